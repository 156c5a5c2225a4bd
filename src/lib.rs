//! NextMind - learning platform core
//!
//! - Static catalog of learning projects, lessons and dashboard modules
//! - Lesson navigator
//! - CORE reflective journal (Context, Objective, Reflect, Evaluate) with
//!   pluggable key-value persistence
//! - Objective-only summaries from an OpenAI-compatible provider, served
//!   through a server-side proxy so clients never hold the API key
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use nextmind::{Catalog, MemoryKvStore, ProxyClient, Session, JournalField, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let catalog = Catalog::bundled()?;
//!     let project = catalog.project("deepfake-detective").unwrap().clone();
//!     let mut session = Session::open(project, Arc::new(MemoryKvStore::new()))?;
//!     session.journal_mut().set_field(JournalField::Context, "AI deepfakes in elections")?;
//!     session.fetch_objective(&ProxyClient::from_config(&config)?).await?;
//!     println!("{}", session.journal().entry().objective);
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod config;
pub mod security;
pub mod catalog;
pub mod completion;
pub mod journal;
pub mod navigator;
pub mod assistant;
pub mod clipboard;
pub mod server;
pub mod cli;

pub use catalog::Catalog;
pub use completion::{CompletionClient, CompletionError, ObjectiveSource, ProxyClient};
pub use config::Config;
pub use journal::{Journal, KeyValueStore, MemoryKvStore, ObjectiveOutcome, SqliteKvStore};
pub use navigator::{LessonNavigator, Session};
pub use server::{ServerState, start as start_server};
pub use types::{JournalEntry, JournalField, JournalKey, Lesson, LessonMeta, Project};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - NextMind learning platform", NAME, VERSION)
}

/// First `max_chars` characters of `s`, never splitting a code point
pub fn truncate_safe(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
