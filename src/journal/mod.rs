//! CORE reflective journal
//!
//! One record per `(project, lesson)` with the Context, Objective, Reflect
//! and Evaluate fields. Every edit rewrites the whole record through the
//! injected [`KeyValueStore`]; there is no batching.
//!
//! "Get Objective" runs in two phases so the owner can keep editing while
//! the request is out:
//!
//! 1. [`Journal::begin_objective`] checks the Context precondition and hands
//!    out an [`ObjectiveTicket`] stamped with the active key and generation.
//! 2. [`Journal::finish_objective`] applies the result, unless the lesson was
//!    switched or reset in the meantime, in which case the result is dropped.

pub mod store;
pub mod sqlite;
pub mod fallback;

use anyhow::{Result, bail};
use chrono::Utc;
use tracing::{debug, warn};

use crate::completion::prompt::EMPTY_OUTPUT_MESSAGE;
use crate::completion::{CompletionError, ObjectiveSource};
use crate::types::{JournalEntry, JournalField, JournalKey, LessonMeta};

pub use store::{KeyValueStore, MemoryKvStore};
pub use sqlite::SqliteKvStore;
pub use fallback::{fallback_summary, FALLBACK_WARNING, PROMPT_FOR_INPUT};

/// An objective request in flight
#[derive(Debug, Clone)]
pub struct ObjectiveTicket {
    key: JournalKey,
    generation: u64,
    /// Context as it was when the request was issued
    pub context: String,
    pub meta: LessonMeta,
}

impl ObjectiveTicket {
    pub fn key(&self) -> &JournalKey {
        &self.key
    }
}

/// Result of [`Journal::begin_objective`]
#[derive(Debug)]
pub enum ObjectiveStart {
    Ready(ObjectiveTicket),
    /// Context was blank; the prompt-for-input message was written
    NeedsContext,
    /// A request for this lesson is already loading
    Busy,
}

/// What a Get Objective invocation did to the journal
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectiveOutcome {
    Remote,
    Fallback { reason: String },
    /// Lesson changed before the response arrived; nothing written
    Stale,
    NeedsContext,
    Busy,
}

/// Journal for the active lesson
pub struct Journal<S: KeyValueStore> {
    store: S,
    key: JournalKey,
    entry: JournalEntry,
    error: bool,
    notice: Option<String>,
    generation: u64,
    in_flight: Option<u64>,
}

impl<S: KeyValueStore> Journal<S> {
    /// Open the journal on a lesson, loading any stored record
    pub fn open(store: S, key: JournalKey) -> Result<Self> {
        let entry = load_entry(&store, &key)?;
        Ok(Self {
            store,
            key,
            entry,
            error: false,
            notice: None,
            generation: 0,
            in_flight: None,
        })
    }

    /// Point the journal at another lesson
    pub fn switch_to(&mut self, key: JournalKey) -> Result<()> {
        let entry = load_entry(&self.store, &key)?;
        self.key = key;
        self.entry = entry;
        self.invalidate();
        Ok(())
    }

    pub fn key(&self) -> &JournalKey {
        &self.key
    }

    pub fn entry(&self) -> &JournalEntry {
        &self.entry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// True while an objective request is loading
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Set when the last objective came from the local fallback
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// User-visible warning, if any
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Edit one field and rewrite the record
    pub fn set_field(&mut self, field: JournalField, value: impl Into<String>) -> Result<()> {
        self.entry.set(field, value.into());
        self.save()
    }

    /// Delete the stored record and clear the fields
    pub fn reset(&mut self) -> Result<()> {
        self.store.delete(&self.key.storage_key())?;
        self.entry = JournalEntry::default();
        self.invalidate();
        debug!(key = %self.key, "Journal record reset");
        Ok(())
    }

    /// All four fields as one text block
    pub fn copy_summary(&self) -> String {
        format_summary(&self.entry)
    }

    /// First phase of Get Objective
    pub fn begin_objective(&mut self, meta: &LessonMeta) -> Result<ObjectiveStart> {
        if meta.key() != self.key {
            bail!("Lesson {} is not the active journal entry ({})", meta.key(), self.key);
        }

        if self.in_flight.is_some() {
            return Ok(ObjectiveStart::Busy);
        }

        if self.entry.context.trim().is_empty() {
            self.set_field(JournalField::Objective, PROMPT_FOR_INPUT)?;
            return Ok(ObjectiveStart::NeedsContext);
        }

        self.in_flight = Some(self.generation);
        Ok(ObjectiveStart::Ready(ObjectiveTicket {
            key: self.key.clone(),
            generation: self.generation,
            context: self.entry.context.clone(),
            meta: meta.clone(),
        }))
    }

    /// Second phase of Get Objective
    pub fn finish_objective(
        &mut self,
        ticket: ObjectiveTicket,
        result: Result<String, CompletionError>,
    ) -> Result<ObjectiveOutcome> {
        if ticket.key != self.key || ticket.generation != self.generation {
            debug!(ticket = %ticket.key, active = %self.key, "Discarding stale objective response");
            return Ok(ObjectiveOutcome::Stale);
        }
        self.in_flight = None;

        match result {
            Ok(text) => {
                // Objective is never left blank once the request went out
                let text = match text.trim() {
                    "" => EMPTY_OUTPUT_MESSAGE.to_string(),
                    trimmed => trimmed.to_string(),
                };
                self.error = false;
                self.notice = None;
                self.set_field(JournalField::Objective, text)?;
                Ok(ObjectiveOutcome::Remote)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Objective request failed, using local summary");
                self.error = true;
                self.notice = Some(FALLBACK_WARNING.to_string());
                self.set_field(JournalField::Objective, fallback_summary(&ticket.meta, &ticket.context))?;
                Ok(ObjectiveOutcome::Fallback { reason: e.to_string() })
            }
        }
    }

    /// Run both phases against a source. No retry.
    pub async fn fetch_objective(
        &mut self,
        meta: &LessonMeta,
        source: &dyn ObjectiveSource,
    ) -> Result<ObjectiveOutcome> {
        let ticket = match self.begin_objective(meta)? {
            ObjectiveStart::Ready(ticket) => ticket,
            ObjectiveStart::NeedsContext => return Ok(ObjectiveOutcome::NeedsContext),
            ObjectiveStart::Busy => return Ok(ObjectiveOutcome::Busy),
        };
        let result = source.objective(&ticket.context, &ticket.meta).await;
        self.finish_objective(ticket, result)
    }

    fn save(&mut self) -> Result<()> {
        self.entry.last_saved_at = Some(Utc::now());
        let json = serde_json::to_string(&self.entry)?;
        self.store.put(&self.key.storage_key(), &json)
    }

    /// Drop per-lesson transient state; outstanding tickets become stale
    fn invalidate(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.error = false;
        self.notice = None;
    }
}

/// Read a record, treating a missing or unreadable one as empty
pub fn load_entry<S: KeyValueStore + ?Sized>(store: &S, key: &JournalKey) -> Result<JournalEntry> {
    match store.get(&key.storage_key())? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(entry) => Ok(entry),
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable journal record, starting empty");
                Ok(JournalEntry::default())
            }
        },
        None => Ok(JournalEntry::default()),
    }
}

/// Format an entry for the clipboard
pub fn format_summary(entry: &JournalEntry) -> String {
    JournalField::all()
        .iter()
        .map(|field| {
            let text = entry.field(*field).trim();
            let text = if text.is_empty() { "(empty)" } else { text };
            format!("{}:\n{}", field.heading(), text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
