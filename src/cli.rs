//! CLI interface for nextmind

use anyhow::{Result, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::assistant::AssistantMessage;
use crate::catalog::Catalog;
use crate::completion::objective_source;
use crate::config::{self, Config};
use crate::journal::{ObjectiveOutcome, SqliteKvStore};
use crate::navigator::Session;
use crate::types::{JournalField, Project, ProjectStatus};

#[derive(Parser)]
#[command(name = "nextmind")]
#[command(about = "NextMind incubator: learning catalog, CORE journal and objective proxy", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (catalog API and objective proxy)
    Serve {
        /// Port to listen on (default from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,
        /// Enable HTTPS
        #[arg(long)]
        https: bool,
        /// Path to SSL certificate
        #[arg(long)]
        cert: Option<String>,
        /// Path to SSL private key
        #[arg(long)]
        key: Option<String>,
    },
    /// Browse the catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Work with the CORE journal of a lesson
    Journal {
        #[command(subcommand)]
        command: JournalCommands,
    },
    /// Ask the lesson assistant a question
    Assist {
        project: String,
        lesson: String,
        /// Your question
        message: String,
    },
    /// Configure nextmind
    Config {
        /// Store the completion provider API key (server side)
        #[arg(long)]
        set_api_key: Option<String>,
        /// Remove the stored API key
        #[arg(long)]
        delete_api_key: bool,
        /// Set the objective model
        #[arg(long)]
        set_model: Option<String>,
        /// Set the objective proxy URL
        #[arg(long)]
        set_proxy: Option<String>,
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Print the default configuration
        #[arg(long)]
        default: bool,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List projects
    List {
        /// Filter by status (available, in-progress, completed, locked)
        #[arg(short, long)]
        status: Option<String>,
        /// Match title, category or tag
        #[arg(short = 'q', long)]
        search: Option<String>,
    },
    /// Show a project's detail
    Show { project: String },
    /// List a project's lessons, marking the one given
    Lessons {
        project: String,
        /// Active lesson id
        #[arg(long)]
        at: Option<String>,
    },
    /// Dashboard modules and stats
    Dashboard,
}

#[derive(Subcommand)]
enum JournalCommands {
    /// Show the journal entry of a lesson
    Show { project: String, lesson: String },
    /// Set one field (context, objective, reflect, evaluate)
    Set {
        project: String,
        lesson: String,
        field: String,
        text: String,
    },
    /// Generate the Objective from the Context
    Objective {
        project: String,
        lesson: String,
        /// Call the provider in-process with the local key instead of the proxy
        #[arg(long)]
        direct: bool,
    },
    /// Delete the entry of a lesson
    Reset { project: String, lesson: String },
    /// Copy all four fields to the clipboard
    Copy {
        project: String,
        lesson: String,
        /// Print instead of copying
        #[arg(long)]
        print: bool,
    },
    /// Lessons of a project that have journal entries
    List { project: String },
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host, https, cert, key } => {
            let config = Config::load()?;
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            crate::server::start(&host, port, https, cert, key).await?;
        }
        Commands::Catalog { command } => {
            let config = Config::load()?;
            let catalog = Catalog::load(&config)?;
            run_catalog(&catalog, command)?;
        }
        Commands::Journal { command } => {
            let config = Config::load()?;
            let catalog = Catalog::load(&config)?;
            run_journal(&config, &catalog, command).await?;
        }
        Commands::Assist { project, lesson, message } => {
            let config = Config::load()?;
            let catalog = Catalog::load(&config)?;
            let project = find_project(&catalog, &project)?;
            let lesson = project
                .lesson(&lesson)
                .with_context(|| format!("Lesson '{}' not found in '{}'", lesson, project.id))?;
            let reply = crate::assistant::reply(project, lesson, &message)
                .unwrap_or_else(AssistantMessage::greeting);
            println!("🤖 {}", reply.content);
        }
        Commands::Config { set_api_key, delete_api_key, set_model, set_proxy, show: _, default, reset } => {
            if let Some(key) = set_api_key {
                config::set_api_key(&key)?;
            } else if delete_api_key {
                crate::security::delete_api_key()?;
                println!("API key removed.");
            } else if let Some(model) = set_model {
                config::set_model(&model)?;
            } else if let Some(url) = set_proxy {
                config::set_proxy_url(&url)?;
            } else if default {
                print!("{}", config::default_config_toml());
            } else if reset {
                config::reset_config()?;
            } else {
                // --show is also the default
                config::show_config()?;
            }
        }
    }

    Ok(())
}

fn find_project<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a Project> {
    catalog
        .project(id)
        .with_context(|| format!("Project '{}' not found", id))
}

fn run_catalog(catalog: &Catalog, command: CatalogCommands) -> Result<()> {
    match command {
        CatalogCommands::List { status, search } => {
            let status = match status {
                Some(raw) => Some(ProjectStatus::parse(&raw).with_context(|| format!("Unknown status '{}'", raw))?),
                None => None,
            };
            let projects: Vec<&Project> = catalog
                .search(search.as_deref().unwrap_or(""))
                .into_iter()
                .filter(|p| status.map_or(true, |s| p.status == s))
                .collect();

            if projects.is_empty() {
                println!("No projects match.");
            }
            for project in projects {
                println!(
                    "{:<22} {:<30} {:<13} {:<12} {:>3}%",
                    project.id, project.title, project.status, project.difficulty, project.progress
                );
            }
        }
        CatalogCommands::Show { project } => {
            let project = find_project(catalog, &project)?;
            print_project(project);
        }
        CatalogCommands::Lessons { project, at } => {
            let project = find_project(catalog, &project)?;
            let active = match at {
                Some(id) => project
                    .lesson_index(&id)
                    .with_context(|| format!("Lesson '{}' not found in '{}'", id, project.id))?,
                None => 0,
            };
            for (index, lesson) in project.lessons.iter().enumerate() {
                let marker = if index == active {
                    "▶"
                } else if index < active {
                    "✓"
                } else {
                    " "
                };
                println!("{} {}. {:<8} {} ({})", marker, index + 1, lesson.id, lesson.title, lesson.duration);
            }
        }
        CatalogCommands::Dashboard => {
            for stat in catalog.stats() {
                println!("  {:<12} {}", stat.label, stat.value);
            }
            println!();
            println!("Your Modules");
            for module in catalog.modules() {
                let state = if module.is_completed {
                    "Completed".to_string()
                } else if module.is_locked {
                    "Locked".to_string()
                } else {
                    format!("{}%", module.progress)
                };
                println!("  {:<40} {:<10} {:>5} students  {}", module.title, module.duration, module.students, state);
            }
        }
    }
    Ok(())
}

fn print_project(project: &Project) {
    println!("{}", project.title);
    println!("{}", "━".repeat(project.title.chars().count().max(20)));
    println!("{}", project.description);
    println!();
    println!("  Category:     {}", project.category);
    println!("  Duration:     {}", project.duration);
    println!("  Participants: {}", project.participants);
    println!("  Difficulty:   {}", project.difficulty);
    println!("  Status:       {} ({}%)", project.status, project.progress);
    if !project.tags.is_empty() {
        println!("  Tags:         {}", project.tags.join(", "));
    }
    println!();
    println!("Lessons");
    for (i, lesson) in project.lessons.iter().enumerate() {
        println!("  {}. [{}] {} - {}", i + 1, lesson.kind, lesson.title, lesson.duration);
    }
    if !project.ai_features.is_empty() {
        println!();
        println!("AI Features");
        for feature in &project.ai_features {
            println!("  • {}", feature);
        }
    }
    if !project.outcomes.is_empty() {
        println!();
        println!("Outcomes");
        for outcome in &project.outcomes {
            println!("  • {}", outcome);
        }
    }
}

async fn run_journal(config: &Config, catalog: &Catalog, command: JournalCommands) -> Result<()> {
    let store = Arc::new(SqliteKvStore::open(config.journal_path()?)?);

    let open = |project: &str, lesson: &str| -> Result<Session<Arc<SqliteKvStore>>> {
        let project = find_project(catalog, project)?.clone();
        Session::open_at(project, store.clone(), lesson)
    };

    match command {
        JournalCommands::Show { project, lesson } => {
            let session = open(&project, &lesson)?;
            print_session(&session);
        }
        JournalCommands::Set { project, lesson, field, text } => {
            let field = JournalField::parse(&field)
                .with_context(|| format!("Unknown field '{}' (use context, objective, reflect, evaluate)", field))?;
            let mut session = open(&project, &lesson)?;
            session.journal_mut().set_field(field, text)?;
            println!("✓ {} saved", field.heading());
        }
        JournalCommands::Objective { project, lesson, direct } => {
            let mut session = open(&project, &lesson)?;
            let source = objective_source(config, direct);

            println!("⏳ Generating objective...");
            match session.fetch_objective(source.as_ref()).await? {
                ObjectiveOutcome::Remote => println!("✓ Objective updated"),
                ObjectiveOutcome::Fallback { reason } => {
                    println!("⚠ {}", session.journal().notice().unwrap_or_default());
                    tracing::debug!("Objective fallback reason: {}", reason);
                }
                ObjectiveOutcome::NeedsContext => println!("⚠ Context is empty"),
                ObjectiveOutcome::Busy => println!("⚠ An objective request is already running"),
                ObjectiveOutcome::Stale => println!("⚠ Lesson changed before the response arrived"),
            }
            println!();
            println!("Objective:\n{}", session.journal().entry().objective);
        }
        JournalCommands::Reset { project, lesson } => {
            let mut session = open(&project, &lesson)?;
            session.journal_mut().reset()?;
            println!("✓ Journal entry for {} cleared", session.journal().key());
        }
        JournalCommands::Copy { project, lesson, print } => {
            let session = open(&project, &lesson)?;
            let summary = session.journal().copy_summary();
            if print {
                println!("{}", summary);
            } else {
                crate::clipboard::copy_to_clipboard(&summary)?;
                println!("✓ Summary copied to clipboard");
            }
        }
        JournalCommands::List { project } => {
            let project = find_project(catalog, &project)?;
            let prefix = format!("core-journal:{}:", project.id);
            let keys = store.keys_with_prefix(&prefix)?;
            if keys.is_empty() {
                println!("No journal entries for {}", project.id);
            }
            for lesson in &project.lessons {
                if keys.iter().any(|k| k[prefix.len()..] == lesson.id) {
                    println!("  {:<8} {}", lesson.id, lesson.title);
                }
            }
        }
    }

    Ok(())
}

fn print_session(session: &Session<Arc<SqliteKvStore>>) {
    let lesson = session.current_lesson();
    let entry = session.journal().entry();

    println!("{} · {}", session.project().title, session.navigator().position());
    println!("{} [{}] ({})", lesson.title, lesson.kind, lesson.duration);
    println!();
    println!("{}", session.journal().copy_summary());
    println!();
    match entry.last_saved_at {
        Some(at) => println!("Last saved: {}", at.to_rfc3339()),
        None => println!("Not saved yet"),
    }
}
