//! Command-line client for the creative tracker.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde_json::json;
use std::io;
use tracker_core::config::expand_tilde;
use tracker_core::models::{EditField, Persona, Phase, Project, ProjectMap};
use tracker_core::tracker::{Notice, NoticeLevel, Rendered, SyncOutcome, ToggleOutcome};
use tracker_core::view::CompletionStats;
use tracker_core::{Config, SheetsProxy, Tracker};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ctrack", about = "Creative tracker CLI", version)]
struct Cli {
    /// Proxy base URL (can also be set via TRACKER_API_URL)
    #[arg(short, long, env = "TRACKER_API_URL")]
    api: Option<String>,

    /// Local store directory (can also be set via TRACKER_DB_PATH)
    #[arg(long, env = "TRACKER_DB_PATH")]
    db: Option<String>,

    /// Creative catalog file (can also be set via TRACKER_CATALOG)
    #[arg(long, env = "TRACKER_CATALOG")]
    catalog: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Persona to work on (P3, P5)
    #[arg(short, long, global = true, default_value = "P3")]
    persona: Persona,

    /// Funnel phase to work on (TOFU, MOFU, BOFU)
    #[arg(long, global = true, default_value = "TOFU")]
    phase: Phase,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// List creatives for the selected persona and phase
    List {
        /// Case-insensitive filter on id, headline and subline
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long)]
        hide_pending: bool,
        #[arg(long)]
        hide_created: bool,
    },
    /// Show completion statistics
    Stats,
    /// Override one field of a creative
    Edit {
        id: String,
        /// headline, subline, cta or visual_description
        field: EditField,
        value: String,
    },
    /// Flip a creative between pending and created
    Toggle { id: String },
    /// Add a custom creative to the selected persona and phase
    Add {
        headline: String,
        #[arg(short, long, default_value = "")]
        subline: String,
    },
    /// Remove a custom creative
    Remove { id: String },
    /// Print the production brief of a creative
    Brief { id: String },
    /// Manage tracked projects
    #[command(subcommand)]
    Project(ProjectCommands),
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// List registered projects
    List,
    /// Show the active project
    Current,
    /// Make a project active
    Use { id: String },
    /// Create a spreadsheet for a new project and make it active
    Create {
        name: String,
        /// Share the new spreadsheet with this address (repeatable)
        #[arg(short, long = "email")]
        emails: Vec<String>,
    },
    /// Print the rows mirrored in the active project's sheet
    Rows {
        /// A1 range to read instead of the whole sheet
        #[arg(short, long)]
        range: Option<String>,
    },
}

fn encoding_error(err: serde_json::Error) -> String {
    format!("response encoding error: {}", err)
}

fn explicit_override(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_config(
    api: Option<String>,
    db: Option<String>,
    catalog: Option<String>,
    timeout: Option<u64>,
) -> Config {
    let mut config = Config::from_env();
    if let Some(api) = explicit_override(api) {
        config.api_url = api;
    }
    if let Some(db) = explicit_override(db) {
        config.db_path = expand_tilde(db);
    }
    if let Some(catalog) = explicit_override(catalog) {
        config.catalog_path = expand_tilde(catalog);
    }
    if let Some(timeout) = timeout {
        config.request_timeout_secs = timeout;
    }
    config
}

fn status_marker(created: bool) -> &'static str {
    if created {
        "✅"
    } else {
        "⏳"
    }
}

fn format_list_output(rendered: &Rendered, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(rendered).map_err(encoding_error);
    }

    let mut lines = vec![format!(
        "{} | {}",
        rendered.breadcrumb,
        rendered.stats.summary()
    )];
    if rendered.projection.items.is_empty() {
        lines.push("No creatives match the current filters".to_string());
    }
    for item in &rendered.projection.items {
        lines.push(format!(
            "{} {:<18} {}",
            status_marker(item.status.is_created()),
            item.creative.id,
            item.fields.headline
        ));
        if !item.fields.subline.is_empty() {
            lines.push(format!("   {:<18} {}", "", item.fields.subline));
        }
    }
    Ok(lines.join("\n"))
}

fn format_stats_output(breadcrumb: &str, stats: &CompletionStats, json: bool) -> Result<String, String> {
    if json {
        let value = json!({
            "breadcrumb": breadcrumb,
            "total": stats.total,
            "created": stats.created,
            "percent": stats.percent,
        });
        return serde_json::to_string_pretty(&value).map_err(encoding_error);
    }
    Ok(format!("{} | {}", breadcrumb, stats.summary()))
}

fn format_toggle_output(id: &str, outcome: &ToggleOutcome, json: bool) -> Result<String, String> {
    let status = outcome.entry.status.as_str();
    if json {
        let sync = match &outcome.sync {
            SyncOutcome::Skipped => json!({ "state": "skipped" }),
            SyncOutcome::Synced(ack) => json!({
                "state": "synced",
                "message": ack.message,
                "rowNumber": ack.row_number,
            }),
            SyncOutcome::Failed(error) => json!({ "state": "failed", "error": error }),
        };
        let value = json!({
            "id": id,
            "status": status,
            "date": outcome.entry.date,
            "sync": sync,
        });
        return serde_json::to_string_pretty(&value).map_err(encoding_error);
    }

    let sync = match &outcome.sync {
        SyncOutcome::Skipped => "not synced".to_string(),
        SyncOutcome::Synced(ack) => match ack.row_number {
            Some(row) => format!("synced, row {}", row),
            None => "synced, appended".to_string(),
        },
        SyncOutcome::Failed(error) => format!("sync failed: {}", error),
    };
    Ok(format!(
        "{} {}: {} ({})",
        status_marker(outcome.entry.is_created()),
        id,
        status,
        sync
    ))
}

fn format_project_output(project: &Project, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(project).map_err(encoding_error);
    }
    let mut lines = vec![
        format!("{} ({})", project.name, project.id),
        format!("  sheet: {} [{}]", project.sheet_id, project.sheet_name),
    ];
    if let Some(url) = &project.url {
        lines.push(format!("  url:   {}", url));
    }
    Ok(lines.join("\n"))
}

fn format_projects_output(projects: &ProjectMap, current: &str, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(projects).map_err(encoding_error);
    }
    Ok(projects
        .values()
        .map(|project| {
            let marker = if project.id == current { '*' } else { ' ' };
            format!(
                "{} {:<20} {:<28} {}",
                marker, project.id, project.name, project.sheet_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

fn format_rows_output(rows: &[Vec<String>], json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(rows).map_err(encoding_error);
    }
    Ok(rows
        .iter()
        .map(|row| row.join(" | "))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn format_notice(notice: &Notice) -> String {
    let level = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Danger => "error",
    };
    format!("[{}] {}", level, notice.message)
}

fn emit(output: Result<String, String>, action: &str) {
    match output {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{}", output),
        Err(message) => {
            eprintln!("{} failed: {}", action, message);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ctrack=warn,tracker_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let Cli {
        api,
        db,
        catalog,
        timeout,
        json,
        persona,
        phase,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let config = resolve_config(api, db, catalog, timeout);
    let mut tracker = Tracker::from_config(&config)?;
    tracker.set_persona(persona);
    tracker.set_phase(phase);

    let (result, notices) = run_and_collect_notices(&mut tracker, command, json).await;
    for notice in notices {
        eprintln!("{}", format_notice(&notice));
    }
    result
}

/// Run `command` and return the notices it recorded, whether it failed or not.
async fn run_and_collect_notices<P: SheetsProxy>(
    tracker: &mut Tracker<P>,
    command: Commands,
    json: bool,
) -> (anyhow::Result<()>, Vec<Notice>) {
    let result = run_command(tracker, command, json).await;
    (result, tracker.take_notices())
}

async fn run_command<P: SheetsProxy>(
    tracker: &mut Tracker<P>,
    command: Commands,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Completions { .. } => {
            anyhow::bail!("completions are generated before the tracker is opened")
        }
        Commands::List {
            search,
            hide_pending,
            hide_created,
        } => {
            tracker.set_search(search);
            tracker.set_visibility(!hide_pending, !hide_created);
            let rendered = tracker.render()?;
            emit(format_list_output(&rendered, json), "List");
        }
        Commands::Stats => {
            let stats = tracker.stats()?;
            emit(format_stats_output(&tracker.breadcrumb(), &stats, json), "Stats");
        }
        Commands::Edit { id, field, value } => {
            tracker.update_edit(&id, field, value)?;
            if !json {
                println!("Updated {} of {}", field.key(), id);
            }
        }
        Commands::Toggle { id } => {
            let outcome = tracker.toggle_status(&id).await?;
            emit(format_toggle_output(&id, &outcome, json), "Toggle");
        }
        Commands::Add { headline, subline } => {
            let (persona, phase) = (tracker.view().persona, tracker.view().phase);
            let creative = tracker.add_custom(persona, phase, &headline, &subline)?;
            let output = if json {
                serde_json::to_string_pretty(&creative).map_err(encoding_error)
            } else {
                Ok(format!("Added: {} ({})", creative.headline, creative.id))
            };
            emit(output, "Add");
        }
        Commands::Remove { id } => {
            if !tracker.delete_custom(&id)? {
                anyhow::bail!("no custom creative with id '{}'", id);
            }
            if !json {
                println!("Removed: {}", id);
            }
        }
        Commands::Brief { id } => {
            let brief = tracker.brief(&id)?;
            let output = if json {
                serde_json::to_string_pretty(&json!({ "id": id, "brief": brief }))
                    .map_err(encoding_error)
            } else {
                Ok(brief)
            };
            emit(output, "Brief");
        }
        Commands::Project(ProjectCommands::List) => {
            let projects = tracker.projects()?;
            let current = tracker.store().current_project_id()?;
            emit(format_projects_output(&projects, &current, json), "Project list");
        }
        Commands::Project(ProjectCommands::Current) => {
            let project = tracker.current_project()?;
            emit(format_project_output(&project, json), "Project current");
        }
        Commands::Project(ProjectCommands::Use { id }) => {
            let project = tracker.select_project(&id)?;
            emit(format_project_output(&project, json), "Project use");
        }
        Commands::Project(ProjectCommands::Create { name, emails }) => {
            let project = tracker.create_project(&name, &emails).await?;
            emit(format_project_output(&project, json), "Project create");
        }
        Commands::Project(ProjectCommands::Rows { range }) => {
            let rows = tracker.read_remote_rows(range.as_deref()).await?;
            emit(format_rows_output(&rows, json), "Project rows");
        }
    }
    Ok(())
}
