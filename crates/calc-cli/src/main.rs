mod config;
mod session;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use calc_core::{parse_keys, HistoryStore};
use calc_store::{HistoryWriter, SqliteHistoryStore};

use config::Config;
use session::Session;

#[derive(Parser)]
#[command(
    name = "calc",
    version,
    about = "Keypad calculator with persistent history"
)]
struct Cli {
    /// Path to the SQLite history database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive keypad: one line of keys per input (default)
    Keypad,

    /// Press a run of keys and print the display
    Tap {
        /// Key glyphs, e.g. "7+3=" or "12*-3="
        #[arg(allow_hyphen_values = true)]
        keys: String,

        /// Do not record the calculation
        #[arg(long)]
        no_history: bool,
    },

    /// Browse or edit calculation history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Show the active configuration
    Config,
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List records, newest first
    List {
        /// Maximum records (default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one record
    Delete {
        /// Record ID
        id: i64,
    },

    /// Delete every record
    Clear,

    /// Show a record as the calculator would display it
    Restore {
        /// Record ID
        id: i64,
    },
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "calc", "calc")
        .map(|dirs| dirs.data_dir().join("history.db"))
        .unwrap_or_else(|| PathBuf::from("history.db"))
}

fn resolve_db_path(db: Option<PathBuf>, cfg: &Config) -> PathBuf {
    db.or_else(|| cfg.store.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn open_store(path: &Path) -> Result<SqliteHistoryStore> {
    SqliteHistoryStore::new(path).context("failed to open history database")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;
    let db_path = resolve_db_path(cli.db, &cfg);

    match cli.command.unwrap_or(Commands::Keypad) {
        Commands::Keypad => cmd_keypad(&db_path, &cfg),
        Commands::Tap { keys, no_history } => cmd_tap(&db_path, &cfg, &keys, no_history),
        Commands::History { command } => {
            let store = open_store(&db_path)?;
            match command {
                HistoryCommands::List { limit, json } => {
                    cmd_history_list(&store, limit.unwrap_or(cfg.history.limit), json)
                }
                HistoryCommands::Delete { id } => cmd_history_delete(&store, id),
                HistoryCommands::Clear => cmd_history_clear(&store),
                HistoryCommands::Restore { id } => cmd_history_restore(&store, &cfg, id),
            }
        }
        Commands::Config => cmd_config(&db_path, &cfg),
    }
}

// ---------------------------------------------------------------------------
// Keypad commands
// ---------------------------------------------------------------------------

/// Spawn the writer on one connection and keep a second one for reads.
fn open_history(
    path: &Path,
    cfg: &Config,
) -> Result<(Option<HistoryWriter>, Option<SqliteHistoryStore>)> {
    if !cfg.history.enabled {
        return Ok((None, None));
    }
    let writer = HistoryWriter::spawn(open_store(path)?);
    let reader = open_store(path)?;
    Ok((Some(writer), Some(reader)))
}

fn cmd_keypad(db_path: &Path, cfg: &Config) -> Result<()> {
    let (writer, reader) = open_history(db_path, cfg)?;
    let mut session = Session::new(writer, cfg.keypad.show_preview);

    println!("calc keypad: type keys like 7+3= and press enter, :quit to exit");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    session.run(stdin.lock(), reader.as_ref(), &mut stdout)?;
    stdout.flush()?;

    session.finish();
    Ok(())
}

fn cmd_tap(db_path: &Path, cfg: &Config, keys: &str, no_history: bool) -> Result<()> {
    let keys = parse_keys(keys).map_err(anyhow::Error::msg)?;

    let writer = if cfg.history.enabled && !no_history {
        Some(HistoryWriter::spawn(open_store(db_path)?))
    } else {
        None
    };
    let mut session = Session::new(writer, cfg.keypad.show_preview);
    session.press_all(keys);

    for line in session.display() {
        println!("{line}");
    }
    session.finish();
    Ok(())
}

// ---------------------------------------------------------------------------
// History commands
// ---------------------------------------------------------------------------

fn cmd_history_list(store: &SqliteHistoryStore, limit: usize, json: bool) -> Result<()> {
    let records = store.list(Some(limit))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    println!("{:>5}  {:<30} Result", "ID", "Expression");
    println!("{}", "-".repeat(48));
    for r in &records {
        println!("{:>5}  {:<30} {}", r.id, r.expression, r.result);
    }
    Ok(())
}

fn cmd_history_delete(store: &SqliteHistoryStore, id: i64) -> Result<()> {
    store.delete(id)?;
    println!("Deleted: {id}");
    Ok(())
}

fn cmd_history_clear(store: &SqliteHistoryStore) -> Result<()> {
    let removed = store.clear_all()?;
    println!("Cleared {removed} records.");
    Ok(())
}

fn cmd_history_restore(store: &SqliteHistoryStore, cfg: &Config, id: i64) -> Result<()> {
    let record = store
        .get(id)?
        .with_context(|| format!("history record not found: {id}"))?;

    let mut session = Session::new(None, cfg.keypad.show_preview);
    session.restore(&record);
    for line in session.display() {
        println!("{line}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(db_path: &Path, cfg: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[store]");
    println!("  path = {}", db_path.display());
    println!();
    println!("[history]");
    println!("  enabled = {}", cfg.history.enabled);
    println!("  limit = {}", cfg.history.limit);
    println!();
    println!("[keypad]");
    println!("  show_preview = {}", cfg.keypad.show_preview);
    Ok(())
}
