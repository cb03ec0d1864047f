mod cache;
mod event;
mod lyrics;
mod player;
mod pool;
mod state;
mod text_utils;
mod ui;

use crate::lyrics::SqliteLyricsStore;
use crate::player::StatusCommand;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_DATABASE: &str = "lyrics/music.sqlite3";

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Synced lyrics for the track playing in cmus")]
pub struct Config {
    /// Print the current lyric line to stdout instead of the full-screen UI
    #[arg(long)]
    pipe: bool,
    /// Path to the lyrics database. Falls back to CMUS_LYRICS_DB, then lyrics/music.sqlite3
    #[arg(long)]
    database: Option<PathBuf>,
    /// Program that prints the player status
    #[arg(long, default_value = "cmus-remote")]
    status_command: String,
    /// Arguments for the status program (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "-Q", allow_hyphen_values = true)]
    status_arg: Vec<String>,
    /// How often to poll the player, in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_interval_ms: u64,
    /// Enable backend logging to stderr
    #[arg(long)]
    pub debug_log: bool,
    /// Write backend logs to this file (works together with the full-screen UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn status_command(&self) -> StatusCommand {
        StatusCommand::new(self.status_command.clone(), self.status_arg.iter().cloned())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }
}

fn database_from_env_if_unset(cli: &mut Config) {
    if cli.database.is_none()
        && let Ok(s) = std::env::var("CMUS_LYRICS_DB")
        && !s.trim().is_empty()
    {
        cli.database = Some(PathBuf::from(s.trim()));
    }
}

/// Install a subscriber only when asked to, so log lines never land on the
/// alternate screen.
fn init_logging(cfg: &Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Some(path) = &cfg.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if cfg.debug_log {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// Opens the store, runs the selected mode, then releases the store.
async fn run(cfg: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let db_path = cfg.database_path();
    let store = SqliteLyricsStore::open(&db_path)
        .await
        .map_err(|e| format!("cannot open lyrics database {}: {}", db_path.display(), e))?;

    let result = if cfg.pipe {
        crate::ui::pipe::display_lyrics_pipe(store.clone(), cfg).await
    } else {
        crate::ui::modern::display_lyrics_modern(store.clone(), cfg).await
    };
    store.close().await;
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut cfg = Config::parse();
    database_from_env_if_unset(&mut cfg);
    if let Err(e) = init_logging(&cfg) {
        eprintln!("Error: cannot set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cmus() {
        let cfg = Config::parse_from(["cmus-lyrics"]);
        assert_eq!(cfg.status_command().program(), "cmus-remote");
        assert_eq!(cfg.status_arg, vec!["-Q".to_string()]);
        assert_eq!(cfg.poll_interval(), Duration::from_millis(500));
        assert!(!cfg.pipe);
    }

    #[test]
    fn explicit_database_wins() {
        let cfg = Config::parse_from(["cmus-lyrics", "--database", "/tmp/x.sqlite3"]);
        assert_eq!(cfg.database_path(), PathBuf::from("/tmp/x.sqlite3"));
    }

    #[test]
    fn status_args_are_split() {
        let cfg = Config::parse_from([
            "cmus-lyrics",
            "--status-command",
            "sh",
            "--status-arg",
            "-c,cat status.txt",
            "--poll-interval-ms",
            "250",
        ]);
        assert_eq!(cfg.status_arg, vec!["-c".to_string(), "cat status.txt".to_string()]);
        assert_eq!(cfg.poll_interval(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn missing_database_is_one_readable_error() {
        let path = std::env::temp_dir().join("cmus-lyrics-missing-startup.sqlite3");
        let cfg = Config::parse_from(["cmus-lyrics", "--pipe", "--database", path.to_str().unwrap()]);
        let err = run(cfg).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("cannot open lyrics database"), "{}", msg);
        assert!(msg.contains("cmus-lyrics-missing-startup.sqlite3"));
    }
}
