//! Mailwright - a terminal editor for email templates.
//!
//! # Usage
//!
//! ```bash
//! mailwright --api-url https://mail.example.com/api
//! mailwright --autosave-ms 1500 --save
//! MAILWRIGHT_DEBUG_LOG=mailwright.log mailwright
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mailwright::app::{App, DEFAULT_TIMEOUT};
use mailwright::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use mailwright::editor::DEFAULT_AUTOSAVE_DELAY_MS;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// A terminal editor for email templates
#[derive(Parser, Debug)]
#[command(name = "mailwright", version, about, long_about = None)]
struct Cli {
    /// Base URL of the content API (falls back to MAILWRIGHT_API_URL)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Quiet period in milliseconds before an edit is saved
    #[arg(long, value_name = "MS")]
    autosave_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Write debug logs to a file (falls back to MAILWRIGHT_DEBUG_LOG)
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults in the global config
    #[arg(long)]
    save: bool,

    /// Clear saved defaults in the global config
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            api_url: self.api_url.clone(),
            autosave_ms: self.autosave_ms,
            timeout_secs: self.timeout_secs,
            debug_log: self.debug_log.clone(),
        }
    }
}

/// Log to `path` at debug level, or to stderr at WARN when no path is set.
/// `RUST_LOG` still applies on top of either default.
fn init_logging(path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open debug log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("mailwright=debug")),
            )
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
            )
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let env_flags = ConfigFlags {
        api_url: std::env::var("MAILWRIGHT_API_URL").ok(),
        debug_log: std::env::var_os("MAILWRIGHT_DEBUG_LOG").map(PathBuf::from),
        ..ConfigFlags::default()
    };
    let effective = env_flags.union(&file_flags).union(&cli_flags);

    init_logging(effective.debug_log.as_deref())?;

    let api_url = effective
        .api_url
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let timeout = effective
        .timeout_secs
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
    tracing::debug!(%api_url, ?timeout, "config.effective");

    let mut app = App::new(api_url)
        .with_autosave_ms(effective.autosave_ms.unwrap_or(DEFAULT_AUTOSAVE_DELAY_MS))
        .with_timeout(timeout)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
