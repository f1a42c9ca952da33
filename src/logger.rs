//! File logging through `tracing`. The terminal belongs to the UI, so events
//! go to the configured log file.
//!
//! QUIZ_LOG sets the filter directives (default "info,textquiz=debug"),
//! QUIZ_LOG_FORMAT=json switches to structured JSON lines.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub fn init(log_file: &Path) -> std::io::Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let filter = EnvFilter::try_from_env("QUIZ_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info,textquiz=debug"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    // A second init (tests, re-entry) keeps the first subscriber.
    let result = match std::env::var("QUIZ_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().try_init(),
        _ => builder.try_init(),
    };
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
    Ok(())
}
