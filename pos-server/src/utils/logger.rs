//! Logging Infrastructure
//!
//! Console logging by default; daily rolling files when a log directory is given.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with optional file output
///
/// `RUST_LOG` wins over `log_level` when set. Calling this twice is harmless
/// (the second registration is ignored), which keeps tests that build a full
/// server from fighting over the global subscriber.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},tower_http=info,sqlx=warn")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if let Err(e) = std::fs::create_dir_all(log_path) {
            eprintln!("Cannot create log dir {}: {}, logging to console", dir, e);
        } else {
            let file_appender = tracing_appender::rolling::daily(log_path, "pos-server");
            let _ = subscriber.with_writer(file_appender).with_ansi(false).try_init();
            return;
        }
    }

    let _ = subscriber.try_init();
}
