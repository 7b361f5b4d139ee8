//! Structured logging for Quarry.
//!
//! Console output carries uptime timestamps, targets and thread names, so
//! lines from the `chunk-stream-worker` thread are easy to tell apart from the
//! main loop. Debug builds can additionally write JSON lines to a log file.
//! The level comes from `RUST_LOG` if set, else from the config.

use std::fs::File;
use std::path::Path;

use quarry_config::Config;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File written inside the log directory in debug builds.
pub const LOG_FILE_NAME: &str = "quarry.log";

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - whether to enable the file layer
/// * `config` - source of the `debug.log_level` filter
///
/// Panics if a global subscriber is already set.
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let subscriber = tracing_subscriber::registry()
        .with(build_filter(config))
        .with(console_layer());

    if let Some(file) = open_log_file(log_dir, debug_build) {
        subscriber.with(json_file_layer(file)).init();
        return;
    }
    subscriber.init();
}

/// `RUST_LOG` if set and valid, otherwise [`filter_directives`].
pub fn build_filter(config: Option<&Config>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(config)))
}

/// The configured log level, or [`DEFAULT_FILTER`] when unset or blank.
pub fn filter_directives(config: Option<&Config>) -> String {
    config
        .map(|config| config.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

fn console_layer<S>() -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime())
}

fn json_file_layer<S>(file: File) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime())
        .json()
}

fn open_log_file(log_dir: Option<&Path>, debug_build: bool) -> Option<File> {
    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(file) = File::create(log_dir.join(LOG_FILE_NAME))
    {
        return Some(file);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_to_info() {
        assert_eq!(filter_directives(None), "info");

        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directives(Some(&config)), "info");
    }

    #[test]
    fn test_filter_follows_config() {
        let mut config = Config::default();
        config.debug.log_level = "warn,quarry_region=debug".to_string();
        let directives = filter_directives(Some(&config));
        assert_eq!(directives, "warn,quarry_region=debug");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_log_file_only_in_debug_builds() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        assert!(open_log_file(Some(&log_dir), false).is_none());
        assert!(!log_dir.exists());
        assert!(open_log_file(None, true).is_none());

        assert!(open_log_file(Some(&log_dir), true).is_some());
        assert!(log_dir.join(LOG_FILE_NAME).exists());
    }

    #[test]
    fn test_file_layer_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let file = open_log_file(Some(dir.path()), true).unwrap();
        let subscriber = tracing_subscriber::registry().with(json_file_layer(file));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(sectors = 2, "Saved chunk");
            tracing::debug!("Chunk worker started");
        });

        let contents = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("each line is JSON"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["fields"]["message"], "Saved chunk");
        assert_eq!(lines[0]["fields"]["sectors"], 2);
        assert_eq!(lines[1]["level"], "DEBUG");
    }
}
