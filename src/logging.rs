use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Env var naming a log file path. Unset means log to stderr.
pub const LOG_ENV: &str = "STATEBRIDGE_LOG";

/// Initialize tracing.
///
/// Stdout is reserved for data (the view prints states as JSON lines), so
/// logs go to stderr, or to a file when `STATEBRIDGE_LOG` is set. Log files
/// get unique names so owner and view processes never share one:
/// `{path}.{timestamp}.{pid}`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match log_target(std::env::var(LOG_ENV).ok().as_deref()) {
        LogTarget::Stderr => return init_stderr(filter),
        LogTarget::StderrFallback { path, error } => {
            init_stderr(filter);
            tracing::warn!(%path, %error, "Failed to create log file, logging to stderr");
            return;
        }
        LogTarget::File(file) => file,
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
}

#[derive(Debug)]
enum LogTarget {
    Stderr,
    File(std::fs::File),
    /// A log file was requested but could not be created.
    StderrFallback { path: String, error: std::io::Error },
}

fn log_target(log_path: Option<&str>) -> LogTarget {
    let Some(log_path) = log_path else {
        return LogTarget::Stderr;
    };
    let path = unique_log_path(log_path);
    match std::fs::File::create(&path) {
        Ok(file) => LogTarget::File(file),
        Err(error) => LogTarget::StderrFallback { path, error },
    }
}

fn init_stderr(filter: EnvFilter) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339());
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

/// `{path}.{timestamp}.{pid}`
fn unique_log_path(log_path: &str) -> String {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}.{}.{}", log_path, timestamp, pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_gets_timestamp_and_pid() {
        let path = unique_log_path("/tmp/statebridge.log");
        let suffix = path
            .strip_prefix("/tmp/statebridge.log.")
            .unwrap();
        let (timestamp, pid) = suffix.split_once('.').unwrap();
        assert!(timestamp.parse::<u64>().unwrap() > 0);
        assert_eq!(pid, std::process::id().to_string());
    }

    #[test]
    fn unset_path_logs_to_stderr() {
        assert!(matches!(log_target(None), LogTarget::Stderr));
    }

    #[test]
    fn uncreatable_file_falls_back_to_stderr() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing").join("statebridge.log");
        match log_target(missing.to_str()) {
            LogTarget::StderrFallback { path, .. } => {
                assert!(path.starts_with(missing.to_str().unwrap()))
            }
            other => panic!("expected stderr fallback, got {other:?}"),
        }
    }

    #[test]
    fn creatable_file_is_used() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("statebridge.log");
        assert!(matches!(log_target(path.to_str()), LogTarget::File(_)));
    }
}
