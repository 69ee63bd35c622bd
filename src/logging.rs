use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a log file.
pub const LOG_PATH_ENV: &str = "GOMARKET_CART_LOG";

/// Initialize tracing.
///
/// Without `GOMARKET_CART_LOG`, only warnings reach stderr, keeping command
/// output clean. With it, events go to a per-run log file.
/// `RUST_LOG` overrides the level in both cases.
pub fn init_tracing() {
    match std::env::var(LOG_PATH_ENV) {
        Ok(log_path) => init_file_sink(&log_path),
        Err(_) => init_stderr_sink(),
    }
}

fn init_stderr_sink() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();
}

/// Log to a file at `info` and above, without ANSI colors.
///
/// The file is named `{log_path}.{unix seconds}.{pid}`, so two CLI runs
/// pointed at the same `GOMARKET_CART_LOG` never write into one file. If the
/// file cannot be created, a warning goes to stderr and tracing stays off.
fn init_file_sink(log_path: &str) {
    let unique_path = unique_log_path(log_path, std::process::id());

    let Ok(file) = std::fs::File::create(&unique_path) else {
        eprintln!(
            "Warning: Failed to create log file: {}",
            unique_path.display()
        );
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
}

fn unique_log_path(log_path: &str, pid: u32) -> PathBuf {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!("{}.{}.{}", log_path, timestamp, pid))
}
