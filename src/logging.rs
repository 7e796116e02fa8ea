//! Tracing setup: console plus a daily file under the configured log directory
//! (`urban_map.log.YYYY-MM-DD`). `RUST_LOG` overrides the default filter.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(log_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(Path::new(log_dir))?;

    let (writer, guard) =
        tracing_appender::non_blocking(RollingFileAppender::new(Rotation::DAILY, log_dir, "urban_map.log"));
    // flushed at exit only if the guard outlives main
    std::mem::forget(guard);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,urban_map=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .try_init()?;

    tracing::info!(log_dir, "Logging initialized");
    Ok(())
}

/// Report a failed map operation, e.g. `log_map_error!("mount", err)`
#[macro_export]
macro_rules! log_map_error {
    ($op:expr, $err:expr) => {
        tracing::error!(op = $op, error = %$err, "Map operation failed")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("logs");
        init_logging(dir.to_str().unwrap()).unwrap();
        assert!(dir.is_dir());
        crate::log_map_error!("test", "expected failure");
    }
}
