use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, Once};

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "TIMEBUDGET_LOG";
const LOG_FILE_NAME: &str = "timebudget.log";

static TRACING_INIT: Once = Once::new();

/// `$TIMEBUDGET_LOG` wins; otherwise our own crates log at `level` and
/// dependencies at warn.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,timebudget_core={0},timebudget={0}", level))
    })
}

pub fn init_stderr(level: &str) {
    TRACING_INIT.call_once(|| {
        fmt()
            .with_env_filter(filter(level))
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}

/// The TUI owns the terminal, so its logs go to `<data_dir>/timebudget.log`.
pub fn init_file(level: &str, data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE_NAME))?;
    TRACING_INIT.call_once(|| {
        fmt()
            .with_env_filter(filter(level))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    });
    Ok(())
}
