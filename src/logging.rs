use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};

/// Info to stderr, debug to `<log_dir>/<name>_<timestamp>.log`.
/// Returns the log file path.
pub fn init_logging(log_dir: &Path, name: &str) -> Result<PathBuf> {
    create_dir_all(log_dir)
        .with_context(|| format!("cannot create log dir {}", log_dir.display()))?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("{name}_{ts}.log"));

    let config = ConfigBuilder::new().build();
    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Debug,
            config,
            File::create(&log_path)
                .with_context(|| format!("cannot create log file {}", log_path.display()))?,
        ),
    ])?;

    Ok(log_path)
}
