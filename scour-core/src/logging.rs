//! Logging initialisation for cleanup runs.

use env_logger::Target;
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

const LOG_DIR: &str = "/var/log/scour";

/// Initialise the `log` facade for a cleanup run.
///
/// Logs go to a stable file so a failed provisioning attempt leaves a
/// transcript behind; stderr is the fallback when the file cannot be
/// created (unprivileged runs, readonly roots).
pub fn init() {
    let target = open_log_target(Path::new(LOG_DIR)).unwrap_or(Target::Stderr);
    env_logger::Builder::from_default_env()
        .target(target)
        .filter_level(LevelFilter::Info)
        .init();
}

fn open_log_target(dir: &Path) -> io::Result<Target> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("cleanup.log"))?;
    Ok(Target::Pipe(Box::new(file)))
}
