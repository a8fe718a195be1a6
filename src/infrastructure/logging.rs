use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt};

/// Routes `tracing` output to a file, since stdout belongs to the terminal UI.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. When the log file
/// cannot be opened a warning goes to stderr and the client runs without file
/// logging; returns whether a log file is in use.
pub fn init_logging(path: &Path) -> bool {
    let file = match open_log_file(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {}; logging disabled", path.display(), e);
            return false;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (e.g. by an embedding program).
    let _ = fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    true
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
