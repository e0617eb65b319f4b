use std::env;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Changes the process working directory and restores it when dropped.
///
/// The working directory is process-wide. Only one guard may be alive at a time, which
/// holds as long as engines are invoked one after another.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        debug!(from = ?previous, to = ?dir, "Entered engine working directory.");
        Ok(Self { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        match env::set_current_dir(&self.previous) {
            Ok(()) => debug!(to = ?self.previous, "Restored working directory."),
            Err(e) => warn!(
                path = ?self.previous,
                error = %e,
                "Failed to restore working directory."
            ),
        }
    }
}
