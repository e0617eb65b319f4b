use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{trace, warn};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error while writing artifact: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error while writing artifact: {0}")]
    Csv(#[from] csv::Error),
}

/// Defines the interface for files prepared as engine input.
pub trait InputArtifact {
    /// Prefix of the temporary file name, used to recognise leftovers.
    const PREFIX: &'static str;

    /// Serializes the artifact to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(&self, writer: &mut impl Write) -> Result<(), ArtifactError>;

    /// Writes the artifact to a fresh temporary file and syncs it to disk.
    ///
    /// The file lives as long as the returned [`TempArtifact`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, written or synced.
    fn materialize(&self) -> Result<TempArtifact, ArtifactError> {
        let file = tempfile::Builder::new().prefix(Self::PREFIX).tempfile()?;
        {
            let mut writer = BufWriter::new(file.as_file());
            self.write_to(&mut writer)?;
            writer.flush()?;
        }
        file.as_file().sync_all()?;
        trace!(path = ?file.path(), "Materialized input artifact.");
        Ok(TempArtifact { file })
    }
}

/// A temporary file that is deleted when dropped.
#[derive(Debug)]
pub struct TempArtifact {
    file: NamedTempFile,
}

impl TempArtifact {
    /// Creates an empty temporary file for an engine to write its output into.
    pub fn empty(prefix: &str) -> Result<Self, ArtifactError> {
        let file = tempfile::Builder::new().prefix(prefix).tempfile()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Absolute path rendered for use on an engine command line.
    pub fn arg(&self) -> String {
        self.file.path().to_string_lossy().into_owned()
    }

    pub fn read_to_string(&self) -> Result<String, ArtifactError> {
        Ok(fs::read_to_string(self.file.path())?)
    }

    /// Deletes the file now. Failures are logged, not returned.
    pub fn discard(self) {
        let path: PathBuf = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!(path = ?path, error = %e, "Failed to remove temporary artifact.");
        }
    }
}

/// Removes a file an engine leaves behind as a side effect. Missing files are fine.
pub fn remove_litter(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => trace!(path = ?path, "Removed engine litter."),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = ?path, error = %e, "Failed to remove engine litter."),
    }
}
