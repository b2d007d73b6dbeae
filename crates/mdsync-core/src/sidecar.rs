//! Sidecar files preserving diagram source next to rendered artifacts.
//!
//! Each diagram's source lives in `code-<id>.txt` inside the artifact
//! directory. Files are write-once: an existing sidecar is never
//! overwritten, so the stored source stays authoritative once the inline
//! source has been removed from the document.

use std::io;
use std::path::{Path, PathBuf};

/// Filename prefix for sidecar source files.
pub const SIDECAR_PREFIX: &str = "code-";

/// Write-once store for diagram sources in an artifact directory.
#[derive(Debug)]
pub struct SidecarCache {
    dir: PathBuf,
}

impl SidecarCache {
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Path of the sidecar file for a diagram identifier.
    #[must_use]
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{SIDECAR_PREFIX}{id}.txt"))
    }

    /// Store diagram source unless a sidecar already exists.
    ///
    /// Returns `true` when a new file was written.
    pub fn store_if_absent(&self, id: &str, source: &str) -> io::Result<bool> {
        let path = self.path_for(id);
        if path.exists() {
            return Ok(false);
        }
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, source)?;
        tracing::debug!(path = %path.display(), "stored diagram source");
        Ok(true)
    }

    /// Load stored source for an identifier, `None` when absent.
    pub fn load(&self, id: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(id)) {
            Ok(source) => Ok(Some(source)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}
