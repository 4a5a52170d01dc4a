use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::errors::OnnxModelError;

/// Model file on disk, optionally pinned to a recorded checksum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnnxArtefact {
    /// Location of the artefact on disk.
    pub path: PathBuf,
    /// Expected SHA-256 checksum as hexadecimal. `None` skips verification.
    #[serde(default)]
    pub sha256: Option<String>,
}

impl OnnxArtefact {
    /// Artefact at `path` without a pinned checksum.
    #[must_use]
    pub fn unpinned(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sha256: None,
        }
    }

    /// Verifies the artefact checksum when one is recorded.
    ///
    /// # Errors
    ///
    /// Returns `ChecksumMismatch` when the computed digest does not match
    /// `sha256` and propagates I/O errors while reading the file.
    pub fn verify(&self) -> Result<(), OnnxModelError> {
        let Some(expected) = self.sha256.as_deref() else {
            return Ok(());
        };
        let expected = normalise_hex(expected);
        let actual = compute_sha256(&self.path)?;
        if actual == expected {
            debug!(path = %self.path.display(), "artefact checksum verified");
            Ok(())
        } else {
            Err(OnnxModelError::ChecksumMismatch {
                path: self.path.clone(),
                expected,
                actual,
            })
        }
    }
}

/// Computes the SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns I/O errors from opening or reading the file.
pub fn compute_sha256(path: &Path) -> Result<String, OnnxModelError> {
    let io_error = |source| OnnxModelError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = reader.read(&mut buffer).map_err(io_error)?;
        if read == 0 {
            break;
        }
        let chunk = buffer.get(..read).ok_or_else(|| {
            io_error(std::io::Error::other(
                "read reported bytes beyond buffer length",
            ))
        })?;
        hasher.update(chunk);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[must_use]
pub fn normalise_hex(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
