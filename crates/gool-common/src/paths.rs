//! Layout of the gool working directory.
//!
//! Videos live in one sub directory per status:
//!
//! ```text
//! <working_dir>/
//!   Encoded/   .otrkey files
//!   Decoded/   decoded, uncut videos
//!   Cut/       finished videos
//!   log/       diagnostics written when a tool fails
//! ```

use crate::types::{Stage, VideoStatus};
use std::path::{Path, PathBuf};

const ENCODED_DIR: &str = "Encoded";
const DECODED_DIR: &str = "Decoded";
const CUT_DIR: &str = "Cut";
const LOG_DIR: &str = "log";

/// Extension of encrypted OTR files.
pub const OTRKEY_EXTENSION: &str = "otrkey";

/// Extension of the files produced by the cut tool.
pub const CUT_CONTAINER: &str = "mkv";

/// Resolved paths of the working directory and its sub directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDirs {
    pub root: PathBuf,
    pub encoded: PathBuf,
    pub decoded: PathBuf,
    pub cut: PathBuf,
    pub log: PathBuf,
}

impl WorkDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            encoded: root.join(ENCODED_DIR),
            decoded: root.join(DECODED_DIR),
            cut: root.join(CUT_DIR),
            log: root.join(LOG_DIR),
            root,
        }
    }

    /// Create the working directory and all sub directories if necessary.
    pub fn ensure(&self) -> std::io::Result<()> {
        for dir in [&self.root, &self.encoded, &self.decoded, &self.cut, &self.log] {
            if !dir.is_dir() {
                tracing::debug!("Creating directory {:?}", dir);
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    /// Directory a video with the given status belongs in.
    pub fn dir_for(&self, status: VideoStatus) -> &Path {
        match status {
            VideoStatus::Raw => &self.encoded,
            VideoStatus::Decoded => &self.decoded,
            VideoStatus::Cut => &self.cut,
        }
    }

    /// Glob patterns for the working directory and the status sub directories.
    pub fn scan_patterns(&self) -> Vec<String> {
        [&self.root, &self.encoded, &self.decoded, &self.cut]
            .iter()
            .map(|dir| dir.join("*").to_string_lossy().into_owned())
            .collect()
    }

    /// Diagnostics file for a failed tool run, if the stage runs a tool.
    pub fn error_file(&self, key: &str, stage: Stage) -> Option<PathBuf> {
        stage
            .error_file_suffix()
            .map(|suffix| self.log.join(format!("{key}{suffix}")))
    }

    /// Where the decoder puts the decoded version of an `.otrkey` file.
    pub fn decoded_output(&self, encoded: &Path) -> Option<PathBuf> {
        let stem = encoded.file_stem()?;
        Some(self.decoded.join(stem))
    }

    /// Where the cut tool writes the finished video.
    pub fn cut_output(&self, key: &str) -> PathBuf {
        self.cut.join(format!("{key}.cut.{CUT_CONTAINER}"))
    }

    /// Move a video file into the directory of its status unless it is already there.
    ///
    /// Returns the (possibly new) path.
    pub fn relocate(&self, path: &Path, status: VideoStatus) -> std::io::Result<PathBuf> {
        let file_name = path.file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a file path: {}", path.display()),
            )
        })?;
        let target = self.dir_for(status).join(file_name);
        if target == path {
            return Ok(target);
        }

        tracing::debug!("Moving {:?} to {:?}", path, target);
        std::fs::rename(path, &target)?;
        Ok(target)
    }
}

/// Delete a file that is no longer needed. Failures are logged, not returned.
pub fn remove_superseded(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("{:?} has been deleted", path),
        Err(e) => tracing::warn!("{:?} couldn't be deleted: {}", path, e),
    }
}
