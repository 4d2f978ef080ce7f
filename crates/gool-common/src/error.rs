//! Error types shared by the catalog, the cutlist subsystem and the pipeline.
//!
//! None of these abort a run on their own: scan, fetch, cutlist and tool
//! errors are absorbed into the result of the video they belong to. Only
//! [`Error::NoLocations`] is surfaced to the caller as a run-level failure.

use std::path::PathBuf;

/// Common error type for gool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file name does not follow the OTR naming convention.
    #[error("not an OTR video: {}", path.display())]
    Scan { path: PathBuf },

    /// None of the scan locations could be read.
    #[error("no location could be scanned")]
    NoLocations,

    /// Network or decoding failure while talking to the cutlist server.
    #[error("cutlist fetch failed: {0}")]
    Fetch(String),

    /// A cutlist document is missing mandatory information.
    #[error("cutlist {id} is incomplete: {reason}")]
    SpecIncomplete { id: String, reason: String },

    /// An external tool could not be run or exited unsuccessfully.
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a new Scan error.
    pub fn scan(path: impl Into<PathBuf>) -> Self {
        Self::Scan { path: path.into() }
    }

    /// Create a new Fetch error.
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new SpecIncomplete error.
    pub fn spec_incomplete(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpecIncomplete {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Tool error.
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
