//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Decrypts `.otrkey` files.
pub const DECODER_TOOL: &str = "otrdecoder";
/// Cuts decoded videos.
pub const CUT_TOOL: &str = "mkvmerge";

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// First line of the version output, if the tool reports one.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// `configured` takes precedence over a `PATH` lookup.
pub fn check_tool(name: &str, configured: Option<&Path>, version_arg: &str) -> ToolInfo {
    let Ok(path) = get_tool_path(name, configured) else {
        return ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        };
    };

    // otrdecoder has no dedicated version flag and may exit non-zero
    let version = Command::new(&path)
        .arg(version_arg)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| {
            String::from_utf8_lossy(&output.stdout)
                .lines()
                .find(|l| !l.trim().is_empty())
                .map(|s| s.trim().to_string())
        });

    ToolInfo {
        name: name.to_string(),
        available: true,
        version,
        path: Some(path),
    }
}

/// Check the decoder and the cut tool.
pub fn check_tools(decoder: Option<&Path>, mkvmerge: Option<&Path>) -> Vec<ToolInfo> {
    vec![
        check_tool(DECODER_TOOL, decoder, "-v"),
        check_tool(CUT_TOOL, mkvmerge, "--version"),
    ]
}

/// Require that a tool is available on `PATH`, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
///
/// A configured directory is searched for the tool's executable.
pub fn get_tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_dir() {
            let candidate = path.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        } else if path.is_file() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!("Configured path {:?} for {} does not exist", path, name);
    }

    require_tool(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool("nonexistent_tool_12345", None, "--version");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_configured_path_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join(DECODER_TOOL);
        std::fs::write(&exe, b"").unwrap();

        assert_eq!(get_tool_path(DECODER_TOOL, Some(&exe)).unwrap(), exe);
        assert_eq!(get_tool_path(DECODER_TOOL, Some(tmp.path())).unwrap(), exe);
    }

    #[test]
    fn test_require_missing_tool() {
        let err = require_tool("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
