//! Builder describing one external tool invocation.

use crate::progress::ProgressFormat;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A fully described tool invocation, handed to a [`crate::ToolRunner`].
///
/// Arguments may contain credentials, so the [`std::fmt::Debug`] output
/// and all log messages only show the program name.
///
/// # Example
///
/// ```
/// use gool_av::{ProgressFormat, ToolCommand};
///
/// let mut cmd = ToolCommand::new("mkvmerge");
/// cmd.arg("-o").arg("out.mkv").progress(ProgressFormat::Mkvmerge);
/// assert_eq!(cmd.program_name(), "mkvmerge");
/// assert_eq!(cmd.get_args(), ["-o", "out.mkv"]);
/// ```
#[derive(Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    progress: ProgressFormat,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            progress: ProgressFormat::None,
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Append a path argument.
    pub fn path_arg(&mut self, path: &Path) -> &mut Self {
        self.arg(path.to_string_lossy())
    }

    /// Select how progress is read from the tool's stdout.
    pub fn progress(&mut self, format: ProgressFormat) -> &mut Self {
        self.progress = format;
        self
    }

    /// Limit the execution time. Without a limit the tool may run forever.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = Some(d);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn progress_format(&self) -> ProgressFormat {
        self.progress
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// File name of the program, used in logs and error messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}

impl std::fmt::Debug for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCommand")
            .field("program", &self.program)
            .field("args", &format_args!("[{} hidden]", self.args.len()))
            .field("progress", &self.progress)
            .field("timeout", &self.timeout)
            .finish()
    }
}
