//! Running tool commands as child processes.

use crate::command::ToolCommand;
use crate::progress::ProgressParser;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Outcome of a tool run that got as far as an exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Everything the tool wrote to stderr (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Short description of a failed run for the item result.
    pub fn failure_message(&self) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        };
        match self.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(last) => format!("{status}: {}", last.trim()),
            None => status,
        }
    }
}

/// Narrow boundary to external tools, substitutable in tests.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run `cmd` to completion, reporting progress percentages as they are parsed.
    ///
    /// A tool that starts and exits unsuccessfully is `Ok` with
    /// `success == false`. `Err` means it could not be started or supervised.
    async fn invoke(
        &self,
        cmd: &ToolCommand,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<ToolOutput>;
}

/// [`ToolRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn invoke(
        &self,
        cmd: &ToolCommand,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<ToolOutput> {
        let name = cmd.program_name();
        tracing::debug!("Starting {}", name);

        let mut child = Command::new(cmd.program())
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::tool_failed(&name, format!("failed to spawn: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::tool_failed(&name, "stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::tool_failed(&name, "stderr not captured"))?;

        let mut parser = cmd.progress_format().parser();

        let supervise = async {
            let (scraped, captured) = tokio::join!(
                scrape_progress(stdout, parser.as_mut(), progress),
                read_lossy(stderr)
            );
            scraped?;
            let stderr = captured?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stderr))
        };

        let supervised = match cmd.get_timeout() {
            Some(limit) => tokio::time::timeout(limit, supervise)
                .await
                .map_err(|_| Error::tool_failed(&name, format!("timed out after {limit:?}")))?,
            None => supervise.await,
        };
        let (status, stderr) = supervised
            .map_err(|e| Error::tool_failed(&name, format!("I/O error waiting for process: {e}")))?;

        tracing::debug!("{} finished with {}", name, status);

        Ok(ToolOutput {
            success: status.success(),
            exit_code: status.code(),
            stderr,
        })
    }
}

/// Feed stdout to the parser, splitting on both `\n` and `\r` since tools
/// redraw their progress line with carriage returns.
async fn scrape_progress<R: AsyncRead + Unpin>(
    mut reader: R,
    parser: &mut dyn ProgressParser,
    progress: &(dyn Fn(u8) + Send + Sync),
) -> std::io::Result<()> {
    let mut buf = [0u8; 4096];
    let mut line: Vec<u8> = Vec::new();

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            if byte == b'\n' || byte == b'\r' {
                feed_line(&line, parser, progress);
                line.clear();
            } else {
                line.push(byte);
            }
        }
    }
    feed_line(&line, parser, progress);

    Ok(())
}

fn feed_line(line: &[u8], parser: &mut dyn ProgressParser, progress: &(dyn Fn(u8) + Send + Sync)) {
    if line.is_empty() {
        return;
    }
    if let Some(percent) = parser.parse_progress(&String::from_utf8_lossy(line)) {
        progress(percent);
    }
}

async fn read_lossy<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Persist the stderr of a failed tool run for the operator.
pub fn write_diagnostics(path: &Path, stderr: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, stderr)?;
    Ok(())
}
