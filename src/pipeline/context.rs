use crate::config::Config;
use crate::cutlist::{CutlistClient, CutlistSource};
use crate::progress::ProgressRegistry;
use anyhow::{Context, Result};
use gool_av::actions::DecoderCredentials;
use gool_av::{get_tool_path, ProcessRunner, ToolRunner, CUT_TOOL, DECODER_TOOL};
use gool_common::paths::WorkDirs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a run needs, built once and shared by all stages.
#[derive(Clone)]
pub struct RunContext {
    pub dirs: WorkDirs,
    pub cleanup: bool,
    pub max_parallel: usize,
    pub credentials: DecoderCredentials,
    pub decoder: PathBuf,
    pub mkvmerge: PathBuf,
    pub tools: Arc<dyn ToolRunner>,
    pub cutlists: Arc<dyn CutlistSource>,
    pub progress: Arc<ProgressRegistry>,
}

impl RunContext {
    /// Context talking to the real tools and the configured cutlist server.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config,
            Arc::new(ProcessRunner),
            Arc::new(CutlistClient::new(&config.cutlist)),
            Arc::new(ProgressRegistry::new()),
        )
    }

    /// Context with explicit collaborators. Creates the working directory layout.
    pub fn new(
        config: &Config,
        tools: Arc<dyn ToolRunner>,
        cutlists: Arc<dyn CutlistSource>,
        progress: Arc<ProgressRegistry>,
    ) -> Result<Self> {
        let dirs = WorkDirs::new(config.resolved_working_dir());
        dirs.ensure()
            .with_context(|| format!("Failed to create working directory {:?}", dirs.root))?;

        Ok(Self {
            dirs,
            cleanup: config.cleanup,
            max_parallel: config.max_parallel.max(1),
            credentials: DecoderCredentials::new(
                config.decoder.username.as_str(),
                config.decoder.password.as_str(),
            ),
            decoder: resolve_tool(DECODER_TOOL, config.decoder.path.as_deref()),
            mkvmerge: resolve_tool(CUT_TOOL, config.tools.mkvmerge_path.as_deref()),
            tools,
            cutlists,
            progress,
        })
    }
}

/// A tool that can't be found is still run by name; the failure then shows
/// up on the videos that need it.
fn resolve_tool(name: &str, configured: Option<&Path>) -> PathBuf {
    get_tool_path(name, configured).unwrap_or_else(|e| {
        tracing::debug!("{}", e);
        PathBuf::from(name)
    })
}
