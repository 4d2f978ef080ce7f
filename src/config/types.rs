use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Root of the `Encoded`/`Decoded`/`Cut`/`log` layout. `~` is expanded.
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Number of videos processed at the same time.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Delete files that have been superseded by a more processed version.
    #[serde(default = "default_true")]
    pub cleanup: bool,

    #[serde(default)]
    pub decoder: DecoderConfig,

    #[serde(default)]
    pub cutlist: CutlistConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from("~/gool")
}

fn default_max_parallel() -> usize {
    num_cpus::get().max(1)
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            max_parallel: default_max_parallel(),
            cleanup: true,
            decoder: DecoderConfig::default(),
            cutlist: CutlistConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    /// Working directory with a leading `~` expanded.
    pub fn resolved_working_dir(&self) -> PathBuf {
        let raw = self.working_dir.to_string_lossy();
        PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
    }
}

/// otrdecoder settings and OTR account.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct DecoderConfig {
    /// otrdecoder binary or the directory containing it. Looked up on `PATH` if unset.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for DecoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderConfig")
            .field("path", &self.path)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CutlistConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Per request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_server_url() -> String {
    "http://cutlist.at/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for CutlistConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CutlistConfig {
    /// Server URL, always ending in `/`.
    pub fn base_url(&self) -> String {
        let url = self.server_url.trim();
        if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{url}/")
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub mkvmerge_path: Option<PathBuf>,
}
