//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], a scratch working directory with a
//! [`RunContext`] whose tools and cutlist server are test doubles.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::Notify;

use gool::config::Config;
use gool::cutlist::CutlistSource;
use gool::pipeline::RunContext;
use gool::progress::ProgressRegistry;
use gool_av::{ToolCommand, ToolOutput, ToolRunner};
use gool_common::{CandidateHeader, Error, Result};

/// A file name following the OTR naming convention, without container.
pub fn recording(title: &str) -> String {
    format!("{title}_21.03.14_20-15_ard_90_TVOON_DE.mpg.HQ")
}

/// A cutlist document with one time-based cut.
pub const GOOD_CUTLIST: &str = "\
[General]
Application=CutAssistant
IntendedCutApplicationName=Avidemux
NoOfCuts=1
DisplayAspectRatio=16:9
FramesPerSecond=25

[Cut0]
Start=30.5
Duration=1200
";

/// A cutlist whose first cut carries neither times nor frames.
pub const MALFORMED_CUTLIST: &str = "\
[General]
NoOfCuts=2

[Cut0]

[Cut1]
Start=10
Duration=20
StartFrame=250
DurationFrames=500
";

pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"video").unwrap();
}

/// Tool runner that records invocations and fakes the tools' output files.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    failing: Mutex<HashMap<String, String>>,
    held: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeRunner {
    /// Make every run of `program` fail with `stderr`.
    pub fn fail(&self, program: &str, stderr: &str) {
        self.failing
            .lock()
            .insert(program.to_string(), stderr.to_string());
    }

    /// Keep every run of `program` going until `gate` is notified.
    pub fn hold(&self, program: &str, gate: Arc<Notify>) {
        self.held.lock().insert(program.to_string(), gate);
    }

    pub fn calls(&self, program: &str) -> usize {
        self.calls.lock().iter().filter(|(p, _)| p == program).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn args(&self, program: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .iter()
            .filter(|(p, _)| p == program)
            .map(|(_, args)| args.clone())
            .collect()
    }
}

fn arg_after(args: &[String], flag: &str) -> Option<PathBuf> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).map(PathBuf::from)
}

#[async_trait]
impl ToolRunner for FakeRunner {
    async fn invoke(
        &self,
        cmd: &ToolCommand,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> gool_av::Result<ToolOutput> {
        let program = cmd.program_name();
        let args = cmd.get_args().to_vec();
        self.calls.lock().push((program.clone(), args.clone()));

        let gate = self.held.lock().get(&program).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(stderr) = self.failing.lock().get(&program).cloned() {
            return Ok(ToolOutput {
                success: false,
                exit_code: Some(1),
                stderr,
            });
        }

        match program.as_str() {
            "otrdecoder" => {
                let input = arg_after(&args, "-i").unwrap();
                let out_dir = arg_after(&args, "-o").unwrap();
                touch(&out_dir.join(input.file_stem().unwrap()));
            }
            "mkvmerge" => touch(&arg_after(&args, "-o").unwrap()),
            _ => {}
        }
        progress(50);
        progress(100);

        Ok(ToolOutput {
            success: true,
            exit_code: Some(0),
            stderr: String::new(),
        })
    }
}

/// In-memory cutlist server.
#[derive(Default)]
pub struct FakeCutlists {
    headers: Mutex<Vec<CandidateHeader>>,
    documents: Mutex<HashMap<String, String>>,
    hold: Option<Arc<Notify>>,
    header_requests: Mutex<usize>,
}

impl FakeCutlists {
    /// Server offering the given cutlists for every recording, best first.
    pub fn offering(cutlists: &[(&str, f64, &str)]) -> Self {
        let server = Self::default();
        for (id, score, text) in cutlists {
            server.headers.lock().push(CandidateHeader {
                id: id.to_string(),
                score: *score,
            });
            server
                .documents
                .lock()
                .insert(id.to_string(), text.to_string());
        }
        server
    }

    /// Block every header lookup until `gate` is notified.
    pub fn held_by(mut self, gate: Arc<Notify>) -> Self {
        self.hold = Some(gate);
        self
    }

    pub fn header_requests(&self) -> usize {
        *self.header_requests.lock()
    }
}

#[async_trait]
impl CutlistSource for FakeCutlists {
    async fn fetch_headers(&self, _lookup_name: &str) -> Vec<CandidateHeader> {
        *self.header_requests.lock() += 1;
        if let Some(gate) = &self.hold {
            gate.notified().await;
        }
        self.headers.lock().clone()
    }

    async fn fetch_document(&self, id: &str) -> Result<String> {
        self.documents
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::fetch(format!("no cutlist {id}")))
    }
}

/// A scratch working directory plus a run context wired to test doubles.
pub struct TestHarness {
    pub tmp: TempDir,
    pub config: Config,
    pub runner: Arc<FakeRunner>,
    pub cutlists: Arc<dyn CutlistSource>,
    pub progress: Arc<ProgressRegistry>,
}

impl TestHarness {
    pub fn new(cutlists: Arc<dyn CutlistSource>) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            working_dir: tmp.path().join("work"),
            max_parallel: 4,
            cleanup: true,
            decoder: gool::config::DecoderConfig {
                path: Some(PathBuf::from("otrdecoder")),
                username: "user@example.org".into(),
                password: "secret".into(),
            },
            ..Config::default()
        };

        Self {
            tmp,
            config,
            runner: Arc::new(FakeRunner::default()),
            cutlists,
            progress: Arc::new(ProgressRegistry::hidden()),
        }
    }

    pub fn context(&self) -> Arc<RunContext> {
        let mut ctx = RunContext::new(
            &self.config,
            self.runner.clone(),
            self.cutlists.clone(),
            self.progress.clone(),
        )
        .unwrap();
        // Keep program names stable regardless of what is installed
        ctx.decoder = PathBuf::from("otrdecoder");
        ctx.mkvmerge = PathBuf::from("mkvmerge");
        Arc::new(ctx)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.config.working_dir.clone()
    }
}
