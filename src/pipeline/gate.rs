//! The join between decoding and cutlist acquisition.
//!
//! Cutting a video needs both its decoded file and its cutlist. The two
//! predecessor stages of a video each send exactly one [`StageSignal`]; the
//! cut stage waits on the [`JoinGate`] until both have arrived.

use gool_common::{CutSpec, VideoStatus};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Number of predecessor stages the cut stage waits for.
pub const FAN_IN: usize = 2;

/// What the decode stage reports. Also sent, unchanged, for videos that
/// need no decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeReport {
    pub status: VideoStatus,
    /// Location of the video after the stage, even if it failed.
    pub path: PathBuf,
    pub failure: Option<String>,
}

#[derive(Debug)]
pub enum StageSignal {
    Decode(DecodeReport),
    Acquire(Result<CutSpec, String>),
}

/// Both signals of one video. `None` if a stage ended without reporting.
#[derive(Debug)]
pub struct Joined {
    pub decode: Option<DecodeReport>,
    pub acquire: Option<Result<CutSpec, String>>,
}

pub struct JoinGate {
    rx: mpsc::Receiver<StageSignal>,
}

impl JoinGate {
    /// A gate and the sender its predecessors report through.
    pub fn new() -> (Self, mpsc::Sender<StageSignal>) {
        let (tx, rx) = mpsc::channel(FAN_IN);
        (Self { rx }, tx)
    }

    /// Wait for one signal from each predecessor.
    ///
    /// Returns early if every sender has been dropped.
    pub async fn wait(mut self) -> Joined {
        let mut joined = Joined {
            decode: None,
            acquire: None,
        };

        while joined.decode.is_none() || joined.acquire.is_none() {
            match self.rx.recv().await {
                Some(StageSignal::Decode(report)) => joined.decode = Some(report),
                Some(StageSignal::Acquire(outcome)) => joined.acquire = Some(outcome),
                None => break,
            }
        }

        joined
    }
}
