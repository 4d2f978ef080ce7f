//! Core type definitions for videos, their lifecycle and their cutlists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Lifecycle status of a video. Ordered: `Raw < Decoded < Cut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    /// Still encrypted (`.otrkey`).
    Raw,
    /// Decoded but not cut yet.
    Decoded,
    /// Cut, nothing left to do.
    Cut,
}

impl VideoStatus {
    /// Short label used in the summary table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Raw => "ENC",
            Self::Decoded => "DEC",
            Self::Cut => "CUT",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of processing a video in the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "result", content = "reason")]
pub enum ItemResult {
    /// Not processed (yet).
    #[default]
    None,
    /// Every stage that ran succeeded.
    Ok,
    /// A stage failed; carries the reason.
    Error(String),
}

impl ItemResult {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// The pipeline stages a video passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Decrypt the `.otrkey` file.
    Decode,
    /// Fetch and select a cutlist.
    Acquire,
    /// Cut the decoded video according to the cutlist.
    Apply,
}

impl Stage {
    /// Human readable label shown next to progress bars.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Decode => "Decoding",
            Self::Acquire => "Fetching cutlist",
            Self::Apply => "Cutting",
        }
    }

    /// Suffix of the diagnostics file written when this stage's tool fails.
    /// Cutlist acquisition runs no tool and has none.
    pub fn error_file_suffix(&self) -> Option<&'static str> {
        match self {
            Self::Decode => Some(".decode.error"),
            Self::Acquire => None,
            Self::Apply => Some(".cut.error"),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recording tracked through `Raw -> Decoded -> Cut`.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// File name without `.otrkey`, without `cut.` and without container extension.
    pub key: String,
    pub status: VideoStatus,
    pub result: ItemResult,
    /// Current location of the video file.
    pub path: PathBuf,
    /// Container extension including the dot (e.g. `.avi`), empty if unknown.
    pub container: String,
    /// Attached once a cutlist has been acquired successfully.
    pub cut_spec: Option<CutSpec>,
}

impl Item {
    pub fn new(
        key: impl Into<String>,
        status: VideoStatus,
        path: impl Into<PathBuf>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            status,
            result: ItemResult::None,
            path: path.into(),
            container: container.into(),
            cut_spec: None,
        }
    }

    /// Name the cutlist server knows this recording by (key plus container).
    pub fn lookup_name(&self) -> String {
        format!("{}{}", self.key, self.container)
    }

    /// True when the item may be handed to the cut tool.
    pub fn is_cut_eligible(&self) -> bool {
        self.status == VideoStatus::Decoded
            && self.cut_spec.as_ref().is_some_and(CutSpec::is_usable)
    }
}

/// A cutlist: the segments of a recording to keep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutSpec {
    /// Id of the candidate this cutlist was read from.
    pub source_id: String,
    pub aspect_ratio: Option<String>,
    pub fps: Option<f64>,
    /// Cut application the cutlist was made for.
    pub application: Option<String>,
    pub segments: Vec<Segment>,
}

impl CutSpec {
    /// A cutlist is usable when it has at least one segment and all of them are complete.
    pub fn is_usable(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(Segment::is_complete)
    }

    /// True when every segment carries a frame pair.
    pub fn is_frame_based(&self) -> bool {
        self.segments.iter().all(|s| s.frame_range().is_some())
    }

    /// True when every segment carries a time pair.
    pub fn is_time_based(&self) -> bool {
        self.segments.iter().all(|s| s.time_range().is_some())
    }
}

/// One kept section of a recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start in seconds.
    pub time_start: Option<f64>,
    /// Duration in seconds.
    pub time_duration: Option<f64>,
    pub frame_start: Option<u64>,
    pub frame_duration: Option<u64>,
}

impl Segment {
    /// `(start, end)` in seconds if the time pair is complete.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        match (self.time_start, self.time_duration) {
            (Some(start), Some(duration)) => Some((start, start + duration)),
            _ => None,
        }
    }

    /// `(start, end)` in frames if the frame pair is complete.
    pub fn frame_range(&self) -> Option<(u64, u64)> {
        match (self.frame_start, self.frame_duration) {
            (Some(start), Some(duration)) => Some((start, start + duration)),
            _ => None,
        }
    }

    /// A segment needs at least one complete pair.
    pub fn is_complete(&self) -> bool {
        self.time_range().is_some() || self.frame_range().is_some()
    }
}

/// A cutlist candidate as listed by the cutlist server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateHeader {
    pub id: String,
    /// Higher is preferred.
    pub score: f64,
}
