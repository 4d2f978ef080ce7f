//! mkvmerge split specifications.
//!
//! The kept segments of a cutlist are expressed as `--split parts:` (time
//! ranges) or `--split parts-frames:` (frame ranges). Ranges after the
//! first are prefixed with `+` so mkvmerge appends them to one output file.

use crate::command::ToolCommand;
use crate::progress::ProgressFormat;
use crate::{Error, Result};
use gool_common::CutSpec;
use std::path::Path;

/// Ordered ranges to keep, as `(start, end)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitSpec {
    Frames(Vec<(u64, u64)>),
    Times(Vec<(f64, f64)>),
}

impl SplitSpec {
    /// Pick the split representation for a cutlist.
    ///
    /// Frame ranges are preferred. When neither representation covers every
    /// segment, the missing values are derived from the frame rate.
    pub fn from_cut_spec(spec: &CutSpec) -> Result<Self> {
        if spec.segments.is_empty() {
            return Err(Error::InvalidInput(format!(
                "cutlist {} has no segments",
                spec.source_id
            )));
        }

        if spec.is_frame_based() {
            return Ok(Self::Frames(
                spec.segments.iter().filter_map(|s| s.frame_range()).collect(),
            ));
        }
        if spec.is_time_based() {
            return Ok(Self::Times(
                spec.segments.iter().filter_map(|s| s.time_range()).collect(),
            ));
        }

        let fps = spec.fps.filter(|fps| *fps > 0.0).ok_or_else(|| {
            Error::Unsupported(format!(
                "cutlist {} mixes time and frame segments and has no frame rate",
                spec.source_id
            ))
        })?;

        let to_frames = |secs: f64| (secs * fps).round().max(0.0) as u64;
        spec.segments
            .iter()
            .map(|segment| {
                if let Some(range) = segment.frame_range() {
                    return Ok(range);
                }
                match (segment.time_start, segment.time_duration) {
                    (Some(start), Some(duration)) => {
                        let start = to_frames(start);
                        Ok((start, start + to_frames(duration)))
                    }
                    _ => Err(Error::InvalidInput(format!(
                        "cutlist {} has an incomplete segment",
                        spec.source_id
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::Frames)
    }

    /// The value of mkvmerge's `--split` option.
    pub fn to_mkvmerge_arg(&self) -> String {
        match self {
            Self::Frames(ranges) => {
                let parts: Vec<String> = ranges.iter().map(|(s, e)| format!("{s}-{e}")).collect();
                format!("parts-frames:{}", parts.join(",+"))
            }
            Self::Times(ranges) => {
                let parts: Vec<String> = ranges
                    .iter()
                    .map(|(s, e)| format!("{}-{}", format_timestamp(*s), format_timestamp(*e)))
                    .collect();
                format!("parts:{}", parts.join(",+"))
            }
        }
    }
}

/// Format seconds as `HH:MM:SS.ffffff`.
pub fn format_timestamp(secs: f64) -> String {
    let micros = (secs.max(0.0) * 1_000_000.0).round() as u64;
    let (whole, frac) = (micros / 1_000_000, micros % 1_000_000);
    format!(
        "{:02}:{:02}:{:02}.{:06}",
        whole / 3600,
        (whole / 60) % 60,
        whole % 60,
        frac
    )
}

/// Build the mkvmerge command cutting `input` into `output`.
pub fn cut_command(mkvmerge: &Path, input: &Path, output: &Path, split: &SplitSpec) -> ToolCommand {
    let mut cmd = ToolCommand::new(mkvmerge);
    cmd.arg("-o")
        .path_arg(output)
        .arg("--split")
        .arg(split.to_mkvmerge_arg())
        .path_arg(input)
        .progress(ProgressFormat::Mkvmerge);
    cmd
}
