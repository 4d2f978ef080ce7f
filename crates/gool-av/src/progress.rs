//! Progress scraping from tool output.
//!
//! Neither otrdecoder nor mkvmerge offers a machine readable progress
//! channel, so the percentage is read from what they print on stdout.

/// Which progress dialect a tool speaks on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressFormat {
    /// The tool reports nothing useful.
    #[default]
    None,
    /// otrdecoder: three phases, each reporting `NN%`.
    Decoder,
    /// mkvmerge: `Progress: NN%` lines.
    Mkvmerge,
}

impl ProgressFormat {
    /// Fresh parser for one tool run.
    pub fn parser(self) -> Box<dyn ProgressParser> {
        match self {
            Self::None => Box::new(NoProgress),
            Self::Decoder => Box::new(DecoderProgress::default()),
            Self::Mkvmerge => Box::new(MkvmergeProgress::default()),
        }
    }
}

/// Turns lines of tool output into an overall percentage.
pub trait ProgressParser: Send {
    /// Returns the new overall percentage (0-100) if the line advanced it.
    fn parse_progress(&mut self, line: &str) -> Option<u8>;
}

struct NoProgress;

impl ProgressParser for NoProgress {
    fn parse_progress(&mut self, _line: &str) -> Option<u8> {
        None
    }
}

/// Marker words otrdecoder prints when it enters its next phase.
const DECODER_PHASE_MARKERS: &[&str] = &["Dekodiere", "Ausgabe"];
const DECODER_PHASES: u32 = 3;

/// otrdecoder progress: verifying, decoding and writing are each reported
/// from 0 to 100 percent and weigh a third of the total.
#[derive(Debug, Default)]
pub struct DecoderProgress {
    phase: u32,
    last: u8,
}

impl ProgressParser for DecoderProgress {
    fn parse_progress(&mut self, line: &str) -> Option<u8> {
        let mut advanced = None;

        for word in line.split_whitespace() {
            if DECODER_PHASE_MARKERS.iter().any(|m| word.contains(m)) {
                self.phase = (self.phase + 1).min(DECODER_PHASES - 1);
                continue;
            }

            let Some(percent) = parse_percent_token(word) else {
                continue;
            };
            let overall = ((self.phase * 100 + percent) / DECODER_PHASES).min(100) as u8;
            if overall > self.last {
                self.last = overall;
                advanced = Some(overall);
            }
        }

        advanced
    }
}

/// mkvmerge progress: `Progress: 42%`.
#[derive(Debug, Default)]
pub struct MkvmergeProgress {
    last: u8,
}

impl ProgressParser for MkvmergeProgress {
    fn parse_progress(&mut self, line: &str) -> Option<u8> {
        let rest = line.trim().strip_prefix("Progress:")?;
        let percent = parse_percent_token(rest.trim())? as u8;
        if percent > self.last {
            self.last = percent;
            return Some(percent);
        }
        None
    }
}

/// Parse tokens like `42%` or `[42%]`, clamped to 100.
fn parse_percent_token(token: &str) -> Option<u32> {
    let token = token.trim_matches(|c: char| !c.is_ascii_digit() && c != '%');
    let digits = token.strip_suffix('%')?;
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u32>().ok().map(|n| n.min(100))
}
