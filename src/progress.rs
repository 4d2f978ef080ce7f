//! Progress bars per video and stage.

use gool_common::Stage;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;
use std::collections::HashMap;

const KEY_WIDTH: usize = 40;

/// Lazily created progress handles keyed by `(video key, stage)`.
///
/// The lock only guards creation; a handle is updated without it by the
/// task that owns the stage.
pub struct ProgressRegistry {
    multi: MultiProgress,
    bars: Mutex<HashMap<(String, Stage), ProgressBar>>,
    style: ProgressStyle,
}

impl ProgressRegistry {
    /// Registry drawing to stderr.
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Registry that tracks values without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::with_template("{prefix:42} {msg:16} [{bar:30}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: Mutex::new(HashMap::new()),
            style,
        }
    }

    /// Handle for `(key, stage)`, created on first use.
    pub fn handle(&self, key: &str, stage: Stage) -> ProgressHandle {
        let mut bars = self.bars.lock();
        let bar = bars
            .entry((key.to_string(), stage))
            .or_insert_with(|| {
                let bar = self.multi.add(ProgressBar::new(100));
                bar.set_style(self.style.clone());
                bar.set_prefix(shorten(key, KEY_WIDTH));
                bar.set_message(stage.label());
                bar
            })
            .clone();
        ProgressHandle { bar }
    }

    /// Current value of a handle, if it has been created.
    pub fn value(&self, key: &str, stage: Stage) -> Option<u8> {
        self.bars
            .lock()
            .get(&(key.to_string(), stage))
            .map(|bar| bar.position() as u8)
    }

    /// Remove all bars from the terminal.
    pub fn clear(&self) {
        if let Err(e) = self.multi.clear() {
            tracing::debug!("Cannot clear progress display: {}", e);
        }
    }
}

impl Default for ProgressRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress of one stage of one video, in percent.
#[derive(Clone)]
pub struct ProgressHandle {
    bar: ProgressBar,
}

impl ProgressHandle {
    /// Set the percentage. Values below the current one are ignored.
    pub fn set(&self, percent: u8) {
        let percent = u64::from(percent.min(100));
        if percent > self.bar.position() {
            self.bar.set_position(percent);
        }
    }

    /// Advance by `step` without reaching 100.
    pub fn nudge(&self, step: u8) {
        let next = (self.bar.position() + u64::from(step)).min(99);
        self.set(next as u8);
    }

    /// Set to 100 and stop the bar.
    pub fn finish(&self) {
        self.set(100);
        self.bar.finish();
    }

    /// Stop the bar where it is, marking the stage as failed.
    pub fn abandon(&self) {
        self.bar.abandon_with_message("failed");
    }

    pub fn value(&self) -> u8 {
        self.bar.position() as u8
    }
}

fn shorten(key: &str, width: usize) -> String {
    if key.chars().count() <= width {
        return key.to_string();
    }
    let head: String = key.chars().take(width.saturating_sub(3)).collect();
    format!("{head}...")
}
