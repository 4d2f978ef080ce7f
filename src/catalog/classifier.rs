//! Recognising OTR recordings by file name.
//!
//! OTR names recordings `<Title>_<YY.MM.DD>_<HH-MM>_<station>_<duration>_TVOON_DE.mpg.<quality>.<container>`.
//! The encrypted download adds `.otrkey`, a cut version carries an additional `cut.`.

use gool_common::paths::OTRKEY_EXTENSION;
use gool_common::{Error, Item, Result, VideoStatus};
use regex::Regex;
use std::path::Path;

const RECORDING_PATTERN: &str = r"\w+_\d{2}\.\d{2}\.\d{2}_\d{2}-\d{2}_\w+";

/// Derives key, status and container from file names.
#[derive(Debug, Clone)]
pub struct Classifier {
    pattern: Regex,
}

impl Classifier {
    pub fn new() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(RECORDING_PATTERN)?,
        })
    }

    /// Classify a file. Fails with [`Error::Scan`] if it isn't an OTR recording.
    pub fn classify(&self, path: &Path) -> Result<Item> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::scan(path))?;

        if !self.pattern.is_match(file_name) {
            return Err(Error::scan(path));
        }

        let otrkey_suffix = format!(".{OTRKEY_EXTENSION}");
        let (status, name) = if let Some(stripped) = file_name.strip_suffix(&otrkey_suffix) {
            (VideoStatus::Raw, stripped.to_string())
        } else if file_name.contains(".cut.") {
            (VideoStatus::Cut, file_name.replace("cut.", ""))
        } else {
            (VideoStatus::Decoded, file_name.to_string())
        };

        let (key, container) = match name.rfind('.') {
            Some(idx) if idx > 0 => (name[..idx].to_string(), name[idx..].to_string()),
            _ => (name, String::new()),
        };

        Ok(Item::new(key, status, path, container))
    }
}
