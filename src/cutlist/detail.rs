//! Cutlist documents as served by `getfile.php`.
//!
//! These are INI files with a `[General]` section and one `[CutN]` section
//! per kept segment:
//!
//! ```ini
//! [General]
//! Application=SomeCutter
//! IntendedCutApplicationName=Avidemux
//! NoOfCuts=2
//! DisplayAspectRatio=16:9
//! FramesPerSecond=25
//!
//! [Cut0]
//! Start=112.52
//! StartFrame=2813
//! Duration=1201.4
//! DurationFrames=30035
//! ```
//!
//! Section and key names are matched case-insensitively.
//! Parsing is done by `rust-ini`.

use encoding_rs::WINDOWS_1252;
use gool_common::{CutSpec, Error, Result, Segment};
use ini::{Ini, ParseOption, Properties};

/// Decode a detail document: UTF-8 if valid, Windows-1252 otherwise.
pub fn decode_document(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(body).0.into_owned(),
    }
}

/// Parse the cutlist `id` from its INI text.
///
/// Missing metadata is tolerated. A missing `NoOfCuts`, or any declared
/// segment with neither a time nor a frame range, rejects the whole cutlist.
pub fn parse_cutlist(id: &str, text: &str) -> Result<CutSpec> {
    // Cutters write Windows paths into comments, so backslashes stay literal
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(text, options)
        .map_err(|e| Error::spec_incomplete(id, format!("unreadable document: {e}")))?;

    let general = ini
        .section(Some("general"))
        .ok_or_else(|| Error::spec_incomplete(id, "no [General] section"))?;

    let aspect_ratio = general.get("displayaspectratio").map(str::to_string);
    if aspect_ratio.is_none() {
        tracing::warn!("Cutlist {}: no DisplayAspectRatio", id);
    }
    let fps = number::<f64>(general, "framespersecond");
    if fps.is_none() {
        tracing::warn!("Cutlist {}: no FramesPerSecond", id);
    }
    let application = general.get("intendedcutapplicationname").map(str::to_string);
    if application.is_none() {
        tracing::warn!("Cutlist {}: no IntendedCutApplicationName", id);
    }

    let count = number::<usize>(general, "noofcuts")
        .ok_or_else(|| Error::spec_incomplete(id, "no NoOfCuts"))?;
    if count == 0 {
        return Err(Error::spec_incomplete(id, "NoOfCuts is 0"));
    }

    // NoOfCuts comes from the server; the sections actually present bound the work
    let mut segments = Vec::new();
    for index in 0..count {
        // A declared but missing section rejects the cutlist, like an empty one
        let Some(section) = ini.section(Some(format!("cut{index}"))) else {
            return Err(Error::spec_incomplete(
                id,
                format!("cut {index} is declared but missing"),
            ));
        };
        let segment = Segment {
            time_start: number(section, "start"),
            time_duration: number(section, "duration"),
            frame_start: number(section, "startframe"),
            frame_duration: number(section, "durationframes"),
        };
        if !segment.is_complete() {
            return Err(Error::spec_incomplete(
                id,
                format!("cut {index} has neither a time nor a frame range"),
            ));
        }
        segments.push(segment);
    }

    Ok(CutSpec {
        source_id: id.to_string(),
        aspect_ratio,
        fps,
        application,
        segments,
    })
}

fn number<T: std::str::FromStr>(section: &Properties, key: &str) -> Option<T> {
    let value = section.get(key)?.trim();
    value
        .parse()
        .ok()
        .or_else(|| value.replace(',', ".").parse().ok())
}
