//! Command builders for the two tool-backed pipeline stages:
//! - Decoding `.otrkey` files with otrdecoder
//! - Cutting decoded videos with mkvmerge

mod decode;
mod split;

pub use decode::{decode_command, DecoderCredentials};
pub use split::{cut_command, format_timestamp, SplitSpec};
