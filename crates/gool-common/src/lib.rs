//! gool-common: Shared types, paths, and error taxonomy.
//!
//! This crate provides common functionality used across gool:
//!
//! - **Core Types**: videos ([`Item`]), their lifecycle ([`VideoStatus`],
//!   [`ItemResult`]) and cutlists ([`CutSpec`], [`Segment`], [`CandidateHeader`])
//! - **Path Utilities**: the layout of the gool working directory ([`paths::WorkDirs`])
//! - **Error Handling**: the error taxonomy absorbed per item during a run
//!
//! # Examples
//!
//! ```
//! use gool_common::{Segment, VideoStatus};
//!
//! assert!(VideoStatus::Raw < VideoStatus::Cut);
//!
//! let seg = Segment {
//!     time_start: Some(10.0),
//!     time_duration: Some(20.0),
//!     ..Segment::default()
//! };
//! assert!(seg.is_complete());
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
