//! # gool-av
//!
//! The boundary between gool and the external programs it drives.
//!
//! This crate provides functionality for:
//! - Describing tool invocations ([`ToolCommand`]) and running them ([`ToolRunner`])
//! - Scraping progress percentages from tool output
//! - Locating `otrdecoder` and `mkvmerge`
//! - Building decoder and cut commands, including mkvmerge split specifications
//!
//! ## Example
//!
//! ```no_run
//! use gool_av::{actions::SplitSpec, ProcessRunner, ToolRunner};
//! use std::path::Path;
//!
//! # async fn example() -> gool_av::Result<()> {
//! let split = SplitSpec::Times(vec![(0.0, 600.0), (900.0, 1800.0)]);
//! let cmd = gool_av::actions::cut_command(
//!     Path::new("mkvmerge"),
//!     Path::new("in.avi"),
//!     Path::new("out.cut.mkv"),
//!     &split,
//! );
//! let output = ProcessRunner.invoke(&cmd, &|percent| println!("{percent}%")).await?;
//! assert!(output.success);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod command;
mod error;
pub mod progress;
pub mod runner;
pub mod tools;

// Re-exports
pub use command::ToolCommand;
pub use error::{Error, Result};
pub use progress::{ProgressFormat, ProgressParser};
pub use runner::{write_diagnostics, ProcessRunner, ToolOutput, ToolRunner};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo, CUT_TOOL, DECODER_TOOL};
