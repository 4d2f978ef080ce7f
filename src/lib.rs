//! gool - batch processing of Online TV Recorder videos
//!
//! This library crate exposes the core functionality for integration testing.

pub mod catalog;
pub mod config;
pub mod cutlist;
pub mod pipeline;
pub mod progress;
pub mod summary;
