#![forbid(unsafe_code)]

//! Core domain model and rep-counting engine for Coach Virtual.
//!
//! This crate provides:
//! - Domain types (joint angles, landmarks, profiles, counter state, events)
//! - The rep counter state machine
//! - Joint angle computation from pose landmarks
//! - Exercise catalog
//! - Feedback rendering and sinks
//! - Training sessions and the session log

pub mod types;
pub mod error;
pub mod counter;
pub mod angles;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod feedback;
pub mod frames;
pub mod session;
pub mod session_log;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use counter::RepCounter;
pub use angles::{AngleProvider, LandmarkAngles};
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use feedback::{BackgroundSink, FeedbackMessage, FeedbackSink, LogSink, RecordingSink};
pub use frames::{read_frames, FrameRecord};
pub use session::TrainingSession;
pub use session_log::{read_summaries, JsonlSessionLog, SummarySink};
