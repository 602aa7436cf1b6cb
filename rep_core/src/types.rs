//! Core domain types for the rep-counting engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Joint angles and pose landmarks
//! - Exercise profiles and catalog definitions
//! - Rep counter state and emitted events
//! - Session summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Pose Input Types
// ============================================================================

/// A single body keypoint produced by the pose estimator.
///
/// Coordinates are normalized to the image (0..1); `visibility` is the
/// estimator's confidence that the point is actually in view.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }
}

/// All landmarks detected on one body in one video frame
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct LandmarkFrame {
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }
}

/// Named joint angles (in degrees) for a single frame.
///
/// Recomputed every frame and never retained. A joint that could not be
/// measured (occluded, off-screen) is simply absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct JointAngleSet(BTreeMap<String, f64>);

impl JointAngleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for tests and fixtures
    pub fn with(mut self, joint: impl Into<String>, degrees: f64) -> Self {
        self.insert(joint, degrees);
        self
    }

    pub fn insert(&mut self, joint: impl Into<String>, degrees: f64) {
        self.0.insert(joint.into(), degrees);
    }

    /// Angle for `joint`, ignoring non-finite readings
    pub fn get(&self, joint: &str) -> Option<f64> {
        self.0.get(joint).copied().filter(|a| a.is_finite())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for JointAngleSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ============================================================================
// Exercise Configuration Types
// ============================================================================

/// Threshold configuration driving one exercise's rep counter.
///
/// The band between `flexed_threshold` and `extended_threshold` is the
/// hysteresis zone where no transition fires.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseProfile {
    pub primary_joint: String,
    pub flexed_threshold: f64,
    pub extended_threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_joint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_threshold: Option<f64>,
}

impl ExerciseProfile {
    /// Profile without a form-error channel
    pub fn new(primary_joint: impl Into<String>, flexed: f64, extended: f64) -> Self {
        Self {
            primary_joint: primary_joint.into(),
            flexed_threshold: flexed,
            extended_threshold: extended,
            error_joint: None,
            error_threshold: None,
        }
    }

    /// Attach a compensatory-movement check on a secondary joint
    pub fn with_error_check(mut self, joint: impl Into<String>, threshold: f64) -> Self {
        self.error_joint = Some(joint.into());
        self.error_threshold = Some(threshold);
        self
    }

    /// The configured error joint and threshold, if both are present
    pub fn error_check(&self) -> Option<(&str, f64)> {
        match (&self.error_joint, self.error_threshold) {
            (Some(joint), Some(threshold)) => Some((joint.as_str(), threshold)),
            _ => None,
        }
    }
}

/// Spoken/displayed cues for an exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeedbackCues {
    #[serde(default = "default_flexed_cue")]
    pub flexed: String,
    #[serde(default = "default_extended_cue")]
    pub extended: String,
    #[serde(default = "default_form_error_cue")]
    pub form_error: String,
}

fn default_flexed_cue() -> String {
    "Up".into()
}

fn default_extended_cue() -> String {
    "Down".into()
}

fn default_form_error_cue() -> String {
    "Watch your form".into()
}

impl Default for FeedbackCues {
    fn default() -> Self {
        Self {
            flexed: default_flexed_cue(),
            extended: default_extended_cue(),
            form_error: default_form_error_cue(),
        }
    }
}

/// A catalog entry: an exercise the trainer knows how to count
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub profile: ExerciseProfile,
    #[serde(default)]
    pub cues: FeedbackCues,
}

/// The set of exercises available to a session
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: BTreeMap<String, ExerciseDefinition>,
}

// ============================================================================
// Rep Counter State and Events
// ============================================================================

/// Phase of the tracked movement
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Down,
    Up,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Down => write!(f, "down"),
            Stage::Up => write!(f, "up"),
        }
    }
}

/// Per-session counter state. Only `RepCounter::on_frame` produces new values.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepCounterState {
    pub stage: Stage,
    pub rep_count: u32,
    pub error_active: bool,
}

impl Default for RepCounterState {
    fn default() -> Self {
        Self {
            stage: Stage::Down,
            rep_count: 0,
            error_active: false,
        }
    }
}

/// Something observable that happened while processing a frame
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepEvent {
    StageChanged { to: Stage },
    RepCompleted { count: u32 },
    FormError { joint: String },
}

/// Result of feeding one frame to the counter
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutcome {
    pub state: RepCounterState,
    pub events: Vec<RepEvent>,
}

// ============================================================================
// Session Types
// ============================================================================

/// Record of a finished training session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub id: Uuid,
    pub exercise_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub reps: u32,
    pub form_errors: u32,
    pub frames_seen: u64,
    pub frames_dropped: u64,
}
