//! Repetition counter state machine.
//!
//! The counter turns a stream of joint-angle readings into stage changes,
//! completed reps and form-error events:
//! - `down` → `up` when the primary angle drops below the flexed threshold
//! - `up` → `down` when it rises above the extended threshold (one rep)
//! - readings inside the band between the two thresholds change nothing
//!
//! `on_frame` never mutates in place; it returns the next state plus the
//! events produced, so sessions can be replayed and tested frame by frame.

use crate::{Error, ExerciseProfile, FrameOutcome, JointAngleSet, RepCounterState, RepEvent, Result, Stage};

/// Stateless transition engine for one exercise profile
#[derive(Clone, Debug)]
pub struct RepCounter {
    profile: ExerciseProfile,
}

impl RepCounter {
    /// Validate `profile` and return the counter with its initial state
    ///
    /// Fails with `Error::InvalidProfile` when the thresholds do not form a
    /// proper hysteresis band or the error check is only half configured.
    pub fn create(profile: ExerciseProfile) -> Result<(Self, RepCounterState)> {
        validate_profile(&profile)?;
        tracing::debug!(
            "Created rep counter on {} ({} < band < {})",
            profile.primary_joint,
            profile.flexed_threshold,
            profile.extended_threshold
        );
        Ok((Self { profile }, RepCounterState::default()))
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    /// Apply one frame of angles to `state`
    ///
    /// Frames without a usable primary-joint reading are treated as
    /// occluded: the state comes back unchanged and no events are emitted.
    pub fn on_frame(&self, state: &RepCounterState, angles: &JointAngleSet) -> FrameOutcome {
        let Some(angle) = angles.get(&self.profile.primary_joint) else {
            tracing::debug!(
                "No reading for {}, skipping frame",
                self.profile.primary_joint
            );
            return FrameOutcome {
                state: state.clone(),
                events: Vec::new(),
            };
        };

        let mut next = state.clone();
        let mut events = Vec::new();

        // Form check runs first and never blocks the stage transition
        let mut excursion = false;
        if let Some((joint, threshold)) = self.profile.error_check() {
            if let Some(error_angle) = angles.get(joint) {
                excursion = error_angle > threshold;
                if excursion && !next.error_active {
                    tracing::debug!("{} at {:.1} exceeds {:.1}", joint, error_angle, threshold);
                    next.error_active = true;
                    events.push(RepEvent::FormError {
                        joint: joint.to_string(),
                    });
                }
            }
        }

        match next.stage {
            Stage::Down if angle < self.profile.flexed_threshold => {
                next.stage = Stage::Up;
                // A flex clears the error flag unless the excursion is still going
                next.error_active = excursion;
                events.push(RepEvent::StageChanged { to: Stage::Up });
                tracing::debug!("Stage down -> up at {:.1}", angle);
            }
            Stage::Up if angle > self.profile.extended_threshold => {
                next.stage = Stage::Down;
                next.rep_count = next.rep_count.saturating_add(1);
                events.push(RepEvent::StageChanged { to: Stage::Down });
                events.push(RepEvent::RepCompleted {
                    count: next.rep_count,
                });
                tracing::debug!("Stage up -> down at {:.1}, rep {}", angle, next.rep_count);
            }
            _ => {}
        }

        FrameOutcome {
            state: next,
            events,
        }
    }

    /// Fold a sequence of frames from `state`, collecting every event in order
    pub fn replay<'a, I>(&self, state: &RepCounterState, frames: I) -> FrameOutcome
    where
        I: IntoIterator<Item = &'a JointAngleSet>,
    {
        let mut current = state.clone();
        let mut events = Vec::new();
        for angles in frames {
            let outcome = self.on_frame(&current, angles);
            current = outcome.state;
            events.extend(outcome.events);
        }
        FrameOutcome {
            state: current,
            events,
        }
    }
}

/// Check the invariants a profile must satisfy before any frame is processed
pub fn validate_profile(profile: &ExerciseProfile) -> Result<()> {
    if profile.primary_joint.trim().is_empty() {
        return Err(Error::InvalidProfile("primary joint name is empty".into()));
    }

    if !profile.flexed_threshold.is_finite() || !profile.extended_threshold.is_finite() {
        return Err(Error::InvalidProfile(format!(
            "thresholds must be finite (flexed {}, extended {})",
            profile.flexed_threshold, profile.extended_threshold
        )));
    }

    if profile.flexed_threshold >= profile.extended_threshold {
        return Err(Error::InvalidProfile(format!(
            "flexed threshold {} must be below extended threshold {}",
            profile.flexed_threshold, profile.extended_threshold
        )));
    }

    match (&profile.error_joint, profile.error_threshold) {
        (None, None) => Ok(()),
        (Some(joint), Some(threshold)) => {
            if joint.trim().is_empty() {
                Err(Error::InvalidProfile("error joint name is empty".into()))
            } else if !threshold.is_finite() {
                Err(Error::InvalidProfile(format!(
                    "error threshold must be finite, got {}",
                    threshold
                )))
            } else {
                Ok(())
            }
        }
        (Some(_), None) => Err(Error::InvalidProfile(
            "error joint set without an error threshold".into(),
        )),
        (None, Some(_)) => Err(Error::InvalidProfile(
            "error threshold set without an error joint".into(),
        )),
    }
}
