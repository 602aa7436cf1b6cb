//! Training session driver.
//!
//! A session wires the pieces together for one exercise: frames go through
//! the rep counter, resulting events are rendered and handed to the
//! feedback sink, and running totals are kept for the final summary.

use crate::angles::AngleProvider;
use crate::config::FeedbackConfig;
use crate::counter::RepCounter;
use crate::feedback::{render, FeedbackSink};
use crate::{
    ExerciseDefinition, JointAngleSet, LandmarkFrame, RepCounterState, RepEvent, Result,
    SessionSummary,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One live training session
pub struct TrainingSession<S: FeedbackSink> {
    id: Uuid,
    exercise: ExerciseDefinition,
    counter: RepCounter,
    state: RepCounterState,
    settings: FeedbackConfig,
    sink: S,
    started_at: DateTime<Utc>,
    frames_seen: u64,
    frames_dropped: u64,
    form_errors: u32,
}

impl<S: FeedbackSink> TrainingSession<S> {
    /// Start a session; fails if the exercise profile is invalid
    pub fn start(exercise: ExerciseDefinition, settings: FeedbackConfig, sink: S) -> Result<Self> {
        let (counter, state) = RepCounter::create(exercise.profile.clone())?;
        let id = Uuid::new_v4();
        tracing::info!("Started session {} for {}", id, exercise.id);

        Ok(Self {
            id,
            exercise,
            counter,
            state,
            settings,
            sink,
            started_at: Utc::now(),
            frames_seen: 0,
            frames_dropped: 0,
            form_errors: 0,
        })
    }

    /// Feed one frame of joint angles and dispatch any feedback
    pub fn process(&mut self, angles: &JointAngleSet) -> Vec<RepEvent> {
        self.frames_seen += 1;
        if angles.get(&self.counter.profile().primary_joint).is_none() {
            self.frames_dropped += 1;
        }

        let outcome = self.counter.on_frame(&self.state, angles);
        self.state = outcome.state;

        for event in &outcome.events {
            if matches!(event, RepEvent::FormError { .. }) {
                self.form_errors += 1;
            }
            let message = render(event, &self.exercise.cues, &self.settings);
            if let Err(e) = self.sink.deliver(&message) {
                tracing::warn!("Dropping feedback '{}': {}", message.text, e);
            }
        }

        outcome.events
    }

    /// Compute angles with `provider` and feed the result
    pub fn process_landmarks<P: AngleProvider>(
        &mut self,
        provider: &P,
        frame: &LandmarkFrame,
    ) -> Vec<RepEvent> {
        let angles = provider.angles(frame);
        self.process(&angles)
    }

    pub fn state(&self) -> &RepCounterState {
        &self.state
    }

    /// End the session, returning its summary and the sink
    pub fn finish(self) -> (SessionSummary, S) {
        let summary = SessionSummary {
            id: self.id,
            exercise_id: self.exercise.id.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            reps: self.state.rep_count,
            form_errors: self.form_errors,
            frames_seen: self.frames_seen,
            frames_dropped: self.frames_dropped,
        };
        tracing::info!(
            "Finished session {}: {} reps, {} form errors",
            summary.id,
            summary.reps,
            summary.form_errors
        );
        (summary, self.sink)
    }
}
