//! Feedback rendering and delivery.
//!
//! Counter events are turned into user-facing messages here and handed to a
//! `FeedbackSink`. Sinks may be slow (speech synthesis, network); wrap them
//! in a `BackgroundSink` so the frame loop never waits on them.

use crate::config::FeedbackConfig;
use crate::{Error, FeedbackCues, RepEvent, Result, Stage};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// How a message should be presented
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Info,
    Progress,
    Warning,
}

/// A rendered feedback message
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeedbackMessage {
    pub kind: FeedbackKind,
    pub text: String,
    /// Whether a voice sink should read this aloud
    pub speak: bool,
}

/// Render a counter event using an exercise's cues
pub fn render(event: &RepEvent, cues: &FeedbackCues, settings: &FeedbackConfig) -> FeedbackMessage {
    match event {
        RepEvent::StageChanged { to: Stage::Up } => FeedbackMessage {
            kind: FeedbackKind::Info,
            text: cues.flexed.clone(),
            speak: settings.speak_stage_changes,
        },
        RepEvent::StageChanged { to: Stage::Down } => FeedbackMessage {
            kind: FeedbackKind::Info,
            text: cues.extended.clone(),
            speak: settings.speak_stage_changes,
        },
        RepEvent::RepCompleted { count } => FeedbackMessage {
            kind: FeedbackKind::Progress,
            text: count.to_string(),
            speak: settings.speak_reps,
        },
        RepEvent::FormError { .. } => FeedbackMessage {
            kind: FeedbackKind::Warning,
            text: cues.form_error.clone(),
            speak: settings.speak_form_errors,
        },
    }
}

/// Destination for feedback messages
pub trait FeedbackSink {
    fn deliver(&mut self, message: &FeedbackMessage) -> Result<()>;
}

/// Sink that writes every message to the tracing log
#[derive(Debug, Default)]
pub struct LogSink;

impl FeedbackSink for LogSink {
    fn deliver(&mut self, message: &FeedbackMessage) -> Result<()> {
        match message.kind {
            FeedbackKind::Warning => tracing::warn!("{}", message.text),
            _ => tracing::info!("{}", message.text),
        }
        Ok(())
    }
}

/// Sink that keeps messages in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<FeedbackMessage>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far
    pub fn messages(&self) -> Vec<FeedbackMessage> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl FeedbackSink for RecordingSink {
    fn deliver(&mut self, message: &FeedbackMessage) -> Result<()> {
        self.messages
            .lock()
            .map_err(|_| Error::Feedback("recording buffer poisoned".into()))?
            .push(message.clone());
        Ok(())
    }
}

/// Runs another sink on a worker thread.
///
/// `deliver` only queues the message, so it returns immediately no matter
/// how slow the inner sink is. Inner sink failures are logged, not returned.
pub struct BackgroundSink {
    tx: Option<Sender<FeedbackMessage>>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundSink {
    /// Start a worker thread that owns `inner`
    pub fn spawn<S>(mut inner: S) -> Result<Self>
    where
        S: FeedbackSink + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<FeedbackMessage>();
        let worker = std::thread::Builder::new()
            .name("feedback".into())
            .spawn(move || {
                for message in rx {
                    if let Err(e) = inner.deliver(&message) {
                        tracing::warn!("Feedback sink failed: {}", e);
                    }
                }
                tracing::debug!("Feedback worker drained");
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    /// Close the queue and wait until every queued message was delivered
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| Error::Feedback("feedback worker panicked".into()))?;
        }
        Ok(())
    }
}

impl FeedbackSink for BackgroundSink {
    fn deliver(&mut self, message: &FeedbackMessage) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| Error::Feedback("feedback worker stopped".into()))?;
        tx.send(message.clone())
            .map_err(|_| Error::Feedback("feedback worker stopped".into()))
    }
}

impl Drop for BackgroundSink {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct SlowSink {
        out: RecordingSink,
    }

    impl FeedbackSink for SlowSink {
        fn deliver(&mut self, message: &FeedbackMessage) -> Result<()> {
            std::thread::sleep(Duration::from_millis(20));
            self.out.deliver(message)
        }
    }

    struct FailingSink;

    impl FeedbackSink for FailingSink {
        fn deliver(&mut self, _message: &FeedbackMessage) -> Result<()> {
            Err(Error::Feedback("speaker unplugged".into()))
        }
    }

    fn message(text: &str) -> FeedbackMessage {
        FeedbackMessage {
            kind: FeedbackKind::Info,
            text: text.into(),
            speak: true,
        }
    }

    #[test]
    fn test_render_rep_completed_announces_count() {
        let msg = render(
            &RepEvent::RepCompleted { count: 7 },
            &FeedbackCues::default(),
            &FeedbackConfig::default(),
        );
        assert_eq!(msg.kind, FeedbackKind::Progress);
        assert_eq!(msg.text, "7");
        assert!(msg.speak);
    }

    #[test]
    fn test_render_form_error_uses_cue() {
        let cues = FeedbackCues {
            form_error: "Keep your elbow close to your body".into(),
            ..FeedbackCues::default()
        };
        let msg = render(
            &RepEvent::FormError {
                joint: "rightShoulder".into(),
            },
            &cues,
            &FeedbackConfig::default(),
        );
        assert_eq!(msg.kind, FeedbackKind::Warning);
        assert_eq!(msg.text, "Keep your elbow close to your body");
    }

    #[test]
    fn test_render_respects_speak_settings() {
        let settings = FeedbackConfig {
            speak_stage_changes: false,
            ..FeedbackConfig::default()
        };
        let msg = render(
            &RepEvent::StageChanged { to: Stage::Up },
            &FeedbackCues::default(),
            &settings,
        );
        assert_eq!(msg.text, "Up");
        assert!(!msg.speak);
    }

    #[test]
    fn test_recording_sink_shares_buffer() {
        let recorder = RecordingSink::new();
        let mut handle = recorder.clone();
        handle.deliver(&message("one")).unwrap();
        assert_eq!(recorder.messages(), vec![message("one")]);
    }

    #[test]
    fn test_background_sink_delivers_in_order() {
        let recorder = RecordingSink::new();
        let mut sink = BackgroundSink::spawn(SlowSink {
            out: recorder.clone(),
        })
        .unwrap();

        for text in ["1", "2", "3"] {
            sink.deliver(&message(text)).unwrap();
        }
        sink.shutdown().unwrap();

        let texts: Vec<_> = recorder.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_background_sink_survives_failing_inner_sink() {
        let mut sink = BackgroundSink::spawn(FailingSink).unwrap();
        assert!(sink.deliver(&message("ignored")).is_ok());
        assert!(sink.shutdown().is_ok());
    }
}
