//! Recorded frame streams for offline replay.
//!
//! A frame file is JSON Lines, one frame per line, holding either
//! precomputed angles or raw landmarks:
//!
//! ```text
//! {"angles": {"rightElbow": 170.0, "rightShoulder": 12.0}}
//! {"landmarks": [{"x": 0.5, "y": 0.4, "visibility": 0.9}, ...]}
//! ```

use crate::angles::AngleProvider;
use crate::{Error, JointAngleSet, LandmarkFrame, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One recorded frame
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FrameRecord {
    Angles { angles: JointAngleSet },
    Landmarks { landmarks: LandmarkFrame },
}

impl FrameRecord {
    /// Joint angles for this frame, computing them from landmarks if needed
    pub fn to_angles<P: AngleProvider>(&self, provider: &P) -> JointAngleSet {
        match self {
            FrameRecord::Angles { angles } => angles.clone(),
            FrameRecord::Landmarks { landmarks } => provider.angles(landmarks),
        }
    }
}

/// Parse frame records from a JSON Lines reader; blank lines are skipped
pub fn parse_frames<R: BufRead>(reader: R) -> Result<Vec<FrameRecord>> {
    let mut frames = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str::<FrameRecord>(&line).map_err(|e| Error::Frame {
            line: idx + 1,
            message: e.to_string(),
        })?;
        frames.push(record);
    }
    Ok(frames)
}

/// Read a frame file from disk
pub fn read_frames(path: &Path) -> Result<Vec<FrameRecord>> {
    let file = File::open(path)?;
    let frames = parse_frames(BufReader::new(file))?;
    tracing::debug!("Read {} frames from {:?}", frames.len(), path);
    Ok(frames)
}
