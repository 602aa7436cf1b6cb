//! Joint angle calculation from pose landmarks.
//!
//! Angles are measured at the middle point of a landmark triple using the
//! dot product of the two limb vectors, in the image plane:
//! cos(θ) = (v1 · v2) / (|v1| × |v2|)
//!
//! Landmark indices follow the 33-point MediaPipe pose layout.

use crate::{JointAngleSet, Landmark, LandmarkFrame};

/// Pose landmark indices used for joint angles
pub mod landmark {
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;
    pub const LEFT_ANKLE: usize = 27;
    pub const RIGHT_ANKLE: usize = 28;
}

/// Joint name plus the (outer, vertex, outer) landmark triple that defines it
const JOINTS: &[(&str, [usize; 3])] = &[
    ("leftElbow", [landmark::LEFT_SHOULDER, landmark::LEFT_ELBOW, landmark::LEFT_WRIST]),
    ("rightElbow", [landmark::RIGHT_SHOULDER, landmark::RIGHT_ELBOW, landmark::RIGHT_WRIST]),
    ("leftShoulder", [landmark::LEFT_HIP, landmark::LEFT_SHOULDER, landmark::LEFT_ELBOW]),
    ("rightShoulder", [landmark::RIGHT_HIP, landmark::RIGHT_SHOULDER, landmark::RIGHT_ELBOW]),
    ("leftHip", [landmark::LEFT_SHOULDER, landmark::LEFT_HIP, landmark::LEFT_KNEE]),
    ("rightHip", [landmark::RIGHT_SHOULDER, landmark::RIGHT_HIP, landmark::RIGHT_KNEE]),
    ("leftKnee", [landmark::LEFT_HIP, landmark::LEFT_KNEE, landmark::LEFT_ANKLE]),
    ("rightKnee", [landmark::RIGHT_HIP, landmark::RIGHT_KNEE, landmark::RIGHT_ANKLE]),
];

/// Default confidence below which a landmark is treated as occluded
pub const DEFAULT_MIN_VISIBILITY: f64 = 0.5;

/// Source of per-frame joint angles.
///
/// The rep counter only ever sees the resulting `JointAngleSet`, so any pose
/// backend can be plugged in behind this trait.
pub trait AngleProvider {
    fn angles(&self, frame: &LandmarkFrame) -> JointAngleSet;
}

/// Computes the standard limb angles directly from a landmark frame
#[derive(Clone, Debug)]
pub struct LandmarkAngles {
    min_visibility: f64,
}

impl Default for LandmarkAngles {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_VISIBILITY)
    }
}

impl LandmarkAngles {
    pub fn new(min_visibility: f64) -> Self {
        Self { min_visibility }
    }

    fn visible(&self, frame: &LandmarkFrame, index: usize) -> Option<Landmark> {
        frame
            .get(index)
            .filter(|lm| lm.visibility >= self.min_visibility)
            .copied()
    }
}

impl AngleProvider for LandmarkAngles {
    fn angles(&self, frame: &LandmarkFrame) -> JointAngleSet {
        let mut angles = JointAngleSet::new();
        for (name, [a, b, c]) in JOINTS {
            let points = (
                self.visible(frame, *a),
                self.visible(frame, *b),
                self.visible(frame, *c),
            );
            if let (Some(a), Some(b), Some(c)) = points {
                if let Some(angle) = joint_angle(&a, &b, &c) {
                    angles.insert(*name, angle);
                }
            }
        }
        angles
    }
}

/// Angle at `b` formed by segments b→a and b→c, in degrees (0..=180)
///
/// Returns `None` when either segment has (near) zero length.
pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> Option<f64> {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if mag1 < 1e-6 || mag2 < 1e-6 {
        return None;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}
