//! Default catalog of countable exercises.
//!
//! Each entry pairs an `ExerciseProfile` with the cues spoken back to the
//! user. Thresholds are in degrees for the joints produced by
//! `angles::LandmarkAngles`.

use crate::counter::validate_profile;
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with the built-in exercises
pub fn build_default_catalog() -> Catalog {
    let mut exercises = BTreeMap::new();

    // Elbow drifting forward shows up as the shoulder opening past 45°
    exercises.insert(
        "biceps_curl".into(),
        ExerciseDefinition {
            id: "biceps_curl".into(),
            name: "Biceps Curl".into(),
            profile: ExerciseProfile::new("rightElbow", 60.0, 160.0)
                .with_error_check("rightShoulder", 45.0),
            cues: FeedbackCues {
                flexed: "Up".into(),
                extended: "Down".into(),
                form_error: "Keep your elbow close to your body".into(),
            },
        },
    );

    exercises.insert(
        "squat".into(),
        ExerciseDefinition {
            id: "squat".into(),
            name: "Bodyweight Squat".into(),
            profile: ExerciseProfile::new("rightKnee", 90.0, 160.0),
            cues: FeedbackCues {
                flexed: "Good depth".into(),
                extended: "Stand tall".into(),
                form_error: "Watch your form".into(),
            },
        },
    );

    exercises.insert(
        "push_up".into(),
        ExerciseDefinition {
            id: "push_up".into(),
            name: "Push-up".into(),
            profile: ExerciseProfile::new("rightElbow", 90.0, 160.0),
            cues: FeedbackCues {
                flexed: "Chest down".into(),
                extended: "Push".into(),
                form_error: "Watch your form".into(),
            },
        },
    );

    exercises.insert(
        "shoulder_press".into(),
        ExerciseDefinition {
            id: "shoulder_press".into(),
            name: "Shoulder Press".into(),
            profile: ExerciseProfile::new("rightElbow", 80.0, 165.0),
            cues: FeedbackCues {
                flexed: "Press".into(),
                extended: "Lock out".into(),
                form_error: "Watch your form".into(),
            },
        },
    );

    Catalog { exercises }
}

impl Catalog {
    /// Look up an exercise by id
    pub fn get(&self, id: &str) -> Result<&ExerciseDefinition> {
        self.exercises
            .get(id)
            .ok_or_else(|| Error::UnknownExercise(id.to_string()))
    }

    /// Add or replace exercises, rejecting any whose profile is invalid
    pub fn extend_with<I>(&mut self, defs: I) -> Result<()>
    where
        I: IntoIterator<Item = ExerciseDefinition>,
    {
        for def in defs {
            validate_profile(&def.profile).map_err(|e| {
                Error::Config(format!("exercise '{}': {}", def.id, e))
            })?;
            if self.exercises.contains_key(&def.id) {
                tracing::info!("Custom exercise '{}' overrides built-in entry", def.id);
            }
            self.exercises.insert(def.id.clone(), def);
        }
        Ok(())
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors (empty if valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, def) in &self.exercises {
            if id != &def.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match definition ID '{}'",
                    id, def.id
                ));
            }
            if def.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
            if let Err(e) = validate_profile(&def.profile) {
                errors.push(format!("Exercise '{}': {}", id, e));
            }
        }

        if self.exercises.is_empty() {
            errors.push("Catalog has no exercises".to_string());
        }

        errors
    }
}
