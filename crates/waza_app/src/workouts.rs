//! Exercise logging.
//!
//! Incoming form data is a statically shaped draft with one validator per
//! field, not an open-ended key/value map.

use crate::{AppError, AppResult};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use waza_client::{Exercise, WazaApiClient};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExerciseValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("muscle_group must not be empty")]
    EmptyMuscleGroup,
    #[error("weight must not be negative")]
    NegativeWeight,
    #[error("sets must be at least 1")]
    NonPositiveSets,
    #[error("reps must be at least 1")]
    NonPositiveReps,
    #[error("session_id must not be empty")]
    EmptySessionId,
}

/// Unvalidated exercise form data.
#[derive(Clone, Debug, Deserialize)]
pub struct ExerciseDraft {
    pub title: String,
    pub muscle_group: String,
    pub weight: f64,
    pub sets: u32,
    pub reps: u32,
    pub session_id: String,
}

fn validate_title(title: &str) -> Result<(), ExerciseValidationError> {
    if title.trim().is_empty() {
        return Err(ExerciseValidationError::EmptyTitle);
    }
    Ok(())
}

fn validate_muscle_group(muscle_group: &str) -> Result<(), ExerciseValidationError> {
    if muscle_group.trim().is_empty() {
        return Err(ExerciseValidationError::EmptyMuscleGroup);
    }
    Ok(())
}

fn validate_weight(weight: f64) -> Result<(), ExerciseValidationError> {
    if weight.is_nan() || weight < 0.0 {
        return Err(ExerciseValidationError::NegativeWeight);
    }
    Ok(())
}

fn validate_sets(sets: u32) -> Result<(), ExerciseValidationError> {
    if sets == 0 {
        return Err(ExerciseValidationError::NonPositiveSets);
    }
    Ok(())
}

fn validate_reps(reps: u32) -> Result<(), ExerciseValidationError> {
    if reps == 0 {
        return Err(ExerciseValidationError::NonPositiveReps);
    }
    Ok(())
}

fn validate_session_id(session_id: &str) -> Result<(), ExerciseValidationError> {
    if session_id.trim().is_empty() {
        return Err(ExerciseValidationError::EmptySessionId);
    }
    Ok(())
}

impl ExerciseDraft {
    pub fn validate(self) -> Result<Exercise, ExerciseValidationError> {
        validate_title(&self.title)?;
        validate_muscle_group(&self.muscle_group)?;
        validate_weight(self.weight)?;
        validate_sets(self.sets)?;
        validate_reps(self.reps)?;
        validate_session_id(&self.session_id)?;
        Ok(Exercise {
            exercise_id: None,
            title: self.title,
            muscle_group: self.muscle_group,
            weight: self.weight,
            sets: self.sets,
            reps: self.reps,
            session_id: self.session_id,
        })
    }
}

pub struct WorkoutLog {
    client: Arc<dyn WazaApiClient>,
}

impl WorkoutLog {
    pub fn new(client: Arc<dyn WazaApiClient>) -> Self {
        Self { client }
    }

    pub async fn log_exercise(&self, draft: ExerciseDraft) -> AppResult<Exercise> {
        let exercise = draft
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(self.client.create_exercise(exercise).await?)
    }
}
