//! Submission request constants and validation.

use crate::error::CoreError;
use crate::tile::TILES_PER_JOB;

/// Change action: re-roll a new 2×2 grid seeded from one quadrant.
pub const ACTION_VARIATION: &str = "VARIATION";
/// Change action: upscale one quadrant to a full-size image.
pub const ACTION_UPSCALE: &str = "UPSCALE";

/// All valid change actions.
pub const VALID_CHANGE_ACTIONS: &[&str] = &[ACTION_VARIATION, ACTION_UPSCALE];

/// Validate that a prompt is non-empty after trimming.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        Err(CoreError::Validation(
            "Prompt must not be empty".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate a change action string.
pub fn validate_change_action(action: &str) -> Result<(), CoreError> {
    if VALID_CHANGE_ACTIONS.contains(&action) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown change action '{action}'. Must be one of: {}",
            VALID_CHANGE_ACTIONS.join(", ")
        )))
    }
}

/// Validate a 1-based quadrant index as used on the wire (1–4).
pub fn validate_change_index(index: u8) -> Result<(), CoreError> {
    if (1..=TILES_PER_JOB as u8).contains(&index) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Change index must be between 1 and {TILES_PER_JOB}, got {index}"
        )))
    }
}
