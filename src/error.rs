// src/error.rs
// Error taxonomy shared by the core, the config loader and the HTTP layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("no pendulum at index {index} (collection holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("simulation state lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Rejects anything that is not a finite number strictly greater than zero.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}

pub(crate) fn require_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidParameter(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Inclusive range check; NaN never passes.
pub(crate) fn require_in_range(name: &str, value: f64, lo: f64, hi: f64) -> Result<()> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidParameter(format!(
            "{name} must lie in [{lo}, {hi}], got {value}"
        )))
    }
}
