//! Error taxonomy for round control and configuration
//!
//! Nothing here is fatal: every variant leaves the round in a stage the
//! player can retry or quit from.

use thiserror::Error;

use crate::round::Stage;

/// Invalid gesture tuning
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive number (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("neutral angle {neutral}° must be below threshold {threshold}°")]
    NeutralNotBelowThreshold { neutral: f64, threshold: f64 },
    #[error("smoothing factor must be in (0, 1] (got {0})")]
    SmoothingOutOfRange(f64),
}

/// Rejected control-surface action
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundError {
    #[error("motion permission was not granted")]
    PermissionDenied,
    #[error("category '{key}' has no prompts")]
    EmptyCategory { key: String },
    #[error("unknown category '{key}'")]
    UnknownCategory { key: String },
    #[error("cannot {action} while {stage}")]
    WrongStage { action: &'static str, stage: Stage },
    #[error("invalid gesture config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Category data could not be loaded
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed category data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read category file: {0}")]
    Io(#[from] std::io::Error),
}
