//! Tilt Deck - forehead word-guessing driven by device tilt
//!
//! Core modules:
//! - `motion`: Orientation normalization, gesture classification, calibration
//! - `round`: Deck shuffling and the round lifecycle state machine
//! - `catalog`: Category word lists
//! - `platform`: Browser/native host abstraction (sensor, permission, timers)
//! - `settings`: Persisted gameplay preferences

pub mod catalog;
pub mod error;
pub mod motion;
pub mod platform;
pub mod round;
pub mod settings;

pub use catalog::{Catalog, Category};
pub use error::{CatalogError, ConfigError, RoundError};
pub use settings::{CalibrationStrategy, Settings};

/// Gameplay tuning constants
pub mod consts {
    /// Tilt (degrees from baseline) that counts as a gesture
    pub const THRESHOLD_DEG: f64 = 28.0;
    /// Tilt the classifier must fall back under before it re-arms
    pub const NEUTRAL_DEG: f64 = 10.0;
    /// Minimum time between two emitted gestures
    pub const COOLDOWN_MS: f64 = 900.0;
    /// Exponential smoothing factor applied to each new sample
    pub const SMOOTHING_FACTOR: f64 = 0.35;

    /// Round length used when none (or zero) is configured
    pub const DEFAULT_ROUND_SECONDS: u32 = 60;
    /// Round lengths offered on the setup screen
    pub const ROUND_SECONDS_OPTIONS: [u32; 2] = [30, 60];
    /// Countdown resolution
    pub const TIMER_INTERVAL_MS: u32 = 1000;

    /// How long the adaptive calibration wants the device held still
    pub const HOLD_STEADY_MS: f64 = 600.0;
}
