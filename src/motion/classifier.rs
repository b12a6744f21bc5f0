//! Tilt gesture classifier
//!
//! Turns a jittery 30-60 Hz stream of tilt readings into rare `Down`/`Up`
//! events. Three gates keep one physical tilt from counting twice:
//! exponential smoothing, a neutral-return (hysteresis) re-arm, and a
//! cooldown since the last emission.

use serde::{Deserialize, Serialize};

use super::calibration::{Axis, Calibration, CalibrationProfile, TiltSign};
use super::orientation::TiltReading;
use crate::consts::*;
use crate::error::ConfigError;

/// Discrete gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    /// Tilt in the calibrated "down" direction (screen toward the floor)
    Down,
    /// Tilt the other way (screen toward the ceiling)
    Up,
}

/// Gesture thresholds and filtering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Smoothed deviation from baseline needed to emit
    pub threshold_deg: f64,
    /// Deviation the signal must return under to re-arm
    pub neutral_deg: f64,
    /// Minimum milliseconds between emissions
    pub cooldown_ms: f64,
    /// Weight of the newest sample in the moving average, in (0, 1]
    pub smoothing_factor: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            threshold_deg: THRESHOLD_DEG,
            neutral_deg: NEUTRAL_DEG,
            cooldown_ms: COOLDOWN_MS,
            smoothing_factor: SMOOTHING_FACTOR,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("threshold_deg", self.threshold_deg),
            ("neutral_deg", self.neutral_deg),
            ("cooldown_ms", self.cooldown_ms),
            ("smoothing_factor", self.smoothing_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if self.smoothing_factor > 1.0 {
            return Err(ConfigError::SmoothingOutOfRange(self.smoothing_factor));
        }
        if self.neutral_deg >= self.threshold_deg {
            return Err(ConfigError::NeutralNotBelowThreshold {
                neutral: self.neutral_deg,
                threshold: self.threshold_deg,
            });
        }
        Ok(())
    }
}

/// One step of exponential smoothing
#[inline]
pub(crate) fn smooth(previous: f64, raw: f64, alpha: f64) -> f64 {
    previous * (1.0 - alpha) + raw * alpha
}

/// Mutable classifier state (owned by exactly one classifier)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierState {
    pub smoothed_delta: f64,
    pub armed: bool,
    pub last_fired_at: Option<f64>,
}

impl Default for ClassifierState {
    fn default() -> Self {
        Self {
            smoothed_delta: 0.0,
            armed: true,
            last_fired_at: None,
        }
    }
}

/// Classifier bound to one calibrated axis for the life of a round
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: GestureConfig,
    axis: Axis,
    sign: TiltSign,
    /// `None` until the first sample after (re)calibration
    baseline: Option<f64>,
    state: ClassifierState,
}

impl GestureClassifier {
    /// Classifier that takes its baseline from the first sample it sees
    pub fn uncalibrated(config: GestureConfig, axis: Axis, sign: TiltSign) -> Self {
        Self {
            config,
            axis,
            sign,
            baseline: None,
            state: ClassifierState::default(),
        }
    }

    /// Classifier with a known baseline, armed and at rest
    pub fn new(config: GestureConfig, profile: CalibrationProfile) -> Self {
        Self {
            config,
            axis: profile.axis,
            sign: profile.sign,
            baseline: Some(profile.baseline),
            state: ClassifierState::default(),
        }
    }

    /// Classifier continuing from a finished calibration. If the player is
    /// still holding the calibration tilt it starts disarmed and waits for
    /// a return to neutral.
    pub fn from_calibration(config: GestureConfig, calibration: Calibration) -> Self {
        let mut classifier = Self::new(config, calibration.profile);
        classifier.state.smoothed_delta = calibration.residual_delta;
        classifier.state.armed = calibration.residual_delta.abs() <= config.neutral_deg;
        classifier
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Feed one reading taken at `now_ms`; returns a gesture if one fired
    pub fn observe(&mut self, reading: &TiltReading, now_ms: f64) -> Option<Gesture> {
        let value = self.axis.value(reading);
        if !value.is_finite() || !now_ms.is_finite() {
            return None;
        }

        let Some(baseline) = self.baseline else {
            self.baseline = Some(value);
            return None;
        };

        let raw_delta = value - baseline;
        self.state.smoothed_delta = smooth(
            self.state.smoothed_delta,
            raw_delta,
            self.config.smoothing_factor,
        );

        // Hysteresis: must come back near neutral before counting again
        if !self.state.armed {
            if self.state.smoothed_delta.abs() <= self.config.neutral_deg {
                self.state.armed = true;
            }
            return None;
        }

        if let Some(last) = self.state.last_fired_at {
            if now_ms - last < self.config.cooldown_ms {
                return None;
            }
        }

        let directed = self.state.smoothed_delta * self.sign.factor();
        let gesture = if directed >= self.config.threshold_deg {
            Gesture::Down
        } else if directed <= -self.config.threshold_deg {
            Gesture::Up
        } else {
            return None;
        };

        self.state.armed = false;
        self.state.last_fired_at = Some(now_ms);
        log::debug!(
            "Gesture {:?} (delta {:.1}° on {:?})",
            gesture,
            self.state.smoothed_delta,
            self.axis
        );
        Some(gesture)
    }
}
