//! Per-round calibration
//!
//! Both strategies answer the same question, "which axis and direction
//! means down, and where is neutral?", behind the `Calibrator` trait so the
//! round state machine never cares which one is deployed.

use serde::{Deserialize, Serialize};

use super::classifier::{GestureConfig, smooth};
use super::orientation::TiltReading;
use crate::settings::CalibrationStrategy;

/// Which normalized axis the classifier watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Pitch (forward/back)
    Primary,
    /// Roll (side to side)
    Secondary,
}

impl Axis {
    #[inline]
    pub fn value(&self, reading: &TiltReading) -> f64 {
        match self {
            Axis::Primary => reading.pitch,
            Axis::Secondary => reading.roll,
        }
    }
}

/// Direction along the active axis that counts as `Down`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiltSign {
    Positive,
    Negative,
}

impl TiltSign {
    #[inline]
    pub fn factor(&self) -> f64 {
        match self {
            TiltSign::Positive => 1.0,
            TiltSign::Negative => -1.0,
        }
    }

    fn of(delta: f64) -> Self {
        if delta < 0.0 {
            TiltSign::Negative
        } else {
            TiltSign::Positive
        }
    }
}

/// Read-only result of calibration, valid for one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub axis: Axis,
    pub sign: TiltSign,
    pub baseline: f64,
}

/// A finished calibration plus where the smoothed signal stood when it
/// finished (non-zero if the player is still mid-tilt)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub profile: CalibrationProfile,
    pub residual_delta: f64,
}

/// Outcome of feeding one reading to a calibrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    Pending,
    Complete(Calibration),
}

/// Calibration strategy
pub trait Calibrator: std::fmt::Debug {
    /// Feed one normalized reading taken at `now_ms`
    fn observe(&mut self, reading: &TiltReading, now_ms: f64) -> CalibrationStep;

    /// Short human-readable progress message
    fn status(&self) -> &'static str;
}

/// Build the calibrator for a deployment's strategy
pub fn calibrator_for(
    strategy: CalibrationStrategy,
    config: GestureConfig,
    hold_steady_ms: f64,
) -> Box<dyn Calibrator> {
    match strategy {
        CalibrationStrategy::FixedAxis => Box::new(FixedAxisCalibrator),
        CalibrationStrategy::Adaptive => Box::new(AdaptiveCalibrator::new(config, hold_steady_ms)),
    }
}

/// Pitch axis, positive = down, baseline = first good reading
#[derive(Debug, Clone, Default)]
pub struct FixedAxisCalibrator;

impl Calibrator for FixedAxisCalibrator {
    fn observe(&mut self, reading: &TiltReading, _now_ms: f64) -> CalibrationStep {
        if !reading.pitch.is_finite() {
            return CalibrationStep::Pending;
        }
        CalibrationStep::Complete(Calibration {
            profile: CalibrationProfile {
                axis: Axis::Primary,
                sign: TiltSign::Positive,
                baseline: reading.pitch,
            },
            residual_delta: 0.0,
        })
    }

    fn status(&self) -> &'static str {
        "hold the device to your forehead"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdaptivePhase {
    /// Waiting for the reading to settle for `hold_steady_ms`
    HoldSteady,
    /// Settled; waiting for the player's deliberate "down" tilt
    AwaitTilt,
}

/// Learns axis and sign from the player's first deliberate tilt
#[derive(Debug, Clone)]
pub struct AdaptiveCalibrator {
    config: GestureConfig,
    hold_steady_ms: f64,
    phase: AdaptivePhase,
    /// Neutral [pitch, roll]
    baseline: Option<[f64; 2]>,
    /// Smoothed deviation from baseline per axis
    smoothed: [f64; 2],
    steady_since: f64,
}

const AXES: [Axis; 2] = [Axis::Primary, Axis::Secondary];

impl AdaptiveCalibrator {
    pub fn new(config: GestureConfig, hold_steady_ms: f64) -> Self {
        Self {
            config,
            hold_steady_ms,
            phase: AdaptivePhase::HoldSteady,
            baseline: None,
            smoothed: [0.0; 2],
            steady_since: 0.0,
        }
    }

    fn rebaseline(&mut self, values: [f64; 2], now_ms: f64) {
        self.baseline = Some(values);
        self.smoothed = [0.0; 2];
        self.steady_since = now_ms;
    }
}

impl Calibrator for AdaptiveCalibrator {
    fn observe(&mut self, reading: &TiltReading, now_ms: f64) -> CalibrationStep {
        let values = [reading.pitch, reading.roll];
        if values.iter().any(|v| !v.is_finite()) || !now_ms.is_finite() {
            return CalibrationStep::Pending;
        }

        let Some(baseline) = self.baseline else {
            self.rebaseline(values, now_ms);
            return CalibrationStep::Pending;
        };

        for i in 0..2 {
            self.smoothed[i] = smooth(
                self.smoothed[i],
                values[i] - baseline[i],
                self.config.smoothing_factor,
            );
        }

        match self.phase {
            AdaptivePhase::HoldSteady => {
                if self.smoothed.iter().any(|d| d.abs() > self.config.neutral_deg) {
                    // Still moving; start the hold over from here
                    self.rebaseline(values, now_ms);
                } else if now_ms - self.steady_since >= self.hold_steady_ms {
                    // Fold the residual drift into the neutral pose
                    self.baseline = Some([
                        baseline[0] + self.smoothed[0],
                        baseline[1] + self.smoothed[1],
                    ]);
                    self.smoothed = [0.0; 2];
                    self.phase = AdaptivePhase::AwaitTilt;
                    log::debug!("Calibration: steady, waiting for tilt");
                }
                CalibrationStep::Pending
            }
            AdaptivePhase::AwaitTilt => {
                let (idx, delta) = if self.smoothed[0].abs() >= self.smoothed[1].abs() {
                    (0, self.smoothed[0])
                } else {
                    (1, self.smoothed[1])
                };
                if delta.abs() < self.config.threshold_deg {
                    return CalibrationStep::Pending;
                }
                let profile = CalibrationProfile {
                    axis: AXES[idx],
                    sign: TiltSign::of(delta),
                    baseline: baseline[idx],
                };
                log::debug!("Calibration complete: {:?}", profile);
                CalibrationStep::Complete(Calibration {
                    profile,
                    residual_delta: delta,
                })
            }
        }
    }

    fn status(&self) -> &'static str {
        match self.phase {
            AdaptivePhase::HoldSteady => "waiting for steady hold",
            AdaptivePhase::AwaitTilt => "tilt down once to calibrate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GestureConfig {
        GestureConfig {
            threshold_deg: 28.0,
            neutral_deg: 10.0,
            cooldown_ms: 900.0,
            smoothing_factor: 1.0,
        }
    }

    fn reading(pitch: f64, roll: f64) -> TiltReading {
        TiltReading { pitch, roll }
    }

    #[test]
    fn test_fixed_axis_uses_first_reading() {
        let mut cal = FixedAxisCalibrator;
        match cal.observe(&reading(72.0, 3.0), 0.0) {
            CalibrationStep::Complete(c) => {
                assert_eq!(c.profile.axis, Axis::Primary);
                assert_eq!(c.profile.sign, TiltSign::Positive);
                assert_eq!(c.profile.baseline, 72.0);
                assert_eq!(c.residual_delta, 0.0);
            }
            CalibrationStep::Pending => panic!("fixed-axis should complete immediately"),
        }
    }

    #[test]
    fn test_adaptive_picks_roll_and_negative_sign() {
        let mut cal = AdaptiveCalibrator::new(config(), 500.0);
        assert_eq!(cal.observe(&reading(5.0, 2.0), 0.0), CalibrationStep::Pending);
        assert_eq!(cal.status(), "waiting for steady hold");
        assert_eq!(cal.observe(&reading(6.0, 1.0), 300.0), CalibrationStep::Pending);
        assert_eq!(cal.observe(&reading(5.0, 2.0), 600.0), CalibrationStep::Pending);
        assert_eq!(cal.status(), "tilt down once to calibrate");

        // Small wobble below threshold does nothing
        assert_eq!(cal.observe(&reading(12.0, -10.0), 700.0), CalibrationStep::Pending);

        match cal.observe(&reading(8.0, -33.0), 800.0) {
            CalibrationStep::Complete(c) => {
                assert_eq!(c.profile.axis, Axis::Secondary);
                assert_eq!(c.profile.sign, TiltSign::Negative);
                assert!((c.profile.baseline - 2.0).abs() < 1e-9);
                assert!((c.residual_delta + 35.0).abs() < 1e-9);
            }
            CalibrationStep::Pending => panic!("tilt should complete calibration"),
        }
    }

    #[test]
    fn test_adaptive_movement_restarts_hold() {
        let mut cal = AdaptiveCalibrator::new(config(), 500.0);
        cal.observe(&reading(0.0, 0.0), 0.0);
        cal.observe(&reading(40.0, 0.0), 400.0);
        // Hold restarted at t=400, so t=600 is not long enough
        cal.observe(&reading(40.0, 0.0), 600.0);
        assert_eq!(cal.status(), "waiting for steady hold");
        cal.observe(&reading(41.0, 0.0), 950.0);
        assert_eq!(cal.status(), "tilt down once to calibrate");
    }

    #[test]
    fn test_adaptive_stalls_without_tilt() {
        let mut cal = AdaptiveCalibrator::new(config(), 100.0);
        for i in 0..500 {
            let step = cal.observe(&reading(1.0, -1.0), i as f64 * 20.0);
            assert_eq!(step, CalibrationStep::Pending);
        }
    }

    #[test]
    fn test_adaptive_ignores_invalid_reading() {
        let mut cal = AdaptiveCalibrator::new(config(), 100.0);
        assert_eq!(
            cal.observe(&reading(f64::NAN, 0.0), 0.0),
            CalibrationStep::Pending
        );
        assert!(cal.baseline.is_none());
    }

    #[test]
    fn test_calibrator_for_strategy() {
        let fixed = calibrator_for(CalibrationStrategy::FixedAxis, config(), 100.0);
        assert_eq!(fixed.status(), "hold the device to your forehead");
        let adaptive = calibrator_for(CalibrationStrategy::Adaptive, config(), 100.0);
        assert_eq!(adaptive.status(), "waiting for steady hold");
    }
}
