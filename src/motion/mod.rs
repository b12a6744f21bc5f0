//! Motion processing
//!
//! Raw orientation samples flow through here and leave as discrete gestures:
//! - Normalize for screen rotation (pure)
//! - Calibrate a baseline and active axis once per round
//! - Classify smoothed tilts with hysteresis and cooldown

pub mod calibration;
pub mod classifier;
pub mod orientation;

pub use calibration::{
    AdaptiveCalibrator, Axis, Calibration, CalibrationProfile, CalibrationStep, Calibrator,
    FixedAxisCalibrator, TiltSign, calibrator_for,
};
pub use classifier::{ClassifierState, Gesture, GestureClassifier, GestureConfig};
pub use orientation::{RawSample, ScreenRotation, TiltReading, normalize};
