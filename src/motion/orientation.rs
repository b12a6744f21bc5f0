//! Orientation normalization
//!
//! Maps the browser's front-back (beta) and left-right (gamma) angles onto a
//! rotation-independent pitch/roll pair, so that tilting the top of the
//! device toward the player always reads as positive pitch.

use serde::{Deserialize, Serialize};

/// One raw orientation sample as delivered by the host, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSample {
    /// Front-back tilt (beta)
    pub front_back_deg: Option<f64>,
    /// Left-right tilt (gamma)
    pub left_right_deg: Option<f64>,
}

impl RawSample {
    pub fn new(front_back_deg: f64, left_right_deg: f64) -> Self {
        Self {
            front_back_deg: Some(front_back_deg),
            left_right_deg: Some(left_right_deg),
        }
    }

    /// Both angles, if present and finite
    fn angles(&self) -> Option<(f64, f64)> {
        match (self.front_back_deg, self.left_right_deg) {
            (Some(beta), Some(gamma)) if beta.is_finite() && gamma.is_finite() => {
                Some((beta, gamma))
            }
            _ => None,
        }
    }
}

/// Screen rotation in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScreenRotation {
    #[default]
    Upright,
    /// Rotated 90° (landscape)
    QuarterTurn,
    /// Rotated 180° (upside-down portrait)
    HalfTurn,
    /// Rotated 270° (landscape, other side)
    ThreeQuarterTurn,
}

impl ScreenRotation {
    /// Rotation from a screen angle in degrees. Accepts negative angles
    /// (`-90` is the same as `270`); anything off a quarter turn is treated
    /// as upright.
    pub fn from_degrees(angle: i32) -> Self {
        match angle.rem_euclid(360) {
            90 => ScreenRotation::QuarterTurn,
            180 => ScreenRotation::HalfTurn,
            270 => ScreenRotation::ThreeQuarterTurn,
            _ => ScreenRotation::Upright,
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            ScreenRotation::Upright => 0,
            ScreenRotation::QuarterTurn => 90,
            ScreenRotation::HalfTurn => 180,
            ScreenRotation::ThreeQuarterTurn => 270,
        }
    }

    pub fn is_sideways(&self) -> bool {
        matches!(
            self,
            ScreenRotation::QuarterTurn | ScreenRotation::ThreeQuarterTurn
        )
    }
}

/// Rotation-independent tilt
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TiltReading {
    /// Forward/back tilt relative to the screen
    pub pitch: f64,
    /// Side-to-side tilt relative to the screen
    pub roll: f64,
}

/// Normalize a raw sample for the given screen rotation.
///
/// Beta turns about the device's x axis (its right edge) and gamma about
/// its y axis (its top edge), per DeviceOrientation. A screen angle of 90°
/// means the device was turned counter-clockwise, so the screen's right
/// edge is the device's bottom (-y) and its top is the device's right
/// edge (+x). Pitch is the turn about the screen's right edge, roll the
/// turn about its top.
///
/// Returns `None` when either angle is missing or not finite.
pub fn normalize(sample: &RawSample, rotation: ScreenRotation) -> Option<TiltReading> {
    let (beta, gamma) = sample.angles()?;
    let (pitch, roll) = match rotation {
        ScreenRotation::Upright => (beta, gamma),
        ScreenRotation::HalfTurn => (-beta, -gamma),
        ScreenRotation::QuarterTurn => (-gamma, beta),
        ScreenRotation::ThreeQuarterTurn => (gamma, -beta),
    };
    Some(TiltReading { pitch, roll })
}
