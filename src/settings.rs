//! Gameplay settings and preferences
//!
//! Persisted in LocalStorage. Only preferences live here; rounds are never
//! saved.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::motion::GestureConfig;
use crate::round::RoundConfig;

/// How a round establishes its baseline and gesture axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CalibrationStrategy {
    /// Pitch axis, tilt down = correct, baseline from the first reading
    #[default]
    FixedAxis,
    /// Learn axis and direction from one deliberate tilt after a steady hold
    Adaptive,
}

impl CalibrationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrationStrategy::FixedAxis => "Fixed",
            CalibrationStrategy::Adaptive => "Adaptive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixed" | "fixed-axis" => Some(CalibrationStrategy::FixedAxis),
            "adaptive" => Some(CalibrationStrategy::Adaptive),
            _ => None,
        }
    }
}

/// Gameplay settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Round length in seconds (0 means the default)
    #[serde(default)]
    pub round_seconds: u32,
    /// Tilt detection tuning
    #[serde(default)]
    pub gesture: GestureConfig,
    /// Calibration procedure
    #[serde(default)]
    pub calibration: CalibrationStrategy,
    /// Steady-hold time required by the adaptive calibration
    #[serde(default = "default_hold_steady_ms")]
    pub hold_steady_ms: f64,
}

fn default_hold_steady_ms() -> f64 {
    HOLD_STEADY_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            round_seconds: DEFAULT_ROUND_SECONDS,
            gesture: GestureConfig::default(),
            calibration: CalibrationStrategy::FixedAxis,
            hold_steady_ms: HOLD_STEADY_MS,
        }
    }
}

impl Settings {
    pub fn round_config(&self) -> RoundConfig {
        RoundConfig::new(self.round_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gesture.validate()?;
        if !self.hold_steady_ms.is_finite() || self.hold_steady_ms < 0.0 {
            return Err(ConfigError::Negative {
                field: "hold_steady_ms",
                value: self.hold_steady_ms,
            });
        }
        Ok(())
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tilt_deck_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(settings) if settings.validate().is_ok() => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Ok(_) => log::warn!("Stored settings are invalid, using defaults"),
                    Err(e) => log::warn!("Could not parse stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            CalibrationStrategy::from_str("Adaptive"),
            Some(CalibrationStrategy::Adaptive)
        );
        assert_eq!(
            CalibrationStrategy::from_str("fixed-axis"),
            Some(CalibrationStrategy::FixedAxis)
        );
        assert_eq!(CalibrationStrategy::from_str("tilt"), None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"round_seconds":30}"#).unwrap();
        assert_eq!(settings.round_seconds, 30);
        assert_eq!(settings.gesture, GestureConfig::default());
        assert_eq!(settings.calibration, CalibrationStrategy::FixedAxis);
        assert_eq!(settings.hold_steady_ms, HOLD_STEADY_MS);
    }

    #[test]
    fn test_zero_seconds_means_default() {
        let settings = Settings {
            round_seconds: 0,
            ..Default::default()
        };
        assert_eq!(settings.round_config().seconds, DEFAULT_ROUND_SECONDS);
    }

    #[test]
    fn test_validate_rejects_bad_gesture() {
        let mut settings = Settings {
            calibration: CalibrationStrategy::Adaptive,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        settings.gesture.neutral_deg = settings.gesture.threshold_deg;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_hold_steady_allows_zero_rejects_negative() {
        let instant = Settings {
            hold_steady_ms: 0.0,
            ..Default::default()
        };
        assert!(instant.validate().is_ok());

        let negative = Settings {
            hold_steady_ms: -5.0,
            ..Default::default()
        };
        let err = negative.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::Negative {
                field: "hold_steady_ms",
                value: -5.0
            }
        );
        assert_eq!(err.to_string(), "hold_steady_ms must not be negative (got -5)");
    }
}
