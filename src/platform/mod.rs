//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Motion permission prompt
//! - Orientation sensor subscription and screen rotation
//! - The 1 Hz round timer
//!
//! Subscriptions carry a liveness flag so callbacks that arrive after
//! teardown can tell they are stale.

pub mod subscription;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use subscription::{LiveFlag, Subscription};

use serde::{Deserialize, Serialize};

/// Host answer to the motion permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl From<bool> for PermissionStatus {
    fn from(granted: bool) -> Self {
        if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{TiltDeckApp, request_motion_permission};
