//! Player preferences
//!
//! Persisted as JSON in LocalStorage on the web; natively the defaults are
//! used and saving is a no-op.

use serde::{Deserialize, Serialize};

use crate::consts::TELEMETRY_INTERVAL;
use crate::sim::{DragSensitivity, SessionState};

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Sailing ===
    /// Start with the boost preset
    pub boost: bool,
    /// Camera drag yaw sensitivity (radians per pixel)
    pub drag_yaw_sensitivity: f32,
    /// Camera drag pitch sensitivity (radians per pixel)
    pub drag_pitch_sensitivity: f32,

    // === HUD ===
    /// Seconds between telemetry updates (0 = every frame)
    pub telemetry_interval: f32,
    /// Show the on-foot controls hint after docking
    pub show_controls_hint: bool,

    // === Accessibility ===
    /// Reduced motion (no camera drag orbit)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let sensitivity = DragSensitivity::default();
        Self {
            boost: false,
            drag_yaw_sensitivity: sensitivity.yaw,
            drag_pitch_sensitivity: sensitivity.pitch,
            telemetry_interval: TELEMETRY_INTERVAL,
            show_controls_hint: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective drag sensitivity (respects reduced_motion)
    pub fn drag_sensitivity(&self) -> DragSensitivity {
        if self.reduced_motion {
            return DragSensitivity { yaw: 0.0, pitch: 0.0 };
        }
        let sane = |v: f32, fallback: f32| if v.is_finite() && v >= 0.0 { v } else { fallback };
        let defaults = DragSensitivity::default();
        DragSensitivity {
            yaw: sane(self.drag_yaw_sensitivity, defaults.yaw),
            pitch: sane(self.drag_pitch_sensitivity, defaults.pitch),
        }
    }

    /// Push preferences into a running session
    pub fn apply(&self, state: &mut SessionState) {
        state.set_boost(self.boost);
        state.sensitivity = self.drag_sensitivity();
        state.telemetry_interval = if self.telemetry_interval.is_finite() {
            self.telemetry_interval.max(0.0)
        } else {
            TELEMETRY_INTERVAL
        };
        state.show_controls_hint = self.show_controls_hint;
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "isle_voyage_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(err) => log::warn!("Ignoring stored settings: {}", err),
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
