//! Application settings

use serde::{Deserialize, Serialize};
use shared::BuildVolume;

/// Viewport display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Platform wireframe color RGB
    pub platform_color: [u8; 3],
    /// Color of newly placed objects RGB
    pub object_color: [u8; 3],
    /// Highlight color of the selected object RGB
    pub selection_color: [u8; 3],
    /// Start with an orthographic projection
    pub orthographic: bool,
    /// Animate newly placed objects dropping onto the platform
    pub drop_animation: bool,
    /// Interval of the periodic redraw request, milliseconds
    pub redraw_interval_ms: u64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [0, 0, 0],
            platform_color: [200, 200, 200],
            object_color: [77, 179, 128],
            selection_color: [0, 220, 255],
            orthographic: false,
            drop_animation: true,
            redraw_interval_ms: 50,
        }
    }
}

/// Step sizes for mouse and keyboard manipulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Key move step, build-volume units
    pub move_step: f32,
    /// Key move step with Ctrl held
    pub fine_move_step: f32,
    /// Key rotate step, degrees
    pub rotate_step: f32,
    /// Key rotate step with Ctrl held, degrees
    pub fine_rotate_step: f32,
    /// Rotation per wheel notch, degrees
    pub wheel_rotate_step: f32,
    /// Distance factor per shift+wheel notch
    pub zoom_factor: f32,
    /// Radius of the virtual trackball sphere in normalized device units
    pub trackball_radius: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            move_step: 5.0,
            fine_move_step: 1.0,
            rotate_step: 18.0,
            fine_rotate_step: 1.0,
            wheel_rotate_step: 5.0,
            zoom_factor: 1.05,
            trackball_radius: 0.8,
        }
    }
}

/// All application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    /// Printer build volume
    pub build_volume: BuildVolume,
    /// Viewport settings
    pub viewport: ViewportSettings,
    /// Manipulation step sizes
    pub interaction: InteractionSettings,
}

impl AppSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("org", "plater", "plater-view")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to file
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(dir) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("Cannot create config dir {}: {e}", dir.display());
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Cannot write settings to {}: {e}", path.display());
                }
            }
            Err(e) => tracing::warn!("Cannot serialize settings: {e}"),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        if settings.build_volume.is_valid() {
            Ok(settings)
        } else {
            tracing::warn!("Configured build volume is not positive, using default");
            Ok(Self {
                build_volume: BuildVolume::default(),
                ..settings
            })
        }
    }
}

/// Convert an RGB byte triple to normalized floats
pub fn rgb(c: [u8; 3]) -> [f32; 3] {
    [c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0]
}
