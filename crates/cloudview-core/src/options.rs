//! Configuration options for a display session.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::buffer::{EvictionPolicy, DEFAULT_MAX_POINTS};
use crate::error::Result;

/// Options for one call to the display routine.
///
/// Every field has a default, so a JSON document only needs the fields it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Window title.
    pub title: String,
    /// Window size in pixels (width, height). Also the offscreen capture size.
    pub window_size: (u32, u32),
    /// One label per viewport. Missing labels are empty.
    pub labels: Vec<String>,
    /// Where to write the final frame. `None` skips the screenshot.
    pub output_path: Option<PathBuf>,
    /// Whether to open a window and block until it is closed.
    pub interactive: bool,
    /// Rendered point size in pixels.
    pub point_size: f32,
    /// Background color of every viewport.
    pub background_color: Vec3,
    /// How points are colored.
    pub color_mode: ColorMode,
    /// Shared camera placement.
    pub camera: CameraSetup,
    /// Capacity and overflow handling of each cloud's buffer.
    pub buffer: BufferOptions,
    /// Decorations drawn on top of the clouds.
    pub overlays: OverlayOptions,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            title: "Default".to_string(),
            window_size: (1800, 600),
            labels: Vec::new(),
            output_path: None,
            interactive: true,
            point_size: 4.0,
            background_color: Vec3::ONE,
            color_mode: ColorMode::default(),
            camera: CameraSetup::default(),
            buffer: BufferOptions::default(),
            overlays: OverlayOptions::default(),
        }
    }
}

impl DisplayOptions {
    /// Sets the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the per-viewport labels.
    #[must_use]
    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the screenshot path.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets whether the window blocks for interaction.
    #[must_use]
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Sets the window size.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Parses options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// How point colors are chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColorMode {
    /// Use the per-point RGB colors.
    #[default]
    Rgb,
    /// Map each point's depth through a named color map.
    Depth {
        /// Color map name ("rainbow" or "viridis").
        color_map: String,
    },
}

/// Where the shared camera looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FocalPoint {
    /// The world origin.
    #[default]
    Origin,
    /// The centroid of the first cloud.
    Centroid,
}

/// Placement of the shared camera relative to the first cloud's centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSetup {
    /// Offset distance `d`; the camera sits at `centroid + (d, d, d / 2)`.
    pub distance: f32,
    /// View-up vector.
    pub view_up: Vec3,
    /// Focal point choice.
    pub focal_point: FocalPoint,
    /// Near clipping distance.
    pub near: f32,
    /// Far clipping distance.
    pub far: f32,
    /// Vertical view angle in degrees.
    pub view_angle_deg: f32,
}

impl Default for CameraSetup {
    fn default() -> Self {
        Self {
            distance: 10.0,
            view_up: Vec3::new(0.0, -1.0, 0.0),
            focal_point: FocalPoint::Origin,
            near: 0.002,
            far: 1000.0,
            view_angle_deg: 30.0,
        }
    }
}

impl CameraSetup {
    /// Camera position for a cloud centered at `centroid`.
    #[must_use]
    pub fn position(&self, centroid: Vec3) -> Vec3 {
        let d = self.distance;
        centroid + Vec3::new(d, d, d / 2.0)
    }

    /// Focal point for a cloud centered at `centroid`.
    #[must_use]
    pub fn target(&self, centroid: Vec3) -> Vec3 {
        match self.focal_point {
            FocalPoint::Origin => Vec3::ZERO,
            FocalPoint::Centroid => centroid,
        }
    }
}

/// Point buffer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferOptions {
    /// Maximum number of points per cloud.
    pub max_points: usize,
    /// Overflow behavior once a buffer is full.
    pub eviction: EvictionPolicy,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            eviction: EvictionPolicy::default(),
        }
    }
}

/// Decorations: axes, reference rings, labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// Draw an axes indicator in every viewport.
    pub show_axes: bool,
    /// Draw the two reference rings in the first viewport.
    pub show_rings: bool,
    /// Label font size in pixels.
    pub label_font_size: f32,
    /// Label color.
    pub label_color: Vec3,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            show_axes: true,
            show_rings: true,
            label_font_size: 22.0,
            label_color: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = DisplayOptions::default();
        assert_eq!(opts.title, "Default");
        assert_eq!(opts.window_size, (1800, 600));
        assert!(opts.interactive);
        assert!(opts.output_path.is_none());
        assert_eq!(opts.point_size, 4.0);
        assert_eq!(opts.background_color, Vec3::ONE);
        assert_eq!(opts.color_mode, ColorMode::Rgb);
        assert_eq!(opts.buffer.eviction, EvictionPolicy::OverwritePosition);
    }

    #[test]
    fn test_camera_setup_positions() {
        let setup = CameraSetup::default();
        let centroid = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(setup.position(centroid), Vec3::new(11.0, 12.0, 8.0));
        assert_eq!(setup.target(centroid), Vec3::ZERO);

        let centered = CameraSetup {
            focal_point: FocalPoint::Centroid,
            ..CameraSetup::default()
        };
        assert_eq!(centered.target(centroid), centroid);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts = DisplayOptions::from_json(
            r#"{ "title": "scan", "interactive": false, "buffer": { "eviction": "Ring" } }"#,
        )
        .unwrap();
        assert_eq!(opts.title, "scan");
        assert!(!opts.interactive);
        assert_eq!(opts.buffer.eviction, EvictionPolicy::Ring);
        assert_eq!(opts.buffer.max_points, DEFAULT_MAX_POINTS);
        assert_eq!(opts.window_size, (1800, 600));
    }

    #[test]
    fn test_json_round_trip() {
        let opts = DisplayOptions::default()
            .with_title("pair")
            .with_labels(["left", "right"])
            .with_output_path("/tmp/out.png")
            .with_interactive(false);
        let parsed = DisplayOptions::from_json(&opts.to_json().unwrap()).unwrap();
        assert_eq!(parsed, opts);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(DisplayOptions::from_json("{ not json").is_err());
    }
}
