//! cloudview: side-by-side viewers for colored 3D point clouds.
//!
//! Each cloud gets its own viewport in one window, left to right. All
//! viewports share a single camera, so turning one turns them all. The first
//! viewport also shows two reference rings in the XZ plane (radius 50 and
//! 100), and every viewport shows a small axes indicator and an optional
//! text label.
//!
//! # Quick Start
//!
//! ```no_run
//! use cloudview::*;
//! use ndarray::array;
//!
//! fn main() -> Result<()> {
//!     let points = vec![array![[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]];
//!     let colors = vec![array![[255u8, 0, 0], [0, 255, 0], [0, 0, 255]]];
//!
//!     let options = DisplayOptions::default()
//!         .with_title("scan")
//!         .with_labels(["frame 0"])
//!         .with_output_path("scan.png");
//!
//!     // Blocks until the window is closed, then writes scan.png
//!     show_point_clouds(&points, &colors, &options)
//! }
//! ```
//!
//! # Controls
//!
//! - left drag: orbit, right drag or shift + left drag: pan, wheel: dolly
//! - `+`: grow the point size of every cloud by one pixel
//! - `r`: reset the camera, `q` or Escape: close the window

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

mod app;
mod headless;
mod session;

pub use headless::{render_to_file, render_to_image};
pub use session::{Capture, DisplaySession};

// Re-export core types
pub use cloudview_core::{
    buffer_from_arrays, centroid, tile_horizontal, validate_clouds, AxesActor, BufferOptions,
    CameraSetup, CloudActor, CloudviewError, ColorMode, DisplayOptions, EvictionPolicy, FocalPoint,
    KeyHandler, KeyHandlers, KeyResponse, OverlayOptions, PixelRect, PointBuffer,
    PointSizeHandler, Result, RingActor, Scene, TextActor, Viewport, ViewportScene,
    DEFAULT_MAX_POINTS,
};
pub use cloudview_core::{Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export render types
pub use cloudview_render::{Camera, ColorMap, ColorMapRegistry, RenderEngine};

use ndarray::Array2;

/// Shows point clouds side by side, one viewport each.
///
/// `points[i]` is an N x 3 array of positions and `colors[i]` the matching
/// N x 3 array of RGB bytes. Inputs are validated before any window or GPU
/// work; a mismatch in cloud count, row count, or column count is an error.
///
/// With `options.interactive` set this opens a window and blocks until it is
/// closed, then writes the final frame to `options.output_path` if set.
/// Otherwise nothing is shown and the frame is rendered offscreen at
/// `options.window_size`.
pub fn show_point_clouds(
    points: &[Array2<f32>],
    colors: &[Array2<u8>],
    options: &DisplayOptions,
) -> Result<()> {
    let _ = env_logger::try_init();
    let mut session = DisplaySession::new(points, colors, options.clone())?;
    session.show()
}
