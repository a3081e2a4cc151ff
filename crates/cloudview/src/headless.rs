//! Headless rendering of a display session.
//!
//! Renders a session's scene to an image buffer or file without opening a
//! window. Used for non-interactive sessions and in tests.

use std::path::Path;

use cloudview_core::{CloudviewError, Result};
use cloudview_render::{save_image, RenderEngine};
use pollster::FutureExt;

use crate::session::{render_error, screenshot_error, DisplaySession};

/// Renders the session's scene to raw RGBA pixels.
///
/// Creates a headless GPU context, renders one frame with the session's
/// current camera and point sizes, and returns `width * height * 4` bytes,
/// row by row from the top-left corner.
///
/// # Example
/// ```no_run
/// use cloudview::*;
/// use ndarray::array;
///
/// let points = vec![array![[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0]]];
/// let colors = vec![array![[255u8, 0, 0], [0, 0, 255]]];
/// let session = DisplaySession::new(&points, &colors, DisplayOptions::default()).unwrap();
/// let pixels = render_to_image(&session, 800, 600).unwrap();
/// assert_eq!(pixels.len(), 800 * 600 * 4);
/// ```
pub fn render_to_image(session: &DisplaySession, width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(CloudviewError::Render(format!(
            "image size must be non-zero, got {width}x{height}"
        )));
    }

    let mut engine = RenderEngine::new_headless(width, height)
        .block_on()
        .map_err(|e| render_error(format!("failed to create headless engine: {e}")))?;

    engine
        .render_to_image(session.scene(), session.camera())
        .map_err(render_error)
}

/// Renders the session's scene and saves it as PNG or JPEG, chosen by the
/// file extension.
pub fn render_to_file(
    session: &DisplaySession,
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> Result<()> {
    let data = render_to_image(session, width, height)?;
    save_image(path, &data, width, height).map_err(screenshot_error)
}
