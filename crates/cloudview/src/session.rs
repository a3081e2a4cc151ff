//! A display session: one scene, its camera, and its key bindings.

use std::path::Path;

use cloudview_core::{
    CloudviewError, DisplayOptions, KeyHandler, KeyHandlers, KeyResponse, Result, Scene,
};
use cloudview_render::{save_image, Camera, ScreenshotError};
use ndarray::Array2;

/// A frame read back from the GPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// RGBA pixels, row-major from the top-left corner.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Capture {
    /// Writes the capture as PNG or JPEG, chosen by file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_image(path, &self.pixels, self.width, self.height).map_err(screenshot_error)
    }
}

/// State shared by the window loop and the headless renderer.
///
/// The session owns the scene and the camera that drives every viewport.
/// Key presses reach the scene only through the session's handlers.
#[derive(Debug)]
pub struct DisplaySession {
    scene: Scene,
    camera: Camera,
    initial_camera: Camera,
    handlers: KeyHandlers,
    options: DisplayOptions,
    pub(crate) capture: Option<Capture>,
}

impl DisplaySession {
    /// Validates the clouds and builds the scene, camera, and one
    /// point-size handler per viewport. No window or GPU work happens here.
    pub fn new(
        points: &[Array2<f32>],
        colors: &[Array2<u8>],
        options: DisplayOptions,
    ) -> Result<Self> {
        let scene = Scene::from_arrays(points, colors, &options)?;
        let camera = Camera::from_setup(scene.camera_setup(), scene.camera_anchor());
        let handlers = KeyHandlers::point_size_per_viewport(&scene);

        log::info!(
            "display session '{}': {} cloud(s), camera at {}",
            options.title,
            scene.len(),
            camera.position
        );

        Ok(Self {
            scene,
            initial_camera: camera.clone(),
            camera,
            handlers,
            options,
            capture: None,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    /// The last frame captured when the window closed, if any.
    pub fn capture(&self) -> Option<&Capture> {
        self.capture.as_ref()
    }

    /// Installs an extra key handler after the built-in ones.
    pub fn add_key_handler(&mut self, handler: impl KeyHandler + 'static) {
        self.handlers.push(handler);
    }

    /// Puts the camera back where the session started.
    pub fn reset_camera(&mut self) {
        self.camera = self.initial_camera.clone();
        log::debug!("camera reset to {}", self.camera.position);
    }

    /// Handles a key press. `r` resets the camera; everything else goes to
    /// the key handlers.
    pub fn handle_key(&mut self, key: &str) -> KeyResponse {
        if key == "r" {
            self.reset_camera();
            return KeyResponse::Handled;
        }
        self.handlers.dispatch(key, &mut self.scene)
    }

    /// Shows the session according to its options.
    ///
    /// Interactive sessions block until the window closes, then write the
    /// final frame to the output path if one is set. Non-interactive
    /// sessions render offscreen at the configured window size.
    pub fn show(&mut self) -> Result<()> {
        if self.options.interactive {
            crate::app::run(self)?;
            if let Some(path) = &self.options.output_path {
                let capture = self.capture.as_ref().ok_or_else(|| {
                    CloudviewError::Screenshot("window closed before a frame was captured".into())
                })?;
                capture.save(path)?;
            }
            return Ok(());
        }

        match &self.options.output_path {
            Some(path) => {
                let (width, height) = self.options.window_size;
                crate::headless::render_to_file(self, path, width, height)
            }
            None => {
                log::info!("non-interactive session without output path, nothing to render");
                Ok(())
            }
        }
    }
}

pub(crate) fn render_error(e: impl std::fmt::Display) -> CloudviewError {
    CloudviewError::Render(e.to_string())
}

pub(crate) fn screenshot_error(e: ScreenshotError) -> CloudviewError {
    CloudviewError::Screenshot(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudview_core::Vec3;
    use ndarray::array;

    fn session() -> DisplaySession {
        let points: Vec<Array2<f32>> = vec![
            array![[0.0, 0.0, 0.0], [2.0, 2.0, 2.0]],
            array![[1.0, 1.0, 1.0]],
        ];
        let colors: Vec<Array2<u8>> = vec![array![[255, 0, 0], [0, 255, 0]], array![[0, 0, 255]]];
        DisplaySession::new(&points, &colors, DisplayOptions::default()).unwrap()
    }

    #[test]
    fn test_plus_grows_every_viewport() {
        let mut session = session();
        assert_eq!(session.handle_key("+"), KeyResponse::Handled);
        assert_eq!(session.handle_key("+"), KeyResponse::Handled);
        assert_eq!(session.scene().point_size(0).unwrap(), 6.0);
        assert_eq!(session.scene().point_size(1).unwrap(), 6.0);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let mut session = session();
        assert_eq!(session.handle_key("-"), KeyResponse::Ignored);
        assert_eq!(session.scene().point_size(0).unwrap(), 4.0);
    }

    #[test]
    fn test_reset_restores_initial_camera() {
        let mut session = session();
        let initial = session.camera().clone();
        session.camera_mut().orbit(0.5, 0.2);
        session.camera_mut().dolly(0.3);
        assert_ne!(session.camera(), &initial);

        assert_eq!(session.handle_key("r"), KeyResponse::Handled);
        assert_eq!(session.camera(), &initial);
    }

    #[test]
    fn test_camera_follows_first_cloud() {
        let session = session();
        assert_eq!(session.camera().position, Vec3::new(11.0, 11.0, 6.0));
        assert_eq!(session.camera().target, Vec3::ZERO);
    }

    #[test]
    fn test_non_interactive_without_path_does_nothing() {
        let points: Vec<Array2<f32>> = vec![array![[0.0, 0.0, 0.0]]];
        let colors: Vec<Array2<u8>> = vec![array![[0, 0, 0]]];
        let options = DisplayOptions::default().with_interactive(false);
        let mut session = DisplaySession::new(&points, &colors, options).unwrap();
        session.show().unwrap();
        assert!(session.capture().is_none());
    }
}
