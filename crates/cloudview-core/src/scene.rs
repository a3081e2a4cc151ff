//! The scene: viewports, their actors, and the shared camera anchor.

use glam::Vec3;
use ndarray::Array2;

use crate::actor::{AxesActor, CloudActor, RingActor, TextActor};
use crate::error::{CloudviewError, Result};
use crate::input::{buffer_from_arrays, centroid, validate_clouds};
use crate::layout::{tile_horizontal, Viewport};
use crate::options::{CameraSetup, DisplayOptions};

/// Everything drawn inside one viewport.
#[derive(Debug, Clone)]
pub struct ViewportScene {
    pub viewport: Viewport,
    pub cloud: CloudActor,
    pub rings: Vec<RingActor>,
    pub axes: Option<AxesActor>,
    pub label: TextActor,
}

/// The full scene of a display session.
///
/// The scene owns every actor. Renderers read it by shared reference; the
/// event loop is its only writer.
#[derive(Debug, Clone)]
pub struct Scene {
    viewports: Vec<ViewportScene>,
    background: Vec3,
    camera_setup: CameraSetup,
    camera_anchor: Vec3,
    revision: u64,
}

impl Scene {
    /// Builds the scene for a set of clouds.
    ///
    /// Inputs are validated first; nothing is built if any check fails.
    pub fn from_arrays(
        points: &[Array2<f32>],
        colors: &[Array2<u8>],
        options: &DisplayOptions,
    ) -> Result<Self> {
        validate_clouds(points, colors, &options.labels)?;

        let overlays = &options.overlays;
        let viewports = tile_horizontal(points.len())
            .into_iter()
            .zip(points.iter().zip(colors))
            .enumerate()
            .map(|(i, (viewport, (pc, co)))| {
                let buffer = buffer_from_arrays(pc.view(), co.view(), &options.buffer);
                let cloud = CloudActor::new(buffer, options.point_size)
                    .with_color_mode(options.color_mode.clone());
                let rings = if i == 0 && overlays.show_rings {
                    RingActor::reference_pair().to_vec()
                } else {
                    Vec::new()
                };
                let text = options.labels.get(i).cloned().unwrap_or_default();
                ViewportScene {
                    viewport,
                    cloud,
                    rings,
                    axes: overlays.show_axes.then(AxesActor::default),
                    label: TextActor::new(text, overlays.label_font_size, overlays.label_color),
                }
            })
            .collect();

        // Only the first cloud positions the camera.
        let camera_anchor = centroid(points[0].view()).unwrap_or(Vec3::ZERO);
        log::info!(
            "built scene with {} viewport(s), camera anchor {camera_anchor}",
            points.len()
        );

        Ok(Self {
            viewports,
            background: options.background_color,
            camera_setup: options.camera.clone(),
            camera_anchor,
            revision: 0,
        })
    }

    /// The viewports, left to right.
    #[must_use]
    pub fn viewports(&self) -> &[ViewportScene] {
        &self.viewports
    }

    /// Number of viewports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.viewports.len()
    }

    /// Returns true if the scene has no viewports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    /// Background color.
    #[must_use]
    pub fn background(&self) -> Vec3 {
        self.background
    }

    /// Shared camera configuration.
    #[must_use]
    pub fn camera_setup(&self) -> &CameraSetup {
        &self.camera_setup
    }

    /// Centroid of the first cloud, which the camera is placed relative to.
    #[must_use]
    pub fn camera_anchor(&self) -> Vec3 {
        self.camera_anchor
    }

    /// Counter bumped whenever geometry may have changed.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Looks up a viewport.
    pub fn viewport(&self, index: usize) -> Result<&ViewportScene> {
        self.viewports
            .get(index)
            .ok_or(CloudviewError::ViewportOutOfRange {
                index,
                count: self.viewports.len(),
            })
    }

    /// Mutable access to a viewport's geometry. Bumps the revision.
    pub fn viewport_mut(&mut self, index: usize) -> Result<&mut ViewportScene> {
        let count = self.viewports.len();
        let viewport = self
            .viewports
            .get_mut(index)
            .ok_or(CloudviewError::ViewportOutOfRange { index, count })?;
        self.revision += 1;
        Ok(viewport)
    }

    /// Returns a viewport's point size.
    pub fn point_size(&self, index: usize) -> Result<f32> {
        Ok(self.viewport(index)?.cloud.point_size)
    }

    /// Sets a viewport's point size. Point size is a draw parameter, so the
    /// revision is left alone.
    pub fn set_point_size(&mut self, index: usize, size: f32) -> Result<()> {
        let count = self.viewports.len();
        let viewport = self
            .viewports
            .get_mut(index)
            .ok_or(CloudviewError::ViewportOutOfRange { index, count })?;
        viewport.cloud.point_size = size;
        Ok(())
    }
}
