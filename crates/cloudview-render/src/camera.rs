//! Camera and view management.

use cloudview_core::CameraSetup;
use glam::{Mat4, Quat, Vec3};

/// A perspective camera shared by every viewport.
///
/// Each viewport supplies its own aspect ratio when building the projection,
/// so one camera can drive viewports of different shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Focal point.
    pub target: Vec3,
    /// View-up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Camera {
    /// Places the camera relative to `anchor` (the first cloud's centroid).
    #[must_use]
    pub fn from_setup(setup: &CameraSetup, anchor: Vec3) -> Self {
        Self {
            position: setup.position(anchor),
            target: setup.target(anchor),
            up: setup.view_up.normalize_or(Vec3::Y),
            fov: setup.view_angle_deg.to_radians(),
            near: setup.near,
            far: setup.far,
        }
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix for a viewport with the given aspect ratio.
    #[must_use]
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect_ratio.max(1e-6), self.near, self.far)
    }

    /// Projection times view.
    #[must_use]
    pub fn view_projection(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    /// Returns the forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Returns the right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::X)
    }

    /// Distance from the camera to the focal point.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Rotates the camera about the focal point.
    ///
    /// `azimuth` turns about the view-up vector, `elevation` about the
    /// camera's right vector. Both in radians.
    pub fn orbit(&mut self, azimuth: f32, elevation: f32) {
        let offset = self.position - self.target;
        let yaw = Quat::from_axis_angle(self.up.normalize_or(Vec3::Y), -azimuth);
        let pitch = Quat::from_axis_angle(self.right(), -elevation);
        let rotation = yaw * pitch;

        let new_offset = rotation * offset;
        let new_up = (rotation * self.up).normalize_or(self.up);
        // Keep the up vector away from the view direction.
        if new_offset.normalize_or_zero().cross(new_up).length_squared() > 1e-6 {
            self.position = self.target + new_offset;
            self.up = new_up;
        }
    }

    /// Moves camera and focal point together, in view-plane units.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let right = self.right();
        let up = right.cross(self.forward());
        let offset = right * delta_x + up * delta_y;
        self.position += offset;
        self.target += offset;
    }

    /// Moves toward (positive) or away from (negative) the focal point by a
    /// fraction of the current distance.
    pub fn dolly(&mut self, factor: f32) {
        let distance = self.distance();
        let new_distance = (distance * (1.0 - factor)).max(self.near * 2.0);
        self.position = self.target - self.forward() * new_distance;
    }
}
