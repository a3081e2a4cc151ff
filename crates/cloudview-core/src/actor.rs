//! Renderable scene objects.

use glam::{Quat, Vec3};

use crate::buffer::PointBuffer;
use crate::options::ColorMode;

/// A point cloud with its visual mapping.
#[derive(Debug, Clone)]
pub struct CloudActor {
    buffer: PointBuffer,
    /// Point size in pixels.
    pub point_size: f32,
    /// How points are colored.
    pub color_mode: ColorMode,
}

impl CloudActor {
    /// Point size of a standalone actor.
    pub const DEFAULT_POINT_SIZE: f32 = 18.0;

    /// Wraps a filled buffer.
    #[must_use]
    pub fn new(buffer: PointBuffer, point_size: f32) -> Self {
        Self {
            buffer,
            point_size,
            color_mode: ColorMode::Rgb,
        }
    }

    /// Sets the color mode.
    #[must_use]
    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    /// The underlying points.
    #[must_use]
    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    /// Mutable access to the underlying points.
    pub fn buffer_mut(&mut self) -> &mut PointBuffer {
        &mut self.buffer
    }
}

impl From<PointBuffer> for CloudActor {
    fn from(buffer: PointBuffer) -> Self {
        Self::new(buffer, Self::DEFAULT_POINT_SIZE)
    }
}

/// A flat annulus, used as a distance reference.
#[derive(Debug, Clone, PartialEq)]
pub struct RingActor {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub color: Vec3,
    /// Number of segments around the circle.
    pub resolution: u32,
    /// Applied to the ring, which is built in the XY plane.
    pub rotation: Quat,
}

impl RingActor {
    /// A ring in the XZ plane (the XY disk rotated 90 degrees about X).
    #[must_use]
    pub fn horizontal(inner_radius: f32, outer_radius: f32, color: Vec3) -> Self {
        Self {
            inner_radius,
            outer_radius,
            color,
            resolution: 100,
            rotation: Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        }
    }

    /// The two reference rings drawn in the first viewport.
    #[must_use]
    pub fn reference_pair() -> [Self; 2] {
        [
            Self::horizontal(100.0, 99.0, Vec3::new(1.0, 0.0, 0.0)),
            Self::horizontal(50.0, 49.0, Vec3::new(0.0, 1.0, 0.0)),
        ]
    }

    /// Triangulates the ring into a triangle list.
    ///
    /// Inner and outer radius may be given in either order.
    #[must_use]
    pub fn triangles(&self) -> Vec<Vec3> {
        let segments = self.resolution.max(3);
        let (r0, r1) = (self.inner_radius, self.outer_radius);
        let point = |i: u32, r: f32| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            self.rotation * Vec3::new(r * angle.cos(), r * angle.sin(), 0.0)
        };

        let mut triangles = Vec::with_capacity(segments as usize * 6);
        for i in 0..segments {
            let j = (i + 1) % segments;
            let (a, b) = (point(i, r0), point(i, r1));
            let (c, d) = (point(j, r0), point(j, r1));
            triangles.extend_from_slice(&[a, b, d, a, d, c]);
        }
        triangles
    }
}

/// Colored X/Y/Z axis lines from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesActor {
    pub length: f32,
}

impl Default for AxesActor {
    fn default() -> Self {
        Self { length: 1.0 }
    }
}

impl AxesActor {
    /// Line segments as (start, end, color): X red, Y green, Z blue.
    #[must_use]
    pub fn lines(&self) -> [(Vec3, Vec3, Vec3); 3] {
        [
            (Vec3::ZERO, Vec3::X * self.length, Vec3::X),
            (Vec3::ZERO, Vec3::Y * self.length, Vec3::Y),
            (Vec3::ZERO, Vec3::Z * self.length, Vec3::Z),
        ]
    }
}

/// A 2D text label anchored to a viewport's lower-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextActor {
    pub text: String,
    /// Font size in pixels.
    pub font_size: f32,
    pub color: Vec3,
    /// Offset from the viewport's lower-left corner, in pixels.
    pub offset: (f32, f32),
}

impl TextActor {
    /// Creates a label with the given size and color.
    #[must_use]
    pub fn new(text: impl Into<String>, font_size: f32, color: Vec3) -> Self {
        Self {
            text: text.into(),
            font_size,
            color,
            offset: (4.0, 4.0),
        }
    }

    /// Returns true if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_lies_in_xz_plane() {
        let ring = RingActor::horizontal(100.0, 99.0, Vec3::X);
        let triangles = ring.triangles();
        assert_eq!(triangles.len(), 100 * 6);
        for v in &triangles {
            assert!(v.y.abs() < 1e-3, "vertex {v} is off the XZ plane");
            let r = Vec3::new(v.x, 0.0, v.z).length();
            assert!((99.0 - 1e-3..=100.0 + 1e-3).contains(&r));
        }
    }

    #[test]
    fn test_reference_pair() {
        let [outer, inner] = RingActor::reference_pair();
        assert_eq!(outer.color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(inner.color, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(inner.inner_radius, 50.0);
        assert_eq!(inner.outer_radius, 49.0);
    }

    #[test]
    fn test_axes_colors_match_axes() {
        for (start, end, color) in AxesActor::default().lines() {
            assert_eq!(start, Vec3::ZERO);
            assert_eq!(end, color);
        }
    }

    #[test]
    fn test_blank_label_is_empty() {
        assert!(TextActor::new("  ", 22.0, Vec3::ZERO).is_empty());
        assert!(!TextActor::new("scan 1", 22.0, Vec3::ZERO).is_empty());
    }

    #[test]
    fn test_actor_from_buffer_uses_default_size() {
        let actor = CloudActor::from(PointBuffer::new(4));
        assert_eq!(actor.point_size, 18.0);
        assert_eq!(actor.color_mode, ColorMode::Rgb);
    }
}
