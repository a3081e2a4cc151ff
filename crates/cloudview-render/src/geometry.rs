//! GPU vertex types and their construction from scene actors.

use bytemuck::{Pod, Zeroable};
use cloudview_core::{AxesActor, CloudActor, ColorMode, PixelRect, RingActor, Vec3, ViewportScene};
use glam::Mat4;

use crate::color_maps::ColorMapRegistry;

/// A world-space vertex with a linear RGBA color.
///
/// Also used per instance for points, where each instance expands to a
/// screen-aligned square.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColorVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    /// Layout for vertex buffers of this type.
    #[must_use]
    pub fn layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            color: color.extend(1.0).to_array(),
        }
    }
}

/// Per-viewport uniforms (matches `ViewUniforms` in scene.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct ViewUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub viewport_size: [f32; 2],
    pub point_size: f32,
    pub _pad: f32,
}

impl ViewUniforms {
    #[must_use]
    pub fn new(view_proj: Mat4, rect: PixelRect, point_size: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            viewport_size: [rect.width as f32, rect.height as f32],
            point_size,
            _pad: 0.0,
        }
    }
}

/// Converts an sRGB-encoded channel to linear.
#[must_use]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_color(rgb: Vec3) -> Vec3 {
    Vec3::new(
        srgb_to_linear(rgb.x),
        srgb_to_linear(rgb.y),
        srgb_to_linear(rgb.z),
    )
}

fn linear_from_bytes([r, g, b]: [u8; 3]) -> Vec3 {
    linear_color(Vec3::new(r.into(), g.into(), b.into()) / 255.0)
}

/// One instance per point, colored by the actor's color mode.
#[must_use]
pub fn cloud_instances(cloud: &CloudActor, color_maps: &ColorMapRegistry) -> Vec<ColorVertex> {
    let buffer = cloud.buffer();
    match &cloud.color_mode {
        ColorMode::Rgb => buffer
            .positions()
            .iter()
            .zip(buffer.colors())
            .map(|(&p, &c)| ColorVertex::new(p, linear_from_bytes(c)))
            .collect(),
        ColorMode::Depth { color_map } => {
            let Some(map) = color_maps.get_or_fallback(color_map) else {
                return Vec::new();
            };
            let (lo, hi) = buffer.depth_range().unwrap_or((0.0, 0.0));
            buffer
                .positions()
                .iter()
                .zip(buffer.depths())
                .map(|(&p, &d)| ColorVertex::new(p, linear_color(map.map_range(d, lo, hi))))
                .collect()
        }
    }
}

/// Triangle list for a set of rings.
#[must_use]
pub fn ring_vertices(rings: &[RingActor]) -> Vec<ColorVertex> {
    rings
        .iter()
        .flat_map(|ring| {
            let color = linear_color(ring.color);
            ring.triangles()
                .into_iter()
                .map(move |p| ColorVertex::new(p, color))
        })
        .collect()
}

/// Line list for the axes.
#[must_use]
pub fn axes_vertices(axes: &AxesActor) -> Vec<ColorVertex> {
    axes.lines()
        .iter()
        .flat_map(|&(start, end, color)| {
            let color = linear_color(color);
            [ColorVertex::new(start, color), ColorVertex::new(end, color)]
        })
        .collect()
}

/// Splits point instances into runs that each fit in one vertex buffer of
/// at most `max_buffer_size` bytes.
pub fn instance_chunks(
    instances: &[ColorVertex],
    max_buffer_size: u64,
) -> std::slice::Chunks<'_, ColorVertex> {
    let stride = std::mem::size_of::<ColorVertex>() as u64;
    let per_chunk = (max_buffer_size / stride).clamp(1, u64::from(u32::MAX));
    instances.chunks(usize::try_from(per_chunk).unwrap_or(usize::MAX))
}

/// The world-space geometry of one viewport, ready for upload.
#[derive(Debug, Clone, Default)]
pub struct ViewportGeometry {
    pub points: Vec<ColorVertex>,
    pub triangles: Vec<ColorVertex>,
    pub lines: Vec<ColorVertex>,
}

impl ViewportGeometry {
    /// Collects every world-space actor of a viewport.
    #[must_use]
    pub fn build(viewport: &ViewportScene, color_maps: &ColorMapRegistry) -> Self {
        Self {
            points: cloud_instances(&viewport.cloud, color_maps),
            triangles: ring_vertices(&viewport.rings),
            lines: viewport.axes.as_ref().map(axes_vertices).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudview_core::{PointBuffer, TextActor};
    use proptest::prelude::*;

    fn cloud(points: &[(Vec3, [u8; 3])]) -> CloudActor {
        let mut buffer = PointBuffer::new(16);
        for &(p, c) in points {
            buffer.add_point(p, c);
        }
        CloudActor::new(buffer, 4.0)
    }

    #[test]
    fn test_uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<ViewUniforms>(), 80);
        assert_eq!(std::mem::size_of::<ColorVertex>(), 28);
    }

    #[test]
    fn test_srgb_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214).abs() < 1e-3);
    }

    #[test]
    fn test_rgb_instances_keep_order() {
        let actor = cloud(&[
            (Vec3::new(1.0, 2.0, 3.0), [255, 0, 0]),
            (Vec3::new(4.0, 5.0, 6.0), [0, 0, 255]),
        ]);
        let instances = cloud_instances(&actor, &ColorMapRegistry::new());
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(instances[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(instances[1].color, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_depth_mode_spans_color_map() {
        let actor = cloud(&[
            (Vec3::new(0.0, 0.0, -1.0), [0, 0, 0]),
            (Vec3::new(0.0, 0.0, 1.0), [0, 0, 0]),
        ])
        .with_color_mode(ColorMode::Depth {
            color_map: "rainbow".into(),
        });
        let instances = cloud_instances(&actor, &ColorMapRegistry::new());
        assert_eq!(instances[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(instances[1].color, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_viewport_geometry_counts() {
        let viewport = ViewportScene {
            viewport: cloudview_core::Viewport::FULL,
            cloud: cloud(&[(Vec3::ZERO, [10, 20, 30])]),
            rings: RingActor::reference_pair().to_vec(),
            axes: Some(AxesActor::default()),
            label: TextActor::new("", 22.0, Vec3::ZERO),
        };
        let geometry = ViewportGeometry::build(&viewport, &ColorMapRegistry::new());
        assert_eq!(geometry.points.len(), 1);
        assert_eq!(geometry.triangles.len(), 2 * 100 * 6);
        assert_eq!(geometry.lines.len(), 6);
    }

    #[test]
    fn test_large_clouds_split_at_buffer_limit() {
        let limit = 28 * 1000 + 20;
        let per_chunk = 1000;
        let instances = vec![ColorVertex::new(Vec3::ZERO, Vec3::ONE); per_chunk + 5];

        let chunks: Vec<_> = instance_chunks(&instances, limit).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), per_chunk);
        assert_eq!(chunks[1].len(), 5);
        assert!(chunks[0].len() as u64 * 28 <= limit);
    }

    #[test]
    fn test_tiny_limit_still_makes_progress() {
        let instances = vec![ColorVertex::new(Vec3::ZERO, Vec3::ONE); 3];
        assert_eq!(instance_chunks(&instances, 1).count(), 3);
        assert_eq!(instance_chunks(&[], 1024).count(), 0);
    }

    proptest! {
        #[test]
        fn prop_chunks_cover_cloud_within_limit(count in 0usize..500, limit in 28u64..4096) {
            let instances = vec![ColorVertex::new(Vec3::ZERO, Vec3::ONE); count];
            let mut total = 0;
            for chunk in instance_chunks(&instances, limit) {
                prop_assert!(chunk.len() as u64 * 28 <= limit);
                total += chunk.len();
            }
            prop_assert_eq!(total, count);
        }
    }
}
