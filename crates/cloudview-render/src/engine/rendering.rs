use pollster::FutureExt;
use wgpu::util::DeviceExt;

use cloudview_core::{PixelRect, Scene};

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::geometry::{instance_chunks, srgb_to_linear, ColorVertex, ViewUniforms, ViewportGeometry};

use super::{RenderEngine, ViewportResources};

impl RenderEngine {
    /// Uploads scene geometry if the scene changed since the last upload.
    ///
    /// Allocation and validation failures during upload are returned as
    /// [`RenderError::Allocation`].
    fn prepare_geometry(&mut self, scene: &Scene) -> RenderResult<()> {
        let up_to_date = self.geometry_revision == Some(scene.revision())
            && self.viewports.len() == scene.len();
        if up_to_date {
            return Ok(());
        }

        let validation_scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let out_of_memory_scope = self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let viewports: Vec<ViewportResources> = scene
            .viewports()
            .iter()
            .enumerate()
            .map(|(i, viewport)| {
                let geometry = ViewportGeometry::build(viewport, &self.color_maps);
                self.create_viewport_resources(i, &geometry)
            })
            .collect();
        let out_of_memory = out_of_memory_scope.pop().block_on();
        let invalid = validation_scope.pop().block_on();
        if let Some(e) = out_of_memory.or(invalid) {
            self.viewports.clear();
            self.geometry_revision = None;
            return Err(RenderError::Allocation(e.to_string()));
        }

        self.viewports = viewports;
        self.geometry_revision = Some(scene.revision());

        log::debug!(
            "uploaded geometry for {} viewport(s) at revision {}",
            self.viewports.len(),
            scene.revision()
        );
        Ok(())
    }

    fn create_viewport_resources(
        &self,
        index: usize,
        geometry: &ViewportGeometry,
    ) -> ViewportResources {
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("viewport {index} uniforms")),
            size: std::mem::size_of::<ViewUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("viewport {index} bind group")),
            layout: &self.pipelines.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let upload = |label: &str, vertices: &[ColorVertex]| {
            if vertices.is_empty() {
                return None;
            }
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("viewport {index} {label}")),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            Some((buffer, vertices.len() as u32))
        };

        let max_buffer_size = self.device.limits().max_buffer_size;
        let points: Vec<(wgpu::Buffer, u32)> = instance_chunks(&geometry.points, max_buffer_size)
            .enumerate()
            .filter_map(|(chunk, instances)| upload(&format!("points {chunk}"), instances))
            .collect();
        if points.len() > 1 {
            log::debug!(
                "viewport {index}: {} points in {} buffers",
                geometry.points.len(),
                points.len()
            );
        }

        ViewportResources {
            points,
            triangles: upload("triangles", &geometry.triangles),
            lines: upload("lines", &geometry.lines),
            uniform_buffer,
            bind_group,
        }
    }

    fn viewport_rects(&self, scene: &Scene) -> Vec<PixelRect> {
        scene
            .viewports()
            .iter()
            .map(|v| v.viewport.to_pixels(self.width, self.height))
            .collect()
    }

    /// Records the draw commands for the whole scene into `view`.
    fn encode_scene(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &Camera,
    ) -> RenderResult<()> {
        self.prepare_geometry(scene)?;

        let rects = self.viewport_rects(scene);
        for ((resources, viewport), rect) in self.viewports.iter().zip(scene.viewports()).zip(&rects) {
            let uniforms = ViewUniforms::new(
                camera.view_projection(rect.aspect_ratio()),
                *rect,
                viewport.cloud.point_size,
            );
            self.queue.write_buffer(
                &resources.uniform_buffer,
                0,
                bytemuck::cast_slice(&[uniforms]),
            );
        }

        self.labels.prepare(
            &self.device,
            &self.queue,
            scene.viewports().iter().map(|v| &v.label).zip(rects.iter().copied()),
            self.width,
            self.height,
        )?;

        let background = scene.background();
        let clear_color = wgpu::Color {
            r: f64::from(srgb_to_linear(background.x)),
            g: f64::from(srgb_to_linear(background.y)),
            b: f64::from(srgb_to_linear(background.z)),
            a: 1.0,
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        for (resources, rect) in self.viewports.iter().zip(&rects) {
            if rect.width == 0 || rect.height == 0 {
                continue;
            }
            render_pass.set_viewport(
                rect.x as f32,
                rect.y as f32,
                rect.width as f32,
                rect.height as f32,
                0.0,
                1.0,
            );
            render_pass.set_scissor_rect(rect.x, rect.y, rect.width, rect.height);
            render_pass.set_bind_group(0, &resources.bind_group, &[]);

            if let Some((buffer, count)) = &resources.triangles {
                render_pass.set_pipeline(&self.pipelines.triangles);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..*count, 0..1);
            }
            if let Some((buffer, count)) = &resources.lines {
                render_pass.set_pipeline(&self.pipelines.lines);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..*count, 0..1);
            }
            if !resources.points.is_empty() {
                render_pass.set_pipeline(&self.pipelines.points);
            }
            for (buffer, count) in &resources.points {
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..6, 0..*count);
            }
        }

        // Labels are placed in window pixels and clipped by their bounds.
        render_pass.set_viewport(0.0, 0.0, self.width as f32, self.height as f32, 0.0, 1.0);
        render_pass.set_scissor_rect(0, 0, self.width, self.height);
        self.labels.render(&mut render_pass)
    }

    /// Renders one frame to the window surface and presents it.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame(&mut self, scene: &Scene, camera: &Camera) -> RenderResult<()> {
        let surface = self.surface.as_ref().ok_or(RenderError::NoSurface)?;
        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.resize(self.width, self.height);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        self.encode_scene(&mut encoder, &view, scene, camera)?;

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.labels.trim();
        Ok(())
    }

    /// Renders the scene offscreen and returns RGBA pixels, row-major from
    /// the top-left corner.
    ///
    /// Windowed engines render to a texture in the surface format, so the
    /// capture matches what the window shows.
    pub fn render_to_image(&mut self, scene: &Scene, camera: &Camera) -> RenderResult<Vec<u8>> {
        let (texture, view) = match self.offscreen.take() {
            Some(target) => target,
            None => Self::create_offscreen_texture(
                &self.device,
                self.width,
                self.height,
                self.surface_config.format,
            ),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("offscreen encoder"),
            });

        let pixels = match self.encode_scene(&mut encoder, &view, scene, camera) {
            Ok(()) => {
                self.queue.submit(std::iter::once(encoder.finish()));
                self.labels.trim();
                self.read_texture(&texture)
            }
            Err(e) => Err(e),
        };
        self.offscreen = Some((texture, view));
        pixels
    }
}
