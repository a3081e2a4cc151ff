//! Viewport labels, shaped and rasterized with glyphon.
//!
//! Labels are laid out in window pixels and clipped to their viewport, so
//! they are drawn in one batch after every viewport's geometry.

use cloudview_core::{PixelRect, TextActor};
use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};

use crate::engine::DEPTH_FORMAT;
use crate::error::{RenderError, RenderResult};

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.2;

/// Returns true if the system has at least one font glyphon can use.
#[must_use]
pub fn fonts_available() -> bool {
    !FontSystem::new().db().is_empty()
}

/// Top-left corner of a label's text, in window pixels.
///
/// The label's offset is measured from the viewport's lower-left corner to
/// the bottom of the last line.
#[must_use]
pub fn label_origin(label: &TextActor, rect: PixelRect) -> (f32, f32) {
    let lines = label.text.lines().count().max(1) as f32;
    let (left, up) = label.offset;
    let height = lines * label.font_size * LINE_HEIGHT;
    (
        rect.x as f32 + left,
        (rect.y + rect.height) as f32 - up - height,
    )
}

/// Clip rectangle of a viewport.
#[must_use]
pub fn label_bounds(rect: PixelRect) -> TextBounds {
    TextBounds {
        left: rect.x as i32,
        top: rect.y as i32,
        right: (rect.x + rect.width) as i32,
        bottom: (rect.y + rect.height) as i32,
    }
}

fn text_color(label: &TextActor) -> Color {
    let [r, g, b] = (label.color.clamp(glam::Vec3::ZERO, glam::Vec3::ONE) * 255.0)
        .round()
        .to_array();
    Color::rgb(r as u8, g as u8, b as u8)
}

/// A shaped label, reshaped only when its text or size changes.
struct ShapedLabel {
    text: String,
    font_size: f32,
    buffer: Buffer,
}

/// Draws the text labels of every viewport.
pub struct LabelRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    atlas: TextAtlas,
    renderer: TextRenderer,
    viewport: Viewport,
    shaped: Vec<ShapedLabel>,
}

impl LabelRenderer {
    /// Creates a label renderer for targets of `format` with the engine's
    /// depth attachment.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let font_system = FontSystem::new();
        if font_system.db().is_empty() {
            log::warn!("no system fonts found, labels will not be drawn");
        }

        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let renderer = TextRenderer::new(
            &mut atlas,
            device,
            wgpu::MultisampleState::default(),
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        );
        let viewport = Viewport::new(device, &cache);

        Self {
            font_system,
            swash_cache,
            atlas,
            renderer,
            viewport,
            shaped: Vec::new(),
        }
    }

    fn shape(&mut self, index: usize, label: &TextActor) {
        let current = self
            .shaped
            .get(index)
            .is_some_and(|s| s.text == label.text && s.font_size == label.font_size);
        if current {
            return;
        }

        let metrics = Metrics::new(label.font_size, label.font_size * LINE_HEIGHT);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(
            &mut self.font_system,
            &label.text,
            &Attrs::new().family(Family::SansSerif),
            Shaping::Advanced,
            None,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);

        let shaped = ShapedLabel {
            text: label.text.clone(),
            font_size: label.font_size,
            buffer,
        };
        if index < self.shaped.len() {
            self.shaped[index] = shaped;
        } else {
            self.shaped.push(shaped);
        }
    }

    /// Shapes and uploads the labels for one frame.
    ///
    /// `labels` pairs each viewport's label with its pixel rectangle, left
    /// to right. `width` and `height` are the render target's size.
    pub fn prepare<'a>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        labels: impl IntoIterator<Item = (&'a TextActor, PixelRect)>,
        width: u32,
        height: u32,
    ) -> RenderResult<()> {
        let labels: Vec<(&TextActor, PixelRect)> = labels.into_iter().collect();
        for (i, (label, _)) in labels.iter().enumerate() {
            self.shape(i, label);
        }
        self.shaped.truncate(labels.len());

        self.viewport.update(queue, Resolution { width, height });

        let areas: Vec<TextArea<'_>> = labels
            .iter()
            .zip(&self.shaped)
            .filter(|((label, rect), _)| !label.is_empty() && rect.width > 0 && rect.height > 0)
            .map(|((label, rect), shaped)| {
                let (left, top) = label_origin(label, *rect);
                TextArea {
                    buffer: &shaped.buffer,
                    left,
                    top,
                    scale: 1.0,
                    bounds: label_bounds(*rect),
                    default_color: text_color(label),
                    custom_glyphs: &[],
                }
            })
            .collect();

        self.renderer
            .prepare(
                device,
                queue,
                &mut self.font_system,
                &mut self.atlas,
                &self.viewport,
                areas,
                &mut self.swash_cache,
            )
            .map_err(|e| RenderError::Text(e.to_string()))
    }

    /// Draws the prepared labels.
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) -> RenderResult<()> {
        self.renderer
            .render(&self.atlas, &self.viewport, render_pass)
            .map_err(|e| RenderError::Text(e.to_string()))
    }

    /// Frees atlas space for glyphs not used in the last frame.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}
