use crate::error::{RenderError, RenderResult};

use super::RenderEngine;

impl RenderEngine {
    /// Rows in a texture-to-buffer copy must be padded to this alignment.
    pub(crate) fn aligned_bytes_per_row(width: u32) -> u32 {
        let bytes_per_pixel = 4u32;
        let unaligned = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        unaligned.div_ceil(align) * align
    }

    /// Copies a 4-byte-per-pixel texture to the CPU as tightly packed RGBA.
    pub(crate) fn read_texture(&self, texture: &wgpu::Texture) -> RenderResult<Vec<u8>> {
        let (width, height) = (texture.width(), texture.height());
        let bytes_per_row = Self::aligned_bytes_per_row(width);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback buffer"),
            size: u64::from(bytes_per_row * height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback copy encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::PollType::wait_indefinitely())?;
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        // Copy data, removing row padding
        let data = buffer_slice.get_mapped_range();
        let row_bytes = (width * 4) as usize;
        let mut result = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height {
            let start = (row * bytes_per_row) as usize;
            result.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        buffer.unmap();

        if matches!(
            texture.format(),
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            swap_red_blue(&mut result);
        }

        Ok(result)
    }
}

fn swap_red_blue(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_padded_to_copy_alignment() {
        assert_eq!(RenderEngine::aligned_bytes_per_row(64), 256);
        assert_eq!(RenderEngine::aligned_bytes_per_row(65), 512);
        assert_eq!(RenderEngine::aligned_bytes_per_row(1), 256);
    }

    #[test]
    fn test_swap_red_blue() {
        let mut pixels = vec![1, 2, 3, 4, 5, 6, 7, 8];
        swap_red_blue(&mut pixels);
        assert_eq!(pixels, vec![3, 2, 1, 4, 7, 6, 5, 8]);
    }
}
