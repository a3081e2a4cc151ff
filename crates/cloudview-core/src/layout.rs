//! Viewport layout.

use serde::{Deserialize, Serialize};

/// A viewport in normalized window coordinates, origin at the lower left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

/// A viewport in pixels, origin at the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// The whole window.
    pub const FULL: Self = Self {
        x_min: 0.0,
        y_min: 0.0,
        x_max: 1.0,
        y_max: 1.0,
    };

    /// Converts to a pixel rectangle for a window of the given size.
    ///
    /// Edges are rounded so that adjacent viewports share a boundary without
    /// gaps or overlap. Empty rectangles are widened to one pixel.
    #[must_use]
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let (w, h) = (width as f32, height as f32);
        let left = (self.x_min * w).round() as u32;
        let right = (self.x_max * w).round() as u32;
        // Flip y: normalized coordinates grow upward, pixels grow downward.
        let top = ((1.0 - self.y_max) * h).round() as u32;
        let bottom = ((1.0 - self.y_min) * h).round() as u32;

        let x = left.min(width.saturating_sub(1));
        let y = top.min(height.saturating_sub(1));
        PixelRect {
            x,
            y,
            width: right.saturating_sub(x).max(1).min(width - x),
            height: bottom.saturating_sub(y).max(1).min(height - y),
        }
    }
}

impl PixelRect {
    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Returns true if the pixel lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= f64::from(self.x)
            && py >= f64::from(self.y)
            && px < f64::from(self.x + self.width)
            && py < f64::from(self.y + self.height)
    }
}

/// Splits the window into `count` full-height columns, left to right.
#[must_use]
pub fn tile_horizontal(count: usize) -> Vec<Viewport> {
    let step = 1.0 / count.max(1) as f32;
    (0..count)
        .map(|i| Viewport {
            x_min: i as f32 * step,
            y_min: 0.0,
            x_max: if i + 1 == count {
                1.0
            } else {
                (i + 1) as f32 * step
            },
            y_max: 1.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_viewport_is_full_window() {
        assert_eq!(tile_horizontal(1), vec![Viewport::FULL]);
    }

    #[test]
    fn test_tiles_cover_unit_interval() {
        let tiles = tile_horizontal(3);
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[0].x_min, 0.0);
        assert_eq!(tiles[2].x_max, 1.0);
        for pair in tiles.windows(2) {
            assert_eq!(pair[0].x_max, pair[1].x_min);
        }
        for tile in &tiles {
            assert_eq!(tile.y_min, 0.0);
            assert_eq!(tile.y_max, 1.0);
            assert!((tile.x_max - tile.x_min - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_tiles() {
        assert!(tile_horizontal(0).is_empty());
    }

    #[test]
    fn test_pixel_rects_abut() {
        let rects: Vec<PixelRect> = tile_horizontal(3)
            .iter()
            .map(|v| v.to_pixels(1800, 600))
            .collect();
        assert_eq!(
            rects[0],
            PixelRect {
                x: 0,
                y: 0,
                width: 600,
                height: 600
            }
        );
        assert_eq!(rects[1].x, 600);
        assert_eq!(rects[2].x + rects[2].width, 1800);
        assert_eq!(rects[1].aspect_ratio(), 1.0);
    }

    #[test]
    fn test_pixel_rect_flips_y() {
        let lower_half = Viewport {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 1.0,
            y_max: 0.5,
        };
        let rect = lower_half.to_pixels(100, 100);
        assert_eq!(rect.y, 50);
        assert_eq!(rect.height, 50);
        assert!(rect.contains(10.0, 75.0));
        assert!(!rect.contains(10.0, 25.0));
    }
}
