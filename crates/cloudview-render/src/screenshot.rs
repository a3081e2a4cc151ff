//! Writing captured frames to image files.

use image::{ImageBuffer, Rgba};
use std::path::Path;

/// Saves raw RGBA pixel data to an image file.
///
/// The format follows the file extension: `.png`, `.jpg`, or `.jpeg`.
/// Pixels are row-major from the top-left corner, 4 bytes each.
///
/// # Errors
/// Returns an error if the file cannot be written or format is unsupported.
pub fn save_image(
    path: impl AsRef<Path>,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, data.to_vec())
        .ok_or(ScreenshotError::InvalidImageData)?;

    match extension.as_str() {
        "png" => {
            img.save_with_format(path, image::ImageFormat::Png)?;
        }
        "jpg" | "jpeg" => {
            // JPEG has no alpha channel
            let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb_img.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => {
            return Err(ScreenshotError::UnsupportedFormat(extension));
        }
    }

    log::info!("screenshot saved to {}", path.display());
    Ok(())
}

/// Encodes raw RGBA pixel data as PNG in memory.
///
/// # Errors
/// Returns an error if the data does not match the dimensions.
pub fn save_to_buffer(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScreenshotError> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, data.to_vec())
        .ok_or(ScreenshotError::InvalidImageData)?;

    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;

    Ok(buffer.into_inner())
}

/// Error type for screenshot operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("Failed to save image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported image format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid image data")]
    InvalidImageData,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> Vec<u8> {
        (0..width * height)
            .flat_map(|i| {
                if i % 2 == 0 {
                    [255, 255, 255, 255]
                } else {
                    [255, 0, 0, 255]
                }
            })
            .collect()
    }

    #[test]
    fn test_png_buffer_has_signature() {
        let png = save_to_buffer(&checker(4, 3), 4, 3).unwrap();
        assert_eq!(&png[0..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_wrong_size_is_rejected() {
        let err = save_to_buffer(&[0; 10], 4, 3).unwrap_err();
        assert!(matches!(err, ScreenshotError::InvalidImageData));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = std::env::temp_dir().join("cloudview_screenshot_test.bmpx");
        let err = save_image(&path, &checker(2, 2), 2, 2).unwrap_err();
        assert!(matches!(err, ScreenshotError::UnsupportedFormat(ext) if ext == "bmpx"));
    }

    #[test]
    fn test_save_png_round_trip() {
        let path = std::env::temp_dir().join("cloudview_screenshot_test.png");
        save_image(&path, &checker(4, 4), 4, 4).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(1, 0).0, [255, 0, 0, 255]);

        let _ = std::fs::remove_file(&path);
    }
}
