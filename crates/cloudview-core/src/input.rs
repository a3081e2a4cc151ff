//! Validation and conversion of raw point/color arrays.

use glam::Vec3;
use ndarray::{Array2, ArrayView2, Axis};

use crate::buffer::PointBuffer;
use crate::error::{CloudviewError, Result};
use crate::options::BufferOptions;

/// Checks that points and colors describe well-formed clouds.
///
/// Every cloud needs a color array with the same number of rows, and both
/// arrays must have exactly three columns. Labels may be fewer than clouds
/// but not more.
pub fn validate_clouds(
    points: &[Array2<f32>],
    colors: &[Array2<u8>],
    labels: &[String],
) -> Result<()> {
    if points.len() != colors.len() {
        return Err(CloudviewError::CloudCountMismatch {
            points: points.len(),
            colors: colors.len(),
        });
    }
    if points.is_empty() {
        return Err(CloudviewError::NoPointClouds);
    }
    if labels.len() > points.len() {
        return Err(CloudviewError::TooManyLabels {
            labels: labels.len(),
            clouds: points.len(),
        });
    }

    for (cloud, (pc, co)) in points.iter().zip(colors).enumerate() {
        if pc.nrows() != co.nrows() {
            return Err(CloudviewError::RowCountMismatch {
                cloud,
                points: pc.nrows(),
                colors: co.nrows(),
            });
        }
        if pc.ncols() != 3 {
            return Err(CloudviewError::PointColumns {
                cloud,
                columns: pc.ncols(),
            });
        }
        if co.ncols() != 3 {
            return Err(CloudviewError::ColorColumns {
                cloud,
                columns: co.ncols(),
            });
        }
    }
    Ok(())
}

/// Fills a new buffer row by row from validated arrays.
#[must_use]
pub fn buffer_from_arrays(
    points: ArrayView2<'_, f32>,
    colors: ArrayView2<'_, u8>,
    options: &BufferOptions,
) -> PointBuffer {
    let mut buffer = PointBuffer::with_policy(options.max_points, options.eviction);
    for (p, c) in points.rows().into_iter().zip(colors.rows()) {
        buffer.add_point(Vec3::new(p[0], p[1], p[2]), [c[0], c[1], c[2]]);
    }
    log::debug!("filled point buffer with {} points", buffer.len());
    buffer
}

/// Column-wise mean of an N x 3 array, or `None` for zero rows.
#[must_use]
pub fn centroid(points: ArrayView2<'_, f32>) -> Option<Vec3> {
    let mean = points.mean_axis(Axis(0))?;
    Some(Vec3::new(mean[0], mean[1], mean[2]))
}
