//! Error types for cloudview.

use thiserror::Error;

/// The main error type for cloudview operations.
#[derive(Error, Debug)]
pub enum CloudviewError {
    /// No point clouds were supplied.
    #[error("at least one point cloud is required")]
    NoPointClouds,

    /// The point cloud list and the color list differ in length.
    #[error("number of point clouds ({points}) is different from number of color arrays ({colors})")]
    CloudCountMismatch { points: usize, colors: usize },

    /// A point cloud and its colors differ in row count.
    #[error("expected same number of points ({points}) as colors ({colors}), cloud index = {cloud}")]
    RowCountMismatch {
        cloud: usize,
        points: usize,
        colors: usize,
    },

    /// A point array is not N x 3.
    #[error("expected points to be N x 3, got N x {columns}, cloud index = {cloud}")]
    PointColumns { cloud: usize, columns: usize },

    /// A color array is not N x 3.
    #[error("expected colors to be N x 3, got N x {columns}, cloud index = {cloud}")]
    ColorColumns { cloud: usize, columns: usize },

    /// More labels than viewports.
    #[error("got {labels} labels for {clouds} point clouds")]
    TooManyLabels { labels: usize, clouds: usize },

    /// A viewport index does not exist in the scene.
    #[error("viewport {index} out of range (scene has {count})")]
    ViewportOutOfRange { index: usize, count: usize },

    /// Rendering or windowing failed.
    #[error("render error: {0}")]
    Render(String),

    /// Writing the screenshot failed.
    #[error("screenshot error: {0}")]
    Screenshot(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for cloudview operations.
pub type Result<T> = std::result::Result<T, CloudviewError>;
