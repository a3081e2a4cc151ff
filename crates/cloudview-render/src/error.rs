//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface reports no usable format.
    #[error("surface configuration failed")]
    SurfaceConfigurationFailed,

    /// Acquiring the next surface texture failed.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// The engine has no surface to present to.
    #[error("engine has no surface")]
    NoSurface,

    /// Mapping the readback buffer failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    /// Waiting on the device failed.
    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    /// The device rejected an allocation, e.g. out of memory.
    #[error("GPU allocation failed: {0}")]
    Allocation(String),

    /// Preparing or drawing label text failed.
    #[error("text rendering failed: {0}")]
    Text(String),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_errors_convert() {
        let err = RenderError::from(wgpu::PollError::Timeout);
        assert!(matches!(err, RenderError::Poll(_)));
        assert!(err.to_string().starts_with("device poll failed"));
    }
}
