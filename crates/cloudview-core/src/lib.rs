//! Core scene model for cloudview.
//!
//! This crate holds everything that does not touch the GPU:
//! - [`PointBuffer`], a fixed-capacity point/color/depth store with an
//!   explicit [`EvictionPolicy`]
//! - input validation for N x 3 point and color arrays
//! - the left-to-right viewport layout
//! - actors (clouds, reference rings, axes, labels) and the [`Scene`] that owns them
//! - [`KeyHandler`]s that mutate the scene in response to key presses
//! - [`DisplayOptions`], the serde-backed configuration of a display session

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Pixel math converts between float and integer coordinates throughout
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod actor;
pub mod buffer;
pub mod error;
pub mod input;
pub mod interaction;
pub mod layout;
pub mod options;
pub mod scene;

pub use actor::{AxesActor, CloudActor, RingActor, TextActor};
pub use buffer::{EvictionPolicy, PointBuffer, DEFAULT_MAX_POINTS};
pub use error::{CloudviewError, Result};
pub use input::{buffer_from_arrays, centroid, validate_clouds};
pub use interaction::{KeyHandler, KeyHandlers, KeyResponse, PointSizeHandler};
pub use layout::{tile_horizontal, PixelRect, Viewport};
pub use options::{
    BufferOptions, CameraSetup, ColorMode, DisplayOptions, FocalPoint, OverlayOptions,
};
pub use scene::{Scene, ViewportScene};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
