//! Rendering backend for cloudview.
//!
//! This crate provides the wgpu-based rendering engine, including:
//! - the shared perspective [`Camera`] and its trackball motions
//! - vertex building for clouds, rings, and axes
//! - viewport labels drawn with glyphon
//! - per-viewport drawing to a window surface or an offscreen texture
//! - image readback and screenshot encoding

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod camera;
pub mod color_maps;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod labels;
pub mod screenshot;

pub use camera::Camera;
pub use color_maps::{ColorMap, ColorMapRegistry};
pub use engine::{RenderEngine, DEPTH_FORMAT, OFFSCREEN_FORMAT};
pub use error::{RenderError, RenderResult};
pub use geometry::{ColorVertex, ViewUniforms, ViewportGeometry};
pub use labels::{fonts_available, LabelRenderer};
pub use screenshot::{save_image, save_to_buffer, ScreenshotError};
