//! # Rendering
//!
//! Backend-agnostic skeleton rendering: the mesh batcher, the skeleton
//! renderer driving it, color compositing, bounds queries and the device
//! interface every side effect goes through.

pub mod batching;
pub mod bounds;
pub mod color;
pub mod device;
pub mod skeleton_renderer;

pub use batching::{BatchError, BatchResult, BatchStats, MeshBatcher, MeshItem, MeshVertex};
pub use bounds::{Bounds, Rectangle};
pub use color::composite_color;
pub use device::{
    BlendMode, CullMode, DeviceError, DeviceResult, DrawCall, Effect, EffectPass, GraphicsDevice,
    RasterizerState, RecordingDevice, TextureHandle, Viewport,
};
pub use skeleton_renderer::{FrameStats, SkeletonRenderer};

use crate::config::ConfigError;
use crate::skeleton::SkeletonError;

/// Errors that can occur while rendering skeletons
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A draw or end was issued outside a `begin`/`end` pair
    ///
    /// The renderer only accepts geometry while a frame is open, because the
    /// projection and pass state are set up by `begin`.
    #[error("Renderer used outside begin/end")]
    NotBegun,

    /// `begin` was called while a frame was already open
    #[error("Renderer frame already begun")]
    AlreadyBegun,

    /// The renderer configuration failed validation
    #[error("Invalid renderer configuration: {0}")]
    Config(#[from] ConfigError),

    /// The batcher could not hold or replay an item
    ///
    /// Raised when a single attachment exceeds the region capacity or its
    /// triangles reference vertices it does not own. Never recovered by
    /// truncating geometry.
    #[error("Batching failed: {0}")]
    Batch(#[from] BatchError),

    /// The graphics device rejected a pass or draw call
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Skeleton data is inconsistent (missing bone, bad mesh)
    #[error("Skeleton data error: {0}")]
    Skeleton(#[from] SkeletonError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
