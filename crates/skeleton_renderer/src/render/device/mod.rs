//! Graphics device abstraction
//!
//! Defines the interface between the skeleton renderer and a graphics backend.
//! Keeps batching and compositing independent of Vulkan/DirectX/OpenGL specifics:
//! every device side effect goes through [`GraphicsDevice`], and all blend and
//! rasterizer state travels explicitly inside an [`EffectPass`].

pub mod effect;
pub mod recording;
pub mod state;

pub use effect::{Effect, EffectPass};
pub use recording::{DeviceCommand, RecordedDraw, RecordingDevice};
pub use state::{BlendMode, CullMode, RasterizerState};

use crate::render::batching::MeshVertex;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors reported by a graphics device
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device could not record or submit a draw call
    #[error("Draw call failed: {0}")]
    DrawFailed(String),

    /// The device refused the pass state (blend, rasterizer, matrices)
    #[error("Pass state rejected: {0}")]
    StateRejected(String),
}

/// Handle to a texture owned by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle(pub u64);

/// Render target dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One indexed draw over a slice of a region's buffers
///
/// `vertices` and `indices` are the whole region buffers, so a backend can
/// upload them once and issue several draws against them. Index values are
/// already offset into `vertices`.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// Region vertex buffer
    pub vertices: &'a [MeshVertex],
    /// Region index buffer
    pub indices: &'a [u16],
    /// First index of this draw within `indices`
    pub first_index: usize,
    /// Number of indices drawn
    pub index_count: usize,
    /// Texture bound for this draw
    pub texture: TextureHandle,
}

impl<'a> DrawCall<'a> {
    /// Indices actually consumed by this draw
    pub fn index_slice(&self) -> &'a [u16] {
        let indices: &'a [u16] = self.indices;
        &indices[self.first_index..self.first_index + self.index_count]
    }

    /// Number of triangles drawn
    pub fn primitive_count(&self) -> usize {
        self.index_count / 3
    }
}

/// Backend-agnostic device interface used by the renderer
pub trait GraphicsDevice {
    /// Current render target size
    fn viewport(&self) -> Viewport;

    /// Set the device-wide blend state outside of any pass
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Apply a pass (blend, rasterizer, matrices) ahead of the next draw
    fn apply_pass(&mut self, pass: &EffectPass) -> DeviceResult<()>;

    /// Bind `call.texture` and draw the indexed triangle list
    fn draw_indexed(&mut self, call: &DrawCall<'_>) -> DeviceResult<()>;
}
