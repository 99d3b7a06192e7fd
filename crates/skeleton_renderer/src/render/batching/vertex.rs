//! Vertex type for batched skeleton geometry

/// Position, color and texture coordinate of one batched vertex
///
/// Layout matches a `PositionColorTexture` vertex declaration: 12 bytes of
/// position, 16 bytes of float RGBA, 8 bytes of UV.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// World-space position; z is always 0 for skeleton geometry
    pub position: [f32; 3],
    /// RGBA color, premultiplied or straight depending on the renderer mode
    pub color: [f32; 4],
    /// Texture coordinates
    pub uv: [f32; 2],
}

impl MeshVertex {
    /// Size of one vertex in bytes
    pub const STRIDE: usize = std::mem::size_of::<Self>();
}
