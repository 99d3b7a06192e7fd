//! Batch rendering system
//!
//! Batches variable-size meshes into fixed-capacity regions for few draw calls.

pub mod mesh_batcher;
pub mod vertex;

// Re-export all batching types
pub use mesh_batcher::*;
pub use vertex::MeshVertex;
