//! # Skeleton Renderer
//!
//! Batched drawing of 2D skeletal animation attachments.
//!
//! ## Features
//!
//! - **Mesh Batching**: Variable-size textured items packed into fixed-capacity
//!   regions and replayed as one draw call per texture run
//! - **Skeleton Rendering**: Region, mesh and skinned-mesh attachments drawn in
//!   slot order with premultiplied or straight alpha
//! - **Bounds Queries**: Screen rectangles for a whole skeleton or a named slot
//! - **Device Agnostic**: Every GPU side effect goes through [`GraphicsDevice`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skeleton_renderer::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut skeleton = Skeleton::new();
//!     let root = skeleton.add_bone(Bone::new("root").with_world_transform(400.0, 300.0, 0.0, 1.0, 1.0));
//!     skeleton.add_slot(Slot::new("body", root).with_attachment(RegionAttachment::new("body", 64.0, 128.0)))?;
//!
//!     let mut device = RecordingDevice::new(800, 600);
//!     let mut renderer = SkeletonRenderer::new(RendererConfig::default())?;
//!     renderer.begin(&device)?;
//!     renderer.draw(&mut device, &skeleton)?;
//!     renderer.end(&mut device)?;
//!     Ok(())
//! }
//! ```
//!
//! [`GraphicsDevice`]: render::device::GraphicsDevice

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod skeleton;

/// Common imports for renderer users
pub mod prelude {
    pub use crate::{
        config::{BatcherConfig, Config, ConfigError, RendererConfig},
        foundation::math::{Mat2, Mat4, Vec2},
        render::{
            BatchError, BlendMode, Effect, EffectPass, GraphicsDevice, MeshBatcher, RasterizerState,
            Rectangle, RecordingDevice, RenderError, RenderResult, SkeletonRenderer, TextureHandle,
        },
        skeleton::{
            AtlasRegion, Attachment, Bone, BoneWeight, Color, MeshAttachment, RegionAttachment, Skeleton,
            SkeletonError, SkinnedMeshAttachment, SkinnedVertex, Slot, SlotBlendMode,
        },
    };
}
