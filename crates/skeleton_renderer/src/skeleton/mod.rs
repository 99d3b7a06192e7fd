//! # Skeleton Data Model
//!
//! Read-only view of a posed skeleton as the renderer consumes it: bones with
//! resolved world transforms, slots in draw order, and the attachment each slot
//! currently shows. Posing and animation happen elsewhere; this module only
//! stores their result and turns attachments into world-space vertices.

pub mod attachment;

pub use attachment::{
    Attachment, AtlasRegion, AttachmentKind, BoneWeight, MeshAttachment, RegionAttachment,
    SkinnedMeshAttachment, SkinnedVertex, QUAD_TRIANGLES,
};

use std::fmt;
use std::ops::Mul;

use crate::foundation::math::{Mat2, Vec2};

/// Result type for skeleton operations
pub type SkeletonResult<T> = Result<T, SkeletonError>;

/// Errors raised by malformed skeleton data
#[derive(Debug, thiserror::Error)]
pub enum SkeletonError {
    /// A slot or skinned vertex refers to a bone that does not exist
    #[error("Bone index {bone} out of range ({bones} bones)")]
    BoneOutOfRange {
        /// Requested bone
        bone: usize,
        /// Number of bones
        bones: usize,
    },

    /// The draw order refers to a slot that does not exist
    #[error("Slot index {slot} out of range ({slots} slots)")]
    SlotOutOfRange {
        /// Requested slot
        slot: usize,
        /// Number of slots
        slots: usize,
    },

    /// A world-vertex output buffer is too short
    #[error("World vertex buffer holds {available} floats, {required} required")]
    BufferTooSmall {
        /// Floats needed
        required: usize,
        /// Floats provided
        available: usize,
    },

    /// Mesh vertices, UVs and triangles disagree
    #[error("Invalid mesh '{name}': {reason}")]
    InvalidMesh {
        /// Attachment name
        name: String,
        /// What is inconsistent
        reason: String,
    },
}

/// RGBA tint with float channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white, the identity tint
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Create a color from channels
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as `[r, g, b, a]`
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b, self.a * rhs.a)
    }
}

/// Blend mode authored on a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotBlendMode {
    /// Regular alpha blending
    #[default]
    Normal,
    /// Additive blending
    Additive,
    /// Multiply; drawn with the renderer's default blend
    Multiply,
    /// Screen; drawn with the renderer's default blend
    Screen,
}

/// A bone with its resolved world transform
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Bone name
    pub name: String,
    /// Rotation, scale and shear in world space
    pub world_matrix: Mat2,
    /// World position of the bone origin
    pub world_position: Vec2,
}

impl Bone {
    /// Create a bone at the world origin with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            world_matrix: Mat2::identity(),
            world_position: Vec2::zeros(),
        }
    }

    /// Set the world transform from position, rotation (degrees) and scale
    pub fn with_world_transform(mut self, x: f32, y: f32, rotation: f32, scale_x: f32, scale_y: f32) -> Self {
        let (sin, cos) = rotation.to_radians().sin_cos();
        #[rustfmt::skip]
        let world_matrix = Mat2::new(
            cos * scale_x, -sin * scale_y,
            sin * scale_x, cos * scale_y,
        );
        self.world_matrix = world_matrix;
        self.world_position = Vec2::new(x, y);
        self
    }

    /// Set the raw world matrix and position
    pub fn with_world_matrix(mut self, world_matrix: Mat2, world_position: Vec2) -> Self {
        self.world_matrix = world_matrix;
        self.world_position = world_position;
        self
    }

    /// Transform a bone-local point to world space
    #[inline]
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let world = self.world_matrix * Vec2::new(x, y) + self.world_position;
        (world.x, world.y)
    }
}

/// A named attachment point with its tint and current attachment
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Slot name, used by bounding queries
    pub name: String,
    /// Index of the owning bone
    pub bone: usize,
    /// Slot tint
    pub color: Color,
    /// Authored blend mode
    pub blend_mode: SlotBlendMode,
    /// Attachment currently shown, if any
    pub attachment: Option<Attachment>,
    /// Deformed local vertices for mesh attachments; empty when not deformed
    pub deform: Vec<f32>,
}

impl Slot {
    /// Create an empty slot on `bone`
    pub fn new(name: impl Into<String>, bone: usize) -> Self {
        Self {
            name: name.into(),
            bone,
            color: Color::WHITE,
            blend_mode: SlotBlendMode::Normal,
            attachment: None,
            deform: Vec::new(),
        }
    }

    /// Set the attachment
    pub fn with_attachment(mut self, attachment: impl Into<Attachment>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }

    /// Set the tint
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the blend mode
    pub fn with_blend_mode(mut self, blend_mode: SlotBlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Set deformed vertices
    pub fn with_deform(mut self, deform: Vec<f32>) -> Self {
        self.deform = deform;
        self
    }

    /// Whether the slot asks for additive blending
    pub fn is_additive(&self) -> bool {
        self.blend_mode == SlotBlendMode::Additive
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Posed skeleton: bones, slots and the order slots are painted in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    bones: Vec<Bone>,
    slots: Vec<Slot>,
    draw_order: Vec<usize>,
    /// Skeleton-wide tint multiplied into every slot
    pub color: Color,
}

impl Skeleton {
    /// Create an empty skeleton
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone, returning its index
    pub fn add_bone(&mut self, bone: Bone) -> usize {
        self.bones.push(bone);
        self.bones.len() - 1
    }

    /// Add a slot at the front of the draw order, returning its index
    pub fn add_slot(&mut self, slot: Slot) -> SkeletonResult<usize> {
        if slot.bone >= self.bones.len() {
            return Err(SkeletonError::BoneOutOfRange {
                bone: slot.bone,
                bones: self.bones.len(),
            });
        }
        self.slots.push(slot);
        let index = self.slots.len() - 1;
        self.draw_order.push(index);
        Ok(index)
    }

    /// Bones in setup order
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Bone by index
    pub fn bone(&self, index: usize) -> SkeletonResult<&Bone> {
        self.bones.get(index).ok_or(SkeletonError::BoneOutOfRange {
            bone: index,
            bones: self.bones.len(),
        })
    }

    /// Mutable bone by index, for callers applying a new pose
    pub fn bone_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    /// Slots in setup order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Mutable slot by index
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    /// Index of the first slot named `name`
    pub fn find_slot(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }

    /// Slot indices back to front
    pub fn draw_order_indices(&self) -> &[usize] {
        &self.draw_order
    }

    /// Slots back to front
    pub fn draw_order(&self) -> impl Iterator<Item = &Slot> {
        self.draw_order.iter().map(|&index| &self.slots[index])
    }

    /// Replace the draw order
    pub fn set_draw_order(&mut self, draw_order: Vec<usize>) -> SkeletonResult<()> {
        if let Some(&slot) = draw_order.iter().find(|&&slot| slot >= self.slots.len()) {
            return Err(SkeletonError::SlotOutOfRange {
                slot,
                slots: self.slots.len(),
            });
        }
        self.draw_order = draw_order;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_multiplies_channelwise() {
        let color = Color::new(0.5, 1.0, 0.25, 0.8) * Color::new(0.5, 0.5, 1.0, 0.5);
        assert_eq!(color, Color::new(0.25, 0.5, 0.25, 0.4));
    }

    #[test]
    fn test_bone_world_transform() {
        let bone = Bone::new("root").with_world_transform(10.0, 20.0, 90.0, 2.0, 1.0);
        let (x, y) = bone.transform_point(1.0, 0.0);
        assert_relative_eq!(x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(y, 22.0, epsilon = 1e-5);
    }

    #[test]
    fn test_slot_requires_existing_bone() {
        let mut skeleton = Skeleton::new();
        let result = skeleton.add_slot(Slot::new("head", 0));
        assert!(matches!(result, Err(SkeletonError::BoneOutOfRange { bone: 0, bones: 0 })));
    }

    #[test]
    fn test_draw_order_follows_insertion_then_override() {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_bone(Bone::new("root"));
        skeleton.add_slot(Slot::new("a", root)).unwrap();
        skeleton.add_slot(Slot::new("b", root)).unwrap();
        skeleton.add_slot(Slot::new("c", root)).unwrap();

        let names: Vec<_> = skeleton.draw_order().map(ToString::to_string).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        skeleton.set_draw_order(vec![2, 0, 1]).unwrap();
        let names: Vec<_> = skeleton.draw_order().map(|slot| slot.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        assert!(skeleton.set_draw_order(vec![3]).is_err());
        assert_eq!(skeleton.find_slot("b"), Some(1));
    }
}
