//! Attachments: the drawable geometry hung on a slot
//!
//! Every attachment carries a tint, a texture handle, UVs and triangles, and
//! writes its world-space positions as interleaved `x, y` floats into a caller
//! buffer via [`Attachment::compute_world_vertices`].

use super::{Bone, Color, Skeleton, SkeletonError, SkeletonResult, Slot};
use crate::render::device::TextureHandle;

/// Triangles of a region quad in TL, TR, BL, BR vertex order
pub const QUAD_TRIANGLES: [u16; 6] = [0, 1, 2, 1, 3, 2];

/// Discriminant of [`Attachment`], handy for logging and stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    /// Textured quad
    Region,
    /// Free-form mesh bound to one bone
    Mesh,
    /// Mesh whose vertices are weighted over several bones
    SkinnedMesh,
}

/// Drawable content of a slot
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// Textured quad
    Region(RegionAttachment),
    /// Free-form mesh bound to the slot's bone
    Mesh(MeshAttachment),
    /// Mesh weighted over several bones
    SkinnedMesh(SkinnedMeshAttachment),
}

impl Attachment {
    /// Attachment name
    pub fn name(&self) -> &str {
        match self {
            Attachment::Region(region) => &region.name,
            Attachment::Mesh(mesh) => &mesh.name,
            Attachment::SkinnedMesh(mesh) => &mesh.name,
        }
    }

    /// Which variant this is
    pub fn kind(&self) -> AttachmentKind {
        match self {
            Attachment::Region(_) => AttachmentKind::Region,
            Attachment::Mesh(_) => AttachmentKind::Mesh,
            Attachment::SkinnedMesh(_) => AttachmentKind::SkinnedMesh,
        }
    }

    /// Attachment tint
    pub fn color(&self) -> Color {
        match self {
            Attachment::Region(region) => region.color,
            Attachment::Mesh(mesh) => mesh.color,
            Attachment::SkinnedMesh(mesh) => mesh.color,
        }
    }

    /// Texture the attachment samples
    pub fn texture(&self) -> TextureHandle {
        match self {
            Attachment::Region(region) => region.texture,
            Attachment::Mesh(mesh) => mesh.texture,
            Attachment::SkinnedMesh(mesh) => mesh.texture,
        }
    }

    /// Number of vertices drawn
    pub fn vertex_count(&self) -> usize {
        self.uvs().len() / 2
    }

    /// Interleaved `u, v` texture coordinates, one pair per vertex
    pub fn uvs(&self) -> &[f32] {
        match self {
            Attachment::Region(region) => region.uvs.as_slice(),
            Attachment::Mesh(mesh) => mesh.uvs.as_slice(),
            Attachment::SkinnedMesh(mesh) => mesh.uvs.as_slice(),
        }
    }

    /// Local triangle indices
    pub fn triangles(&self) -> &[u16] {
        match self {
            Attachment::Region(_) => QUAD_TRIANGLES.as_slice(),
            Attachment::Mesh(mesh) => mesh.triangles.as_slice(),
            Attachment::SkinnedMesh(mesh) => mesh.triangles.as_slice(),
        }
    }

    /// Write world positions for `slot` into `out` as `x, y` pairs
    ///
    /// `out` must hold at least `2 * vertex_count()` floats.
    pub fn compute_world_vertices(&self, skeleton: &Skeleton, slot: &Slot, out: &mut [f32]) -> SkeletonResult<()> {
        check_buffer(self.vertex_count() * 2, out)?;
        match self {
            Attachment::Region(region) => {
                region.compute_world_vertices(skeleton.bone(slot.bone)?, out);
                Ok(())
            }
            Attachment::Mesh(mesh) => {
                mesh.compute_world_vertices(skeleton.bone(slot.bone)?, &slot.deform, out);
                Ok(())
            }
            Attachment::SkinnedMesh(mesh) => mesh.compute_world_vertices(skeleton, &slot.deform, out),
        }
    }
}

impl From<RegionAttachment> for Attachment {
    fn from(region: RegionAttachment) -> Self {
        Attachment::Region(region)
    }
}

impl From<MeshAttachment> for Attachment {
    fn from(mesh: MeshAttachment) -> Self {
        Attachment::Mesh(mesh)
    }
}

impl From<SkinnedMeshAttachment> for Attachment {
    fn from(mesh: SkinnedMeshAttachment) -> Self {
        Attachment::SkinnedMesh(mesh)
    }
}

fn check_buffer(required: usize, out: &[f32]) -> SkeletonResult<()> {
    if out.len() < required {
        return Err(SkeletonError::BufferTooSmall {
            required,
            available: out.len(),
        });
    }
    Ok(())
}

/// Atlas sub-rectangle a mesh's region-local UVs are mapped into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    /// Left texture coordinate
    pub u: f32,
    /// Top texture coordinate
    pub v: f32,
    /// Right texture coordinate
    pub u2: f32,
    /// Bottom texture coordinate
    pub v2: f32,
    /// Region is stored rotated 90 degrees in the atlas
    pub rotate: bool,
}

impl AtlasRegion {
    /// The whole texture, unrotated
    pub const FULL: Self = Self {
        u: 0.0,
        v: 0.0,
        u2: 1.0,
        v2: 1.0,
        rotate: false,
    };

    fn map_uvs(&self, region_uvs: &[f32]) -> Vec<f32> {
        let width = self.u2 - self.u;
        let height = self.v2 - self.v;
        region_uvs
            .chunks_exact(2)
            .flat_map(|uv| {
                if self.rotate {
                    [self.u + uv[1] * width, self.v + height - uv[0] * height]
                } else {
                    [self.u + uv[0] * width, self.v + uv[1] * height]
                }
            })
            .collect()
    }
}

impl Default for AtlasRegion {
    fn default() -> Self {
        Self::FULL
    }
}

/// Textured quad placed relative to its bone
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAttachment {
    /// Attachment name
    pub name: String,
    /// Center x in bone space
    pub x: f32,
    /// Center y in bone space
    pub y: f32,
    /// Rotation in degrees
    pub rotation: f32,
    /// Horizontal scale
    pub scale_x: f32,
    /// Vertical scale
    pub scale_y: f32,
    /// Unscaled width
    pub width: f32,
    /// Unscaled height
    pub height: f32,
    /// Tint
    pub color: Color,
    /// Texture sampled by the quad
    pub texture: TextureHandle,
    uvs: [f32; 8],
    offset: [f32; 8],
}

impl RegionAttachment {
    /// Corner 1 x
    pub const X1: usize = 0;
    /// Corner 1 y
    pub const Y1: usize = 1;
    /// Corner 2 x
    pub const X2: usize = 2;
    /// Corner 2 y
    pub const Y2: usize = 3;
    /// Corner 3 x
    pub const X3: usize = 4;
    /// Corner 3 y
    pub const Y3: usize = 5;
    /// Corner 4 x
    pub const X4: usize = 6;
    /// Corner 4 y
    pub const Y4: usize = 7;

    /// Create an unrotated quad centred on its bone, mapped to the whole texture
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        let mut region = Self {
            name: name.into(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            width,
            height,
            color: Color::WHITE,
            texture: TextureHandle::default(),
            uvs: [0.0; 8],
            offset: [0.0; 8],
        };
        region.set_uvs(AtlasRegion::FULL);
        region.update_offset();
        region
    }

    /// Set the center in bone space
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self.update_offset();
        self
    }

    /// Set the rotation in degrees
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self.update_offset();
        self
    }

    /// Set the scale
    pub fn with_scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self.update_offset();
        self
    }

    /// Set the tint
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the texture and its atlas sub-rectangle
    pub fn with_texture(mut self, texture: TextureHandle, region: AtlasRegion) -> Self {
        self.texture = texture;
        self.set_uvs(region);
        self
    }

    /// Corner UVs, indexed by the `X*`/`Y*` constants
    pub fn uvs(&self) -> &[f32; 8] {
        &self.uvs
    }

    /// Corner offsets in bone space, indexed by the `X*`/`Y*` constants
    pub fn offset(&self) -> &[f32; 8] {
        &self.offset
    }

    /// Map the quad corners onto an atlas sub-rectangle
    pub fn set_uvs(&mut self, region: AtlasRegion) {
        let AtlasRegion { u, v, u2, v2, rotate } = region;
        let uvs = &mut self.uvs;
        if rotate {
            uvs[Self::X2] = u;
            uvs[Self::Y2] = v2;
            uvs[Self::X3] = u;
            uvs[Self::Y3] = v;
            uvs[Self::X4] = u2;
            uvs[Self::Y4] = v;
            uvs[Self::X1] = u2;
            uvs[Self::Y1] = v2;
        } else {
            uvs[Self::X1] = u;
            uvs[Self::Y1] = v2;
            uvs[Self::X2] = u;
            uvs[Self::Y2] = v;
            uvs[Self::X3] = u2;
            uvs[Self::Y3] = v;
            uvs[Self::X4] = u2;
            uvs[Self::Y4] = v2;
        }
    }

    /// Recompute corner offsets after a change to position, rotation, scale or size
    pub fn update_offset(&mut self) {
        let local_x = -self.width / 2.0 * self.scale_x;
        let local_y = -self.height / 2.0 * self.scale_y;
        let local_x2 = self.width / 2.0 * self.scale_x;
        let local_y2 = self.height / 2.0 * self.scale_y;
        let (sin, cos) = self.rotation.to_radians().sin_cos();

        let local_x_cos = local_x * cos + self.x;
        let local_x_sin = local_x * sin;
        let local_y_cos = local_y * cos + self.y;
        let local_y_sin = local_y * sin;
        let local_x2_cos = local_x2 * cos + self.x;
        let local_x2_sin = local_x2 * sin;
        let local_y2_cos = local_y2 * cos + self.y;
        let local_y2_sin = local_y2 * sin;

        let offset = &mut self.offset;
        offset[Self::X1] = local_x_cos - local_y_sin;
        offset[Self::Y1] = local_y_cos + local_x_sin;
        offset[Self::X2] = local_x_cos - local_y2_sin;
        offset[Self::Y2] = local_y2_cos + local_x_sin;
        offset[Self::X3] = local_x2_cos - local_y2_sin;
        offset[Self::Y3] = local_y2_cos + local_x2_sin;
        offset[Self::X4] = local_x2_cos - local_y_sin;
        offset[Self::Y4] = local_y_cos + local_x2_sin;
    }

    /// Write the four world-space corners into `out[..8]`
    pub fn compute_world_vertices(&self, bone: &Bone, out: &mut [f32]) {
        for (corner, offset) in out[..8].chunks_exact_mut(2).zip(self.offset.chunks_exact(2)) {
            let (x, y) = bone.transform_point(offset[0], offset[1]);
            corner[0] = x;
            corner[1] = y;
        }
    }
}

fn validate_mesh(name: &str, vertex_count: usize, uvs: &[f32], triangles: &[u16]) -> SkeletonResult<()> {
    let invalid = |reason: String| SkeletonError::InvalidMesh {
        name: name.to_string(),
        reason,
    };

    if uvs.len() != vertex_count * 2 {
        return Err(invalid(format!(
            "{} UV floats for {vertex_count} vertices",
            uvs.len()
        )));
    }
    if triangles.len() % 3 != 0 {
        return Err(invalid(format!(
            "triangle index count {} is not a multiple of 3",
            triangles.len()
        )));
    }
    if let Some(&index) = triangles.iter().find(|&&index| usize::from(index) >= vertex_count) {
        return Err(invalid(format!(
            "triangle index {index} out of range for {vertex_count} vertices"
        )));
    }
    Ok(())
}

/// Mesh rigidly bound to the slot's bone
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAttachment {
    /// Attachment name
    pub name: String,
    /// Tint
    pub color: Color,
    /// Texture sampled by the mesh
    pub texture: TextureHandle,
    vertices: Vec<f32>,
    region_uvs: Vec<f32>,
    uvs: Vec<f32>,
    triangles: Vec<u16>,
}

impl MeshAttachment {
    /// Create a mesh from bone-space `x, y` pairs, region-local UVs and triangles
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<f32>,
        region_uvs: Vec<f32>,
        triangles: Vec<u16>,
    ) -> SkeletonResult<Self> {
        let name = name.into();
        if vertices.len() % 2 != 0 {
            return Err(SkeletonError::InvalidMesh {
                name,
                reason: format!("odd vertex float count {}", vertices.len()),
            });
        }
        validate_mesh(&name, vertices.len() / 2, &region_uvs, &triangles)?;

        let uvs = region_uvs.clone();
        Ok(Self {
            name,
            color: Color::WHITE,
            texture: TextureHandle::default(),
            vertices,
            region_uvs,
            uvs,
            triangles,
        })
    }

    /// Set the tint
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the texture and remap UVs into its atlas sub-rectangle
    pub fn with_texture(mut self, texture: TextureHandle, region: AtlasRegion) -> Self {
        self.texture = texture;
        self.uvs = region.map_uvs(&self.region_uvs);
        self
    }

    /// Bone-space vertices
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Atlas UVs
    pub fn uvs(&self) -> &[f32] {
        &self.uvs
    }

    /// Local triangle indices
    pub fn triangles(&self) -> &[u16] {
        &self.triangles
    }

    /// Write world positions into `out`, preferring `deform` when it matches the mesh
    pub fn compute_world_vertices(&self, bone: &Bone, deform: &[f32], out: &mut [f32]) {
        let source = if deform.len() == self.vertices.len() {
            deform
        } else {
            &self.vertices
        };
        for (world, local) in out.chunks_exact_mut(2).zip(source.chunks_exact(2)) {
            let (x, y) = bone.transform_point(local[0], local[1]);
            world[0] = x;
            world[1] = y;
        }
    }
}

/// One bone's contribution to a skinned vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneWeight {
    /// Influencing bone
    pub bone: usize,
    /// Vertex x in that bone's space
    pub x: f32,
    /// Vertex y in that bone's space
    pub y: f32,
    /// Blend weight
    pub weight: f32,
}

impl BoneWeight {
    /// Create a bone weight
    pub fn new(bone: usize, x: f32, y: f32, weight: f32) -> Self {
        Self { bone, x, y, weight }
    }
}

/// A skinned vertex and the bones that move it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinnedVertex {
    /// Influences; weights normally sum to 1
    pub influences: Vec<BoneWeight>,
}

impl SkinnedVertex {
    /// Create a vertex from its influences
    pub fn new(influences: Vec<BoneWeight>) -> Self {
        Self { influences }
    }
}

/// Mesh whose vertices are blended over several bones
#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedMeshAttachment {
    /// Attachment name
    pub name: String,
    /// Tint
    pub color: Color,
    /// Texture sampled by the mesh
    pub texture: TextureHandle,
    vertices: Vec<SkinnedVertex>,
    region_uvs: Vec<f32>,
    uvs: Vec<f32>,
    triangles: Vec<u16>,
    influence_count: usize,
}

impl SkinnedMeshAttachment {
    /// Create a skinned mesh
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<SkinnedVertex>,
        region_uvs: Vec<f32>,
        triangles: Vec<u16>,
    ) -> SkeletonResult<Self> {
        let name = name.into();
        validate_mesh(&name, vertices.len(), &region_uvs, &triangles)?;

        let influence_count = vertices.iter().map(|vertex| vertex.influences.len()).sum();
        let uvs = region_uvs.clone();
        Ok(Self {
            name,
            color: Color::WHITE,
            texture: TextureHandle::default(),
            vertices,
            region_uvs,
            uvs,
            triangles,
            influence_count,
        })
    }

    /// Set the tint
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the texture and remap UVs into its atlas sub-rectangle
    pub fn with_texture(mut self, texture: TextureHandle, region: AtlasRegion) -> Self {
        self.texture = texture;
        self.uvs = region.map_uvs(&self.region_uvs);
        self
    }

    /// Skinned vertices
    pub fn vertices(&self) -> &[SkinnedVertex] {
        &self.vertices
    }

    /// Atlas UVs
    pub fn uvs(&self) -> &[f32] {
        &self.uvs
    }

    /// Local triangle indices
    pub fn triangles(&self) -> &[u16] {
        &self.triangles
    }

    /// Floats a deform buffer needs: one `x, y` offset per influence
    pub fn deform_len(&self) -> usize {
        self.influence_count * 2
    }

    /// Write blended world positions into `out`
    ///
    /// A `deform` of exactly [`deform_len`](Self::deform_len) floats offsets
    /// each influence's bone-space position; any other length is ignored.
    pub fn compute_world_vertices(&self, skeleton: &Skeleton, deform: &[f32], out: &mut [f32]) -> SkeletonResult<()> {
        let deform = (deform.len() == self.deform_len()).then_some(deform);
        let mut influence = 0;

        for (world, vertex) in out.chunks_exact_mut(2).zip(&self.vertices) {
            let (mut wx, mut wy) = (0.0, 0.0);
            for weight in &vertex.influences {
                let bone = skeleton.bone(weight.bone)?;
                let (mut vx, mut vy) = (weight.x, weight.y);
                if let Some(deform) = deform {
                    vx += deform[influence * 2];
                    vy += deform[influence * 2 + 1];
                }
                influence += 1;

                let (x, y) = bone.transform_point(vx, vy);
                wx += x * weight.weight;
                wy += y * weight.weight;
            }
            world[0] = wx;
            world[1] = wy;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn skeleton_with_bones(bones: Vec<Bone>) -> Skeleton {
        let mut skeleton = Skeleton::new();
        for bone in bones {
            skeleton.add_bone(bone);
        }
        skeleton
    }

    #[test]
    fn test_region_corners_follow_bone() {
        let region = RegionAttachment::new("body", 10.0, 10.0).with_position(5.0, 5.0);
        let mut out = [0.0; 8];

        region.compute_world_vertices(&Bone::new("root"), &mut out);
        assert_eq!(out, [0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 0.0]);

        let bone = Bone::new("moved").with_world_transform(100.0, 50.0, 0.0, 2.0, 2.0);
        region.compute_world_vertices(&bone, &mut out);
        assert_eq!(out, [100.0, 50.0, 100.0, 70.0, 120.0, 70.0, 120.0, 50.0]);
    }

    #[test]
    fn test_region_rotation() {
        let region = RegionAttachment::new("arm", 2.0, 2.0).with_rotation(90.0);
        let offset = region.offset();
        assert_relative_eq!(offset[RegionAttachment::X1], 1.0, epsilon = 1e-5);
        assert_relative_eq!(offset[RegionAttachment::Y1], -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_region_uvs_for_rotated_atlas_entry() {
        let region = RegionAttachment::new("r", 1.0, 1.0).with_texture(
            TextureHandle(3),
            AtlasRegion {
                u: 0.25,
                v: 0.5,
                u2: 0.75,
                v2: 1.0,
                rotate: true,
            },
        );
        assert_eq!(region.uvs(), &[0.75, 1.0, 0.25, 1.0, 0.25, 0.5, 0.75, 0.5]);
    }

    #[test]
    fn test_mesh_uses_deform_only_when_lengths_match() {
        let mesh = MeshAttachment::new("m", vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0], vec![0.0; 6], vec![0, 1, 2]).unwrap();
        let bone = Bone::new("root").with_world_transform(10.0, 0.0, 0.0, 1.0, 1.0);
        let mut out = [0.0; 6];

        mesh.compute_world_vertices(&bone, &[], &mut out);
        assert_eq!(out, [10.0, 0.0, 11.0, 0.0, 10.0, 1.0]);

        mesh.compute_world_vertices(&bone, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0], &mut out);
        assert_eq!(out, [11.0, 1.0, 12.0, 2.0, 13.0, 3.0]);

        mesh.compute_world_vertices(&bone, &[5.0, 5.0], &mut out);
        assert_eq!(out, [10.0, 0.0, 11.0, 0.0, 10.0, 1.0]);
    }

    #[test]
    fn test_mesh_rejects_inconsistent_data() {
        assert!(MeshAttachment::new("odd", vec![0.0; 3], vec![0.0; 3], vec![]).is_err());
        assert!(MeshAttachment::new("uv", vec![0.0; 4], vec![0.0; 2], vec![]).is_err());
        assert!(MeshAttachment::new("tri", vec![0.0; 4], vec![0.0; 4], vec![0, 1]).is_err());
        assert!(MeshAttachment::new("idx", vec![0.0; 6], vec![0.0; 6], vec![0, 1, 3]).is_err());
    }

    #[test]
    fn test_mesh_uvs_remapped_into_atlas() {
        let mesh = MeshAttachment::new("m", vec![0.0; 4], vec![0.0, 0.0, 1.0, 1.0], vec![])
            .unwrap()
            .with_texture(
                TextureHandle(1),
                AtlasRegion {
                    u: 0.5,
                    v: 0.0,
                    u2: 1.0,
                    v2: 0.5,
                    rotate: false,
                },
            );
        assert_eq!(mesh.uvs(), &[0.5, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_skinned_vertex_blends_bones() {
        let skeleton = skeleton_with_bones(vec![
            Bone::new("a"),
            Bone::new("b").with_world_transform(10.0, 0.0, 0.0, 1.0, 1.0),
        ]);
        let mesh = SkinnedMeshAttachment::new(
            "skin",
            vec![SkinnedVertex::new(vec![
                BoneWeight::new(0, 0.0, 2.0, 0.5),
                BoneWeight::new(1, 0.0, 2.0, 0.5),
            ])],
            vec![0.0, 0.0],
            vec![],
        )
        .unwrap();
        let mut out = [0.0; 2];

        mesh.compute_world_vertices(&skeleton, &[], &mut out).unwrap();
        assert_eq!(out, [5.0, 2.0]);

        assert_eq!(mesh.deform_len(), 4);
        mesh.compute_world_vertices(&skeleton, &[2.0, 0.0, 2.0, 0.0], &mut out).unwrap();
        assert_eq!(out, [7.0, 2.0]);
    }

    #[test]
    fn test_skinned_vertex_with_missing_bone() {
        let skeleton = skeleton_with_bones(vec![Bone::new("a")]);
        let mesh = SkinnedMeshAttachment::new(
            "skin",
            vec![SkinnedVertex::new(vec![BoneWeight::new(4, 0.0, 0.0, 1.0)])],
            vec![0.0, 0.0],
            vec![],
        )
        .unwrap();
        let mut out = [0.0; 2];
        let result = mesh.compute_world_vertices(&skeleton, &[], &mut out);
        assert!(matches!(result, Err(SkeletonError::BoneOutOfRange { bone: 4, .. })));
    }

    #[test]
    fn test_attachment_checks_output_buffer() {
        let mut skeleton = skeleton_with_bones(vec![Bone::new("root")]);
        let slot = Slot::new("s", 0).with_attachment(RegionAttachment::new("r", 1.0, 1.0));
        skeleton.add_slot(slot.clone()).unwrap();
        let attachment = slot.attachment.as_ref().unwrap();

        let mut short = [0.0; 4];
        let result = attachment.compute_world_vertices(&skeleton, &slot, &mut short);
        assert!(matches!(result, Err(SkeletonError::BufferTooSmall { required: 8, available: 4 })));

        assert_eq!(attachment.kind(), AttachmentKind::Region);
        assert_eq!(attachment.vertex_count(), 4);
        assert_eq!(attachment.triangles(), &QUAD_TRIANGLES);
    }
}
