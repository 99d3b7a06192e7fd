//! # Mesh Batcher
//!
//! Collects draw items for one frame and replays them as indexed draw calls.
//!
//! ## Architecture
//!
//! - **MeshBatcher**: Owns the frame's regions and replays them on a device
//! - **Region**: Fixed-capacity vertex/index storage holding whole items
//! - **MeshItem**: Writable view of one item's vertices, local indices and texture
//!
//! Items are appended in draw order and never reordered. A region is closed
//! only when the next item does not fit; texture changes inside a region become
//! separate draw calls against the same region buffers, not new regions.

use std::fmt;

use super::vertex::MeshVertex;
use crate::config::BatcherConfig;
use crate::render::device::{DeviceError, DrawCall, EffectPass, GraphicsDevice, TextureHandle};

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;

/// Which per-region limit an item ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityKind {
    /// Vertex buffer capacity
    Vertices,
    /// Index buffer capacity
    Indices,
}

impl fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityKind::Vertices => f.write_str("vertices"),
            CapacityKind::Indices => f.write_str("indices"),
        }
    }
}

/// Errors that can occur while batching or replaying geometry
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// A single item is larger than one region; the geometry cannot be drawn
    #[error("Item needs {requested} {kind} but a region holds at most {capacity}")]
    CapacityExceeded {
        /// Limit that was hit
        kind: CapacityKind,
        /// Amount the item asked for
        requested: usize,
        /// Region capacity
        capacity: usize,
    },

    /// An item's local index points past its own vertices
    #[error("Item {item} in region {region} references local vertex {index} but has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Region holding the item
        region: usize,
        /// Item position within the region
        item: usize,
        /// Offending local index
        index: u16,
        /// Vertices owned by the item
        vertex_count: usize,
    },

    /// The device failed while replaying
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

/// Statistics for batch rendering performance monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Items allocated
    pub items: usize,
    /// Regions opened
    pub regions: usize,
    /// Vertices allocated
    pub vertices: usize,
    /// Triangle indices allocated
    pub indices: usize,
    /// Draw calls issued
    pub draw_calls: usize,
    /// Draw calls that switched texture from the previous draw in the same region
    pub texture_switches: usize,
}

impl BatchStats {
    /// Average number of items merged into one draw call
    pub fn avg_items_per_draw_call(&self) -> f32 {
        if self.draw_calls == 0 {
            0.0
        } else {
            self.items as f32 / self.draw_calls as f32
        }
    }
}

/// Placement of one item inside its region
#[derive(Debug, Clone, Copy)]
struct ItemRange {
    first_vertex: usize,
    vertex_count: usize,
    first_index: usize,
    index_count: usize,
    texture: TextureHandle,
}

/// Fixed-capacity vertex/index storage
#[derive(Debug)]
struct Region {
    vertices: Vec<MeshVertex>,
    triangles: Vec<u16>,
    items: Vec<ItemRange>,
}

impl Region {
    fn with_capacity(config: &BatcherConfig) -> Self {
        Self {
            vertices: Vec::with_capacity(config.max_vertices_per_region),
            triangles: Vec::with_capacity(config.max_indices_per_region),
            items: Vec::new(),
        }
    }

    fn fits(&self, config: &BatcherConfig, vertex_count: usize, index_count: usize) -> bool {
        self.vertices.len() + vertex_count <= config.max_vertices_per_region
            && self.triangles.len() + index_count <= config.max_indices_per_region
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
        self.items.clear();
    }
}

/// Writable storage for one draw item
///
/// `triangles` holds indices local to `vertices` (0-based); the batcher adds
/// the item's base vertex when replaying. Never pre-offset them.
#[derive(Debug)]
pub struct MeshItem<'a> {
    /// Item vertices
    pub vertices: &'a mut [MeshVertex],
    /// Local triangle indices
    pub triangles: &'a mut [u16],
    /// Texture the item samples
    pub texture: &'a mut TextureHandle,
}

/// Frame-scoped batcher of variable-size textured meshes
#[derive(Debug)]
pub struct MeshBatcher {
    config: BatcherConfig,
    regions: Vec<Region>,
    active_regions: usize,
    index_scratch: Vec<u16>,
    stats: BatchStats,
}

impl MeshBatcher {
    /// Create a batcher with the given region capacities
    ///
    /// Capacities outside the range [`BatcherConfig::validate`] accepts are
    /// clamped into it.
    pub fn new(config: BatcherConfig) -> Self {
        let clamped = config.clamped();
        if clamped != config {
            log::warn!(
                "Batcher capacity {}v/{}i out of range, clamped to {}v/{}i",
                config.max_vertices_per_region,
                config.max_indices_per_region,
                clamped.max_vertices_per_region,
                clamped.max_indices_per_region
            );
        }

        Self {
            config: clamped,
            regions: Vec::new(),
            active_regions: 0,
            index_scratch: Vec::new(),
            stats: BatchStats::default(),
        }
    }

    /// Region capacities
    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Discard every item and recycle region storage
    ///
    /// Items handed out earlier cannot outlive this call; the borrow on the
    /// batcher ends first.
    pub fn reset(&mut self) {
        for region in &mut self.regions[..self.active_regions] {
            region.clear();
        }
        self.active_regions = 0;
    }

    /// Allocate room for an item of `vertex_count` vertices and `index_count` indices
    ///
    /// Opens a new region when the current one cannot hold the whole item.
    /// Fails when the item alone exceeds a region's capacity.
    pub fn next_item(&mut self, vertex_count: usize, index_count: usize) -> BatchResult<MeshItem<'_>> {
        if vertex_count > self.config.max_vertices_per_region {
            return Err(BatchError::CapacityExceeded {
                kind: CapacityKind::Vertices,
                requested: vertex_count,
                capacity: self.config.max_vertices_per_region,
            });
        }
        if index_count > self.config.max_indices_per_region {
            return Err(BatchError::CapacityExceeded {
                kind: CapacityKind::Indices,
                requested: index_count,
                capacity: self.config.max_indices_per_region,
            });
        }

        let needs_region = match self.active_regions.checked_sub(1) {
            Some(current) => !self.regions[current].fits(&self.config, vertex_count, index_count),
            None => true,
        };
        if needs_region {
            self.open_region();
        }

        let region = &mut self.regions[self.active_regions - 1];
        let first_vertex = region.vertices.len();
        let first_index = region.triangles.len();
        region.vertices.resize(first_vertex + vertex_count, MeshVertex::default());
        region.triangles.resize(first_index + index_count, 0);
        region.items.push(ItemRange {
            first_vertex,
            vertex_count,
            first_index,
            index_count,
            texture: TextureHandle::default(),
        });

        self.stats.items += 1;
        self.stats.vertices += vertex_count;
        self.stats.indices += index_count;

        let Region { vertices, triangles, items } = region;
        let last = items.len() - 1;
        Ok(MeshItem {
            vertices: &mut vertices[first_vertex..],
            triangles: &mut triangles[first_index..],
            texture: &mut items[last].texture,
        })
    }

    fn open_region(&mut self) {
        if self.active_regions == self.regions.len() {
            self.regions.push(Region::with_capacity(&self.config));
        }
        self.active_regions += 1;
        self.stats.regions += 1;
        log::trace!(
            "Opened batch region {} ({} vertices / {} indices)",
            self.active_regions - 1,
            self.config.max_vertices_per_region,
            self.config.max_indices_per_region
        );
    }

    /// Replay every item in append order
    ///
    /// Each region becomes one draw call per run of consecutive items sharing a
    /// texture; `pass` is applied before every draw call. Items stay batched
    /// until [`reset`](Self::reset), so a multi-pass effect can replay them again.
    pub fn draw<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, pass: &EffectPass) -> BatchResult<()> {
        for (region_index, region) in self.regions[..self.active_regions].iter().enumerate() {
            if region.items.is_empty() {
                continue;
            }

            self.index_scratch.clear();
            for (item_index, item) in region.items.iter().enumerate() {
                let local = &region.triangles[item.first_index..item.first_index + item.index_count];
                for &index in local {
                    let out_of_range = || BatchError::IndexOutOfRange {
                        region: region_index,
                        item: item_index,
                        index,
                        vertex_count: item.vertex_count,
                    };
                    if usize::from(index) >= item.vertex_count {
                        return Err(out_of_range());
                    }
                    let global = u16::try_from(item.first_vertex + usize::from(index))
                        .map_err(|_| out_of_range())?;
                    self.index_scratch.push(global);
                }
            }

            let mut previous_texture = None;
            for run in region.items.chunk_by(|a, b| a.texture == b.texture) {
                let first = &run[0];
                let last = &run[run.len() - 1];
                let index_count = last.first_index + last.index_count - first.first_index;
                if index_count == 0 {
                    continue;
                }

                device.apply_pass(pass)?;
                device.draw_indexed(&DrawCall {
                    vertices: &region.vertices,
                    indices: &self.index_scratch,
                    first_index: first.first_index,
                    index_count,
                    texture: first.texture,
                })?;

                self.stats.draw_calls += 1;
                if previous_texture.is_some_and(|texture| texture != first.texture) {
                    self.stats.texture_switches += 1;
                }
                previous_texture = Some(first.texture);
            }

            log::trace!(
                "Replayed region {region_index}: {} items, {} vertices, {} indices",
                region.items.len(),
                region.vertices.len(),
                region.triangles.len()
            );
        }

        Ok(())
    }

    /// Items currently batched
    pub fn item_count(&self) -> usize {
        self.active().map(|region| region.items.len()).sum()
    }

    /// Regions currently in use
    pub fn region_count(&self) -> usize {
        self.active_regions
    }

    /// Vertices currently batched
    pub fn vertex_count(&self) -> usize {
        self.active().map(|region| region.vertices.len()).sum()
    }

    /// Indices currently batched
    pub fn index_count(&self) -> usize {
        self.active().map(|region| region.triangles.len()).sum()
    }

    /// Whether nothing is batched
    pub fn is_empty(&self) -> bool {
        self.active().all(|region| region.items.is_empty())
    }

    /// `(vertices, indices, items)` held by each region in use
    pub fn region_sizes(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.active()
            .map(|region| (region.vertices.len(), region.triangles.len(), region.items.len()))
    }

    /// Statistics accumulated since the last [`reset_stats`](Self::reset_stats)
    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = BatchStats::default();
    }

    fn active(&self) -> impl Iterator<Item = &Region> {
        self.regions[..self.active_regions].iter()
    }
}

impl Default for MeshBatcher {
    fn default() -> Self {
        Self::new(BatcherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;
    use proptest::prelude::*;

    fn small_batcher(max_vertices: usize) -> MeshBatcher {
        MeshBatcher::new(BatcherConfig::with_capacity(max_vertices, max_vertices * 3))
    }

    fn push_quad(batcher: &mut MeshBatcher, texture: u64, x: f32) {
        let item = batcher.next_item(4, 6).unwrap();
        item.triangles.copy_from_slice(&[0, 1, 2, 1, 3, 2]);
        for (i, vertex) in item.vertices.iter_mut().enumerate() {
            vertex.position = [x, i as f32, 0.0];
        }
        *item.texture = TextureHandle(texture);
    }

    #[test]
    fn test_new_batcher_is_empty() {
        let batcher = MeshBatcher::default();
        assert!(batcher.is_empty());
        assert_eq!(batcher.region_count(), 0);
        assert_eq!(batcher.config().max_vertices_per_region, 32767);
    }

    #[test]
    fn test_item_larger_than_region_is_rejected() {
        let mut batcher = small_batcher(8);
        let result = batcher.next_item(9, 3);
        assert!(matches!(
            result,
            Err(BatchError::CapacityExceeded { kind: CapacityKind::Vertices, requested: 9, capacity: 8 })
        ));

        let result = batcher.next_item(4, 25);
        assert!(matches!(
            result,
            Err(BatchError::CapacityExceeded { kind: CapacityKind::Indices, requested: 25, capacity: 24 })
        ));
        assert!(batcher.is_empty());
    }

    #[test]
    fn test_overflow_opens_regions_without_splitting_items() {
        let mut batcher = small_batcher(10);
        // 4 + 4 fit, the third quad would make 12
        for i in 0..5 {
            push_quad(&mut batcher, 1, i as f32);
        }

        assert_eq!(batcher.region_count(), 3);
        let sizes: Vec<_> = batcher.region_sizes().collect();
        assert_eq!(sizes, vec![(8, 12, 2), (8, 12, 2), (4, 6, 1)]);
        assert_eq!(batcher.vertex_count(), 20);
        assert_eq!(batcher.index_count(), 30);

        let mut device = RecordingDevice::default();
        batcher.draw(&mut device, &EffectPass::new("main")).unwrap();

        let draws: Vec<_> = device.draws().collect();
        assert_eq!(draws.len(), 3);
        let total_indices: usize = draws.iter().map(|draw| draw.indices.len()).sum();
        assert_eq!(total_indices, 30);
        assert!(draws.iter().all(|draw| draw.region_vertex_count <= 10));
    }

    #[test]
    fn test_index_buffer_offsets_recover_local_indices() {
        let mut batcher = small_batcher(64);
        let item = batcher.next_item(3, 3).unwrap();
        item.triangles.copy_from_slice(&[0, 1, 2]);
        *item.texture = TextureHandle(5);
        let item = batcher.next_item(5, 6).unwrap();
        item.triangles.copy_from_slice(&[4, 0, 3, 2, 1, 0]);
        *item.texture = TextureHandle(5);

        let mut device = RecordingDevice::default();
        batcher.draw(&mut device, &EffectPass::new("main")).unwrap();

        let draw = device.draws().next().unwrap();
        assert_eq!(draw.indices, vec![0, 1, 2, 7, 3, 6, 5, 4, 3]);

        let second_base = 3;
        let recovered: Vec<u16> = draw.indices[3..].iter().map(|index| index - second_base).collect();
        assert_eq!(recovered, vec![4, 0, 3, 2, 1, 0]);
    }

    #[test]
    fn test_texture_runs_split_draw_calls_not_regions() {
        let mut batcher = small_batcher(64);
        push_quad(&mut batcher, 1, 0.0);
        push_quad(&mut batcher, 1, 1.0);
        push_quad(&mut batcher, 2, 2.0);
        push_quad(&mut batcher, 1, 3.0);

        let mut device = RecordingDevice::default();
        batcher.draw(&mut device, &EffectPass::new("main")).unwrap();

        assert_eq!(batcher.region_count(), 1);
        let textures: Vec<_> = device.draws().map(|draw| draw.texture).collect();
        assert_eq!(textures, vec![TextureHandle(1), TextureHandle(2), TextureHandle(1)]);
        let counts: Vec<_> = device.draws().map(|draw| draw.indices.len()).collect();
        assert_eq!(counts, vec![12, 6, 6]);
        assert_eq!(batcher.stats().texture_switches, 2);
        assert_eq!(device.pass_applications(), 3);
    }

    #[test]
    fn test_draw_preserves_append_order() {
        let mut batcher = small_batcher(64);
        for i in 0..3 {
            push_quad(&mut batcher, 1, i as f32 * 10.0);
        }

        let mut device = RecordingDevice::default();
        batcher.draw(&mut device, &EffectPass::new("main")).unwrap();

        let draw = device.draws().next().unwrap();
        let xs: Vec<f32> = draw
            .triangle_vertices
            .chunks(6)
            .map(|triangle_pair| triangle_pair[0].position[0])
            .collect();
        assert_eq!(xs, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_invalid_local_index_is_reported() {
        let mut batcher = small_batcher(64);
        let item = batcher.next_item(3, 3).unwrap();
        item.triangles.copy_from_slice(&[0, 1, 3]);

        let mut device = RecordingDevice::default();
        let result = batcher.draw(&mut device, &EffectPass::new("main"));
        assert!(matches!(
            result,
            Err(BatchError::IndexOutOfRange { region: 0, item: 0, index: 3, vertex_count: 3 })
        ));
        assert_eq!(device.draw_count(), 0);
    }

    #[test]
    fn test_reset_recycles_regions() {
        let mut batcher = small_batcher(8);
        for i in 0..4 {
            push_quad(&mut batcher, 1, i as f32);
        }
        assert_eq!(batcher.region_count(), 2);

        batcher.reset();
        assert!(batcher.is_empty());
        assert_eq!(batcher.region_count(), 0);

        push_quad(&mut batcher, 1, 0.0);
        assert_eq!(batcher.region_count(), 1);
        assert_eq!(batcher.item_count(), 1);
    }

    #[test]
    fn test_empty_batcher_issues_nothing() {
        let mut batcher = MeshBatcher::default();
        let mut device = RecordingDevice::default();
        batcher.draw(&mut device, &EffectPass::new("main")).unwrap();
        assert!(device.commands().is_empty());
    }

    #[test]
    fn test_device_failure_propagates() {
        let mut batcher = small_batcher(64);
        push_quad(&mut batcher, 1, 0.0);

        let mut device = RecordingDevice::default().with_draw_failure_after(0);
        let result = batcher.draw(&mut device, &EffectPass::new("main"));
        assert!(matches!(result, Err(BatchError::Device(DeviceError::DrawFailed(_)))));
    }

    #[test]
    fn test_index_capacity_forces_new_region() {
        let mut batcher = MeshBatcher::new(BatcherConfig::with_capacity(100, 9));
        for texture in 0..3 {
            let item = batcher.next_item(3, 6).unwrap();
            item.triangles.copy_from_slice(&[0, 1, 2, 2, 1, 0]);
            *item.texture = TextureHandle(texture);
        }

        let sizes: Vec<_> = batcher.region_sizes().collect();
        assert_eq!(sizes, vec![(3, 6, 1), (3, 6, 1), (3, 6, 1)]);

        let mut device = RecordingDevice::default();
        batcher.draw(&mut device, &EffectPass::new("main")).unwrap();
        assert!(device.draws().all(|draw| draw.indices == [0, 1, 2, 2, 1, 0]));
    }

    #[test]
    fn test_out_of_range_capacity_is_clamped() {
        let batcher = MeshBatcher::new(BatcherConfig::with_capacity(usize::MAX, 0));
        assert_eq!(batcher.config().max_vertices_per_region, 65_536);
        assert_eq!(batcher.config().max_indices_per_region, 6);
        assert!(batcher.config().validate().is_ok());

        let mut batcher = MeshBatcher::new(BatcherConfig::with_capacity(1, usize::MAX));
        assert_eq!(batcher.config().max_vertices_per_region, 4);
        push_quad(&mut batcher, 1, 0.0);
        assert!(batcher.next_item(5, 6).is_err());
    }

    #[test]
    fn test_batch_stats() {
        let mut stats = BatchStats::default();
        assert_eq!(stats.avg_items_per_draw_call(), 0.0);
        stats.items = 12;
        stats.draw_calls = 4;
        assert_eq!(stats.avg_items_per_draw_call(), 3.0);
    }

    const MAX_VERTICES: usize = 16;
    const MAX_INDICES: usize = 24;

    /// `(vertex_count, index_count, texture)` of one item
    fn item_shape() -> impl Strategy<Value = (usize, usize, u64)> {
        (1..=MAX_VERTICES, 0..=MAX_INDICES / 3, 0u64..3)
            .prop_map(|(vertices, triangles, texture)| (vertices, triangles * 3, texture))
    }

    proptest! {
        #[test]
        fn test_items_fill_regions_greedily_and_replay_in_order(
            items in prop::collection::vec(item_shape(), 0..40)
        ) {
            let mut batcher = MeshBatcher::new(BatcherConfig::with_capacity(MAX_VERTICES, MAX_INDICES));
            let mut expected_regions: Vec<(usize, usize, usize)> = Vec::new();
            let mut expected_indices = Vec::new();

            for (n, &(vertex_count, index_count, texture)) in items.iter().enumerate() {
                let item = batcher.next_item(vertex_count, index_count).unwrap();
                for (k, index) in item.triangles.iter_mut().enumerate() {
                    *index = ((k * 7 + n) % vertex_count) as u16;
                }
                *item.texture = TextureHandle(texture);
                let local = item.triangles.to_vec();

                let opens_region = expected_regions.last().map_or(true, |&(vertices, indices, _)| {
                    vertices + vertex_count > MAX_VERTICES || indices + index_count > MAX_INDICES
                });
                if opens_region {
                    expected_regions.push((0, 0, 0));
                }
                let region = expected_regions.last_mut().unwrap();
                expected_indices.extend(local.iter().map(|&index| index + region.0 as u16));
                region.0 += vertex_count;
                region.1 += index_count;
                region.2 += 1;
            }

            let sizes: Vec<_> = batcher.region_sizes().collect();
            prop_assert!(sizes.iter().all(|&(v, i, _)| v <= MAX_VERTICES && i <= MAX_INDICES));
            prop_assert_eq!(sizes, expected_regions);
            prop_assert_eq!(batcher.item_count(), items.len());
            prop_assert_eq!(batcher.vertex_count(), items.iter().map(|item| item.0).sum::<usize>());
            prop_assert_eq!(batcher.index_count(), items.iter().map(|item| item.1).sum::<usize>());

            let mut device = RecordingDevice::default();
            batcher.draw(&mut device, &EffectPass::new("main")).unwrap();
            for draw in device.draws() {
                prop_assert!(draw.region_vertex_count <= MAX_VERTICES);
                prop_assert!(draw.indices.iter().all(|&index| usize::from(index) < draw.region_vertex_count));
            }
            let issued: Vec<u16> = device.draws().flat_map(|draw| draw.indices.iter().copied()).collect();
            prop_assert_eq!(issued, expected_indices);
        }
    }
}
