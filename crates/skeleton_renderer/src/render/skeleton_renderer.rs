//! # Skeleton Renderer
//!
//! Turns a posed [`Skeleton`] into batched, textured triangles. Slots are
//! visited in draw order; each visible attachment becomes one batcher item
//! carrying world positions, composited vertex colors and atlas UVs.
//!
//! ## Batching rules
//!
//! - Texture changes never flush; the batcher splits them into draw calls.
//! - A change of effective blend mode flushes everything batched so far with
//!   the previous blend, so additive slots keep their place in the draw order.
//! - Nothing reaches the device before [`SkeletonRenderer::end`] or a blend
//!   change.
//!
//! ## Frame lifecycle
//!
//! ```text
//! Idle --begin--> Begun --draw*--> Begun --end--> Idle
//! ```

use crate::config::RendererConfig;
use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::batching::{BatchStats, MeshBatcher};
use crate::render::bounds::{self, Bounds, Rectangle};
use crate::render::color::composite_color;
use crate::render::device::{BlendMode, Effect, GraphicsDevice, RasterizerState};
use crate::render::{RenderError, RenderResult};
use crate::skeleton::{Attachment, Skeleton, SkeletonResult, Slot};

/// Region corner feeding each quad vertex, in TL, TR, BL, BR order
const REGION_CORNERS: [usize; 4] = [0, 3, 1, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    Idle,
    Begun,
}

/// Counters for the frame in progress, reset by `begin`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Slots that produced a batcher item
    pub slots_drawn: usize,
    /// Slots without an attachment
    pub slots_skipped: usize,
    /// Flushes forced by a blend change before `end`
    pub blend_flushes: usize,
    /// Flushes issued in total, including the one in `end`
    pub flushes: usize,
}

/// Draws skeletons through a [`MeshBatcher`] onto a [`GraphicsDevice`]
///
/// # Design Notes
/// The renderer owns its batcher, effect and world-vertex scratch buffer, so
/// every drawing call takes `&mut self` and the device is passed in per call.
/// The scratch buffer only ever grows; a large mesh early in a session keeps
/// its allocation for the renderer's lifetime.
#[derive(Debug)]
pub struct SkeletonRenderer {
    config: RendererConfig,
    effect: Effect,
    batcher: MeshBatcher,
    world_vertices: Vec<f32>,
    default_blend_mode: BlendMode,
    device_blend_mode: BlendMode,
    state: FrameState,
    frame: FrameStats,
    frame_count: u64,
}

impl SkeletonRenderer {
    /// Create a renderer with the default single-pass effect
    ///
    /// # Arguments
    /// * `config` - Alpha convention, rasterizer state and batcher capacities
    ///
    /// # Errors
    /// [`RenderError::Config`] if `config` fails validation.
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        Self::with_effect(config, Effect::default())
    }

    /// Create a renderer drawing with a caller-supplied effect
    ///
    /// # Errors
    /// [`RenderError::Config`] if `config` fails validation.
    pub fn with_effect(config: RendererConfig, effect: Effect) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self::build(config, effect))
    }

    fn build(config: RendererConfig, effect: Effect) -> Self {
        let default_blend_mode = BlendMode::for_alpha_convention(config.premultiplied_alpha);
        log::debug!(
            "Creating skeleton renderer (premultiplied_alpha: {}, {} passes)",
            config.premultiplied_alpha,
            effect.passes().len()
        );

        Self {
            batcher: MeshBatcher::new(config.batcher),
            config,
            effect,
            world_vertices: vec![0.0; 8],
            default_blend_mode,
            device_blend_mode: default_blend_mode,
            state: FrameState::Idle,
            frame: FrameStats::default(),
            frame_count: 0,
        }
    }

    /// Start a frame
    ///
    /// Resets the batcher, primes every pass with the default blend and the
    /// configured rasterizer state, and projects the device viewport with a
    /// y-down orthographic projection.
    ///
    /// # Errors
    /// [`RenderError::AlreadyBegun`] if a frame is already open.
    pub fn begin<D: GraphicsDevice + ?Sized>(&mut self, device: &D) -> RenderResult<()> {
        self.begin_with_transform(device, Mat4::identity())
    }

    /// Start a frame with a world transform applied to everything drawn
    ///
    /// # Arguments
    /// * `device` - Device whose viewport sizes the projection
    /// * `transform` - Camera or sprite transform placed on every pass
    pub fn begin_with_transform<D: GraphicsDevice + ?Sized>(&mut self, device: &D, transform: Mat4) -> RenderResult<()> {
        if self.state == FrameState::Begun {
            return Err(RenderError::AlreadyBegun);
        }

        self.default_blend_mode = BlendMode::for_alpha_convention(self.config.premultiplied_alpha);
        self.device_blend_mode = self.default_blend_mode;
        self.batcher.reset();
        self.frame = FrameStats::default();

        let viewport = device.viewport();
        let projection = Mat4::orthographic_off_center(
            0.0,
            viewport.width as f32,
            viewport.height as f32,
            0.0,
            1.0,
            0.0,
        );
        for pass in self.effect.passes_mut() {
            pass.blend_mode = self.default_blend_mode;
            pass.rasterizer = self.config.rasterizer;
        }
        self.effect.set_world(transform);
        self.effect.set_projection(projection);

        self.state = FrameState::Begun;
        log::trace!(
            "Begin frame {} ({}x{}, {:?})",
            self.frame_count,
            viewport.width,
            viewport.height,
            self.default_blend_mode
        );
        Ok(())
    }

    /// Batch every visible attachment of `skeleton`
    ///
    /// Several skeletons may be drawn between one `begin`/`end` pair.
    ///
    /// # Errors
    /// [`RenderError::NotBegun`] outside a frame. Capacity, device and
    /// skeleton data errors are propagated. Items batched before a capacity
    /// or skeleton failure stay in the batcher; a failed flush discards its
    /// batch.
    pub fn draw<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, skeleton: &Skeleton) -> RenderResult<()> {
        if self.state != FrameState::Begun {
            return Err(RenderError::NotBegun);
        }

        for slot in skeleton.draw_order() {
            let Some(attachment) = &slot.attachment else {
                self.frame.slots_skipped += 1;
                continue;
            };

            let blend_mode = if slot.is_additive() {
                BlendMode::Additive
            } else {
                self.default_blend_mode
            };
            if blend_mode != self.device_blend_mode {
                log::trace!(
                    "Blend change {:?} -> {:?} at slot '{}'",
                    self.device_blend_mode,
                    blend_mode,
                    slot
                );
                self.flush(device)?;
                self.frame.blend_flushes += 1;
                self.device_blend_mode = blend_mode;
            }

            self.batch_attachment(skeleton, slot, attachment)?;
            self.frame.slots_drawn += 1;
        }

        Ok(())
    }

    fn batch_attachment(&mut self, skeleton: &Skeleton, slot: &Slot, attachment: &Attachment) -> RenderResult<()> {
        let vertex_count = attachment.vertex_count();
        if self.world_vertices.len() < vertex_count * 2 {
            self.world_vertices.resize(vertex_count * 2, 0.0);
        }
        attachment.compute_world_vertices(skeleton, slot, &mut self.world_vertices)?;

        let color = composite_color(skeleton, slot, attachment.color(), self.config.premultiplied_alpha).to_array();
        let uvs = attachment.uvs();
        let triangles = attachment.triangles();

        let item = self.batcher.next_item(vertex_count, triangles.len())?;
        item.triangles.copy_from_slice(triangles);
        *item.texture = attachment.texture();

        let is_region = matches!(attachment, Attachment::Region(_));
        for (index, vertex) in item.vertices.iter_mut().enumerate() {
            let source = if is_region { REGION_CORNERS[index] } else { index };
            vertex.position = [
                self.world_vertices[source * 2],
                self.world_vertices[source * 2 + 1],
                0.0,
            ];
            vertex.uv = [uvs[source * 2], uvs[source * 2 + 1]];
            vertex.color = color;
        }

        Ok(())
    }

    /// Submit everything batched with the tracked blend mode, then clear the batcher
    ///
    /// The batcher is cleared even when a pass fails, so a later flush never
    /// replays items the device has already seen.
    fn flush<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> RenderResult<()> {
        let blend_mode = self.device_blend_mode;
        let mut result = Ok(());
        for pass in self.effect.passes_mut() {
            pass.blend_mode = blend_mode;
            if let Err(err) = self.batcher.draw(device, pass) {
                result = Err(err.into());
                break;
            }
        }
        self.batcher.reset();
        self.frame.flushes += 1;
        result
    }

    /// Finish the frame
    ///
    /// Flushes with the tracked blend and restores [`BlendMode::Normal`] on the
    /// device.
    ///
    /// # Errors
    /// [`RenderError::NotBegun`] outside a frame, or the flush failure. The
    /// frame is closed either way.
    pub fn end<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> RenderResult<()> {
        if self.state != FrameState::Begun {
            return Err(RenderError::NotBegun);
        }
        self.state = FrameState::Idle;

        let result = self.flush(device);
        device.set_blend_mode(BlendMode::Normal);

        log::debug!(
            "Frame {}: {} slots drawn, {} skipped, {} flushes ({} from blend changes)",
            self.frame_count,
            self.frame.slots_drawn,
            self.frame.slots_skipped,
            self.frame.flushes,
            self.frame.blend_flushes
        );
        self.frame_count += 1;
        result
    }

    /// Integer bounds of every region attachment in draw order
    ///
    /// Mesh attachments are not measured. `None` when the skeleton shows no
    /// region attachment.
    pub fn calc_bounding_rect(&self, skeleton: &Skeleton) -> SkeletonResult<Option<Rectangle>> {
        Ok(bounds::skeleton_bounds(skeleton)?.rectangle())
    }

    /// Bounds of the first slot in draw order named `slot_name` showing a region
    pub fn rect_for_slot(&self, skeleton: &Skeleton, slot_name: &str) -> SkeletonResult<Option<Rectangle>> {
        bounds::slot_bounds(skeleton, slot_name)
    }

    /// Raw float bounds; `f32::MAX`/`f32::MIN` sentinels when nothing was measured
    pub fn bounding_rect_raw(&self, skeleton: &Skeleton) -> SkeletonResult<Bounds> {
        bounds::skeleton_bounds(skeleton)
    }

    /// Whether a frame is open
    pub fn is_begun(&self) -> bool {
        self.state == FrameState::Begun
    }

    /// Renderer configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Whether colors are premultiplied by alpha
    pub fn premultiplied_alpha(&self) -> bool {
        self.config.premultiplied_alpha
    }

    /// Select the alpha convention; takes effect at the next `begin`
    pub fn set_premultiplied_alpha(&mut self, premultiplied_alpha: bool) {
        self.config.premultiplied_alpha = premultiplied_alpha;
    }

    /// Rasterizer state primed on every pass
    pub fn rasterizer_state(&self) -> RasterizerState {
        self.config.rasterizer
    }

    /// Set the rasterizer state; takes effect at the next `begin`
    pub fn set_rasterizer_state(&mut self, rasterizer: RasterizerState) {
        self.config.rasterizer = rasterizer;
    }

    /// Blend used for non-additive slots
    pub fn default_blend_mode(&self) -> BlendMode {
        self.default_blend_mode
    }

    /// Override the blend for non-additive slots until the next `begin`
    pub fn set_default_blend_mode(&mut self, blend_mode: BlendMode) {
        self.default_blend_mode = blend_mode;
    }

    /// Effect whose passes draw the batches
    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    /// Mutable effect access, e.g. to change the view transform
    pub fn effect_mut(&mut self) -> &mut Effect {
        &mut self.effect
    }

    /// Replace the effect
    pub fn set_effect(&mut self, effect: Effect) {
        self.effect = effect;
    }

    /// The batcher, for callers driving their own passes
    pub fn batcher(&self) -> &MeshBatcher {
        &self.batcher
    }

    /// Mutable batcher access
    pub fn batcher_mut(&mut self) -> &mut MeshBatcher {
        &mut self.batcher
    }

    /// Cumulative batching statistics
    pub fn stats(&self) -> &BatchStats {
        self.batcher.stats()
    }

    /// Counters of the current or last frame
    pub fn frame_stats(&self) -> &FrameStats {
        &self.frame
    }

    /// Frames completed with `end`
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Floats currently reserved for world-vertex computation
    pub fn scratch_capacity(&self) -> usize {
        self.world_vertices.len()
    }
}

impl Default for SkeletonRenderer {
    fn default() -> Self {
        Self::build(RendererConfig::default(), Effect::default())
    }
}
