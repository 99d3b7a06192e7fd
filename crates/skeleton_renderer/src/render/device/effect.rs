//! Shader effect and its passes
//!
//! An [`Effect`] stands in for a compiled shader technique. The renderer never
//! touches shader code; it only sets the per-pass state (blend, rasterizer,
//! matrices) and hands each pass to the device before drawing.

use super::state::{BlendMode, RasterizerState};
use crate::foundation::math::{Mat4, Mat4Ext};

/// One pass of a shader technique with the fixed-function state it draws with
#[derive(Debug, Clone, PartialEq)]
pub struct EffectPass {
    /// Pass name, used for logging and by devices to select a pipeline
    pub name: String,
    /// Blend state applied when this pass draws
    pub blend_mode: BlendMode,
    /// Rasterizer state applied when this pass draws
    pub rasterizer: RasterizerState,
    /// Model transform
    pub world: Mat4,
    /// View transform
    pub view: Mat4,
    /// Projection transform
    pub projection: Mat4,
}

impl EffectPass {
    /// Create a pass with neutral state and the default 2D view
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blend_mode: BlendMode::Normal,
            rasterizer: RasterizerState::default(),
            world: Mat4::identity(),
            view: Mat4::view_2d(),
            projection: Mat4::identity(),
        }
    }

    /// Combined `projection * view * world`
    pub fn world_view_projection(&self) -> Mat4 {
        self.projection * self.view * self.world
    }
}

/// A shader technique: an ordered list of passes, each drawing the same geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    passes: Vec<EffectPass>,
}

impl Effect {
    /// Create an effect from its passes
    ///
    /// An effect without passes draws nothing; this is logged rather than rejected.
    pub fn new(passes: Vec<EffectPass>) -> Self {
        if passes.is_empty() {
            log::warn!("Effect created without passes; flushes will issue no draw calls");
        }
        Self { passes }
    }

    /// Single-pass textured, vertex-colored effect
    pub fn textured_vertex_color() -> Self {
        Self::new(vec![EffectPass::new("textured_vertex_color")])
    }

    /// Passes in application order
    pub fn passes(&self) -> &[EffectPass] {
        &self.passes
    }

    /// Mutable access to the passes
    pub fn passes_mut(&mut self) -> &mut [EffectPass] {
        &mut self.passes
    }

    /// Set the world transform on every pass
    pub fn set_world(&mut self, world: Mat4) {
        for pass in &mut self.passes {
            pass.world = world;
        }
    }

    /// Set the view transform on every pass
    pub fn set_view(&mut self, view: Mat4) {
        for pass in &mut self.passes {
            pass.view = view;
        }
    }

    /// Set the projection on every pass
    pub fn set_projection(&mut self, projection: Mat4) {
        for pass in &mut self.passes {
            pass.projection = projection;
        }
    }
}

impl Default for Effect {
    fn default() -> Self {
        Self::textured_vertex_color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    #[test]
    fn test_setters_reach_every_pass() {
        let mut effect = Effect::new(vec![EffectPass::new("a"), EffectPass::new("b")]);
        let world = Mat4::new_translation(&Vec3::new(3.0, 4.0, 0.0));
        effect.set_world(world);
        assert!(effect.passes().iter().all(|pass| pass.world == world));
    }

    #[test]
    fn test_new_pass_is_neutral() {
        let pass = EffectPass::new("main");
        assert_eq!(pass.blend_mode, BlendMode::Normal);
        assert_eq!(pass.world, Mat4::identity());
    }
}
