//! Fixed-function device state carried by effect passes

use serde::{Deserialize, Serialize};

/// Blend state applied by the device when drawing a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Neutral device state, restored after a renderer pass ends
    #[default]
    Normal,
    /// `src * src_alpha + dst` for glowing slots
    Additive,
    /// `src + dst * (1 - src_alpha)`, colors already scaled by alpha
    PremultipliedAlpha,
    /// `src * src_alpha + dst * (1 - src_alpha)`, straight colors
    StraightAlpha,
}

impl BlendMode {
    /// Default blend for skeleton geometry given the color convention
    pub fn for_alpha_convention(premultiplied_alpha: bool) -> Self {
        if premultiplied_alpha {
            BlendMode::PremultipliedAlpha
        } else {
            BlendMode::StraightAlpha
        }
    }
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// No culling
    #[default]
    None,
    /// Cull clockwise faces
    Clockwise,
    /// Cull counter-clockwise faces
    CounterClockwise,
}

/// Rasterizer settings passed through to the device untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterizerState {
    /// Which triangle winding to discard
    pub cull_mode: CullMode,
    /// Whether the device scissor rectangle clips output
    pub scissor_test: bool,
}

impl RasterizerState {
    /// No culling, no scissor. Skeleton attachments may be mirrored by
    /// negative bone scale, so both windings must survive.
    pub const CULL_NONE: Self = Self {
        cull_mode: CullMode::None,
        scissor_test: false,
    };

    /// Set the cull mode
    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    /// Enable or disable scissor testing
    pub fn with_scissor_test(mut self, enabled: bool) -> Self {
        self.scissor_test = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_blend_follows_alpha_convention() {
        assert_eq!(BlendMode::for_alpha_convention(true), BlendMode::PremultipliedAlpha);
        assert_eq!(BlendMode::for_alpha_convention(false), BlendMode::StraightAlpha);
    }

    #[test]
    fn test_default_rasterizer_culls_nothing() {
        assert_eq!(RasterizerState::default(), RasterizerState::CULL_NONE);
    }
}
