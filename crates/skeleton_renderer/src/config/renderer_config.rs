//! Renderer and batcher configuration

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::render::device::RasterizerState;

/// Default vertex capacity of one batch region (`i16::MAX`, the signed 16-bit index range)
pub const MAX_REGION_VERTICES: usize = i16::MAX as usize;

/// Largest vertex capacity addressable with 16-bit indices
const INDEXABLE_VERTICES: usize = u16::MAX as usize + 1;

/// Largest index capacity, three indices per addressable vertex
const INDEXABLE_INDICES: usize = INDEXABLE_VERTICES * 3;

/// Capacity of the fixed-size buffer regions the mesh batcher fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatcherConfig {
    /// Maximum vertices in one region
    pub max_vertices_per_region: usize,
    /// Maximum triangle indices in one region
    pub max_indices_per_region: usize,
}

impl BatcherConfig {
    /// Create a batcher configuration with explicit capacities
    pub fn with_capacity(max_vertices_per_region: usize, max_indices_per_region: usize) -> Self {
        Self {
            max_vertices_per_region,
            max_indices_per_region,
        }
    }

    /// Validate the configuration
    ///
    /// A region must hold at least one quad, and every vertex in it must be
    /// addressable by a 16-bit index.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_vertices_per_region < 4 {
            return Err(ConfigError::Invalid(format!(
                "max_vertices_per_region must be at least 4, got {}",
                self.max_vertices_per_region
            )));
        }

        if self.max_vertices_per_region > INDEXABLE_VERTICES {
            return Err(ConfigError::Invalid(format!(
                "max_vertices_per_region must not exceed {INDEXABLE_VERTICES}, got {}",
                self.max_vertices_per_region
            )));
        }

        if self.max_indices_per_region < 6 {
            return Err(ConfigError::Invalid(format!(
                "max_indices_per_region must be at least 6, got {}",
                self.max_indices_per_region
            )));
        }

        if self.max_indices_per_region > INDEXABLE_INDICES {
            return Err(ConfigError::Invalid(format!(
                "max_indices_per_region must not exceed {INDEXABLE_INDICES}, got {}",
                self.max_indices_per_region
            )));
        }

        Ok(())
    }

    /// Nearest configuration that passes [`validate`](Self::validate)
    pub fn clamped(&self) -> Self {
        Self::with_capacity(
            self.max_vertices_per_region.clamp(4, INDEXABLE_VERTICES),
            self.max_indices_per_region.clamp(6, INDEXABLE_INDICES),
        )
    }
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self::with_capacity(MAX_REGION_VERTICES, MAX_REGION_VERTICES * 3)
    }
}

/// # Skeleton Renderer Configuration
///
/// The renderer has exactly two behavioural switches: the alpha convention and
/// the rasterizer state handed to the device. Batcher capacities mirror the
/// device's vertex/index buffer limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Whether textures and vertex colors use premultiplied alpha
    pub premultiplied_alpha: bool,
    /// Rasterizer state passed through to every effect pass
    pub rasterizer: RasterizerState,
    /// Region capacities for the mesh batcher
    pub batcher: BatcherConfig,
}

impl RendererConfig {
    /// Create the default configuration (straight alpha, no culling)
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the alpha convention
    pub fn with_premultiplied_alpha(mut self, premultiplied_alpha: bool) -> Self {
        self.premultiplied_alpha = premultiplied_alpha;
        self
    }

    /// Set the rasterizer state
    pub fn with_rasterizer(mut self, rasterizer: RasterizerState) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Set batcher capacities
    pub fn with_batcher(mut self, batcher: BatcherConfig) -> Self {
        self.batcher = batcher;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.batcher.validate()
    }
}

impl Config for RendererConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::CullMode;

    #[test]
    fn test_default_is_valid() {
        let config = RendererConfig::default();
        assert!(!config.premultiplied_alpha);
        assert_eq!(config.batcher.max_vertices_per_region, 32767);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_region_without_room_for_a_quad() {
        let config = RendererConfig::new().with_batcher(BatcherConfig::with_capacity(3, 6));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_region_beyond_index_range() {
        let config = BatcherConfig::with_capacity(70_000, 6);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unbounded_index_capacity() {
        let config = BatcherConfig::with_capacity(1024, usize::MAX);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_clamped_is_valid() {
        for config in [
            BatcherConfig::with_capacity(0, 0),
            BatcherConfig::with_capacity(usize::MAX, usize::MAX),
            BatcherConfig::with_capacity(3, 1_000_000),
        ] {
            assert!(config.clamped().validate().is_ok());
        }

        assert_eq!(BatcherConfig::with_capacity(0, 0).clamped(), BatcherConfig::with_capacity(4, 6));
        assert_eq!(
            BatcherConfig::with_capacity(usize::MAX, usize::MAX).clamped(),
            BatcherConfig::with_capacity(65_536, 196_608)
        );
        assert_eq!(BatcherConfig::default().clamped(), BatcherConfig::default());
    }

    #[test]
    fn test_parses_partial_toml() {
        let config = RendererConfig::from_toml_str(
            "premultiplied_alpha = true\n\n[rasterizer]\ncull_mode = \"Clockwise\"\n",
        )
        .unwrap();

        assert!(config.premultiplied_alpha);
        assert_eq!(config.rasterizer.cull_mode, CullMode::Clockwise);
        assert_eq!(config.batcher, BatcherConfig::default());
    }

    #[test]
    fn test_parses_ron() {
        let config = RendererConfig::from_ron_str(
            "(premultiplied_alpha: false, batcher: (max_vertices_per_region: 1024, max_indices_per_region: 4096))",
        )
        .unwrap();

        assert_eq!(config.batcher.max_vertices_per_region, 1024);
        assert_eq!(config.batcher.max_indices_per_region, 4096);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = RendererConfig::default().save_to_file("renderer.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = std::env::temp_dir().join("skeleton_renderer_config_test.toml");
        let path = path.to_string_lossy().into_owned();
        let config = RendererConfig::new().with_premultiplied_alpha(true);

        config.save_to_file(&path).unwrap();
        let loaded = RendererConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
