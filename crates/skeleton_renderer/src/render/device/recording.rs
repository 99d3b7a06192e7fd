//! In-memory device that records every call it receives
//!
//! Used as the device sink in tests and by the viewer app to inspect exactly
//! what a frame would have submitted to a GPU.

use super::{BlendMode, DeviceError, DeviceResult, DrawCall, EffectPass, GraphicsDevice, RasterizerState, TextureHandle, Viewport};
use crate::render::batching::MeshVertex;

/// A draw call as the device saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    /// Texture bound for the draw
    pub texture: TextureHandle,
    /// Blend state of the pass applied before the draw
    pub blend_mode: BlendMode,
    /// Name of the pass applied before the draw
    pub pass_name: String,
    /// Number of vertices in the region buffer the draw referenced
    pub region_vertex_count: usize,
    /// Indices issued by this draw, already offset into the region
    pub indices: Vec<u16>,
    /// Vertices referenced by the issued indices, in index order
    pub triangle_vertices: Vec<MeshVertex>,
}

/// Device side effect, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// `set_blend_mode` was called
    SetBlendMode(BlendMode),
    /// `apply_pass` was called
    ApplyPass {
        /// Pass name
        name: String,
        /// Pass blend state
        blend_mode: BlendMode,
        /// Pass rasterizer state
        rasterizer: RasterizerState,
    },
    /// `draw_indexed` was called
    Draw(RecordedDraw),
}

/// Graphics device that records commands instead of rendering
#[derive(Debug)]
pub struct RecordingDevice {
    viewport: Viewport,
    commands: Vec<DeviceCommand>,
    blend_mode: BlendMode,
    current_pass: Option<(String, BlendMode)>,
    fail_after_draws: Option<usize>,
    draws_issued: usize,
}

impl RecordingDevice {
    /// Create a recording device with the given viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            commands: Vec::new(),
            blend_mode: BlendMode::Normal,
            current_pass: None,
            fail_after_draws: None,
            draws_issued: 0,
        }
    }

    /// Make every draw after the first `count` fail with [`DeviceError::DrawFailed`]
    pub fn with_draw_failure_after(mut self, count: usize) -> Self {
        self.fail_after_draws = Some(count);
        self
    }

    /// All commands in call order
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Recorded draws in call order
    pub fn draws(&self) -> impl Iterator<Item = &RecordedDraw> {
        self.commands.iter().filter_map(|command| match command {
            DeviceCommand::Draw(draw) => Some(draw),
            _ => None,
        })
    }

    /// Number of draw calls recorded
    pub fn draw_count(&self) -> usize {
        self.draws().count()
    }

    /// Number of `apply_pass` calls recorded
    pub fn pass_applications(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DeviceCommand::ApplyPass { .. }))
            .count()
    }

    /// Device-wide blend state last set through `set_blend_mode`
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.commands.clear();
        self.current_pass = None;
        self.draws_issued = 0;
    }
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl GraphicsDevice for RecordingDevice {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
        self.commands.push(DeviceCommand::SetBlendMode(mode));
    }

    fn apply_pass(&mut self, pass: &EffectPass) -> DeviceResult<()> {
        self.current_pass = Some((pass.name.clone(), pass.blend_mode));
        self.commands.push(DeviceCommand::ApplyPass {
            name: pass.name.clone(),
            blend_mode: pass.blend_mode,
            rasterizer: pass.rasterizer,
        });
        Ok(())
    }

    fn draw_indexed(&mut self, call: &DrawCall<'_>) -> DeviceResult<()> {
        if let Some(limit) = self.fail_after_draws {
            if self.draws_issued >= limit {
                return Err(DeviceError::DrawFailed(format!(
                    "recording device configured to fail after {limit} draws"
                )));
            }
        }

        let (pass_name, blend_mode) = self
            .current_pass
            .clone()
            .ok_or_else(|| DeviceError::StateRejected("draw issued before any pass was applied".to_string()))?;

        let indices = call.index_slice().to_vec();
        let mut triangle_vertices = Vec::with_capacity(indices.len());
        for &index in &indices {
            let vertex = call.vertices.get(usize::from(index)).ok_or_else(|| {
                DeviceError::DrawFailed(format!(
                    "index {index} out of range for {} vertices",
                    call.vertices.len()
                ))
            })?;
            triangle_vertices.push(*vertex);
        }

        self.draws_issued += 1;
        self.commands.push(DeviceCommand::Draw(RecordedDraw {
            texture: call.texture,
            blend_mode,
            pass_name,
            region_vertex_count: call.vertices.len(),
            indices,
            triangle_vertices,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32) -> MeshVertex {
        MeshVertex {
            position: [x, 0.0, 0.0],
            ..MeshVertex::default()
        }
    }

    #[test]
    fn test_draw_without_pass_is_rejected() {
        let mut device = RecordingDevice::default();
        let vertices = [vertex(0.0), vertex(1.0), vertex(2.0)];
        let indices = [0, 1, 2];
        let call = DrawCall {
            vertices: &vertices,
            indices: &indices,
            first_index: 0,
            index_count: 3,
            texture: TextureHandle(1),
        };

        let result = device.draw_indexed(&call);
        assert!(matches!(result, Err(DeviceError::StateRejected(_))));
    }

    #[test]
    fn test_records_resolved_triangle_vertices() {
        let mut device = RecordingDevice::default();
        let vertices = [vertex(0.0), vertex(1.0), vertex(2.0), vertex(3.0)];
        let indices = [0, 1, 2, 1, 3, 2];
        let call = DrawCall {
            vertices: &vertices,
            indices: &indices,
            first_index: 3,
            index_count: 3,
            texture: TextureHandle(7),
        };

        device.apply_pass(&EffectPass::new("main")).unwrap();
        device.draw_indexed(&call).unwrap();

        let draw = device.draws().next().unwrap();
        assert_eq!(draw.indices, vec![1, 3, 2]);
        assert_eq!(draw.triangle_vertices[1].position[0], 3.0);
        assert_eq!(draw.texture, TextureHandle(7));
        assert_eq!(draw.pass_name, "main");
    }

    #[test]
    fn test_failure_injection() {
        let mut device = RecordingDevice::default().with_draw_failure_after(0);
        let vertices = [vertex(0.0), vertex(1.0), vertex(2.0)];
        let indices = [0, 1, 2];
        let call = DrawCall {
            vertices: &vertices,
            indices: &indices,
            first_index: 0,
            index_count: 3,
            texture: TextureHandle(1),
        };

        device.apply_pass(&EffectPass::new("main")).unwrap();
        assert!(matches!(device.draw_indexed(&call), Err(DeviceError::DrawFailed(_))));
        assert_eq!(device.draw_count(), 0);
    }
}
