//! Skeleton viewer demo
//!
//! Builds a small hand-posed skeleton with every attachment kind, renders a
//! few frames into a recording device and logs what would have reached the GPU.
//!
//! Usage: `skeleton_viewer [renderer.toml | renderer.ron]`

use skeleton_renderer::prelude::*;
use skeleton_renderer::render::device::DeviceCommand;

const FRAMES: u32 = 4;
const VIEWPORT: (u32, u32) = (800, 600);

#[derive(Debug, thiserror::Error)]
enum ViewerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Skeleton error: {0}")]
    Skeleton(#[from] SkeletonError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

struct ViewerApp {
    renderer: SkeletonRenderer,
    device: RecordingDevice,
    skeleton: Skeleton,
    arm_bone: usize,
}

impl ViewerApp {
    fn new(config: RendererConfig) -> Result<Self, ViewerError> {
        let skeleton = build_demo_skeleton()?;
        let arm_bone = skeleton
            .bones()
            .iter()
            .position(|bone| bone.name == "arm")
            .unwrap_or(0);

        Ok(Self {
            renderer: SkeletonRenderer::new(config)?,
            device: RecordingDevice::new(VIEWPORT.0, VIEWPORT.1),
            skeleton,
            arm_bone,
        })
    }

    fn run(&mut self) -> Result<(), ViewerError> {
        for frame in 0..FRAMES {
            self.pose(frame);
            self.device.clear();

            self.renderer.begin(&self.device)?;
            self.renderer.draw(&mut self.device, &self.skeleton)?;
            self.renderer.end(&mut self.device)?;

            self.report(frame)?;
        }

        let stats = self.renderer.stats();
        log::info!(
            "Totals: {} items, {} regions, {} draw calls ({:.1} items/draw), {} texture switches",
            stats.items,
            stats.regions,
            stats.draw_calls,
            stats.avg_items_per_draw_call(),
            stats.texture_switches
        );
        Ok(())
    }

    /// Swing the arm a little each frame
    fn pose(&mut self, frame: u32) {
        if let Some(arm) = self.skeleton.bone_mut(self.arm_bone) {
            let angle = 15.0 * frame as f32;
            *arm = Bone::new("arm").with_world_transform(440.0, 260.0, angle, 1.0, 1.0);
        }
    }

    fn report(&self, frame: u32) -> Result<(), ViewerError> {
        let frame_stats = self.renderer.frame_stats();
        let draws: Vec<_> = self
            .device
            .draws()
            .map(|draw| format!("{:?}/{:?}", draw.texture, draw.blend_mode))
            .collect();
        log::info!(
            "Frame {frame}: {} draws [{}], {} slots drawn, {} skipped",
            self.device.draw_count(),
            draws.join(", "),
            frame_stats.slots_drawn,
            frame_stats.slots_skipped
        );

        let restored = matches!(
            self.device.commands().last(),
            Some(DeviceCommand::SetBlendMode(BlendMode::Normal))
        );
        log::debug!("Device blend restored to Normal: {restored}");

        match self.renderer.calc_bounding_rect(&self.skeleton)? {
            Some(rect) => log::info!(
                "Frame {frame}: bounds x={} y={} w={} h={}",
                rect.x,
                rect.y,
                rect.width,
                rect.height
            ),
            None => log::warn!("Frame {frame}: skeleton has no region attachments"),
        }

        if let Some(rect) = self.renderer.rect_for_slot(&self.skeleton, "head")? {
            log::info!("Frame {frame}: head at ({}, {})", rect.x, rect.y);
        }
        Ok(())
    }
}

fn build_demo_skeleton() -> Result<Skeleton, ViewerError> {
    let atlas = TextureHandle(1);
    let effects = TextureHandle(2);
    let left_half = AtlasRegion { u: 0.0, v: 0.0, u2: 0.5, v2: 1.0, rotate: false };
    let right_half = AtlasRegion { u: 0.5, v: 0.0, u2: 1.0, v2: 1.0, rotate: false };

    let mut skeleton = Skeleton::new();
    let root = skeleton.add_bone(Bone::new("root").with_world_transform(400.0, 300.0, 0.0, 1.0, 1.0));
    let head = skeleton.add_bone(Bone::new("head").with_world_transform(400.0, 200.0, 0.0, 1.0, 1.0));
    let arm = skeleton.add_bone(Bone::new("arm").with_world_transform(440.0, 260.0, 0.0, 1.0, 1.0));

    let cape = MeshAttachment::new(
        "cape",
        vec![-40.0, -20.0, 40.0, -20.0, -50.0, 80.0, 50.0, 80.0],
        vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        vec![0, 1, 2, 1, 3, 2],
    )?
    .with_texture(atlas, right_half)
    .with_color(Color::new(0.8, 0.1, 0.1, 1.0));
    let sway: Vec<f32> = vec![-40.0, -20.0, 40.0, -20.0, -60.0, 85.0, 40.0, 85.0];

    let sleeve = SkinnedMeshAttachment::new(
        "sleeve",
        vec![
            SkinnedVertex::new(vec![BoneWeight::new(root, 30.0, -30.0, 1.0)]),
            SkinnedVertex::new(vec![
                BoneWeight::new(root, 45.0, -30.0, 0.5),
                BoneWeight::new(arm, 5.0, 10.0, 0.5),
            ]),
            SkinnedVertex::new(vec![BoneWeight::new(arm, 40.0, 0.0, 1.0)]),
        ],
        vec![0.0, 0.0, 1.0, 0.0, 0.5, 1.0],
        vec![0, 1, 2],
    )?
    .with_texture(atlas, right_half);

    skeleton.add_slot(Slot::new("cape", root).with_attachment(cape).with_deform(sway))?;
    skeleton.add_slot(
        Slot::new("body", root)
            .with_attachment(RegionAttachment::new("body", 80.0, 120.0).with_texture(atlas, left_half)),
    )?;
    skeleton.add_slot(Slot::new("sleeve", root).with_attachment(sleeve))?;
    skeleton.add_slot(
        Slot::new("aura", root)
            .with_attachment(RegionAttachment::new("aura", 160.0, 160.0).with_texture(effects, AtlasRegion::FULL))
            .with_blend_mode(SlotBlendMode::Additive)
            .with_color(Color::new(0.4, 0.6, 1.0, 0.5)),
    )?;
    skeleton.add_slot(
        Slot::new("head", head)
            .with_attachment(RegionAttachment::new("head", 48.0, 48.0).with_texture(atlas, left_half)),
    )?;
    skeleton.add_slot(
        Slot::new("hand", arm).with_attachment(
            RegionAttachment::new("hand", 20.0, 20.0)
                .with_position(40.0, 0.0)
                .with_rotation(-30.0)
                .with_texture(atlas, left_half),
        ),
    )?;
    skeleton.add_slot(Slot::new("weapon", arm))?;

    Ok(skeleton)
}

fn load_config() -> Result<RendererConfig, ViewerError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading renderer config from {path}");
            RendererConfig::load_from_file(&path)?
        }
        None => RendererConfig::default().with_premultiplied_alpha(true),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    skeleton_renderer::foundation::logging::init_with_filter("info");

    log::info!("Starting skeleton viewer");

    let config = load_config()?;
    log::info!(
        "Renderer config: premultiplied_alpha={}, cull={:?}, region capacity {}v/{}i",
        config.premultiplied_alpha,
        config.rasterizer.cull_mode,
        config.batcher.max_vertices_per_region,
        config.batcher.max_indices_per_region
    );

    let mut app = ViewerApp::new(config)?;
    match app.run() {
        Ok(()) => {
            log::info!("Skeleton viewer completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Skeleton viewer failed: {:?}", e);
            Err(e.into())
        }
    }
}
