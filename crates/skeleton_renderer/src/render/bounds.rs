//! Screen-space bounds of drawn geometry
//!
//! Only region attachments contribute; mesh attachments are drawn but never
//! measured.

use crate::skeleton::{Attachment, RegionAttachment, Skeleton, SkeletonResult, Slot};

/// Integer rectangle, as used for screen-space hit boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rectangle {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Rectangle {
    /// Create a rectangle
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether the point lies inside
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Running float min/max over world points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest x and y seen
    pub min: [f32; 2],
    /// Largest x and y seen
    pub max: [f32; 2],
}

impl Bounds {
    /// Bounds containing nothing: `f32::MAX` minimum, `f32::MIN` maximum
    pub const EMPTY: Self = Self {
        min: [f32::MAX, f32::MAX],
        max: [f32::MIN, f32::MIN],
    };

    /// Whether no point has been added
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    /// Grow to include one point
    pub fn add_point(&mut self, x: f32, y: f32) {
        self.min[0] = self.min[0].min(x);
        self.min[1] = self.min[1].min(y);
        self.max[0] = self.max[0].max(x);
        self.max[1] = self.max[1].max(y);
    }

    /// Grow to include interleaved `x, y` pairs
    pub fn add_vertices(&mut self, vertices: &[f32]) {
        for point in vertices.chunks_exact(2) {
            self.add_point(point[0], point[1]);
        }
    }

    /// Truncating conversion to an integer rectangle
    pub fn to_rectangle(&self) -> Rectangle {
        Rectangle::new(
            self.min[0] as i32,
            self.min[1] as i32,
            (self.max[0] - self.min[0]) as i32,
            (self.max[1] - self.min[1]) as i32,
        )
    }

    /// [`to_rectangle`](Self::to_rectangle), or `None` when empty
    pub fn rectangle(&self) -> Option<Rectangle> {
        (!self.is_empty()).then(|| self.to_rectangle())
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

fn add_region(bounds: &mut Bounds, skeleton: &Skeleton, slot: &Slot, region: &RegionAttachment) -> SkeletonResult<()> {
    let mut corners = [0.0; 8];
    region.compute_world_vertices(skeleton.bone(slot.bone)?, &mut corners);
    bounds.add_vertices(&corners);
    Ok(())
}

/// Float bounds of every region attachment, visited in draw order
///
/// Returns [`Bounds::EMPTY`] when the skeleton shows no region attachment.
pub fn skeleton_bounds(skeleton: &Skeleton) -> SkeletonResult<Bounds> {
    let mut bounds = Bounds::EMPTY;
    for slot in skeleton.draw_order() {
        if let Some(Attachment::Region(region)) = &slot.attachment {
            add_region(&mut bounds, skeleton, slot, region)?;
        }
    }
    Ok(bounds)
}

/// Bounds of the first slot named `slot_name` that shows a region attachment
pub fn slot_bounds(skeleton: &Skeleton, slot_name: &str) -> SkeletonResult<Option<Rectangle>> {
    let found = skeleton.draw_order().find_map(|slot| match &slot.attachment {
        Some(Attachment::Region(region)) if slot.name == slot_name => Some((slot, region)),
        _ => None,
    });

    match found {
        Some((slot, region)) => {
            let mut bounds = Bounds::EMPTY;
            add_region(&mut bounds, skeleton, slot, region)?;
            Ok(bounds.rectangle())
        }
        None => Ok(None),
    }
}
