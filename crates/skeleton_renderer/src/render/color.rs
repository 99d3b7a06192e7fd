//! Vertex color compositing

use crate::skeleton::{Color, Skeleton, Slot};

/// Combine skeleton, slot and attachment tints into one vertex color
///
/// Alpha is the product of the three alphas. RGB is the product of the three
/// RGBs, additionally scaled by that alpha when `premultiplied_alpha` is set.
pub fn composite_color(skeleton: &Skeleton, slot: &Slot, attachment: Color, premultiplied_alpha: bool) -> Color {
    composite(skeleton.color, slot.color, attachment, premultiplied_alpha)
}

/// [`composite_color`] over bare tints
pub fn composite(skeleton: Color, slot: Color, attachment: Color, premultiplied_alpha: bool) -> Color {
    let mut color = skeleton * slot * attachment;
    if premultiplied_alpha {
        color.r *= color.a;
        color.g *= color.a;
        color.b *= color.a;
    }
    color
}
