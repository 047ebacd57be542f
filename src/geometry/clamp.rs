use crate::foundation::{
    core::{CropBox, CropRadii, LabelAnchor, Position, Shift},
    error::{TrackovlError, TrackovlResult},
};

/// Crop region around `center`, clamped edge by edge to a `width x height` image.
///
/// An edge that would leave the image has only its own radius shortened so it lands on the
/// boundary; the other three radii are kept. Near a border this yields an asymmetric box rather
/// than moving the center.
///
/// The center is truncated to integer pixels. A center outside `[0, width] x [0, height]`, or a
/// clamped region with zero area, is [`TrackovlError::OutOfBounds`].
pub fn clamp_crop(
    center: Position,
    radii: CropRadii,
    width: u32,
    height: u32,
) -> TrackovlResult<CropBox> {
    let cx = axis_center(center.x, width, "x")?;
    let cy = axis_center(center.y, height, "y")?;

    let (left, right) = clamp_axis(cx, radii.left, radii.right, width);
    let (top, bottom) = clamp_axis(cy, radii.top, radii.bottom, height);

    if left >= right || top >= bottom {
        return Err(TrackovlError::out_of_bounds(format!(
            "crop around ({cx}, {cy}) is empty within {width}x{height}"
        )));
    }

    Ok(CropBox {
        left,
        top,
        right,
        bottom,
    })
}

fn axis_center(v: f64, extent: u32, axis: &str) -> TrackovlResult<u32> {
    if !v.is_finite() || v < 0.0 || v > f64::from(extent) {
        return Err(TrackovlError::out_of_bounds(format!(
            "center {axis}={v} is outside [0, {extent}]"
        )));
    }
    Ok(v.floor() as u32)
}

fn clamp_axis(c: u32, before: u32, after: u32, extent: u32) -> (u32, u32) {
    let lo = c.saturating_sub(before);
    let hi = c.saturating_add(after).min(extent);
    (lo, hi)
}

/// Integer anchor for a label drawn at `pos`, offset by `shift`.
pub fn label_anchor(pos: Position, shift: Shift) -> LabelAnchor {
    LabelAnchor {
        x: (pos.x.floor() as i32).saturating_add(shift.dx),
        y: (pos.y.floor() as i32).saturating_add(shift.dy),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/clamp.rs"]
mod tests;
