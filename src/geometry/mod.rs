//! Pixel geometry: crop boxes clamped to the frame and label anchors.

pub(crate) mod clamp;
