use crate::{
    foundation::{
        core::parse_int_list,
        error::{TrackovlError, TrackovlResult},
    },
    raster::frame::ColorMode,
};

/// Fill color as supplied by the caller, before it is checked against a frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FillSpec {
    /// Use the color chosen by a [`DefaultColorPolicy`].
    #[default]
    Default,
    /// Raw channel values: one for grayscale, three for RGB.
    Channels(Vec<i64>),
}

impl FillSpec {
    /// Wrap raw channels; a non-empty list made only of `-1` is the default sentinel.
    pub fn from_channels(channels: Vec<i64>) -> Self {
        if !channels.is_empty() && channels.iter().all(|c| *c == -1) {
            Self::Default
        } else {
            Self::Channels(channels)
        }
    }

    /// Parse `128`, `(255,255,255)`, `255 0 0`, `-1`, ...
    pub fn parse(raw: &str) -> TrackovlResult<Self> {
        Ok(Self::from_channels(parse_int_list(raw)?))
    }

    /// Reject specs no frame could accept, before any frame is opened.
    pub fn check_shape(&self) -> TrackovlResult<()> {
        match self {
            Self::Default => Ok(()),
            Self::Channels(c)
                if matches!(c.len(), 1 | 3) && c.iter().all(|v| (0..=255).contains(v)) =>
            {
                Ok(())
            }
            Self::Channels(c) => Err(TrackovlError::color_format(format!(
                "color must be 1 or 3 integers between 0 and 255, got {c:?}"
            ))),
        }
    }
}

/// A fill color known to match the frame it will be drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Fill {
    /// Grayscale intensity.
    Luma(u8),
    /// RGB triple.
    Rgb([u8; 3]),
}

/// Which color [`FillSpec::Default`] stands for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DefaultColorPolicy {
    /// Full intensity; readable over dark fluorescence backgrounds.
    #[default]
    White,
    /// Zero intensity.
    Black,
}

impl DefaultColorPolicy {
    /// The default fill for frames in `mode`.
    pub fn resolve(self, mode: ColorMode) -> TrackovlResult<Fill> {
        let v = match self {
            Self::White => u8::MAX,
            Self::Black => 0,
        };
        match mode {
            ColorMode::Grayscale => Ok(Fill::Luma(v)),
            ColorMode::Rgb => Ok(Fill::Rgb([v; 3])),
            ColorMode::Palette | ColorMode::Native => Err(not_normalized(mode)),
        }
    }
}

/// Check `spec` against `mode`.
///
/// Grayscale frames take a single integer in `[0, 255]`; RGB frames take three. Palette frames
/// and native frames are rejected: they must be normalized first.
pub fn validate_fill(
    mode: ColorMode,
    spec: &FillSpec,
    policy: DefaultColorPolicy,
) -> TrackovlResult<Fill> {
    let channels = match spec {
        FillSpec::Default => return policy.resolve(mode),
        FillSpec::Channels(c) => c,
    };

    let as_u8 = |v: i64| u8::try_from(v).ok();
    match mode {
        ColorMode::Grayscale => match channels.as_slice() {
            [v] => as_u8(*v).map(Fill::Luma),
            _ => None,
        }
        .ok_or_else(|| {
            TrackovlError::color_format(format!(
                "grayscale frames need a single integer between 0 and 255, got {channels:?}"
            ))
        }),
        ColorMode::Rgb => match channels.as_slice() {
            [r, g, b] => match (as_u8(*r), as_u8(*g), as_u8(*b)) {
                (Some(r), Some(g), Some(b)) => Some(Fill::Rgb([r, g, b])),
                _ => None,
            },
            _ => None,
        }
        .ok_or_else(|| {
            TrackovlError::color_format(format!(
                "RGB frames need 3 integers between 0 and 255, got {channels:?}"
            ))
        }),
        ColorMode::Palette | ColorMode::Native => Err(not_normalized(mode)),
    }
}

fn not_normalized(mode: ColorMode) -> TrackovlError {
    TrackovlError::color_format(format!("{mode} frames must be normalized before drawing"))
}

#[cfg(test)]
#[path = "../../tests/unit/render/color.rs"]
mod tests;
