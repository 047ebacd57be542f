use std::path::Path;

use anyhow::Context as _;
use image::{DynamicImage, GrayImage, RgbImage};

use crate::foundation::{
    core::CropBox,
    error::{TrackovlError, TrackovlResult},
};

/// Color space of a frame as seen by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ColorMode {
    /// 8-bit single channel.
    Grayscale,
    /// 8-bit three channel.
    Rgb,
    /// 8-bit indices into an RGB palette. Must be normalized to [`ColorMode::Rgb`] before drawing.
    Palette,
    /// Any other decoded layout (16-bit, alpha, ...). Must be normalized before drawing.
    Native,
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Grayscale => "grayscale",
            Self::Rgb => "RGB",
            Self::Palette => "palette",
            Self::Native => "native",
        })
    }
}

/// Pixel storage behind an [`ImageFrame`].
#[derive(Clone, Debug, PartialEq)]
pub enum Raster {
    /// Grayscale pixels.
    Gray(GrayImage),
    /// RGB pixels.
    Rgb(RgbImage),
    /// Indexed pixels with their palette.
    Palette {
        /// One palette index per pixel.
        indices: GrayImage,
        /// Palette entries addressed by `indices`.
        palette: Vec<[u8; 3]>,
    },
    /// Decoded image kept in its own layout, so crops are written back with the same depth and
    /// channels.
    Native(DynamicImage),
}

/// A decoded raster image: loaded, annotated or cropped, then saved.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageFrame {
    raster: Raster,
}

impl ImageFrame {
    /// Wrap a grayscale image.
    pub fn gray(img: GrayImage) -> Self {
        Self {
            raster: Raster::Gray(img),
        }
    }

    /// Wrap an RGB image.
    pub fn rgb(img: RgbImage) -> Self {
        Self {
            raster: Raster::Rgb(img),
        }
    }

    /// Build an indexed frame; every index must address an entry of `palette`.
    pub fn palette(indices: GrayImage, palette: Vec<[u8; 3]>) -> TrackovlResult<Self> {
        if let Some(max) = indices.as_raw().iter().max() {
            if usize::from(*max) >= palette.len() {
                return Err(TrackovlError::validation(format!(
                    "palette index {max} out of range for {} entries",
                    palette.len()
                )));
            }
        }
        Ok(Self {
            raster: Raster::Palette { indices, palette },
        })
    }

    /// Adopt a decoded image.
    ///
    /// 8-bit luma and 8-bit RGB map to their drawing modes; every other layout is kept as
    /// [`Raster::Native`] until [`normalize`](Self::normalize) reduces it.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let raster = match img {
            DynamicImage::ImageLuma8(g) => Raster::Gray(g),
            DynamicImage::ImageRgb8(c) => Raster::Rgb(c),
            other => Raster::Native(other),
        };
        Self { raster }
    }

    /// Decode an image file.
    pub fn open(path: &Path) -> TrackovlResult<Self> {
        let img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
        Ok(Self::from_dynamic(img))
    }

    /// Borrow the pixel storage.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Mutably borrow the pixel storage.
    pub fn raster_mut(&mut self) -> &mut Raster {
        &mut self.raster
    }

    /// Current color mode.
    pub fn mode(&self) -> ColorMode {
        match self.raster {
            Raster::Gray(_) => ColorMode::Grayscale,
            Raster::Rgb(_) => ColorMode::Rgb,
            Raster::Palette { .. } => ColorMode::Palette,
            Raster::Native(_) => ColorMode::Native,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        match &self.raster {
            Raster::Gray(g) => g.width(),
            Raster::Rgb(c) => c.width(),
            Raster::Palette { indices, .. } => indices.width(),
            Raster::Native(img) => img.width(),
        }
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        match &self.raster {
            Raster::Gray(g) => g.height(),
            Raster::Rgb(c) => c.height(),
            Raster::Palette { indices, .. } => indices.height(),
            Raster::Native(img) => img.height(),
        }
    }

    /// Bring the frame into a drawing mode: palette frames expand to RGB, native luma layouts
    /// reduce to 8-bit grayscale and other native layouts to 8-bit RGB. Grayscale and RGB frames
    /// are returned as is.
    pub fn normalize(self) -> Self {
        match self.raster {
            Raster::Palette { indices, palette } => {
                let rgb = RgbImage::from_fn(indices.width(), indices.height(), |x, y| {
                    let i = usize::from(indices.get_pixel(x, y).0[0]);
                    image::Rgb(palette.get(i).copied().unwrap_or([0, 0, 0]))
                });
                Self::rgb(rgb)
            }
            Raster::Native(
                luma @ (DynamicImage::ImageLuma16(_)
                | DynamicImage::ImageLumaA8(_)
                | DynamicImage::ImageLumaA16(_)),
            ) => Self::gray(luma.to_luma8()),
            Raster::Native(other) => Self::rgb(other.to_rgb8()),
            raster => Self { raster },
        }
    }

    /// Copy out the region `b`, which must lie inside the frame. The layout is kept.
    pub fn crop(&self, b: CropBox) -> TrackovlResult<Self> {
        let inside = b.left < b.right
            && b.top < b.bottom
            && b.right <= self.width()
            && b.bottom <= self.height();
        if !inside {
            return Err(TrackovlError::out_of_bounds(format!(
                "crop box {b:?} does not fit {}x{}",
                self.width(),
                self.height()
            )));
        }
        let (x, y, w, h) = (b.left, b.top, b.width(), b.height());
        let raster = match &self.raster {
            Raster::Gray(g) => Raster::Gray(image::imageops::crop_imm(g, x, y, w, h).to_image()),
            Raster::Rgb(c) => Raster::Rgb(image::imageops::crop_imm(c, x, y, w, h).to_image()),
            Raster::Palette { indices, palette } => Raster::Palette {
                indices: image::imageops::crop_imm(indices, x, y, w, h).to_image(),
                palette: palette.clone(),
            },
            Raster::Native(img) => Raster::Native(img.crop_imm(x, y, w, h)),
        };
        Ok(Self { raster })
    }

    /// Encode to `path`, creating parent directories. The format follows the extension.
    ///
    /// Palette frames are written expanded to RGB; native frames keep their layout when the
    /// format supports it.
    pub fn save(&self, path: &Path) -> TrackovlResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let res = match &self.raster {
            Raster::Gray(g) => g.save(path),
            Raster::Rgb(c) => c.save(path),
            Raster::Native(img) => img.save(path),
            Raster::Palette { .. } => return self.clone().normalize().save(path),
        };
        res.with_context(|| format!("write image '{}'", path.display()))?;
        Ok(())
    }

    /// Gray value at `(x, y)`, for grayscale frames.
    pub fn pixel_luma(&self, x: u32, y: u32) -> Option<u8> {
        match &self.raster {
            Raster::Gray(g) if x < g.width() && y < g.height() => Some(g.get_pixel(x, y).0[0]),
            _ => None,
        }
    }

    /// RGB value at `(x, y)`, for RGB and palette frames.
    pub fn pixel_rgb(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        match &self.raster {
            Raster::Rgb(c) if x < c.width() && y < c.height() => Some(c.get_pixel(x, y).0),
            Raster::Palette { indices, palette } if x < indices.width() && y < indices.height() => {
                palette
                    .get(usize::from(indices.get_pixel(x, y).0[0]))
                    .copied()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/frame.rs"]
mod tests;
