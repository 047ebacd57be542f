use std::{path::Path, sync::Arc};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::LabelAnchor,
        error::{TrackovlError, TrackovlResult},
    },
    raster::frame::{ImageFrame, Raster},
    render::{color::Fill, painter::LabelPainter},
};

/// Label size used when none is configured.
pub const DEFAULT_FONT_SIZE_PX: f32 = 10.0;

const PREFERRED_FAMILY: &str = "DejaVu Sans";

/// [`LabelPainter`] backed by `usvg` text layout and `resvg` rasterization.
///
/// Each label becomes a one-element SVG document; its alpha coverage is blended into the frame
/// with the label fill.
#[derive(Clone)]
pub struct SvgLabelPainter {
    fontdb: Arc<usvg::fontdb::Database>,
    family: String,
    size_px: f32,
}

impl std::fmt::Debug for SvgLabelPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgLabelPainter")
            .field("faces", &self.fontdb.len())
            .field("family", &self.family)
            .field("size_px", &self.size_px)
            .finish()
    }
}

impl SvgLabelPainter {
    /// Use the fonts installed on this machine, preferring DejaVu Sans.
    pub fn with_system_fonts(size_px: f32) -> TrackovlResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Self::from_database(db, size_px)
    }

    /// Use a single TrueType/OpenType font file.
    pub fn from_font_file(path: &Path, size_px: f32) -> TrackovlResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_font_file(path)
            .with_context(|| format!("load font '{}'", path.display()))?;
        Self::from_database(db, size_px)
    }

    /// Use an in-memory font.
    pub fn from_font_data(bytes: Vec<u8>, size_px: f32) -> TrackovlResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(bytes);
        Self::from_database(db, size_px)
    }

    fn from_database(db: usvg::fontdb::Database, size_px: f32) -> TrackovlResult<Self> {
        if !(size_px.is_finite() && size_px > 0.0) {
            return Err(TrackovlError::validation(format!(
                "font size must be positive, got {size_px}"
            )));
        }
        let family = pick_family(&db).ok_or_else(|| {
            TrackovlError::validation("no usable font face found for label rendering")
        })?;
        tracing::debug!(faces = db.len(), family = %family, size_px, "label font ready");
        Ok(Self {
            fontdb: Arc::new(db),
            family,
            size_px,
        })
    }

    /// Font size in pixels.
    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    /// Font family every label is set in.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Rasterize `text` and return `(width, height, coverage)`, coverage being row-major alpha.
    fn rasterize(&self, text: &str) -> TrackovlResult<(u32, u32, Vec<u8>)> {
        let chars = text.chars().count() as f32;
        let w = (self.size_px * 0.7 * chars + self.size_px).ceil().max(1.0) as u32;
        let h = (self.size_px * 1.3).ceil().max(1.0) as u32;
        let baseline = self.size_px * 0.95;

        let svg = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}"><text x="0" y="{baseline}" font-family="{family}" font-size="{size}" fill="#ffffff">{text}</text></svg>"##,
            family = escape_xml(&self.family),
            size = self.size_px,
            text = escape_xml(text),
        );

        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts).context("parse label svg")?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| TrackovlError::validation("failed to allocate label pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        let coverage = pixmap.data().chunks_exact(4).map(|px| px[3]).collect();
        Ok((w, h, coverage))
    }
}

impl LabelPainter for SvgLabelPainter {
    fn draw_label(
        &self,
        frame: &mut ImageFrame,
        anchor: LabelAnchor,
        text: &str,
        fill: Fill,
    ) -> TrackovlResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let (w, h, coverage) = self.rasterize(text)?;
        blend_coverage(frame, anchor, w, h, &coverage, fill)
    }
}

fn pick_family(db: &usvg::fontdb::Database) -> Option<String> {
    let mut first = None;
    for face in db.faces() {
        for (name, _) in &face.families {
            if name == PREFERRED_FAMILY {
                return Some(name.clone());
            }
            if first.is_none() {
                first = Some(name.clone());
            }
        }
    }
    first
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Blend a `w`x`h` coverage mask placed at `anchor` into `frame`, clipping at the frame edges.
pub(crate) fn blend_coverage(
    frame: &mut ImageFrame,
    anchor: LabelAnchor,
    w: u32,
    h: u32,
    coverage: &[u8],
    fill: Fill,
) -> TrackovlResult<()> {
    let mode = frame.mode();
    let (fw, fh) = (i64::from(frame.width()), i64::from(frame.height()));
    let target = |px: u32, py: u32| -> Option<(u32, u32)> {
        let x = i64::from(anchor.x) + i64::from(px);
        let y = i64::from(anchor.y) + i64::from(py);
        ((0..fw).contains(&x) && (0..fh).contains(&y)).then_some((x as u32, y as u32))
    };

    match (frame.raster_mut(), fill) {
        (Raster::Gray(img), Fill::Luma(v)) => {
            for (i, a) in coverage.iter().enumerate().filter(|(_, a)| **a > 0) {
                let (px, py) = ((i as u32) % w, (i as u32) / w);
                if let Some((x, y)) = target(px, py).filter(|_| py < h) {
                    let p = img.get_pixel_mut(x, y);
                    p.0[0] = mix(p.0[0], v, *a);
                }
            }
            Ok(())
        }
        (Raster::Rgb(img), Fill::Rgb(rgb)) => {
            for (i, a) in coverage.iter().enumerate().filter(|(_, a)| **a > 0) {
                let (px, py) = ((i as u32) % w, (i as u32) / w);
                if let Some((x, y)) = target(px, py).filter(|_| py < h) {
                    let p = img.get_pixel_mut(x, y);
                    for (dst, src) in p.0.iter_mut().zip(rgb) {
                        *dst = mix(*dst, src, *a);
                    }
                }
            }
            Ok(())
        }
        (_, fill) => Err(TrackovlError::color_format(format!(
            "fill {fill:?} cannot be drawn on a {mode} frame"
        ))),
    }
}

fn mix(dst: u8, src: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(src) * a + u32::from(dst) * (255 - a) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg_text.rs"]
mod tests;
