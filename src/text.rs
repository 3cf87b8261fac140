// filepath: src/text.rs
//! Label rendering with fontdue
//!
//! Labels are centered on a point using the ink extents of the rasterized
//! glyphs, so the visible text and not the advance box sits on the center.

use std::fs;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use log::{debug, info, warn};

use crate::color::Rgb;
use crate::draw::Surface;
use crate::error::{IndicatorError, Result};

/// Tried in order when no font is configured.
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

struct Glyph {
    left: i32,
    top: i32,
    width: usize,
    coverage: Vec<u8>,
}

/// Ink bounds of a laid-out string relative to its origin on the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtents {
    pub x_bearing: f64,
    pub y_bearing: f64,
    pub width: f64,
    pub height: f64,
}

pub struct TextRenderer {
    font: Option<Font>,
}

impl TextRenderer {
    /// A renderer that draws nothing.
    pub fn disabled() -> Self {
        Self { font: None }
    }

    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, &'static str> {
        let font = Font::from_bytes(bytes, FontSettings::default())?;
        Ok(Self { font: Some(font) })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| IndicatorError::io(path, e))?;
        Self::from_bytes(&bytes).map_err(|details| IndicatorError::Font {
            path: path.to_path_buf(),
            details: details.to_string(),
        })
    }

    /// Load the configured font, or the first system font that exists.
    ///
    /// Without any usable font, labels are skipped rather than failing.
    pub fn load(configured: Option<&Path>) -> Self {
        let candidates: Vec<PathBuf> = match configured {
            Some(path) => vec![path.to_path_buf()],
            None => FALLBACK_FONTS.iter().map(PathBuf::from).collect(),
        };

        for path in &candidates {
            if configured.is_none() && !path.exists() {
                continue;
            }
            match Self::from_path(path) {
                Ok(renderer) => {
                    info!("Loaded font {}", path.display());
                    return renderer;
                }
                Err(e) => warn!("{e}"),
            }
        }

        warn!("No usable font found, indicator labels will not be drawn");
        Self::disabled()
    }

    pub fn is_enabled(&self) -> bool {
        self.font.is_some()
    }

    fn layout(font: &Font, text: &str, px: f32) -> Vec<Glyph> {
        let mut pen_x = 0.0f32;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let (metrics, coverage) = font.rasterize(ch, px);
            glyphs.push(Glyph {
                left: pen_x.round() as i32 + metrics.xmin,
                top: -(metrics.ymin + metrics.height as i32),
                width: metrics.width,
                coverage,
            });
            pen_x += metrics.advance_width;
        }
        glyphs
    }

    fn extents_of(glyphs: &[Glyph]) -> Option<TextExtents> {
        let mut inked = glyphs.iter().filter(|g| g.width > 0 && !g.coverage.is_empty());
        let first = inked.next()?;
        let height_of = |g: &Glyph| (g.coverage.len() / g.width) as i32;

        let (mut x0, mut y0) = (first.left, first.top);
        let (mut x1, mut y1) = (first.left + first.width as i32, first.top + height_of(first));
        for g in inked {
            x0 = x0.min(g.left);
            y0 = y0.min(g.top);
            x1 = x1.max(g.left + g.width as i32);
            y1 = y1.max(g.top + height_of(g));
        }
        Some(TextExtents {
            x_bearing: f64::from(x0),
            y_bearing: f64::from(y0),
            width: f64::from(x1 - x0),
            height: f64::from(y1 - y0),
        })
    }

    /// Ink extents of `text` at `px` pixels, if a font is loaded and the text has ink.
    pub fn extents(&self, text: &str, px: f64) -> Option<TextExtents> {
        let font = self.font.as_ref()?;
        Self::extents_of(&Self::layout(font, text, px as f32))
    }

    /// Draw `text` with its ink box centered on `(cx, cy)`.
    pub fn draw_centered(
        &self,
        surface: &mut Surface,
        text: &str,
        px: f64,
        cx: f64,
        cy: f64,
        color: Rgb,
    ) {
        let Some(font) = self.font.as_ref() else {
            debug!("No font loaded, skipping label {text:?}");
            return;
        };
        let glyphs = Self::layout(font, text, px as f32);
        let Some(extents) = Self::extents_of(&glyphs) else {
            return;
        };

        let origin_x = (cx - (extents.width / 2.0 + extents.x_bearing)).round() as i32;
        let baseline = (cy - (extents.height / 2.0 + extents.y_bearing)).round() as i32;
        for glyph in &glyphs {
            surface.blend_mask(
                origin_x + glyph.left,
                baseline + glyph.top,
                glyph.width,
                &glyph.coverage,
                color,
            );
        }
    }
}
