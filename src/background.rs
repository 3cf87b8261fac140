// filepath: src/background.rs
//! Background sources: a flat color or a decoded image

use std::path::Path;

use log::info;

use crate::color::Rgb;
use crate::config::{BackgroundMode, IndicatorConfig};
use crate::draw::Surface;
use crate::error::{IndicatorError, Result};

/// What the target surface is painted with before the widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Solid(Rgb),
    /// `color` shows wherever the image does not reach.
    Image {
        image: Surface,
        mode: BackgroundMode,
        color: Rgb,
    },
}

impl Background {
    /// Resolve the configured background, decoding the image if one is set.
    pub fn from_config(config: &IndicatorConfig) -> Result<Self> {
        let color = config.background_color()?;
        match &config.background.image {
            Some(path) => Ok(Self::Image {
                image: decode_background_image(path)?,
                mode: config.background.mode,
                color,
            }),
            None => Ok(Self::Solid(color)),
        }
    }
}

/// Decode an image file into a premultiplied BGRA surface.
pub fn decode_background_image(path: &Path) -> Result<Surface> {
    let decoded = image::open(path).map_err(|source| IndicatorError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    info!("Decoded background image {} ({width}x{height})", path.display());
    Ok(surface_from_rgba(width, height, rgba.as_raw()))
}

/// Convert straight RGBA bytes to premultiplied BGRA.
pub fn surface_from_rgba(width: u32, height: u32, rgba: &[u8]) -> Surface {
    let mut data = Vec::with_capacity(rgba.len());
    for px in rgba.chunks_exact(4) {
        let alpha = u16::from(px[3]);
        let premultiply = |c: u8| ((u16::from(c) * alpha + 127) / 255) as u8;
        data.extend_from_slice(&[premultiply(px[2]), premultiply(px[1]), premultiply(px[0]), px[3]]);
    }
    // Only short when `rgba` was not a whole number of pixels.
    Surface::from_bgra(width, height, data).unwrap_or_else(|| Surface::new(width, height))
}
