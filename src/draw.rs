// filepath: src/draw.rs
//! Drawing utilities for unlock-indicator
//!
//! This file contains the software rasterizer: pixel surfaces, circle and
//! arc coverage, image painting and surface compositing.
//!
//! Pixels are premultiplied and stored as `[b, g, r, a]`, which is the
//! in-memory layout of `wl_shm` ARGB8888 on little-endian machines, so a
//! finished surface can be copied into a shm buffer byte for byte.

use std::f64::consts::TAU;

use crate::color::{Rgb, Rgba};

/// An owned premultiplied BGRA pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// A fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap an existing premultiplied BGRA buffer.
    pub fn from_bgra(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of one row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.data[idx..idx + 4]);
        Some(px)
    }

    /// Replace every pixel with an opaque color.
    pub fn fill(&mut self, color: Rgb) {
        let px = [color.b(), color.g(), color.r(), 255];
        for pixel in self.data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&px);
        }
    }

    /// Copy the rectangle at `(x, y)` of `width` x `height` into `dst`,
    /// one row per `dst_stride` bytes. Pixels outside the surface are left
    /// untouched in `dst`.
    pub fn copy_rect_into(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        dst: &mut [u8],
        dst_stride: usize,
    ) {
        for row in 0..height as i32 {
            let sy = y + row;
            if sy < 0 || sy >= self.height as i32 {
                continue;
            }
            let x_start = x.max(0);
            let x_end = (x + width as i32).min(self.width as i32);
            if x_end <= x_start {
                continue;
            }
            let src = (sy as usize * self.width as usize + x_start as usize) * 4;
            let len = (x_end - x_start) as usize * 4;
            let dst_off = row as usize * dst_stride + (x_start - x) as usize * 4;
            if dst_off + len <= dst.len() {
                dst[dst_off..dst_off + len].copy_from_slice(&self.data[src..src + len]);
            }
        }
    }

    /// Blend an unpremultiplied color with the given coverage (source over).
    fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: f64) {
        let alpha = color.alpha * coverage;
        if alpha <= 0.0 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let (r, g, b) = color.rgb.to_unit();
        let src = [b * alpha, g * alpha, r * alpha, alpha];
        let inv = 1.0 - alpha;
        for (channel, value) in src.iter().enumerate() {
            let dst = f64::from(self.data[idx + channel]) / 255.0;
            self.data[idx + channel] = to_byte(value + dst * inv);
        }
    }

    /// Blend one premultiplied source pixel (source over).
    fn blend_premultiplied(&mut self, x: u32, y: u32, src: &[u8]) {
        let alpha = src[3];
        if alpha == 0 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        if alpha == 255 {
            self.data[idx..idx + 4].copy_from_slice(&src[..4]);
            return;
        }
        let inv = 1.0 - f64::from(alpha) / 255.0;
        for channel in 0..4 {
            let dst = f64::from(self.data[idx + channel]);
            self.data[idx + channel] = (f64::from(src[channel]) + dst * inv).round().min(255.0) as u8;
        }
    }

    /// Composite `src` with its top-left corner at `(x, y)`, clipped to this surface.
    pub fn composite(&mut self, src: &Surface, x: i32, y: i32) {
        for sy in 0..src.height {
            let dy = y + sy as i32;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + sx as i32;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let idx = (sy as usize * src.width as usize + sx as usize) * 4;
                self.blend_premultiplied(dx as u32, dy as u32, &src.data[idx..idx + 4]);
            }
        }
    }

    /// Repeat `src` across the whole surface, anchored at the origin.
    pub fn tile(&mut self, src: &Surface) {
        if src.width == 0 || src.height == 0 {
            return;
        }
        for y in 0..self.height {
            let sy = y % src.height;
            for x in 0..self.width {
                let sx = x % src.width;
                let idx = (sy as usize * src.width as usize + sx as usize) * 4;
                self.blend_premultiplied(x, y, &src.data[idx..idx + 4]);
            }
        }
    }

    /// Blend a coverage mask (0-255 per pixel) in one color, clipped.
    pub fn blend_mask(&mut self, x: i32, y: i32, mask_width: usize, mask: &[u8], color: Rgb) {
        if mask_width == 0 {
            return;
        }
        for (i, &coverage) in mask.iter().enumerate() {
            if coverage == 0 {
                continue;
            }
            let px = x + (i % mask_width) as i32;
            let py = y + (i / mask_width) as i32;
            if px < 0 || py < 0 || px >= self.width as i32 || py >= self.height as i32 {
                continue;
            }
            self.blend(px as u32, py as u32, color.into(), f64::from(coverage) / 255.0);
        }
    }

    /// Fill a disc centered at `(cx, cy)`, all in physical pixels.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        self.shade_ring(cx, cy, radius + 1.0, |dist, _| {
            (radius - dist + 0.5).clamp(0.0, 1.0)
        }, color);
    }

    /// Stroke a full circle of the given line width.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, width: f64, color: Rgb) {
        let half = width / 2.0;
        self.shade_ring(cx, cy, radius + half + 1.0, |dist, _| {
            (half - (dist - radius).abs() + 0.5).clamp(0.0, 1.0)
        }, color.into());
    }

    /// Stroke an arc from `start` to `end` radians with butt ends.
    ///
    /// Angles grow clockwise on screen, starting at the positive x axis.
    pub fn stroke_arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        width: f64,
        start: f64,
        end: f64,
        color: Rgb,
    ) {
        let sweep = end - start;
        if sweep <= 0.0 {
            return;
        }
        if sweep >= TAU {
            self.stroke_circle(cx, cy, radius, width, color);
            return;
        }
        let half = width / 2.0;
        let start = start.rem_euclid(TAU);
        self.shade_ring(cx, cy, radius + half + 1.0, |dist, angle| {
            if (angle - start).rem_euclid(TAU) > sweep {
                return 0.0;
            }
            (half - (dist - radius).abs() + 0.5).clamp(0.0, 1.0)
        }, color.into());
    }

    /// Visit the pixels in the bounding square of `extent` around the center,
    /// blending `color` with the coverage `shade(distance, angle)` returns.
    fn shade_ring<F>(&mut self, cx: f64, cy: f64, extent: f64, shade: F, color: Rgba)
    where
        F: Fn(f64, f64) -> f64,
    {
        let x0 = (cx - extent).floor().max(0.0) as u32;
        let y0 = (cy - extent).floor().max(0.0) as u32;
        let x1 = ((cx + extent).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((cy + extent).ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = f64::from(x) + 0.5 - cx;
                let dy = f64::from(y) + 0.5 - cy;
                let dist = dx.hypot(dy);
                let angle = dy.atan2(dx).rem_euclid(TAU);
                let coverage = shade(dist, angle);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
}

fn to_byte(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}
