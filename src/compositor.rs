// filepath: src/compositor.rs
//! Frame composition
//!
//! Turns a [`FramePlan`] into pixels: paint the background, render the
//! widget offscreen once, then composite it centered on every region.

use log::debug;

use crate::background::Background;
use crate::color::Rgb;
use crate::config::BackgroundMode;
use crate::draw::Surface;
use crate::geometry::WidgetGeometry;
use crate::style::Style;
use crate::text::TextRenderer;
use crate::widget::DrawOp;

/// One monitor's rectangle in the combined display coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner that centers a `width` x `height` box in this region.
    ///
    /// Halves are taken separately with integer division.
    pub fn centered(&self, width: u32, height: u32) -> Placement {
        Placement {
            x: self.x + (self.width as i32 / 2 - width as i32 / 2),
            y: self.y + (self.height as i32 / 2 - height as i32 / 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The whole screen as one region.
    pub fn as_region(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
}

/// Regions to place things on: the monitors, or the whole screen when
/// monitor geometry is unknown.
pub fn effective_regions(regions: &[Region], resolution: Resolution) -> Vec<Region> {
    if regions.is_empty() {
        vec![resolution.as_region()]
    } else {
        regions.to_vec()
    }
}

/// Where the widget lands on each region.
pub fn widget_placements(regions: &[Region], resolution: Resolution, diameter: u32) -> Vec<Placement> {
    effective_regions(regions, resolution)
        .iter()
        .map(|region| region.centered(diameter, diameter))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundOp {
    Fill(Rgb),
    /// Repeat the image across the surface.
    Tile,
    /// Paint the image once with its top-left corner here.
    Paint(Placement),
}

/// Background operations for the configured background. Image backgrounds
/// start with a fill so uncovered pixels get the configured color.
pub fn background_ops(
    background: &Background,
    regions: &[Region],
    resolution: Resolution,
) -> Vec<BackgroundOp> {
    match background {
        Background::Solid(color) => vec![BackgroundOp::Fill(*color)],
        Background::Image { image, mode, color } => {
            let mut ops = vec![BackgroundOp::Fill(*color)];
            match mode {
                BackgroundMode::Tile => ops.push(BackgroundOp::Tile),
                BackgroundMode::Origin => ops.push(BackgroundOp::Paint(Placement { x: 0, y: 0 })),
                BackgroundMode::Centered => ops.extend(
                    effective_regions(regions, resolution).iter().map(|region| {
                        BackgroundOp::Paint(region.centered(image.width(), image.height()))
                    }),
                ),
            }
            ops
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetPlan {
    pub geometry: WidgetGeometry,
    pub style: Style,
    pub ops: Vec<DrawOp>,
    pub placements: Vec<Placement>,
}

/// Everything one redraw will paint, before any pixel is touched.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub resolution: Resolution,
    pub background: Vec<BackgroundOp>,
    pub widget: Option<WidgetPlan>,
}

/// Render the widget into a square transparent surface.
pub fn render_widget(plan: &WidgetPlan, text: &TextRenderer) -> Surface {
    let geometry = &plan.geometry;
    let scale = geometry.scaling_factor;
    let side = geometry.diameter_physical;
    let center = geometry.center_physical();
    let mut surface = Surface::new(side, side);

    for op in &plan.ops {
        match op {
            DrawOp::FillCircle { radius, color } => {
                surface.fill_circle(center, center, radius * scale, *color);
            }
            DrawOp::StrokeCircle {
                radius,
                width,
                color,
            } => {
                surface.stroke_circle(center, center, radius * scale, width * scale, *color);
            }
            DrawOp::StrokeArc {
                radius,
                width,
                start,
                end,
                color,
            } => {
                surface.stroke_arc(
                    center,
                    center,
                    radius * scale,
                    width * scale,
                    *start,
                    *end,
                    *color,
                );
            }
            DrawOp::Text(label) => {
                text.draw_centered(
                    &mut surface,
                    &label.text,
                    label.size * scale,
                    center,
                    center + label.offset_y * scale,
                    label.color,
                );
            }
        }
    }

    surface
}

/// Produce the final frame for display.
pub fn compose(plan: &FramePlan, background: &Background, text: &TextRenderer) -> Surface {
    let mut target = Surface::new(plan.resolution.width, plan.resolution.height);

    let image = match background {
        Background::Image { image, .. } => Some(image),
        Background::Solid(_) => None,
    };
    for op in &plan.background {
        match (op, image) {
            (BackgroundOp::Fill(color), _) => target.fill(*color),
            (BackgroundOp::Tile, Some(image)) => target.tile(image),
            (BackgroundOp::Paint(at), Some(image)) => target.composite(image, at.x, at.y),
            (_, None) => debug!("Image background op {op:?} without an image, skipping"),
        }
    }

    if let Some(widget) = &plan.widget {
        let rendered = render_widget(widget, text);
        for at in &widget.placements {
            target.composite(&rendered, at.x, at.y);
        }
    }

    target
}
