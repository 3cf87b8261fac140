// filepath: src/widget.rs
//! Draw operations for the indicator button
//!
//! Every operation is centered on the button center and expressed in
//! logical units; the rasterizer applies the scaling factor.

use crate::color::{Rgb, Rgba};
use crate::config::IndicatorConfig;
use crate::geometry::{HighlightArc, WidgetGeometry, HIGHLIGHT_SEPARATOR_SPAN};
use crate::state::UnlockState;
use crate::style::{Label, Style};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillCircle {
        radius: f64,
        color: Rgba,
    },
    StrokeCircle {
        radius: f64,
        width: f64,
        color: Rgb,
    },
    /// Arc from `start` to `end`, clockwise in screen coordinates.
    StrokeArc {
        radius: f64,
        width: f64,
        start: f64,
        end: f64,
        color: Rgb,
    },
    Text(Label),
}

/// Inset of the fill separator ring from the main ring.
const SEPARATOR_INSET: f64 = 5.0;

/// Build the ordered draw list for one visible indicator.
///
/// `highlight` is only honored for key-activity unlock states; callers
/// pass `None` whenever the auth state suppresses it.
pub fn build_ops(
    config: &IndicatorConfig,
    geometry: &WidgetGeometry,
    style: &Style,
    unlock: UnlockState,
    highlight: Option<HighlightArc>,
    modifier: Option<Label>,
) -> Vec<DrawOp> {
    let radius = geometry.radius;
    let line_width = config.button.line_width;
    let mut ops = Vec::with_capacity(8);

    if config.features.fill_circle {
        ops.push(DrawOp::FillCircle {
            radius,
            color: style.fill,
        });
    }

    ops.push(DrawOp::StrokeCircle {
        radius,
        width: line_width,
        color: style.stroke,
    });

    if config.features.draw_separator {
        ops.push(DrawOp::StrokeCircle {
            radius: radius - SEPARATOR_INSET,
            width: config.palette.fill_separator_width,
            color: style.separator,
        });
    }

    if let Some(label) = &style.label {
        ops.push(DrawOp::Text(label.clone()));
    }
    if let Some(label) = modifier {
        ops.push(DrawOp::Text(label));
    }

    if let Some(arc) = highlight.filter(|_| unlock.is_key_activity()) {
        let color = if unlock == UnlockState::KeyActive {
            config.palette.key_highlight
        } else {
            config.palette.backspace_highlight
        };
        ops.push(DrawOp::StrokeArc {
            radius,
            width: line_width,
            start: arc.start,
            end: arc.end(),
            color,
        });

        let separator = config.palette.highlight_separator;
        ops.push(DrawOp::StrokeArc {
            radius,
            width: line_width,
            start: arc.start,
            end: arc.start + HIGHLIGHT_SEPARATOR_SPAN,
            color: separator,
        });
        ops.push(DrawOp::StrokeArc {
            radius,
            width: line_width,
            start: arc.end() - HIGHLIGHT_SEPARATOR_SPAN,
            end: arc.end(),
            color: separator,
        });
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AuthState;
    use crate::style::{modifier_label, style_for};

    fn setup(config: &IndicatorConfig, auth: AuthState, unlock: UnlockState) -> Style {
        style_for(config, auth, unlock, 0, false)
    }

    #[test]
    fn full_feature_set_order() {
        let cfg = IndicatorConfig::default();
        let geometry = WidgetGeometry::new(1.0, &cfg.button);
        let style = setup(&cfg, AuthState::Idle, UnlockState::KeyActive);
        let ops = build_ops(
            &cfg,
            &geometry,
            &style,
            UnlockState::KeyActive,
            Some(HighlightArc::at(1.0)),
            None,
        );

        assert_eq!(ops.len(), 6);
        assert!(matches!(ops[0], DrawOp::FillCircle { radius, .. } if radius == 90.0));
        assert!(matches!(ops[1], DrawOp::StrokeCircle { width, .. } if width == 10.0));
        assert!(matches!(ops[2], DrawOp::StrokeCircle { radius, width, .. }
            if radius == 85.0 && width == 2.0));
        match &ops[3] {
            DrawOp::StrokeArc { start, end, color, .. } => {
                assert_eq!(*start, 1.0);
                assert_eq!(*end, 1.0 + std::f64::consts::PI / 3.0);
                assert_eq!(*color, cfg.palette.key_highlight);
            }
            other => panic!("unexpected op {other:?}"),
        }
        assert!(matches!(ops[4], DrawOp::StrokeArc { color, .. }
            if color == cfg.palette.highlight_separator));
    }

    #[test]
    fn toggles_remove_fill_and_separator() {
        let mut cfg = IndicatorConfig::default();
        cfg.features.fill_circle = false;
        cfg.features.draw_separator = false;
        let geometry = WidgetGeometry::new(1.0, &cfg.button);
        let style = setup(&cfg, AuthState::Verify, UnlockState::KeyPressed);
        let ops = build_ops(&cfg, &geometry, &style, UnlockState::KeyPressed, None, None);

        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], DrawOp::StrokeCircle { .. }));
        assert!(matches!(&ops[1], DrawOp::Text(label) if label.text == "Verifying…"));
    }

    #[test]
    fn backspace_uses_delete_color() {
        let cfg = IndicatorConfig::default();
        let geometry = WidgetGeometry::new(1.0, &cfg.button);
        let style = setup(&cfg, AuthState::Idle, UnlockState::BackspaceActive);
        let ops = build_ops(
            &cfg,
            &geometry,
            &style,
            UnlockState::BackspaceActive,
            Some(HighlightArc::at(0.0)),
            None,
        );
        let arcs: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokeArc { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(arcs[0], cfg.palette.backspace_highlight);
        assert_eq!(arcs.len(), 3);
    }

    #[test]
    fn highlight_ignored_without_key_activity() {
        let cfg = IndicatorConfig::default();
        let geometry = WidgetGeometry::new(1.0, &cfg.button);
        let style = setup(&cfg, AuthState::Idle, UnlockState::KeyPressed);
        let ops = build_ops(
            &cfg,
            &geometry,
            &style,
            UnlockState::KeyPressed,
            Some(HighlightArc::at(0.0)),
            None,
        );
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::StrokeArc { .. })));
    }

    #[test]
    fn modifier_line_follows_primary_label() {
        let cfg = IndicatorConfig::default();
        let geometry = WidgetGeometry::new(1.0, &cfg.button);
        let style = setup(&cfg, AuthState::Wrong, UnlockState::Started);
        let modifier = modifier_label(&cfg, AuthState::Wrong, Some("Num Lock"));
        let ops = build_ops(&cfg, &geometry, &style, UnlockState::Started, None, modifier);

        let texts: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(label) => Some((label.text.as_str(), label.offset_y)),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec![("Wrong!", 0.0), ("Num Lock", 28.0)]);
    }
}
