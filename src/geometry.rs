// filepath: src/geometry.rs
//! Widget geometry, derived fresh on every redraw

use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::config::ButtonConfig;

/// Angular width of the keystroke highlight wedge.
pub const HIGHLIGHT_SPAN: f64 = PI / 3.0;

/// Angular width of each separator mark at the wedge ends.
pub const HIGHLIGHT_SEPARATOR_SPAN: f64 = PI / 128.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetGeometry {
    pub scaling_factor: f64,
    /// Side of the square offscreen surface, in physical pixels.
    pub diameter_physical: u32,
    /// Button center in logical units, same on both axes.
    pub center: f64,
    pub radius: f64,
}

impl WidgetGeometry {
    pub fn new(scaling_factor: f64, button: &ButtonConfig) -> Self {
        let scaling_factor = if button.ignore_scaling {
            1.0
        } else {
            sanitize_scaling_factor(scaling_factor)
        };
        let space = button.radius + button.margin;
        Self {
            scaling_factor,
            diameter_physical: (scaling_factor * 2.0 * space).ceil() as u32,
            center: space,
            radius: button.radius,
        }
    }

    /// Button center in physical pixels.
    pub fn center_physical(&self) -> f64 {
        self.center * self.scaling_factor
    }
}

fn sanitize_scaling_factor(factor: f64) -> f64 {
    if factor.is_finite() && factor > 0.0 {
        factor
    } else {
        1.0
    }
}

/// The highlighted part of the ring after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightArc {
    pub start: f64,
    pub span: f64,
}

impl HighlightArc {
    /// A wedge at a fresh random rotation. Only for visual variety.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::at(rng.random_range(0.0..TAU))
    }

    pub fn at(start: f64) -> Self {
        Self {
            start,
            span: HIGHLIGHT_SPAN,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_button_at_unit_scale() {
        let geometry = WidgetGeometry::new(1.0, &ButtonConfig::default());
        assert_eq!(geometry.diameter_physical, 190);
        assert_eq!(geometry.center, 95.0);
        assert_eq!(geometry.radius, 90.0);
    }

    #[test]
    fn diameter_rounds_up() {
        let geometry = WidgetGeometry::new(1.25, &ButtonConfig::default());
        // 1.25 * 190 = 237.5
        assert_eq!(geometry.diameter_physical, 238);
        assert_eq!(geometry.center_physical(), 118.75);
    }

    #[test]
    fn ignore_scaling_pins_factor() {
        let button = ButtonConfig {
            ignore_scaling: true,
            ..ButtonConfig::default()
        };
        let geometry = WidgetGeometry::new(2.0, &button);
        assert_eq!(geometry.scaling_factor, 1.0);
        assert_eq!(geometry.diameter_physical, 190);
    }

    #[test]
    fn nonsense_factor_falls_back_to_one() {
        for factor in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let geometry = WidgetGeometry::new(factor, &ButtonConfig::default());
            assert_eq!(geometry.scaling_factor, 1.0);
        }
    }

    #[test]
    fn highlight_span_is_fixed_and_start_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let arc = HighlightArc::random(&mut rng);
            assert!((0.0..TAU).contains(&arc.start));
            assert_eq!(arc.span, PI / 3.0);
        }
    }

    #[test]
    fn highlight_start_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples = 60_000;
        let mut buckets = [0usize; 6];
        for _ in 0..samples {
            let arc = HighlightArc::random(&mut rng);
            let bucket = ((arc.start / TAU) * 6.0) as usize;
            buckets[bucket.min(5)] += 1;
        }
        let expected = samples / 6;
        for count in buckets {
            let deviation = (count as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.05, "bucket count {count} vs {expected}");
        }
    }

    #[test]
    fn seeded_sources_repeat() {
        let a = HighlightArc::random(&mut StdRng::seed_from_u64(3));
        let b = HighlightArc::random(&mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
