// filepath: src/indicator.rs
//! Redraw orchestration
//!
//! [`UnlockIndicator`] owns the display state and runs state lookup,
//! geometry, composition and publishing in sequence on every redraw.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::background::Background;
use crate::compositor::{self, background_ops, widget_placements, FramePlan, Region, Resolution, WidgetPlan};
use crate::config::IndicatorConfig;
use crate::draw::Surface;
use crate::error::Result;
use crate::geometry::{HighlightArc, WidgetGeometry};
use crate::state::{AuthState, IndicatorState, UnlockState};
use crate::style::{modifier_label, style_for};
use crate::text::TextRenderer;
use crate::widget::build_ops;

/// What the indicator needs from the windowing side.
pub trait DisplayBackend {
    /// Ratio of physical to logical pixels.
    fn scaling_factor(&self) -> f64;

    /// Monitor rectangles in frame coordinates; may be empty.
    fn regions(&self) -> Vec<Region>;

    /// Size of the full target surface.
    fn resolution(&self) -> Resolution;

    /// Human readable list of active lock modifiers, if any.
    fn modifier_label(&self) -> Option<String> {
        None
    }

    /// Take ownership of a finished frame and show it in place of the
    /// previous one, which is released after the swap.
    fn publish(&mut self, frame: Surface) -> Result<()>;
}

pub struct UnlockIndicator<R: Rng = StdRng> {
    config: IndicatorConfig,
    background: Background,
    text: TextRenderer,
    state: IndicatorState,
    failed_attempts: u32,
    rng: R,
}

impl UnlockIndicator<StdRng> {
    /// Build from configuration, decoding the background and loading a font.
    pub fn from_config(config: IndicatorConfig) -> Result<Self> {
        config.validate()?;
        let background = Background::from_config(&config)?;
        let text = TextRenderer::load(config.text.font.as_deref());
        Ok(Self::new(config, background, text, StdRng::from_os_rng()))
    }
}

impl<R: Rng> UnlockIndicator<R> {
    pub fn new(config: IndicatorConfig, background: Background, text: TextRenderer, rng: R) -> Self {
        Self {
            config,
            background,
            text,
            state: IndicatorState::new(),
            failed_attempts: 0,
            rng,
        }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn unlock_state(&self) -> UnlockState {
        self.state.unlock()
    }

    pub fn auth_state(&self) -> AuthState {
        self.state.auth()
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible(self.config.unlock_indicator)
    }

    pub fn on_key_press(&mut self, is_backspace: bool, display: &mut dyn DisplayBackend) -> Result<()> {
        self.state.on_key_press(is_backspace);
        self.redraw(display)
    }

    pub fn on_clear(&mut self, buffer_length: usize, display: &mut dyn DisplayBackend) -> Result<()> {
        self.state.on_clear(buffer_length);
        self.redraw(display)
    }

    pub fn on_nothing_to_delete(&mut self, display: &mut dyn DisplayBackend) -> Result<()> {
        self.state.on_nothing_to_delete();
        self.redraw(display)
    }

    pub fn set_auth_state(&mut self, auth: AuthState, display: &mut dyn DisplayBackend) -> Result<()> {
        self.state.set_auth_state(auth);
        self.redraw(display)
    }

    /// Count one more rejected password. Shown on the next redraw.
    pub fn record_failed_attempt(&mut self) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
    }

    /// Hide the indicator because the password buffer is empty.
    pub fn clear_indicator(&mut self, display: &mut dyn DisplayBackend) -> Result<()> {
        self.clear_indicator_with(0, display)
    }

    /// Drop the keystroke highlight, keeping the ring if input remains.
    pub fn clear_indicator_with(
        &mut self,
        buffer_length: usize,
        display: &mut dyn DisplayBackend,
    ) -> Result<()> {
        self.on_clear(buffer_length, display)
    }

    /// Describe the next frame without rendering it.
    pub fn plan(&mut self, display: &dyn DisplayBackend) -> FramePlan {
        let resolution = display.resolution();
        let regions = display.regions();
        let background = background_ops(&self.background, &regions, resolution);

        let widget = self.is_visible().then(|| {
            let auth = self.state.auth();
            let unlock = self.state.unlock();
            let geometry = WidgetGeometry::new(display.scaling_factor(), &self.config.button);
            debug!(
                "scaling_factor is {:.2}, physical diameter is {} px",
                geometry.scaling_factor, geometry.diameter_physical
            );

            let style = style_for(
                &self.config,
                auth,
                unlock,
                self.failed_attempts,
                self.config.show_failed_attempts,
            );
            let modifiers = display.modifier_label();
            let modifier = modifier_label(&self.config, auth, modifiers.as_deref());
            let highlight = (auth == AuthState::Idle && unlock.is_key_activity())
                .then(|| HighlightArc::random(&mut self.rng));
            let ops = build_ops(&self.config, &geometry, &style, unlock, highlight, modifier);

            WidgetPlan {
                placements: widget_placements(&regions, resolution, geometry.diameter_physical),
                geometry,
                style,
                ops,
            }
        });

        FramePlan {
            resolution,
            background,
            widget,
        }
    }

    /// Compose a frame for the current state and hand it to the display.
    pub fn redraw(&mut self, display: &mut dyn DisplayBackend) -> Result<()> {
        debug!(
            "redraw(unlock_state = {}, auth_state = {})",
            self.state.unlock(),
            self.state.auth()
        );
        let plan = self.plan(display);
        let resolution = plan.resolution;
        if resolution.width == 0 || resolution.height == 0 {
            warn!("Skipping redraw, resolution is {}x{}", resolution.width, resolution.height);
            return Ok(());
        }
        let frame = compositor::compose(&plan, &self.background, &self.text);
        display.publish(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::widget::DrawOp;

    #[derive(Default)]
    struct FakeDisplay {
        regions: Vec<Region>,
        resolution: Resolution,
        modifiers: Option<String>,
        published: Vec<Surface>,
    }

    impl DisplayBackend for FakeDisplay {
        fn scaling_factor(&self) -> f64 {
            1.0
        }

        fn regions(&self) -> Vec<Region> {
            self.regions.clone()
        }

        fn resolution(&self) -> Resolution {
            self.resolution
        }

        fn modifier_label(&self) -> Option<String> {
            self.modifiers.clone()
        }

        fn publish(&mut self, frame: Surface) -> Result<()> {
            self.published.push(frame);
            Ok(())
        }
    }

    fn indicator() -> UnlockIndicator<StdRng> {
        UnlockIndicator::new(
            IndicatorConfig::default(),
            Background::Solid(Rgb::new(0x1a, 0x1a, 0x1a)),
            TextRenderer::disabled(),
            StdRng::seed_from_u64(1),
        )
    }

    fn display() -> FakeDisplay {
        FakeDisplay {
            resolution: Resolution::new(320, 240),
            ..FakeDisplay::default()
        }
    }

    #[test]
    fn hidden_indicator_publishes_background_only() {
        let mut indicator = indicator();
        let mut display = display();
        indicator.redraw(&mut display).unwrap();

        assert_eq!(display.published.len(), 1);
        let frame = &display.published[0];
        assert!(frame.data().chunks_exact(4).all(|px| px == [0x1a, 0x1a, 0x1a, 255]));
        assert!(indicator.plan(&display).widget.is_none());
    }

    #[test]
    fn every_transition_publishes_a_frame() {
        let mut indicator = indicator();
        let mut display = display();
        indicator.on_key_press(false, &mut display).unwrap();
        indicator.on_key_press(true, &mut display).unwrap();
        indicator.on_nothing_to_delete(&mut display).unwrap();
        indicator.set_auth_state(AuthState::Verify, &mut display).unwrap();
        indicator.clear_indicator(&mut display).unwrap();
        assert_eq!(display.published.len(), 5);
        assert_eq!(indicator.unlock_state(), UnlockState::Started);
        assert_eq!(indicator.auth_state(), AuthState::Verify);
    }

    #[test]
    fn highlight_only_while_idle() {
        let mut indicator = indicator();
        let mut display = display();
        indicator.on_key_press(false, &mut display).unwrap();
        let has_arc = |plan: &FramePlan| {
            plan.widget
                .as_ref()
                .is_some_and(|w| w.ops.iter().any(|op| matches!(op, DrawOp::StrokeArc { .. })))
        };
        assert!(has_arc(&indicator.plan(&display)));

        indicator.set_auth_state(AuthState::Verify, &mut display).unwrap();
        assert!(!has_arc(&indicator.plan(&display)));
    }

    #[test]
    fn failed_attempts_show_after_recording() {
        let mut config = IndicatorConfig::default();
        config.show_failed_attempts = true;
        let mut indicator = UnlockIndicator::new(
            config,
            Background::Solid(Rgb::BLACK),
            TextRenderer::disabled(),
            StdRng::seed_from_u64(1),
        );
        let mut display = display();
        indicator.on_clear(2, &mut display).unwrap();
        assert_eq!(indicator.plan(&display).widget.unwrap().style.label, None);

        indicator.record_failed_attempt();
        let label = indicator.plan(&display).widget.unwrap().style.label.unwrap();
        assert_eq!(label.text, "1");
    }

    #[test]
    fn wrong_password_shows_modifiers() {
        let mut indicator = indicator();
        let mut display = display();
        display.modifiers = Some("Caps Lock".to_string());
        indicator.set_auth_state(AuthState::Wrong, &mut display).unwrap();

        let widget = indicator.plan(&display).widget.unwrap();
        let texts: Vec<_> = widget
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(label) => Some(label.text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Wrong!".to_string(), "Caps Lock".to_string()]);
    }

    #[test]
    fn disabled_indicator_never_draws() {
        let mut config = IndicatorConfig::default();
        config.unlock_indicator = false;
        let mut indicator = UnlockIndicator::new(
            config,
            Background::Solid(Rgb::BLACK),
            TextRenderer::disabled(),
            StdRng::seed_from_u64(1),
        );
        let mut display = display();
        indicator.set_auth_state(AuthState::Wrong, &mut display).unwrap();
        assert!(!indicator.is_visible());
        assert!(indicator.plan(&display).widget.is_none());
    }

    #[test]
    fn zero_resolution_skips_publish() {
        let mut indicator = indicator();
        let mut display = FakeDisplay::default();
        indicator.on_key_press(false, &mut display).unwrap();
        assert!(display.published.is_empty());
    }
}
