// filepath: src/session.rs
//! Password buffer and auth timers of the preview
//!
//! Nothing here touches Wayland: timers go through [`Scheduler`], pixels
//! through [`DisplayBackend`].

use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use unlock_indicator::{AuthState, DisplayBackend, Result, UnlockIndicator};

/// Keystroke highlight lingers this long before the ring settles.
pub const CLEAR_INDICATOR_DELAY: Duration = Duration::from_secs(1);
/// How long "Verifying…" stays up before the password is checked.
pub const VERIFY_DELAY: Duration = Duration::from_millis(500);
/// How long "Wrong!" stays up.
pub const WRONG_DELAY: Duration = Duration::from_secs(2);

/// What a timer was armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    ClearIndicator,
    Verify,
    WrongReset,
}

/// One-shot timers that call back into [`Session::on_deadline`].
pub trait Scheduler {
    type Token;

    /// Arm a timer; `None` if it could not be registered.
    fn schedule(&mut self, delay: Duration, deadline: Deadline) -> Option<Self::Token>;

    fn cancel(&mut self, token: Self::Token);
}

pub struct Session<S: Scheduler, R: Rng = StdRng> {
    indicator: UnlockIndicator<R>,
    scheduler: S,
    password: String,
    preview_password: Option<String>,
    clear_timer: Option<S::Token>,
    auth_timer: Option<S::Token>,
    unlocked: bool,
}

impl<S: Scheduler, R: Rng> Session<S, R> {
    pub fn new(indicator: UnlockIndicator<R>, scheduler: S, preview_password: Option<String>) -> Self {
        Self {
            indicator,
            scheduler,
            password: String::new(),
            preview_password,
            clear_timer: None,
            auth_timer: None,
            unlocked: false,
        }
    }

    pub fn indicator(&self) -> &UnlockIndicator<R> {
        &self.indicator
    }

    pub fn indicator_mut(&mut self) -> &mut UnlockIndicator<R> {
        &mut self.indicator
    }

    /// The preview password was entered.
    pub fn unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn verifying(&self) -> bool {
        self.indicator.auth_state() == AuthState::Verify
    }

    pub fn input(&mut self, text: &str, display: &mut dyn DisplayBackend) -> Result<()> {
        if self.verifying() {
            debug!("Ignoring input while verifying");
            return Ok(());
        }
        self.password.push_str(text);
        self.schedule_clear_indicator();
        self.indicator.on_key_press(false, display)
    }

    pub fn backspace(&mut self, display: &mut dyn DisplayBackend) -> Result<()> {
        if self.verifying() {
            debug!("Ignoring backspace while verifying");
            return Ok(());
        }
        self.schedule_clear_indicator();
        if self.password.pop().is_some() {
            self.indicator.on_key_press(true, display)
        } else {
            self.indicator.on_nothing_to_delete(display)
        }
    }

    /// Empty the buffer and hide the indicator.
    pub fn clear(&mut self, display: &mut dyn DisplayBackend) -> Result<()> {
        if self.verifying() {
            debug!("Ignoring clear while verifying");
            return Ok(());
        }
        self.password.clear();
        self.cancel_clear_timer();
        self.indicator.clear_indicator(display)
    }

    /// Show "Verifying…" and arm the check. Replaces any pending
    /// wrong-password reset.
    pub fn submit(&mut self, display: &mut dyn DisplayBackend) -> Result<()> {
        if self.verifying() {
            debug!("Verification already running, ignoring submit");
            return Ok(());
        }
        self.cancel_clear_timer();
        self.cancel_auth_timer();
        self.auth_timer = self.scheduler.schedule(VERIFY_DELAY, Deadline::Verify);
        self.indicator.set_auth_state(AuthState::Verify, display)
    }

    pub fn on_deadline(&mut self, deadline: Deadline, display: &mut dyn DisplayBackend) -> Result<()> {
        match deadline {
            Deadline::ClearIndicator => {
                self.clear_timer = None;
                let remaining = self.password.chars().count();
                self.indicator.clear_indicator_with(remaining, display)
            }
            Deadline::Verify => {
                self.auth_timer = None;
                if !self.verifying() {
                    debug!("Stale verification timer, ignoring");
                    return Ok(());
                }
                self.finish_verification(display)
            }
            Deadline::WrongReset => {
                self.auth_timer = None;
                if self.indicator.auth_state() != AuthState::Wrong {
                    debug!("Stale wrong-password timer, ignoring");
                    return Ok(());
                }
                self.indicator.set_auth_state(AuthState::Idle, display)
            }
        }
    }

    fn finish_verification(&mut self, display: &mut dyn DisplayBackend) -> Result<()> {
        let accepted = self
            .preview_password
            .as_deref()
            .is_some_and(|expected| expected == self.password);
        self.password.clear();

        if accepted {
            info!("Preview password accepted");
            self.unlocked = true;
            return Ok(());
        }

        self.indicator.record_failed_attempt();
        info!("Wrong password ({} failed attempts)", self.indicator.failed_attempts());
        self.auth_timer = self.scheduler.schedule(WRONG_DELAY, Deadline::WrongReset);
        self.indicator.set_auth_state(AuthState::Wrong, display)?;
        self.indicator.clear_indicator(display)
    }

    fn schedule_clear_indicator(&mut self) {
        self.cancel_clear_timer();
        self.clear_timer = self
            .scheduler
            .schedule(CLEAR_INDICATOR_DELAY, Deadline::ClearIndicator);
    }

    fn cancel_clear_timer(&mut self) {
        if let Some(token) = self.clear_timer.take() {
            self.scheduler.cancel(token);
        }
    }

    fn cancel_auth_timer(&mut self) {
        if let Some(token) = self.auth_timer.take() {
            self.scheduler.cancel(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use unlock_indicator::background::Background;
    use unlock_indicator::color::Rgb;
    use unlock_indicator::text::TextRenderer;
    use unlock_indicator::{IndicatorConfig, Region, Resolution, Surface, UnlockState};

    /// Armed timers in order; cancelled ones are removed.
    #[derive(Default)]
    struct ManualTimers {
        next: usize,
        armed: Vec<(usize, Deadline)>,
    }

    impl Scheduler for ManualTimers {
        type Token = usize;

        fn schedule(&mut self, _delay: Duration, deadline: Deadline) -> Option<usize> {
            let token = self.next;
            self.next += 1;
            self.armed.push((token, deadline));
            Some(token)
        }

        fn cancel(&mut self, token: usize) {
            self.armed.retain(|(armed, _)| *armed != token);
        }
    }

    #[derive(Default)]
    struct NullDisplay {
        frames: usize,
    }

    impl DisplayBackend for NullDisplay {
        fn scaling_factor(&self) -> f64 {
            1.0
        }

        fn regions(&self) -> Vec<Region> {
            Vec::new()
        }

        fn resolution(&self) -> Resolution {
            Resolution::new(16, 16)
        }

        fn publish(&mut self, _frame: Surface) -> Result<()> {
            self.frames += 1;
            Ok(())
        }
    }

    fn session(preview_password: Option<&str>) -> Session<ManualTimers> {
        let indicator = UnlockIndicator::new(
            IndicatorConfig::default(),
            Background::Solid(Rgb::WHITE),
            TextRenderer::disabled(),
            StdRng::seed_from_u64(3),
        );
        Session::new(
            indicator,
            ManualTimers::default(),
            preview_password.map(str::to_string),
        )
    }

    fn armed(session: &Session<ManualTimers>, deadline: Deadline) -> bool {
        session.scheduler.armed.iter().any(|(_, d)| *d == deadline)
    }

    /// Fire the oldest armed timer for `deadline`.
    fn fire(session: &mut Session<ManualTimers>, display: &mut NullDisplay, deadline: Deadline) {
        let pos = session
            .scheduler
            .armed
            .iter()
            .position(|(_, d)| *d == deadline)
            .unwrap_or_else(|| panic!("{deadline:?} not armed"));
        session.scheduler.armed.remove(pos);
        session.on_deadline(deadline, display).unwrap();
    }

    fn fail_once(session: &mut Session<ManualTimers>, display: &mut NullDisplay) {
        session.input("nope", display).unwrap();
        session.submit(display).unwrap();
        fire(session, display, Deadline::Verify);
        assert_eq!(session.indicator().auth_state(), AuthState::Wrong);
    }

    #[test]
    fn correct_password_unlocks() {
        let mut display = NullDisplay::default();
        let mut session = session(Some("secret"));
        session.input("secret", &mut display).unwrap();
        session.submit(&mut display).unwrap();
        assert!(session.verifying());
        assert!(!armed(&session, Deadline::ClearIndicator));

        fire(&mut session, &mut display, Deadline::Verify);
        assert!(session.unlocked());
        assert_eq!(session.indicator().failed_attempts(), 0);
    }

    #[test]
    fn resubmit_while_wrong_replaces_the_reset() {
        let mut display = NullDisplay::default();
        let mut session = session(Some("secret"));
        fail_once(&mut session, &mut display);
        assert!(armed(&session, Deadline::WrongReset));

        session.input("secret", &mut display).unwrap();
        session.submit(&mut display).unwrap();
        assert!(!armed(&session, Deadline::WrongReset));
        assert!(armed(&session, Deadline::Verify));

        fire(&mut session, &mut display, Deadline::Verify);
        assert!(session.unlocked());
        assert_eq!(session.indicator().failed_attempts(), 1);
    }

    #[test]
    fn wrong_reset_keeps_newly_typed_input() {
        let mut display = NullDisplay::default();
        let mut session = session(Some("secret"));
        fail_once(&mut session, &mut display);

        session.input("ab", &mut display).unwrap();
        fire(&mut session, &mut display, Deadline::WrongReset);
        assert_eq!(session.indicator().auth_state(), AuthState::Idle);
        assert_eq!(session.password, "ab");
        assert!(session.indicator().is_visible());
    }

    #[test]
    fn wrong_reset_without_input_hides_indicator() {
        let mut display = NullDisplay::default();
        let mut session = session(None);
        fail_once(&mut session, &mut display);
        assert!(session.password.is_empty());

        fire(&mut session, &mut display, Deadline::WrongReset);
        assert_eq!(session.indicator().unlock_state(), UnlockState::Started);
        assert!(!session.indicator().is_visible());
    }

    #[test]
    fn input_is_ignored_while_verifying() {
        let mut display = NullDisplay::default();
        let mut session = session(Some("secret"));
        session.input("secret", &mut display).unwrap();
        session.submit(&mut display).unwrap();

        session.input("x", &mut display).unwrap();
        session.backspace(&mut display).unwrap();
        session.submit(&mut display).unwrap();
        assert_eq!(session.password, "secret");
        assert_eq!(
            session
                .scheduler
                .armed
                .iter()
                .filter(|(_, d)| *d == Deadline::Verify)
                .count(),
            1
        );
    }

    #[test]
    fn backspace_on_empty_buffer_reports_nothing_to_delete() {
        let mut display = NullDisplay::default();
        let mut session = session(None);
        session.backspace(&mut display).unwrap();
        assert_eq!(session.indicator().unlock_state(), UnlockState::NothingToDelete);

        fire(&mut session, &mut display, Deadline::ClearIndicator);
        assert_eq!(session.indicator().unlock_state(), UnlockState::Started);
    }

    #[test]
    fn clear_timer_keeps_ring_while_input_remains() {
        let mut display = NullDisplay::default();
        let mut session = session(None);
        session.input("a", &mut display).unwrap();
        session.input("b", &mut display).unwrap();
        // Each keystroke re-arms the single clear timer.
        assert_eq!(session.scheduler.armed.len(), 1);

        fire(&mut session, &mut display, Deadline::ClearIndicator);
        assert_eq!(session.indicator().unlock_state(), UnlockState::KeyPressed);
        assert!(display.frames > 0);
    }
}
