// filepath: src/state.rs
//! Unlock and authentication state tracking
//!
//! This is purely reactive display state: every transition is accepted,
//! the authentication backend enforces its own protocol.

use std::fmt;

/// Password-buffer interaction since the last full clear.
///
/// Declaration order matters: visibility compares against `KeyPressed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum UnlockState {
    #[default]
    Started,
    Cleared,
    KeyPressed,
    Backspace,
    KeyActive,
    BackspaceActive,
    NothingToDelete,
}

impl UnlockState {
    pub const ALL: [UnlockState; 7] = [
        UnlockState::Started,
        UnlockState::Cleared,
        UnlockState::KeyPressed,
        UnlockState::Backspace,
        UnlockState::KeyActive,
        UnlockState::BackspaceActive,
        UnlockState::NothingToDelete,
    ];

    /// Whether a keystroke highlight wedge belongs to this state.
    pub fn is_key_activity(&self) -> bool {
        matches!(self, UnlockState::KeyActive | UnlockState::BackspaceActive)
    }
}

/// Phase reported by the authentication backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AuthState {
    #[default]
    Idle,
    Verify,
    Lock,
    Wrong,
    LockFailed,
}

impl AuthState {
    pub const ALL: [AuthState; 5] = [
        AuthState::Idle,
        AuthState::Verify,
        AuthState::Lock,
        AuthState::Wrong,
        AuthState::LockFailed,
    ];
}

impl fmt::Display for UnlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnlockState::Started => "started",
            UnlockState::Cleared => "cleared",
            UnlockState::KeyPressed => "key-pressed",
            UnlockState::Backspace => "backspace",
            UnlockState::KeyActive => "key-active",
            UnlockState::BackspaceActive => "backspace-active",
            UnlockState::NothingToDelete => "nothing-to-delete",
        };
        f.write_str(name)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthState::Idle => "idle",
            AuthState::Verify => "verify",
            AuthState::Lock => "lock",
            AuthState::Wrong => "wrong",
            AuthState::LockFailed => "lock-failed",
        };
        f.write_str(name)
    }
}

/// The pair of states the indicator is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndicatorState {
    unlock: UnlockState,
    auth: AuthState,
}

impl IndicatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unlock(&self) -> UnlockState {
        self.unlock
    }

    pub fn auth(&self) -> AuthState {
        self.auth
    }

    /// A key was accepted into a non-empty buffer.
    pub fn on_key_press(&mut self, is_backspace: bool) {
        self.unlock = if is_backspace {
            UnlockState::BackspaceActive
        } else {
            UnlockState::KeyActive
        };
    }

    /// Reset toward a quiescent display.
    pub fn on_clear(&mut self, buffer_length: usize) {
        self.unlock = if buffer_length == 0 {
            UnlockState::Started
        } else {
            UnlockState::KeyPressed
        };
    }

    /// Backspace was pressed on an empty buffer.
    pub fn on_nothing_to_delete(&mut self) {
        self.unlock = UnlockState::NothingToDelete;
    }

    pub fn set_auth_state(&mut self, auth: AuthState) {
        self.auth = auth;
    }

    /// Whether anything should be drawn, given the global enable flag.
    pub fn is_visible(&self, indicator_enabled: bool) -> bool {
        indicator_enabled
            && (self.unlock >= UnlockState::KeyPressed || self.auth > AuthState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_hidden() {
        let state = IndicatorState::new();
        assert_eq!(state.unlock(), UnlockState::Started);
        assert_eq!(state.auth(), AuthState::Idle);
        assert!(!state.is_visible(true));
    }

    #[test]
    fn key_press_selects_active_variant() {
        let mut state = IndicatorState::new();
        state.on_key_press(false);
        assert_eq!(state.unlock(), UnlockState::KeyActive);
        state.on_key_press(true);
        assert_eq!(state.unlock(), UnlockState::BackspaceActive);
    }

    #[test]
    fn clear_depends_on_remaining_input() {
        let mut state = IndicatorState::new();
        state.on_key_press(false);
        state.on_clear(3);
        assert_eq!(state.unlock(), UnlockState::KeyPressed);
        assert!(state.is_visible(true));
        state.on_clear(0);
        assert_eq!(state.unlock(), UnlockState::Started);
        assert!(!state.is_visible(true));
    }

    #[test]
    fn nothing_to_delete_is_visible() {
        let mut state = IndicatorState::new();
        state.on_nothing_to_delete();
        assert_eq!(state.unlock(), UnlockState::NothingToDelete);
        assert!(state.is_visible(true));
    }

    #[test]
    fn auth_state_alone_makes_indicator_visible() {
        let mut state = IndicatorState::new();
        state.set_auth_state(AuthState::Wrong);
        assert!(state.is_visible(true));
        assert!(!state.is_visible(false));
    }

    #[test]
    fn visibility_matches_table() {
        for unlock in UnlockState::ALL {
            for auth in AuthState::ALL {
                let state = IndicatorState { unlock, auth };
                let quiet = matches!(unlock, UnlockState::Started | UnlockState::Cleared)
                    && auth == AuthState::Idle;
                assert_eq!(state.is_visible(true), !quiet, "{unlock}/{auth}");
                assert!(!state.is_visible(false));
            }
        }
    }

    #[derive(Debug, Clone)]
    enum Event {
        Key(bool),
        Clear(usize),
        NothingToDelete,
        Auth(AuthState),
    }

    fn arb_event() -> impl Strategy<Value = Event> {
        prop_oneof![
            any::<bool>().prop_map(Event::Key),
            (0usize..4).prop_map(Event::Clear),
            Just(Event::NothingToDelete),
            prop::sample::select(AuthState::ALL.to_vec()).prop_map(Event::Auth),
        ]
    }

    proptest! {
        /// Any event sequence is accepted and the last auth write wins.
        #[test]
        fn accepts_every_sequence(events in prop::collection::vec(arb_event(), 1..40)) {
            let mut state = IndicatorState::new();
            let mut last_auth = AuthState::Idle;
            for event in events {
                match event {
                    Event::Key(backspace) => state.on_key_press(backspace),
                    Event::Clear(len) => state.on_clear(len),
                    Event::NothingToDelete => state.on_nothing_to_delete(),
                    Event::Auth(auth) => {
                        state.set_auth_state(auth);
                        last_auth = auth;
                    }
                }
            }
            prop_assert_eq!(state.auth(), last_auth);
            prop_assert_ne!(state.unlock(), UnlockState::Cleared);
        }
    }
}
