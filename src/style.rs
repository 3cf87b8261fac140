// filepath: src/style.rs
//! State-to-appearance lookup
//!
//! Auth states take precedence over unlock states, and every state label
//! takes precedence over the failed-attempts counter.

use crate::color::{Rgb, Rgba};
use crate::config::{IndicatorConfig, StateColors};
use crate::state::{AuthState, UnlockState};

pub const VERIFY_TEXT: &str = "Verifying…";
pub const LOCK_TEXT: &str = "Locking…";
pub const WRONG_TEXT: &str = "Wrong!";
pub const LOCK_FAILED_TEXT: &str = "Lock failed!";
pub const NOTHING_TO_DELETE_TEXT: &str = "No input";

/// Counters above this are shown as `"> 999"`.
pub const MAX_SHOWN_ATTEMPTS: u32 = 999;

/// A line of text centered on the button.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub size: f64,
    pub color: Rgb,
    /// Vertical shift from the center line, in logical units.
    pub offset_y: f64,
}

/// Resolved appearance for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Rgba,
    pub stroke: Rgb,
    pub separator: Rgb,
    pub label: Option<Label>,
}

/// Which palette row a state pair resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKey {
    Verify,
    Lock,
    Wrong,
    LockFailed,
    NothingToDelete,
    Idle,
}

impl StyleKey {
    pub fn resolve(auth: AuthState, unlock: UnlockState) -> Self {
        match (auth, unlock) {
            (AuthState::Verify, _) => StyleKey::Verify,
            (AuthState::Lock, _) => StyleKey::Lock,
            (AuthState::Wrong, _) => StyleKey::Wrong,
            (AuthState::LockFailed, _) => StyleKey::LockFailed,
            (AuthState::Idle, UnlockState::NothingToDelete) => StyleKey::NothingToDelete,
            (AuthState::Idle, _) => StyleKey::Idle,
        }
    }

    fn colors(self, config: &IndicatorConfig) -> StateColors {
        let palette = &config.palette;
        match self {
            StyleKey::Verify => palette.verify,
            StyleKey::Lock => palette.lock,
            StyleKey::Wrong => palette.wrong,
            StyleKey::LockFailed => palette.lock_failed,
            StyleKey::NothingToDelete => palette.nothing_to_delete,
            StyleKey::Idle => palette.idle,
        }
    }

    /// Fixed label text, when this state has one and its toggle is on.
    fn text(self, config: &IndicatorConfig) -> Option<&'static str> {
        let toggles = &config.features.text;
        let (enabled, text) = match self {
            StyleKey::Verify => (toggles.verify, VERIFY_TEXT),
            StyleKey::Lock => (toggles.lock, LOCK_TEXT),
            StyleKey::Wrong => (toggles.wrong, WRONG_TEXT),
            StyleKey::LockFailed => (toggles.lock_failed, LOCK_FAILED_TEXT),
            StyleKey::NothingToDelete => (toggles.nothing_to_delete, NOTHING_TO_DELETE_TEXT),
            StyleKey::Idle => return None,
        };
        enabled.then_some(text)
    }
}

/// Format the failed-attempts counter, or `None` when there is nothing to show.
pub fn failed_attempts_text(failed_attempts: u32) -> Option<String> {
    match failed_attempts {
        0 => None,
        n if n > MAX_SHOWN_ATTEMPTS => Some(format!("> {MAX_SHOWN_ATTEMPTS}")),
        n => Some(n.to_string()),
    }
}

pub fn style_for(
    config: &IndicatorConfig,
    auth: AuthState,
    unlock: UnlockState,
    failed_attempts: u32,
    show_failed_attempts: bool,
) -> Style {
    let key = StyleKey::resolve(auth, unlock);
    let colors = key.colors(config);

    let label = match key {
        StyleKey::Idle if show_failed_attempts => {
            failed_attempts_text(failed_attempts).map(|text| Label {
                text,
                size: config.text.attempts_size,
                color: config.text.attempts_color,
                offset_y: 0.0,
            })
        }
        StyleKey::Idle => None,
        _ => key.text(config).map(|text| Label {
            text: text.to_string(),
            size: config.text.size,
            color: config.text.color,
            offset_y: 0.0,
        }),
    };

    Style {
        fill: colors.fill,
        stroke: colors.stroke,
        separator: config.palette.fill_separator,
        label,
    }
}

/// Second, smaller line listing active modifiers after a wrong password.
pub fn modifier_label(
    config: &IndicatorConfig,
    auth: AuthState,
    modifiers: Option<&str>,
) -> Option<Label> {
    if auth != AuthState::Wrong {
        return None;
    }
    let text = modifiers.map(str::trim).filter(|s| !s.is_empty())?;
    Some(Label {
        text: text.to_string(),
        size: config.text.modifier_size,
        color: config.text.color,
        offset_y: config.text.modifier_offset,
    })
}
