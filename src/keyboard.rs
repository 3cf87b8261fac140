// filepath: src/keyboard.rs
//! Keyboard event handling for unlock-indicator

use crate::app::AppData;
use log::{debug, warn};
use smithay_client_toolkit::seat::keyboard::{KeyEvent, Keysym, Modifiers};

/// What a key press means for the password buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Submit,
    Clear,
    Backspace,
    Input(String),
    Ignore,
}

pub fn classify(event: &KeyEvent, modifiers: &Modifiers) -> KeyAction {
    match event.keysym {
        Keysym::Return | Keysym::KP_Enter => return KeyAction::Submit,
        Keysym::Escape => return KeyAction::Clear,
        Keysym::BackSpace => return KeyAction::Backspace,
        Keysym::u if modifiers.ctrl => return KeyAction::Clear,
        _ => {}
    }
    if modifiers.ctrl || modifiers.alt || modifiers.logo {
        return KeyAction::Ignore;
    }
    match event.utf8.as_deref() {
        Some(text) if !text.is_empty() && !text.chars().any(char::is_control) => {
            KeyAction::Input(text.to_string())
        }
        _ => KeyAction::Ignore,
    }
}

pub fn handle_key_press(app: &mut AppData, event: KeyEvent, modifiers: &Modifiers) {
    let action = classify(&event, modifiers);
    debug!("Key {:?} -> {:?}", event.keysym, action);

    let screens = &mut app.screens;
    let result = match action {
        KeyAction::Submit => app.session.submit(screens),
        KeyAction::Clear => app.session.clear(screens),
        KeyAction::Backspace => app.session.backspace(screens),
        KeyAction::Input(text) => app.session.input(&text, screens),
        KeyAction::Ignore => Ok(()),
    };

    if let Err(e) = result {
        warn!("Redraw failed: {e}");
    }
}
