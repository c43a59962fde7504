//! Keyboard input
//!
//! Keys arrive as DOM-style key names ("a", "ArrowUp", " ") and are mapped to
//! logical actions before they reach the game.

use crate::sim::{Control, Game};

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Control(Control),
    /// Reload the level (restart after game over)
    Reload,
}

/// Map a key name to its action, if any
pub fn map_key(key: &str) -> Option<KeyAction> {
    let action = match key {
        " " | "w" | "W" | "ArrowUp" => KeyAction::Control(Control::Jump),
        "a" | "A" | "ArrowLeft" => KeyAction::Control(Control::Left),
        "d" | "D" | "ArrowRight" => KeyAction::Control(Control::Right),
        "s" | "S" | "ArrowDown" => KeyAction::Control(Control::Descend),
        "r" | "R" => KeyAction::Reload,
        _ => return None,
    };
    Some(action)
}

/// Deliver a key press to the game
pub fn key_down(game: &mut Game, key: &str) -> Option<KeyAction> {
    let action = map_key(key)?;
    match action {
        KeyAction::Control(control) => game.press(control),
        KeyAction::Reload => {
            if let Err(err) = game.reload_or_restart() {
                log::error!("Reload key ignored: {err}");
            }
        }
    }
    Some(action)
}

/// Deliver a key release to the game
pub fn key_up(game: &mut Game, key: &str) -> Option<KeyAction> {
    let action = map_key(key)?;
    if let KeyAction::Control(control) = action {
        game.release(control);
    }
    Some(action)
}
