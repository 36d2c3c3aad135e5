//! Command enum for testable input handling
//!
//! Commands represent the intent of a key press without side effects.
//! The window layer maps winit keys to a key name; [`Command::from_key`]
//! turns that into a command the showcase executes.

use neon_theme::ThemeId;

/// Commands that can be returned by input handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch to a theme (through the transition sequence)
    SwitchTheme(ThemeId),
    /// Start a glitch session on the headline
    Glitch,
    /// Show or hide the animated scene
    ToggleScene,
    /// Close the window
    Quit,
}

impl Command {
    /// Command bound to a key, by its logical name
    ///
    /// Digits `1`-`4` pick themes in registry order.
    pub fn from_key(key: &str) -> Option<Command> {
        match key {
            "1" | "2" | "3" | "4" => {
                let index = key.parse::<usize>().ok()? - 1;
                ThemeId::ALL.get(index).copied().map(Command::SwitchTheme)
            }
            "g" | "G" => Some(Command::Glitch),
            "v" | "V" => Some(Command::ToggleScene),
            "Escape" => Some(Command::Quit),
            _ => None,
        }
    }
}
