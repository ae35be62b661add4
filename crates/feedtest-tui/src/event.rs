//! Semantic application events: crossterm key events mapped to a
//! widget-agnostic vocabulary so widgets never touch crossterm directly.
//!
//! # Usage
//!
//! Build a [`Keymap`] from the `[keybindings]` config section once at
//! startup, then call [`Keymap::to_app_event`] on every crossterm [`Event`]
//! and match on the returned [`AppEvent`].
//!
//! # Keybindings
//!
//! | Key(s)                  | Event                      |
//! |-------------------------|----------------------------|
//! | `q`, `Ctrl+c`           | `Quit`                     |
//! | `Tab` *                 | `FocusNext`                |
//! | `Shift+Tab`             | `FocusPrev`                |
//! | `r` *                   | `Refresh`                  |
//! | `Space` *               | `ToggleSeen`               |
//! | `e` *                   | `IncludeSeen`              |
//! | `o` *                   | `ReverseSort`              |
//! | `L` *                   | `CycleLevel`               |
//! | `S` *                   | `CycleSource`              |
//! | `n` *                   | `OpenPoster`               |
//! | `N` *                   | `OpenGlobalPoster`         |
//! | `↑` / `k`               | `Nav(Up)`                  |
//! | `↓` / `j`               | `Nav(Down)`                |
//! | `←` / `h`               | `Nav(Left)`                |
//! | `→` / `l`               | `Nav(Right)`               |
//! | printable char          | `Char(c)`                  |
//! | `Backspace`             | `Backspace`                |
//! | `Enter`                 | `Enter`                    |
//! | `Esc`                   | `Escape`                   |
//! | terminal resize         | `Resize(w, h)`             |
//!
//! Keys marked `*` come from the config file; the table shows the defaults.
//!
//! ## Insert mode
//!
//! When a text-input widget (poster form, command bar) is focused, the event
//! loop calls [`Keymap::to_app_event_insert`] instead. In insert mode every
//! printable character is forwarded as `Char`; only `Ctrl+c`, `Escape`,
//! `Enter`, `Tab`, `Shift+Tab`, `Backspace` and the arrow keys keep their
//! special bindings.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use feedtest_core::config::KeybindingsConfig;

/// Cardinal direction for list navigation and text-cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A semantic application event derived from a raw crossterm [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Exit the application.
    Quit,
    /// Move focus to the next pane, or the next form field.
    FocusNext,
    /// Move focus to the previous form field.
    FocusPrev,
    /// Re-fetch both feeds with the current filters.
    Refresh,
    /// Mark the selected notification seen / unseen.
    ToggleSeen,
    /// Flip the include-seen filter control.
    IncludeSeen,
    /// Flip the sort-order filter control.
    ReverseSort,
    /// Step the level filter control.
    CycleLevel,
    /// Step the source filter control.
    CycleSource,
    /// Open the targeted-notification poster.
    OpenPoster,
    /// Open the global-notification poster.
    OpenGlobalPoster,
    /// Navigate a list (or move a text cursor left/right).
    Nav(Direction),
    /// A printable character forwarded to the active text input.
    Char(char),
    /// Delete the character before the cursor in the active text input.
    Backspace,
    /// Confirm the active input.
    Enter,
    /// The terminal was resized to the given (width, height).
    Resize(u16, u16),
    /// Dismiss the active modal (poster, help popup, command bar).
    Escape,
}

/// Configurable key → event table for normal mode.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<(KeyCode, AppEvent)>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeybindingsConfig::default())
    }
}

impl Keymap {
    /// Build from the `[keybindings]` section. Unparseable entries are
    /// skipped with a warning; the fixed keys (`q`, arrows, `Enter`, …) are
    /// always available.
    pub fn from_config(cfg: &KeybindingsConfig) -> Self {
        let entries = [
            (&cfg.toggle_focus, AppEvent::FocusNext),
            (&cfg.refresh, AppEvent::Refresh),
            (&cfg.toggle_seen, AppEvent::ToggleSeen),
            (&cfg.include_seen, AppEvent::IncludeSeen),
            (&cfg.reverse_sort, AppEvent::ReverseSort),
            (&cfg.cycle_level, AppEvent::CycleLevel),
            (&cfg.cycle_source, AppEvent::CycleSource),
            (&cfg.post, AppEvent::OpenPoster),
            (&cfg.post_global, AppEvent::OpenGlobalPoster),
        ];

        let bindings = entries
            .into_iter()
            .filter_map(|(raw, event)| match parse_binding(raw) {
                Some(code) => Some((code, event)),
                None => {
                    tracing::warn!(binding = %raw, ?event, "ignoring unparseable keybinding");
                    None
                }
            })
            .collect();

        Self { bindings }
    }

    /// Map a raw crossterm [`Event`] to an [`AppEvent`] (normal / navigation mode).
    ///
    /// Returns `None` for events that carry no meaning for the application
    /// (mouse events, unbound keys).
    pub fn to_app_event(&self, event: Event) -> Option<AppEvent> {
        match event {
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            Event::Key(key) => self.map_key(key),
            _ => None,
        }
    }

    /// Map a raw crossterm [`Event`] to an [`AppEvent`] for text-input mode.
    pub fn to_app_event_insert(&self, event: Event) -> Option<AppEvent> {
        match event {
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            Event::Key(key) => map_key_insert(key),
            _ => None,
        }
    }

    fn map_key(&self, key: KeyEvent) -> Option<AppEvent> {
        use KeyCode::*;
        use KeyModifiers as Mod;

        if key.code == Char('c') && key.modifiers == Mod::CONTROL {
            return Some(AppEvent::Quit);
        }

        // Configured bindings win over the fixed table below. Uppercase
        // letters may or may not carry SHIFT depending on the terminal.
        if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT {
            if let Some((_, event)) = self.bindings.iter().find(|(code, _)| *code == key.code) {
                return Some(event.clone());
            }
        }

        match key.code {
            Char('q') if key.modifiers == Mod::NONE => Some(AppEvent::Quit),
            BackTab => Some(AppEvent::FocusPrev),

            Up | Char('k') if key.modifiers == Mod::NONE => Some(AppEvent::Nav(Direction::Up)),
            Down | Char('j') if key.modifiers == Mod::NONE => {
                Some(AppEvent::Nav(Direction::Down))
            }
            Left | Char('h') if key.modifiers == Mod::NONE => {
                Some(AppEvent::Nav(Direction::Left))
            }
            Right | Char('l') if key.modifiers == Mod::NONE => {
                Some(AppEvent::Nav(Direction::Right))
            }

            Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
                Some(AppEvent::Char(c))
            }

            Backspace if key.modifiers == Mod::NONE => Some(AppEvent::Backspace),
            Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
            Esc => Some(AppEvent::Escape),

            _ => None,
        }
    }
}

/// Key mapping for text-input / insert mode.
fn map_key_insert(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    match key.code {
        // Ctrl+c always quits, even while typing
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Up => Some(AppEvent::Nav(Direction::Up)),
        Down => Some(AppEvent::Nav(Direction::Down)),
        Left => Some(AppEvent::Nav(Direction::Left)),
        Right => Some(AppEvent::Nav(Direction::Right)),

        Tab if key.modifiers == Mod::NONE => Some(AppEvent::FocusNext),
        BackTab => Some(AppEvent::FocusPrev),

        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        Backspace if key.modifiers == Mod::NONE => Some(AppEvent::Backspace),
        Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

/// Parse a binding string: `Tab`, `Space`, or a single character.
fn parse_binding(raw: &str) -> Option<KeyCode> {
    match raw {
        "Tab" | "tab" => Some(KeyCode::Tab),
        "Space" | "space" => Some(KeyCode::Char(' ')),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
