//! Single-line text buffer with a char-boundary-aware cursor, shared by the
//! command bar and the poster form fields.

use crate::event::{AppEvent, Direction};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    /// Byte offset of the cursor within `value`.
    pub cursor: usize,
}

impl TextInput {
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Apply an editing event. Returns `true` if the event was consumed.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Char(c) => {
                self.value.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                true
            }
            AppEvent::Backspace => {
                if self.cursor > 0 {
                    let prev = self.prev_boundary();
                    self.value.remove(prev);
                    self.cursor = prev;
                }
                true
            }
            AppEvent::Nav(Direction::Left) => {
                self.cursor = self.prev_boundary();
                true
            }
            AppEvent::Nav(Direction::Right) => {
                if self.cursor < self.value.len() {
                    self.cursor = self.value[self.cursor..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.cursor + i)
                        .unwrap_or(self.value.len());
                }
                true
            }
            _ => false,
        }
    }

    /// Cursor position in columns (chars), for terminal cursor placement.
    pub fn cursor_col(&self) -> u16 {
        self.value[..self.cursor].chars().count() as u16
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}
