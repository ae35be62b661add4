//! Header bar: the single row at the top of the screen.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub const HEADER_TEXT: &str = "KBase Feeds Test UI -- NOT FOR PRODUCTION";

/// Renders the banner text, the signed-in display name (if any), and
/// right-aligned keybinding hints.
pub struct Header<'a> {
    display_name: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(display_name: Option<&'a str>, theme: &'a Theme) -> Self {
        Self { display_name, theme }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            format!(" {HEADER_TEXT} "),
            self.theme.banner.add_modifier(Modifier::BOLD),
        )];
        match self.display_name {
            Some(name) => spans.push(Span::raw(format!(" signed in as {name}"))),
            None => spans.push(Span::styled(
                " not signed in",
                Style::default().add_modifier(Modifier::DIM),
            )),
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        let hint = " n:post  N:global  q:quit  ?:help ";
        let hint_x = area.right().saturating_sub(hint.chars().count() as u16);
        buf.set_string(hint_x, area.y, hint, Style::default().add_modifier(Modifier::DIM));
    }
}
