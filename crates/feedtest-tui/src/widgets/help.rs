//! Help popup: centred floating overlay listing keybindings and commands.
//!
//! Toggle with `?`; close with `?` or `Escape`.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

const BINDINGS: &[(&str, &str)] = &[
    ("q  /  Ctrl+c", "Quit"),
    ("Tab", "Switch focus: your feed ↔ global feed"),
    ("↑ k  /  ↓ j", "Move the selection"),
    ("Space  /  Enter", "Mark the selected notification seen / unseen"),
    ("r", "Refresh both feeds"),
    ("e", "Include seen notifications"),
    ("o", "Reverse sort order"),
    ("L", "Cycle level filter"),
    ("S", "Cycle source filter"),
    ("n", "Post a notification"),
    ("N", "Post a global notification"),
    (":", "Open the command line"),
    ("?", "Toggle this help popup"),
];

const COMMANDS: &[(&str, &str)] = &[
    ("token <token> [name]", "Sign in and load the feed"),
    ("logout", "Hide the feed and forget the token"),
    ("level <name|all>", "Filter your feed by level"),
    ("source <name|all>", "Filter your feed by source service"),
    ("verb <verb|all>", "Filter your feed by verb"),
    ("seen  /  rev", "Toggle include-seen / sort order"),
    ("post  /  global", "Open a poster form"),
    ("theme <name>  /  ts", "Switch theme / toggle timestamps"),
];

pub struct HelpPopup<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (BINDINGS.len() + COMMANDS.len()) as u16 + 4;
        let popup = centered_rect(76, height, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" feedtest — keybindings (? to close) ")
            .border_style(self.theme.border_command_bar.add_modifier(Modifier::BOLD));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines: Vec<Line> = BINDINGS.iter().map(|(k, d)| entry(k, d)).collect();
        lines.push(Line::default());
        lines.push(Line::styled(" Commands", Style::default().add_modifier(Modifier::UNDERLINED)));
        lines.extend(COMMANDS.iter().map(|(c, d)| entry(&format!(":{c}"), d)));

        Paragraph::new(lines).render(inner, buf);
    }
}

fn entry<'a>(key: &str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {key:<24}"), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(desc),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
