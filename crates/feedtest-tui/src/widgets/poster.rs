//! Poster: popup form for creating a notification.
//!
//! Two variants share one form: [`PosterKind::Targeted`] posts to
//! `api/V1/notification` and asks for actor, target and source as well;
//! [`PosterKind::Global`] posts to `api/V1/notification/global` and only
//! needs the message fields.
//!
//! `Tab` / `↓` and `Shift+Tab` / `↑` move between fields, `←` / `→` change
//! the level while the level field is focused, `Enter` submits and `Esc`
//! closes the form.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use crate::widgets::text_input::TextInput;
use feedtest_core::{Level, NewNotification};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

const LABEL_WIDTH: u16 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterKind {
    Targeted,
    Global,
}

impl PosterKind {
    pub fn fields(self) -> &'static [PosterField] {
        use PosterField::*;
        match self {
            PosterKind::Targeted => &[Actor, Target, Source, Verb, Object, Level, Text, Link],
            PosterKind::Global => &[Verb, Object, Level, Text, Link],
        }
    }

    fn title(self) -> &'static str {
        match self {
            PosterKind::Targeted => " Post a notification ",
            PosterKind::Global => " Post a global notification ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterField {
    Actor,
    Target,
    Source,
    Verb,
    Object,
    Level,
    Text,
    Link,
}

impl PosterField {
    fn label(self) -> &'static str {
        match self {
            PosterField::Actor => "actor",
            PosterField::Target => "target",
            PosterField::Source => "source",
            PosterField::Verb => "verb",
            PosterField::Object => "object",
            PosterField::Level => "level",
            PosterField::Text => "text",
            PosterField::Link => "link",
        }
    }

    fn required_for(self, kind: PosterKind) -> bool {
        match self {
            PosterField::Verb | PosterField::Object | PosterField::Level => true,
            PosterField::Actor | PosterField::Target | PosterField::Source => {
                kind == PosterKind::Targeted
            }
            PosterField::Text | PosterField::Link => false,
        }
    }

    /// Slot in [`PosterState::inputs`]; `Level` has no text input.
    fn slot(self) -> Option<usize> {
        match self {
            PosterField::Actor => Some(0),
            PosterField::Target => Some(1),
            PosterField::Source => Some(2),
            PosterField::Verb => Some(3),
            PosterField::Object => Some(4),
            PosterField::Level => None,
            PosterField::Text => Some(5),
            PosterField::Link => Some(6),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PosterError {
    #[error("required: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PosterAction {
    Submit(PosterKind, NewNotification),
    Cancel,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PosterState {
    /// Distinguishes this form from earlier ones so a post's outcome only
    /// lands on the form that sent it.
    pub id: u64,
    pub kind: PosterKind,
    inputs: [TextInput; 7],
    pub level: Level,
    /// Index into `kind.fields()`.
    pub focused: usize,
    /// Validation or server error shown under the form.
    pub error: Option<String>,
    /// Set while the post is in flight.
    pub pending: bool,
}

impl PosterState {
    pub fn new(kind: PosterKind) -> Self {
        Self::with_id(0, kind)
    }

    pub fn with_id(id: u64, kind: PosterKind) -> Self {
        Self {
            id,
            kind,
            inputs: Default::default(),
            level: Level::Alert,
            focused: 0,
            error: None,
            pending: false,
        }
    }

    pub fn focused_field(&self) -> PosterField {
        self.kind.fields()[self.focused]
    }

    pub fn value(&self, field: PosterField) -> &str {
        match field.slot() {
            Some(i) => self.inputs[i].value.as_str(),
            None => self.level.as_str(),
        }
    }

    pub fn set_value(&mut self, field: PosterField, value: &str) {
        if let Some(i) = field.slot() {
            self.inputs[i].value = value.to_string();
            self.inputs[i].cursor = value.len();
        }
    }

    /// Validate the form and build the request body.
    ///
    /// `target` is a comma-separated list of user ids.
    pub fn submit(&self) -> Result<NewNotification, PosterError> {
        let missing: Vec<&'static str> = self
            .kind
            .fields()
            .iter()
            .filter(|f| f.required_for(self.kind) && self.value(**f).trim().is_empty())
            .map(|f| f.label())
            .collect();
        if !missing.is_empty() {
            return Err(PosterError::MissingFields(missing));
        }

        let text = |f: PosterField| {
            let v = self.value(f).trim();
            (!v.is_empty()).then(|| v.to_string())
        };

        let mut note = NewNotification::new(
            self.value(PosterField::Verb).trim(),
            self.value(PosterField::Object).trim(),
            self.level,
        );
        note.context.text = text(PosterField::Text);
        note.context.link = text(PosterField::Link);

        if self.kind == PosterKind::Targeted {
            note.actor = text(PosterField::Actor);
            note.source = text(PosterField::Source);
            note.target = self
                .value(PosterField::Target)
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(note)
    }

    pub fn handle(&mut self, event: &AppEvent) -> Option<PosterAction> {
        if self.pending {
            return matches!(event, AppEvent::Escape).then_some(PosterAction::Cancel);
        }
        let field = self.focused_field();
        match event {
            AppEvent::Escape => Some(PosterAction::Cancel),
            AppEvent::Enter => match self.submit() {
                Ok(note) => {
                    self.error = None;
                    self.pending = true;
                    tracing::debug!(kind = ?self.kind, verb = %note.verb, "poster: submit");
                    Some(PosterAction::Submit(self.kind, note))
                }
                Err(e) => {
                    self.error = Some(e.to_string());
                    None
                }
            },
            AppEvent::FocusNext | AppEvent::Nav(Direction::Down) => {
                self.focused = (self.focused + 1) % self.kind.fields().len();
                None
            }
            AppEvent::FocusPrev | AppEvent::Nav(Direction::Up) => {
                let n = self.kind.fields().len();
                self.focused = (self.focused + n - 1) % n;
                None
            }
            AppEvent::Nav(dir @ (Direction::Left | Direction::Right))
                if field == PosterField::Level =>
            {
                self.level = step_level(self.level, *dir == Direction::Right);
                None
            }
            other => {
                if let Some(i) = field.slot() {
                    if self.inputs[i].handle(other) {
                        self.error = None;
                    }
                }
                None
            }
        }
    }

    /// The post failed; keep the form open with the message shown.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.pending = false;
        self.error = Some(message.into());
    }
}

fn step_level(level: Level, forward: bool) -> Level {
    let n = Level::ALL.len();
    let i = Level::ALL.iter().position(|l| *l == level).unwrap_or(0);
    let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
    Level::ALL[next]
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct Poster<'a> {
    state: &'a PosterState,
    theme: &'a Theme,
}

impl<'a> Poster<'a> {
    pub fn new(state: &'a PosterState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    /// Popup rectangle inside the full-screen `area`.
    pub fn popup_area(&self, area: Rect) -> Rect {
        // one row per field, a blank row, the status row, and the border
        let height = self.state.kind.fields().len() as u16 + 4;
        centered_rect(64, height, area)
    }

    /// Terminal cursor position for the focused text field, if any.
    pub fn cursor_position(&self, area: Rect) -> Option<(u16, u16)> {
        let popup = self.popup_area(area);
        let field = self.state.focused_field();
        let slot = field.slot()?;
        let col = self.state.inputs[slot].cursor_col();
        let x = (popup.x + 1 + LABEL_WIDTH + col).min(popup.right().saturating_sub(2));
        let y = popup.y + 1 + self.state.focused as u16;
        Some((x, y))
    }
}

impl Widget for Poster<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = self.popup_area(area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(self.state.kind.title())
            .title_bottom(" Enter:post  Esc:close ")
            .border_style(self.theme.border_command_bar);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines: Vec<Line> = self
            .state
            .kind
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let focused = i == self.state.focused;
                let marker = if field.required_for(self.state.kind) { "*" } else { " " };
                let label_style = if focused {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default().add_modifier(Modifier::DIM)
                };
                let label = Span::styled(
                    format!("{:<w$}", format!("{}{}", field.label(), marker), w = LABEL_WIDTH as usize),
                    label_style,
                );
                let value = match field {
                    PosterField::Level => Span::styled(
                        format!("◂ {} ▸", self.state.level),
                        self.theme.level_style(self.state.level),
                    ),
                    _ => Span::raw(self.state.value(*field).to_string()),
                };
                Line::from(vec![label, value])
            })
            .collect();

        lines.push(Line::default());
        if self.state.pending {
            lines.push(Line::from(Span::styled(
                "posting…",
                Style::default().add_modifier(Modifier::DIM),
            )));
        } else if let Some(ref err) = self.state.error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }

        Paragraph::new(lines).render(inner, buf);
    }
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
