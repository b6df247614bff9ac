//! Login / registration form shown while signed out.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::field_style;
use crate::app::{App, AuthField, AuthMode};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let form = &app.auth;
  let title = match form.mode {
    AuthMode::Login => " Log in ",
    AuthMode::Register => " Register ",
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let masked: String = "•".repeat(form.password.chars().count());
  let cursor = |field: AuthField| if form.focus == field { "_" } else { "" };

  let mut lines = vec![
    Line::from(vec![
      Span::styled("Email     ", field_style(form.focus == AuthField::Email)),
      Span::raw(format!("{}{}", form.email, cursor(AuthField::Email))),
    ]),
    Line::from(vec![
      Span::styled("Password  ", field_style(form.focus == AuthField::Password)),
      Span::raw(format!("{masked}{}", cursor(AuthField::Password))),
    ]),
    Line::from(""),
  ];

  if form.mode == AuthMode::Register {
    lines.push(Line::from(Span::styled(
      "Only emails on the alumni allowlist can register.",
      Style::default().fg(Color::DarkGray),
    )));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
