//! The signed-in member's profile form.

use alum_core::member::{HEADSHOT_MAX_BYTES, INDUSTRIES};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::field_style;
use crate::app::{App, ProfileField};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let view = app.controller.view();
  let form = &view.profile_form;
  let focus = app.profile_focus;

  let block = Block::default()
    .title(" My profile ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let text_row = |field: ProfileField, label: &'static str, value: &str| {
    let caret = if focus == field { "_" } else { "" };
    Line::from(vec![
      Span::styled(format!("{label:<12}"), field_style(focus == field)),
      Span::raw(format!("{value}{caret}")),
    ])
  };

  let mut lines = vec![
    text_row(ProfileField::Name, "Name", &form.name),
    text_row(ProfileField::GradYear, "Grad year", &form.grad_year),
    Line::from(Span::styled(
      "Industries",
      field_style(focus == ProfileField::Industries),
    )),
  ];

  for (i, tag) in INDUSTRIES.iter().enumerate() {
    let checked = form.industries.iter().any(|t| t == tag);
    let mark = if checked { "[x] " } else { "[ ] " };
    let under_cursor = focus == ProfileField::Industries && i == app.industry_cursor;
    let style = if under_cursor {
      Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
      Style::default()
    };
    lines.push(Line::from(vec![
      Span::raw("  "),
      Span::styled(format!("{mark}{tag}"), style),
    ]));
  }

  lines.push(text_row(ProfileField::Other, "Other", &form.other_industry));
  lines.push(text_row(ProfileField::Bio, "Bio", &form.bio));
  lines.push(text_row(ProfileField::Headshot, "Headshot", &app.headshot_path));

  let current = view.headshot_url.as_deref().unwrap_or("(none)");
  lines.push(Line::from(Span::styled(
    format!(
      "            current: {current}  (max {} MiB)",
      HEADSHOT_MAX_BYTES / (1024 * 1024)
    ),
    Style::default().fg(Color::DarkGray),
  )));

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
