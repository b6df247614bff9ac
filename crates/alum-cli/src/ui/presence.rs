//! Online users pane: every presence record, ordered by email.

use alum_core::presence::PresenceStatus;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use super::notice;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let pane = &app.controller.view().presence;
  let online = pane.records.iter().filter(|r| r.is_online()).count();

  let block = Block::default()
    .title(format!(" Online ({online}/{}) ", pane.records.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  if let Some(text) = &pane.notice {
    f.render_widget(notice(text), inner);
    return;
  }

  let lines: Vec<Line> = pane
    .records
    .iter()
    .map(|record| {
      let (dot, color) = match record.status {
        PresenceStatus::Online => ("● ", Color::Green),
        PresenceStatus::Offline => ("○ ", Color::DarkGray),
      };
      let seen = record
        .last_seen
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string());
      Line::from(vec![
        Span::styled(dot, Style::default().fg(color)),
        Span::raw(format!("{:<32}", record.email)),
        Span::styled(format!("{:<8}", record.status.as_str()), Style::default().fg(color)),
        Span::styled(seen, Style::default().fg(Color::DarkGray)),
      ])
    })
    .collect();

  let para = Paragraph::new(lines).scroll((app.presence_scroll as u16, 0));
  f.render_widget(para, inner);
}
