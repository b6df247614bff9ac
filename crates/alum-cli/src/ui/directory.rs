//! Registered users pane: search controls above the filtered member list.

use alum_core::member::MemberProfile;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{field_style, notice};
use crate::app::{App, SearchField};

/// Render the directory into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let pane = &app.controller.view().directory;
  let visible = pane.visible();
  let total = pane.snapshot().len();

  let title = if pane.filter().is_empty() {
    format!(" Registered users ({total}) ")
  } else {
    format!(" Registered users ({}/{total}) ", visible.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Min(0)])
    .split(inner);

  draw_search(f, rows[0], app);

  if let Some(text) = &pane.notice {
    f.render_widget(notice(text), rows[1]);
    return;
  }

  let items: Vec<ListItem> = visible.iter().map(|m| ListItem::new(member_line(m))).collect();

  let mut state = ListState::default();
  state.select(if visible.is_empty() { None } else { Some(app.list_cursor) });

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    rows[1],
    &mut state,
  );
}

fn draw_search(f: &mut Frame, area: Rect, app: &App) {
  let filter = app.controller.view().directory.filter();
  let focus = app.search_focus;
  let caret = |field: SearchField| if focus == Some(field) { "_" } else { "" };
  let industry = if filter.industry.is_empty() { "any" } else { filter.industry.as_str() };

  let line = Line::from(vec![
    Span::styled("name: ", field_style(focus == Some(SearchField::Name))),
    Span::raw(format!("{}{}  ", filter.name, caret(SearchField::Name))),
    Span::styled("year: ", field_style(focus == Some(SearchField::GradYear))),
    Span::raw(format!("{}{}  ", filter.grad_year, caret(SearchField::GradYear))),
    Span::styled("industry: ", Style::default()),
    Span::raw(industry.to_string()),
  ]);
  f.render_widget(Paragraph::new(line).style(Style::default().fg(Color::Yellow)), area);
}

fn member_line(member: &MemberProfile) -> Line<'static> {
  let year = member.grad_year.map(|y| format!("'{:02}", y % 100)).unwrap_or_default();
  Line::from(vec![
    Span::raw(format!("{:<28}", member.display_name())),
    Span::styled(format!("{year:<5}"), Style::default().fg(Color::Cyan)),
    Span::styled(member.industries.join(", "), Style::default().fg(Color::DarkGray)),
  ])
}
