//! Full profile of one member, drawn as a popup over the directory.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(member) = app.controller.view().detail_member() else {
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", member.display_name()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let label = |text: &'static str| {
    Span::styled(
      format!("{text:<12}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
  };
  let dim = Style::default().fg(Color::DarkGray);

  let name = if member.name.is_empty() {
    Span::styled("(no name)", dim)
  } else {
    Span::raw(member.name.clone())
  };
  let year = match member.grad_year {
    Some(y) => Span::raw(y.to_string()),
    None => Span::styled("—", dim),
  };
  let industries = if member.industries.is_empty() {
    Span::styled("—", dim)
  } else {
    Span::raw(member.industries.join(", "))
  };
  let headshot = match &member.headshot_url {
    Some(url) => Span::raw(url.clone()),
    None => Span::styled("(no headshot)", dim),
  };

  let mut lines = vec![
    Line::from(vec![label("name"), name]),
    Line::from(vec![label("email"), Span::raw(member.email.clone())]),
    Line::from(vec![label("class of"), year]),
    Line::from(vec![label("industries"), industries]),
    Line::from(vec![label("headshot"), headshot]),
    Line::from(""),
  ];
  if member.bio.is_empty() {
    lines.push(Line::from(Span::styled("No bio yet.", dim)));
  } else {
    lines.extend(member.bio.lines().map(|l| Line::from(l.to_string())));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
