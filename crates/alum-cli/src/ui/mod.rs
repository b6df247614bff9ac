//! TUI rendering — orchestrates all panes.

pub mod auth;
pub mod directory;
pub mod member_detail;
pub mod presence;
pub mod profile;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Clear, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // message
      Constraint::Length(1), // key hints
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_message(f, rows[2], app);
  draw_hints(f, rows[3], app);

  if app.controller.view().detail_member().is_some() {
    let popup = centered(rows[1], 70, 80);
    f.render_widget(Clear, popup);
    member_detail::draw(f, popup, app);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let who = match &app.controller.view().signed_in_as {
    Some(email) => format!(" alum  {email}"),
    None => " alum  not signed in".to_string(),
  };
  let left = Span::styled(
    who,
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  if !app.is_signed_in() {
    // The lists still render their signed-out placeholders next to the form.
    let cols = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
      .split(area);
    auth::draw(f, cols[0], app);
    let lists = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
      .split(cols[1]);
    directory::draw(f, lists[0], app);
    presence::draw(f, lists[1], app);
    return;
  }

  match app.screen {
    Screen::Directory => directory::draw(f, area, app),
    Screen::Presence => presence::draw(f, area, app),
    Screen::Profile => profile::draw(f, area, app),
  }
}

// ─── Status rows ──────────────────────────────────────────────────────────────

fn draw_message(f: &mut Frame, area: Rect, app: &App) {
  let Some(message) = &app.controller.view().message else {
    return;
  };
  let color = if message.is_error() { Color::Red } else { Color::Green };
  f.render_widget(
    Paragraph::new(format!(" {}", message.text)).style(Style::default().fg(color)),
    area,
  );
}

fn draw_hints(f: &mut Frame, area: Rect, app: &App) {
  let view = app.controller.view();
  let (mode_label, hints) = if !app.is_signed_in() {
    ("AUTH", "Tab field  Ctrl-R login/register  Enter submit  Esc quit")
  } else if view.detail.is_some() {
    ("MEMBER", "Esc close")
  } else {
    match app.screen {
      Screen::Directory if app.search_focus.is_some() => {
        ("SEARCH", "Type to filter  Enter/Esc done")
      }
      Screen::Directory => (
        "DIRECTORY",
        "↑↓ move  Enter open  / name  y year  i/I industry  c clear  F2 online  F3 profile  F10 sign out  q quit",
      ),
      Screen::Presence => ("ONLINE", "↑↓ scroll  F1 directory  F3 profile  F10 sign out  q quit"),
      Screen::Profile => (
        "PROFILE",
        "Tab/↑↓ field  ←→ Space industries  Ctrl-S save  Esc back  F10 sign out",
      ),
    }
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// A rectangle of `pct_x` × `pct_y` percent centred in `area`.
fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage((100 - pct_y) / 2),
      Constraint::Percentage(pct_y),
      Constraint::Percentage((100 - pct_y) / 2),
    ])
    .split(area);
  Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - pct_x) / 2),
      Constraint::Percentage(pct_x),
      Constraint::Percentage((100 - pct_x) / 2),
    ])
    .split(rows[1])[1]
}

/// Style for a form field depending on focus.
pub(crate) fn field_style(focused: bool) -> Style {
  if focused {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
  } else {
    Style::default()
  }
}

/// Placeholder text rendered in place of an empty list.
pub(crate) fn notice(text: &str) -> Paragraph<'static> {
  Paragraph::new(text.to_owned()).style(Style::default().fg(Color::DarkGray))
}
