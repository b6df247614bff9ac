//! Application state machine and event dispatcher.
//!
//! The controller owns everything the platform feeds; `App` only adds what
//! the terminal needs on top (focus, cursors, unsaved form text).

use std::path::Path;

use alum_core::{
  member::{HeadshotUpload, INDUSTRIES},
  platform::AuthProvider,
};
use alum_session::SessionPresenceController;
use alum_store_sqlite::SqlitePlatform;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub type Controller = SessionPresenceController<SqlitePlatform>;

// ─── Screen ───────────────────────────────────────────────────────────────────

/// Which pane has the keyboard while signed in. Signed out, the auth form is
/// always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Directory,
  Presence,
  Profile,
}

// ─── Auth form ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
  Login,
  Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
  Email,
  Password,
}

#[derive(Debug, Clone)]
pub struct AuthForm {
  pub mode:     AuthMode,
  pub focus:    AuthField,
  pub email:    String,
  pub password: String,
}

impl Default for AuthForm {
  fn default() -> Self {
    Self {
      mode:     AuthMode::Login,
      focus:    AuthField::Email,
      email:    String::new(),
      password: String::new(),
    }
  }
}

// ─── Directory search ─────────────────────────────────────────────────────────

/// Search input currently taking keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
  Name,
  GradYear,
}

// ─── Profile form ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
  Name,
  GradYear,
  Industries,
  Other,
  Bio,
  Headshot,
}

impl ProfileField {
  const ORDER: [ProfileField; 6] = [
    ProfileField::Name,
    ProfileField::GradYear,
    ProfileField::Industries,
    ProfileField::Other,
    ProfileField::Bio,
    ProfileField::Headshot,
  ];

  fn index(self) -> usize {
    Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
  }

  fn next(self) -> Self { Self::ORDER[(self.index() + 1) % Self::ORDER.len()] }

  fn prev(self) -> Self {
    Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub controller: Controller,

  /// Current screen while signed in.
  pub screen: Screen,

  pub auth: AuthForm,

  /// Search input being typed into, if any.
  pub search_focus: Option<SearchField>,

  /// Cursor position within the *filtered* member list.
  pub list_cursor: usize,

  /// Scroll offset within the presence list.
  pub presence_scroll: usize,

  pub profile_focus: ProfileField,

  /// Highlighted entry in the industry checklist.
  pub industry_cursor: usize,

  /// Path typed into the headshot field; read when the form is saved.
  pub headshot_path: String,
}

impl App {
  pub fn new(controller: Controller) -> Self {
    Self {
      controller,
      screen: Screen::Directory,
      auth: AuthForm::default(),
      search_focus: None,
      list_cursor: 0,
      presence_scroll: 0,
      profile_focus: ProfileField::Name,
      industry_cursor: 0,
      headshot_path: String::new(),
    }
  }

  pub fn is_signed_in(&self) -> bool { self.controller.view().is_signed_in() }

  /// Keep cursors inside lists that may have shrunk since the last frame.
  pub fn clamp_cursors(&mut self) {
    let visible = self.controller.view().directory.visible_len();
    self.list_cursor = self.list_cursor.min(visible.saturating_sub(1));
    let records = self.controller.view().presence.records.len();
    self.presence_scroll = self.presence_scroll.min(records.saturating_sub(1));
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if !self.is_signed_in() {
      return self.handle_auth_key(key).await;
    }

    if self.controller.view().detail.is_some() {
      if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
        self.controller.close_detail();
      }
      return true;
    }

    match key.code {
      KeyCode::F(1) => {
        self.screen = Screen::Directory;
        return true;
      }
      KeyCode::F(2) => {
        self.screen = Screen::Presence;
        return true;
      }
      KeyCode::F(3) => {
        self.screen = Screen::Profile;
        return true;
      }
      KeyCode::F(10) => {
        self.sign_out().await;
        return true;
      }
      _ => {}
    }

    match self.screen {
      Screen::Directory => self.handle_directory_key(key),
      Screen::Presence => self.handle_presence_key(key),
      Screen::Profile => self.handle_profile_key(key).await,
    }
  }

  async fn sign_out(&mut self) {
    self.controller.sign_out().await;
    self.screen = Screen::Directory;
    self.search_focus = None;
    self.list_cursor = 0;
    self.presence_scroll = 0;
    self.headshot_path.clear();
  }

  async fn handle_auth_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
      self.auth.mode = match self.auth.mode {
        AuthMode::Login => AuthMode::Register,
        AuthMode::Register => AuthMode::Login,
      };
      return true;
    }

    match key.code {
      KeyCode::Esc => return false,
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.auth.focus = match self.auth.focus {
          AuthField::Email => AuthField::Password,
          AuthField::Password => AuthField::Email,
        };
      }
      KeyCode::Enter => self.submit_auth().await,
      KeyCode::Backspace => {
        self.auth_field_mut().pop();
      }
      KeyCode::Char(c) => self.auth_field_mut().push(c),
      _ => {}
    }
    true
  }

  fn auth_field_mut(&mut self) -> &mut String {
    match self.auth.focus {
      AuthField::Email => &mut self.auth.email,
      AuthField::Password => &mut self.auth.password,
    }
  }

  async fn submit_auth(&mut self) {
    // Already signed in; the session notification has not reached the view.
    if self.controller.platform().current_user().is_some() {
      return;
    }
    let result = match self.auth.mode {
      AuthMode::Login => self.controller.sign_in(&self.auth.email, &self.auth.password).await,
      AuthMode::Register => {
        self.controller.register(&self.auth.email, &self.auth.password).await
      }
    };
    if result.is_ok() {
      self.auth.password.clear();
      self.auth.focus = AuthField::Email;
      self.screen = Screen::Directory;
    }
  }

  fn handle_directory_key(&mut self, key: KeyEvent) -> bool {
    if let Some(field) = self.search_focus {
      match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => self.search_focus = None,
        KeyCode::Backspace => {
          self.controller.update_filter(|f| {
            match field {
              SearchField::Name => f.name.pop(),
              SearchField::GradYear => f.grad_year.pop(),
            };
          });
        }
        KeyCode::Char(c) => {
          self.controller.update_filter(|f| match field {
            SearchField::Name => f.name.push(c),
            SearchField::GradYear => f.grad_year.push(c),
          });
        }
        _ => {}
      }
      self.list_cursor = 0;
      return true;
    }

    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Char('/') => self.search_focus = Some(SearchField::Name),
      KeyCode::Char('y') => self.search_focus = Some(SearchField::GradYear),
      KeyCode::Char('i') => self.cycle_industry(1),
      KeyCode::Char('I') => self.cycle_industry(-1),
      KeyCode::Char('c') => {
        self.controller.set_filter(Default::default());
        self.list_cursor = 0;
      }
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.controller.view().directory.visible_len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => self.open_selected(),
      _ => {}
    }
    true
  }

  /// Open the member under the list cursor. Selection resolves here, once,
  /// against the filtered list.
  pub fn open_selected(&mut self) {
    let selected = self
      .controller
      .view()
      .directory
      .visible()
      .get(self.list_cursor)
      .map(|m| m.user_id);
    if let Some(id) = selected {
      self.controller.open_detail(id);
    }
  }

  /// Step the industry filter through "any" and each known tag.
  fn cycle_industry(&mut self, step: isize) {
    let options = INDUSTRIES.len() as isize + 1;
    let current = self.controller.view().directory.filter().industry.clone();
    let index = INDUSTRIES
      .iter()
      .position(|t| *t == current)
      .map_or(0, |i| i as isize + 1);
    let next = (index + step).rem_euclid(options) as usize;
    self.controller.update_filter(|f| {
      f.industry = match next {
        0 => String::new(),
        n => INDUSTRIES[n - 1].to_owned(),
      };
    });
    self.list_cursor = 0;
  }

  fn handle_presence_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.controller.view().presence.records.len();
        if self.presence_scroll + 1 < len {
          self.presence_scroll += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.presence_scroll = self.presence_scroll.saturating_sub(1);
      }
      _ => {}
    }
    true
  }

  async fn handle_profile_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
      self.save_profile().await;
      return true;
    }

    match key.code {
      KeyCode::Esc => self.screen = Screen::Directory,
      KeyCode::Tab | KeyCode::Down => self.profile_focus = self.profile_focus.next(),
      KeyCode::BackTab | KeyCode::Up => self.profile_focus = self.profile_focus.prev(),
      KeyCode::Left if self.profile_focus == ProfileField::Industries => {
        self.industry_cursor = self.industry_cursor.saturating_sub(1);
      }
      KeyCode::Right if self.profile_focus == ProfileField::Industries => {
        if self.industry_cursor + 1 < INDUSTRIES.len() {
          self.industry_cursor += 1;
        }
      }
      KeyCode::Char(' ') if self.profile_focus == ProfileField::Industries => {
        if let Some(tag) = INDUSTRIES.get(self.industry_cursor) {
          self.controller.profile_form_mut().toggle_industry(tag);
        }
      }
      KeyCode::Backspace => {
        if let Some(text) = self.profile_text_mut() {
          text.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(text) = self.profile_text_mut() {
          text.push(c);
        }
      }
      _ => {}
    }
    true
  }

  fn profile_text_mut(&mut self) -> Option<&mut String> {
    match self.profile_focus {
      ProfileField::Headshot => Some(&mut self.headshot_path),
      ProfileField::Industries => None,
      field => {
        let form = self.controller.profile_form_mut();
        Some(match field {
          ProfileField::Name => &mut form.name,
          ProfileField::GradYear => &mut form.grad_year,
          ProfileField::Other => &mut form.other_industry,
          _ => &mut form.bio,
        })
      }
    }
  }

  async fn save_profile(&mut self) {
    let path = self.headshot_path.trim().to_owned();
    let headshot = if path.is_empty() {
      None
    } else {
      match read_headshot(Path::new(&path)).await {
        Ok(upload) => Some(upload),
        Err(e) => {
          tracing::warn!(%path, error = %e, "failed to read headshot");
          self.controller.show_error(format!("Unable to read headshot {path}: {e}"));
          return;
        }
      }
    };

    if self.controller.save_profile(headshot).await.is_ok() {
      self.headshot_path.clear();
    }
  }
}

async fn read_headshot(path: &Path) -> std::io::Result<HeadshotUpload> {
  let bytes = tokio::fs::read(path).await?;
  Ok(HeadshotUpload::new(bytes, HeadshotUpload::media_type_for(path)))
}
