//! User-initiated actions: registration, login, profile save, search input and
//! the member detail view.
//!
//! Every action reports its outcome through the status message. The returned
//! `Result` is for callers that want to branch on it; the error has already
//! been surfaced by the time it is returned.

use alum_core::{
  Error, Result,
  allowlist::{Allowlist, normalize_email},
  directory::DirectoryFilter,
  member::{HeadshotUpload, MemberProfile, ProfileDraft, UserId},
  platform::{AuthUser, Platform, PlatformError},
};
use tracing::{debug, info, warn};

use crate::controller::SessionPresenceController;

impl<P: Platform> SessionPresenceController<P> {
  // ── Allowlist ─────────────────────────────────────────────────────────────

  /// Fetch and cache the allowlist if it has not been loaded yet.
  async fn ensure_allowlist(&mut self) -> Result<(), PlatformError> {
    if self.allowlist.is_none() {
      let text = self.platform.fetch_allowlist().await?;
      let list = Allowlist::parse(&text);
      debug!(entries = list.len(), "allowlist loaded");
      self.allowlist = Some(list);
    }
    Ok(())
  }

  /// Load the allowlist ahead of the first registration attempt. A failure
  /// is surfaced; the next registration retries the fetch.
  pub async fn preload_allowlist(&mut self) {
    if let Err(e) = self.ensure_allowlist().await {
      warn!(error = %e, "failed to load allowlist");
      self.show_error(format!("Unable to load alumni allowlist: {e}"));
    }
  }

  // ── Registration / login ──────────────────────────────────────────────────

  /// Register an allowlisted email. On success the platform also signs the
  /// new account in, and an empty profile document is created for it.
  pub async fn register(&mut self, email: &str, password: &str) -> Result<AuthUser> {
    self.clear_message();

    if let Err(e) = self.ensure_allowlist().await {
      warn!(error = %e, "failed to load allowlist");
      self.show_error(format!("Unable to load alumni allowlist: {e}"));
      return Err(e.into());
    }

    let email = normalize_email(email);
    let password = password.trim();

    let allowed = self.allowlist.as_ref().is_some_and(|list| list.contains(&email));
    if !allowed {
      info!(%email, "registration rejected: not on allowlist");
      let err = Error::NotOnAllowlist(email);
      self.show_error(err.to_string());
      return Err(err);
    }

    let user = match self.platform.register(&email, password).await {
      Ok(user) => user,
      Err(e) => {
        warn!(%email, error = %e, "registration failed");
        self.show_error(match &e {
          PlatformError::AlreadyRegistered => {
            "This email is already registered. Please log in instead.".to_owned()
          }
          other => format!("Registration failed: {other}"),
        });
        return Err(e.into());
      }
    };
    info!(user_id = %user.user_id, "account registered");

    let profile = MemberProfile::new(user.user_id, &user.email);
    if let Err(e) = self.platform.create_profile(&profile).await {
      warn!(error = %e, "failed to create profile document");
      self.show_error(format!(
        "Registration complete, but your profile could not be created: {e}"
      ));
      return Ok(user);
    }

    self.show_info("Registration complete. You are signed in.");
    Ok(user)
  }

  /// Sign in with existing credentials. The allowlist is not consulted.
  pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<AuthUser> {
    self.clear_message();

    let email = normalize_email(email);
    let password = password.trim();

    match self.platform.sign_in(&email, password).await {
      Ok(user) => Ok(user),
      Err(e) => {
        warn!(%email, error = %e, "login failed");
        self.show_error(format!("Login failed: {e}"));
        Err(e.into())
      }
    }
  }

  // ── Profile ───────────────────────────────────────────────────────────────

  /// Mutable access to the signed-in member's profile form.
  pub fn profile_form_mut(&mut self) -> &mut ProfileDraft { &mut self.view.profile_form }

  /// Save the profile form, uploading `headshot` first if one was picked.
  ///
  /// Validation (year format, headshot size) happens before any upload or
  /// write. A failed upload aborts the save.
  pub async fn save_profile(&mut self, headshot: Option<HeadshotUpload>) -> Result<()> {
    self.clear_message();

    let Some(user) = self.user.clone() else {
      let err = Error::NotSignedIn;
      self.show_error(err.to_string());
      return Err(err);
    };

    let mut patch = match self.view.profile_form.to_patch(&user.email) {
      Ok(patch) => patch,
      Err(e) => {
        self.show_error(e.to_string());
        return Err(e);
      }
    };

    if let Some(headshot) = headshot {
      if let Err(e) = headshot.check_size() {
        info!(size = headshot.len(), "headshot rejected before upload");
        self.show_error(e.to_string());
        return Err(e);
      }

      match self
        .platform
        .upload_headshot(user.user_id, &headshot.bytes, &headshot.media_type)
        .await
      {
        Ok(url) => patch.headshot_url = Some(url),
        Err(e) => {
          warn!(error = %e, "headshot upload failed");
          self.show_error(format!("Headshot upload failed: {e}"));
          return Err(e.into());
        }
      }
    }

    if let Err(e) = self.platform.merge_profile(user.user_id, &patch).await {
      warn!(error = %e, "profile save failed");
      self.show_error(format!("Profile save failed: {e}"));
      return Err(e.into());
    }

    if let Some(url) = patch.headshot_url {
      self.view.headshot_url = Some(url);
    }
    info!(user_id = %user.user_id, "profile saved");
    self.show_info("Profile saved.");
    self.view.directory.refilter();
    Ok(())
  }

  // ── Search ────────────────────────────────────────────────────────────────

  /// Replace the search inputs and recompute the visible list.
  pub fn set_filter(&mut self, filter: DirectoryFilter) {
    self.view.directory.set_filter(filter);
  }

  /// Edit the search inputs in place and recompute the visible list.
  pub fn update_filter(&mut self, edit: impl FnOnce(&mut DirectoryFilter)) {
    let mut filter = self.view.directory.filter().clone();
    edit(&mut filter);
    self.view.directory.set_filter(filter);
  }

  // ── Detail view ───────────────────────────────────────────────────────────

  /// Open a member's full profile. Returns `false` if the member is not in
  /// the current snapshot.
  pub fn open_detail(&mut self, user_id: UserId) -> bool {
    if self.view.directory.snapshot().get(user_id).is_none() {
      return false;
    }
    self.view.detail = Some(user_id);
    true
  }

  pub fn close_detail(&mut self) { self.view.detail = None; }
}
