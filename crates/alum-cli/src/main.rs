//! `alum` — terminal client for the alumni directory.
//!
//! # Usage
//!
//! ```
//! alum --allowlist ~/alumni.txt
//! alum --config ~/.config/alum/config.toml
//! ```
//!
//! Logs go to a file (`--log-file`) since the terminal belongs to the UI;
//! `RUST_LOG` adjusts the level.

mod app;
mod settings;
mod ui;

use std::{io, path::PathBuf, sync::Arc, time::Duration};

use alum_core::platform::{AuthProvider, AuthUser};
use alum_store_sqlite::{SqlitePlatform, StoreOptions};
use anyhow::{Context, Result};
use app::{App, Controller};
use clap::Parser;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{ClientConfig, Overrides};
use tokio::sync::watch;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

/// How long the loop waits for feed or session activity before checking the
/// keyboard again.
const TICK: Duration = Duration::from_millis(50);

/// Grace period for the unload presence write before the runtime shuts down.
const UNLOAD_GRACE: Duration = Duration::from_millis(200);

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "alum", version, about = "Terminal client for the alumni directory")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "~/.config/alum/config.toml")]
  config: PathBuf,

  /// SQLite database holding accounts, profiles and presence.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Newline-delimited list of emails allowed to register.
  #[arg(long, value_name = "FILE")]
  allowlist: Option<PathBuf>,

  /// Directory for uploaded headshots.
  #[arg(long, value_name = "DIR")]
  blob_dir: Option<PathBuf>,

  /// Where to write logs.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let cfg = ClientConfig::load(&settings::expand_tilde(&args.config), Overrides {
    store:     args.store,
    allowlist: args.allowlist,
    blob_dir:  args.blob_dir,
    log_file:  args.log_file,
  })?;

  init_tracing(&cfg)?;
  info!(store = %cfg.store_path.display(), "starting alum");

  if let Some(parent) = cfg.store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let platform = SqlitePlatform::open(&cfg.store_path, StoreOptions {
    blob_dir:       cfg.blob_dir.clone(),
    allowlist_path: cfg.allowlist_path.clone(),
  })
  .await
  .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let platform = Arc::new(platform);

  let mut controller = Controller::new(Arc::clone(&platform));
  controller.preload_allowlist().await;

  // The one session subscription for the life of the process.
  let mut session = platform.session_changes();
  let initial = session.borrow_and_update().clone();
  controller.handle_auth_change(initial).await;

  let mut app = App::new(controller);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app, &mut session).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  app.controller.page_unload();
  tokio::time::sleep(UNLOAD_GRACE).await;
  info!("exiting");

  run_result
}

fn init_tracing(cfg: &ClientConfig) -> Result<()> {
  if let Some(parent) = cfg.log_file.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&cfg.log_file)
    .with_context(|| format!("failed to open log file {}", cfg.log_file.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(std::sync::Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

/// What woke the loop up.
enum Wake {
  Feed(alum_session::FeedEvent),
  Session(Option<AuthUser>),
  Tick,
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  session: &mut watch::Receiver<Option<AuthUser>>,
) -> Result<()> {
  loop {
    app.clamp_cursors();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    let wake = tokio::select! {
      event = app.controller.next_feed_event() => Wake::Feed(event),
      changed = session.changed() => match changed {
        Ok(()) => Wake::Session(session.borrow_and_update().clone()),
        Err(_) => Wake::Tick,
      },
      _ = tokio::time::sleep(TICK) => Wake::Tick,
    };

    match wake {
      Wake::Feed(event) => app.controller.apply_feed_event(event),
      Wake::Session(user) => app.controller.handle_auth_change(user).await,
      Wake::Tick => {}
    }
    app.controller.drain_feed_events();

    // Drain pending keys without blocking the runtime.
    loop {
      let maybe_event = tokio::task::block_in_place(|| {
        if event::poll(Duration::ZERO)? {
          Ok::<_, io::Error>(Some(event::read()?))
        } else {
          Ok(None)
        }
      })?;

      match maybe_event {
        Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
          if !app.handle_key(key).await {
            return Ok(());
          }
        }
        Some(_) => {}
        None => break,
      }
    }
  }
}
