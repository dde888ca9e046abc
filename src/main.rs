//! Terminal runner (default binary).
//!
//! Reads configuration from the environment, then runs a fixed-cadence frame
//! loop: poll the engine, drain pending keys, render, sleep out the frame.

use std::fs::{self, File};
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blockfall::core::{Game, GameConfig, GameEvent, GameSnapshot};
use blockfall::input::handle_key_event;
use blockfall::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};

fn main() -> Result<()> {
    let config = GameConfig::from_env().context("invalid BLOCKFALL_* configuration")?;
    init_tracing(config.log_path.as_deref())?;
    info!(
        width = config.grid_width,
        height = config.grid_height,
        seed = config.seed,
        "starting"
    );

    let game = Game::new(config)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(game, &mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Log to the configured file only; stderr would corrupt the raw-mode screen.
fn init_tracing(log_path: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let Some(path) = log_path else {
        tracing_subscriber::registry().with(env_filter).init();
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();
    info!(path = %path.display(), "logging initialized");
    Ok(())
}

fn run(mut game: Game, term: &mut TerminalRenderer) -> Result<()> {
    let frame = game.config().frame_duration();
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = GameSnapshot::default();

    if let Some(event) = game.start() {
        log_event(event);
    }

    loop {
        let frame_start = Instant::now();

        if let Some(event) = game.poll()? {
            log_event(event);
        }

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    let Some(command) = handle_key_event(key) else {
                        continue;
                    };
                    if let ControlFlow::Break(()) = game.apply(command) {
                        info!(score = game.score(), "quit");
                        return Ok(());
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        game.snapshot_into(&mut snap);
        view.render_into(&snap, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        if let Some(rest) = frame.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

fn log_event(event: GameEvent) {
    match event {
        GameEvent::NextPiece { kind, rows_cleared } => {
            info!(piece = kind.name(), rows_cleared, "next piece");
        }
        GameEvent::GameOver { score } => info!(score, "game over"),
    }
}
