//! Game module - the coordinator
//!
//! Owns the grid, the current piece and the runtime its descend task runs on.
//! The frame loop drives it with two calls:
//!
//! - [`Game::apply`] for every input command, mutating the piece under its lock;
//! - [`Game::poll`] once per frame, which never blocks on a falling piece.
//!
//! When a piece has locked (landed on its own or dropped), `poll` joins the
//! finished task, scores the cleared rows, spawns the next piece and starts
//! its descent, or reports game over if the new piece cannot be placed.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::descend::{Completion, DescendTask, TaskGauge};
use crate::error::EngineError;
use crate::grid::Grid;
use crate::piece::{Piece, PieceHandle};
use crate::rng::PieceGenerator;
use crate::scoring::{calculate_level, calculate_score, descend_speed};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{Command, Direction, PieceKind, Rotation};

/// Something the frame loop should know about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The previous piece locked and a new one started falling
    NextPiece { kind: PieceKind, rows_cleared: u32 },
    /// A new piece overlapped the stack; emitted once
    GameOver { score: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// First piece spawned, descent not started
    Ready,
    Running,
    Over,
}

/// The coordinator
///
/// Dropping a `Game` blocks on its runtime until the descend task exits, so
/// it must not be dropped from inside an async context (that panics).
pub struct Game {
    config: GameConfig,
    grid: Arc<Mutex<Grid>>,
    generator: PieceGenerator,
    piece: PieceHandle,
    descent: Option<DescendTask>,
    /// Set when a Drop command locked the current piece
    dropped: bool,
    status: GameStatus,
    score: u32,
    level: u32,
    /// Grid rows-cleared counter at the previous piece
    lines: u32,
    pieces: u32,
    gauge: TaskGauge,
    // Declared last: dropped after every handle it runs tasks for.
    runtime: Runtime,
}

impl Game {
    /// Empty grid and random pieces as configured
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        let grid = Grid::new(config.grid_width as usize, config.grid_height as usize);
        let generator = PieceGenerator::new(config.seed);
        Self::with_parts(config, grid, generator)
    }

    /// Start from a prepared grid and generator.
    ///
    /// The grid's own dimensions win over the configured ones.
    pub fn with_parts(
        config: GameConfig,
        grid: Grid,
        mut generator: PieceGenerator,
    ) -> Result<Self, EngineError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("blockfall-descend")
            .enable_time()
            .build()?;

        let level = calculate_level(0);
        let grid = Arc::new(Mutex::new(grid));
        let kind = generator.next_kind();
        let piece = spawn_piece(&grid, kind, descend_speed(config.base_speed, level));

        Ok(Self {
            config,
            grid,
            generator,
            piece,
            descent: None,
            dropped: false,
            status: GameStatus::Ready,
            score: 0,
            level,
            lines: 0,
            pieces: 1,
            gauge: TaskGauge::new(),
            runtime,
        })
    }

    /// Begin the descent of the first piece.
    ///
    /// Returns [`GameEvent::GameOver`] if it already overlaps the grid.
    /// Calling it again is a no-op.
    pub fn start(&mut self) -> Option<GameEvent> {
        if self.status != GameStatus::Ready {
            return None;
        }
        self.begin_piece()
    }

    /// Apply one input command to the current piece.
    ///
    /// Rejected moves are silent. Before [`start`](Self::start) the piece may
    /// be moved and rotated but not dropped. Returns `Break` for
    /// [`Command::Quit`].
    pub fn apply(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::MoveLeft => {
                self.piece.move_piece(Direction::Left);
            }
            Command::MoveRight => {
                self.piece.move_piece(Direction::Right);
            }
            Command::RotateForward => {
                self.piece.rotate(Rotation::Forward);
            }
            Command::RotateBackward => {
                self.piece.rotate(Rotation::Backward);
            }
            // Locking before the descent starts would leave `start` facing
            // the piece's own merged cells.
            Command::Drop if self.status != GameStatus::Running => {}
            Command::Drop => {
                if self.piece.drop_piece().is_some() {
                    self.dropped = true;
                }
            }
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Check, without blocking, whether the current piece has locked and if
    /// so move on to the next one.
    pub fn poll(&mut self) -> Result<Option<GameEvent>, EngineError> {
        if self.status != GameStatus::Running {
            return Ok(None);
        }
        let Some(task) = self.descent.as_mut() else {
            return Ok(None);
        };

        if !self.dropped {
            match task.try_complete() {
                Completion::Pending => return Ok(None),
                Completion::Landed(_) => {}
                Completion::Closed => return Err(self.lost_task()),
            }
        }
        self.next_piece().map(Some)
    }

    /// Join a task whose completion channel closed without a landing.
    fn lost_task(&mut self) -> EngineError {
        let Some(task) = self.descent.take() else {
            return EngineError::DescendTaskLost;
        };
        match self.runtime.block_on(task.join()) {
            Err(err) => err,
            Ok(()) => EngineError::DescendTaskLost,
        }
    }

    fn next_piece(&mut self) -> Result<GameEvent, EngineError> {
        if let Some(task) = self.descent.take() {
            self.runtime.block_on(task.join())?;
        }
        self.dropped = false;

        let rows_cleared = self.update_score();
        let kind = self.generator.next_kind();
        self.piece = spawn_piece(
            &self.grid,
            kind,
            descend_speed(self.config.base_speed, self.level),
        );
        self.pieces += 1;

        Ok(self
            .begin_piece()
            .unwrap_or(GameEvent::NextPiece { kind, rows_cleared }))
    }

    fn begin_piece(&mut self) -> Option<GameEvent> {
        if self.piece.overlaps_grid() {
            self.piece.release();
            self.status = GameStatus::Over;
            info!(
                piece = self.piece.kind().name(),
                score = self.score,
                "piece cannot be placed, game over"
            );
            return Some(GameEvent::GameOver { score: self.score });
        }

        self.status = GameStatus::Running;
        self.descent = Some(DescendTask::spawn(
            self.runtime.handle(),
            self.piece.clone(),
            self.config.descend_cycle(),
            self.gauge.clone(),
        ));
        None
    }

    /// Fold rows cleared since the previous piece into score and level.
    fn update_score(&mut self) -> u32 {
        let total = self
            .grid
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rows_cleared();
        let cleared = total - self.lines;
        self.lines = total;
        self.score += calculate_score(cleared);
        self.level = calculate_level(self.score);
        if cleared > 0 {
            info!(cleared, score = self.score, level = self.level, "score updated");
        }
        cleared
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::Over
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Rows cleared up to the last completed piece
    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Pieces spawned so far, the current one included
    pub fn pieces(&self) -> u32 {
        self.pieces
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Handle to the current piece
    pub fn piece(&self) -> &PieceHandle {
        &self.piece
    }

    /// Live/peak counters of descend tasks
    pub fn task_gauge(&self) -> &TaskGauge {
        &self.gauge
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.piece.read(|piece, grid| {
            out.width = grid.width();
            out.height = grid.height();
            grid.write_cells_into(&mut out.cells);
            out.active = Some(ActiveSnapshot::from(piece));
        });
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines;
        out.pieces = self.pieces;
        out.game_over = self.is_over();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        // Wakes the task so the join below returns.
        self.piece.release();
        if let Some(task) = self.descent.take() {
            let _ = self.runtime.block_on(task.join());
        }
    }
}

fn spawn_piece(grid: &Arc<Mutex<Grid>>, kind: PieceKind, speed: f32) -> PieceHandle {
    let width = grid.lock().unwrap_or_else(PoisonError::into_inner).width();
    let piece = Piece::new(kind, width, speed);
    debug!(
        piece = kind.name(),
        x = piece.center().0,
        y = piece.center().1,
        speed,
        "created"
    );
    PieceHandle::new(piece, grid.clone())
}
