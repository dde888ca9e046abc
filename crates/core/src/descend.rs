//! Descend scheduler - one background task per falling piece.
//!
//! The task wakes every cycle and advances the piece through its handle. It
//! ends in exactly one of two ways:
//!
//! - the piece lands: the merge happened under the piece lock, the task sends
//!   one [`Landing`] on its completion channel and exits;
//! - the piece is released (dropped by the player or torn down): the task
//!   exits without merging and without sending.
//!
//! The coordinator polls the completion channel without blocking and joins
//! the task before the next piece starts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

use crate::error::EngineError;
use crate::piece::{Landing, PieceHandle, Tick};

/// Non-blocking view of a task's completion channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Still descending
    Pending,
    /// The piece landed on its own
    Landed(Landing),
    /// The task is gone and will never report a landing
    Closed,
}

/// A running descend task and the receiving end of its completion signal
#[derive(Debug)]
pub struct DescendTask {
    completion: oneshot::Receiver<Landing>,
    join: JoinHandle<()>,
}

impl DescendTask {
    /// Spawn the descent of `piece` on `runtime`, waking every `cycle`.
    pub fn spawn(runtime: &Handle, piece: PieceHandle, cycle: Duration, gauge: TaskGauge) -> Self {
        let (tx, rx) = oneshot::channel();
        let join = runtime.spawn(run(piece, cycle, tx, gauge));
        Self {
            completion: rx,
            join,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(completion: oneshot::Receiver<Landing>, join: JoinHandle<()>) -> Self {
        Self { completion, join }
    }

    /// Check for a landing without waiting
    pub fn try_complete(&mut self) -> Completion {
        match self.completion.try_recv() {
            Ok(landing) => Completion::Landed(landing),
            Err(TryRecvError::Empty) => Completion::Pending,
            Err(TryRecvError::Closed) => Completion::Closed,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the task to exit.
    ///
    /// The piece must already be landed or released, otherwise this waits for
    /// the descent to finish.
    pub async fn join(self) -> Result<(), EngineError> {
        self.join.await.map_err(|err| {
            if err.is_panic() {
                EngineError::DescendTaskPanicked
            } else {
                EngineError::DescendTaskLost
            }
        })
    }
}

async fn run(
    piece: PieceHandle,
    cycle: Duration,
    completion: oneshot::Sender<Landing>,
    gauge: TaskGauge,
) {
    let _live = gauge.enter();

    match piece.begin_descent() {
        Tick::Falling => {}
        Tick::Landed(landing) => {
            trace!(piece = landing.kind.name(), "blocked at spawn");
            let _ = completion.send(landing);
            return;
        }
        Tick::Released => return,
    }

    let mut ticker = time::interval_at(Instant::now() + cycle, cycle);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = piece.released() => {
                trace!("descent released");
                return;
            }
        }

        match piece.descend() {
            Tick::Falling => {}
            Tick::Landed(landing) => {
                let _ = completion.send(landing);
                return;
            }
            Tick::Released => {
                trace!("descent released");
                return;
            }
        }
    }
}

#[derive(Debug, Default)]
struct GaugeInner {
    live: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
}

/// Counts live descend tasks and the highest number ever alive at once.
#[derive(Debug, Clone, Default)]
pub struct TaskGauge {
    inner: Arc<GaugeInner>,
}

impl TaskGauge {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&self) -> GaugeGuard {
        let live = self.inner.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak.fetch_max(live, Ordering::SeqCst);
        self.inner.started.fetch_add(1, Ordering::SeqCst);
        GaugeGuard {
            inner: self.inner.clone(),
        }
    }

    /// Tasks currently alive
    pub fn live(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Most tasks ever alive at the same time
    pub fn peak(&self) -> usize {
        self.inner.peak.load(Ordering::SeqCst)
    }

    /// Tasks started so far
    pub fn started(&self) -> usize {
        self.inner.started.load(Ordering::SeqCst)
    }
}

struct GaugeGuard {
    inner: Arc<GaugeInner>,
}

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.inner.live.fetch_sub(1, Ordering::SeqCst);
    }
}
