use std::time::Duration;

use dg_core::RevealConfig;
use dg_layout::DiagramLayout;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{RevealError, RevealState, TickOutcome};

/// Drives a [`RevealState`] forward on a fixed interval.
///
/// At most one reveal runs at a time. Starting a new one cancels the previous
/// task before the new channel is handed out, and each reveal publishes on
/// its own channel, so a late tick from an old layout can never reach a
/// subscriber of the new one.
#[derive(Debug)]
pub struct RevealScheduler {
    interval: Duration,
    generation: u64,
    active: Option<ActiveReveal>,
}

#[derive(Debug)]
struct ActiveReveal {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    state_rx: watch::Receiver<RevealState>,
}

impl RevealScheduler {
    #[must_use]
    pub fn new(config: &RevealConfig) -> Self {
        Self::with_interval(config.tick())
    }

    #[must_use]
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            active: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tick interval in whole milliseconds, saturating at `u64::MAX`.
    #[must_use]
    pub fn interval_ms(&self) -> u64 {
        u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX)
    }

    /// Generation of the current reveal; bumps on every [`Self::start`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start revealing `layout` from scratch, cancelling any reveal of a
    /// previous layout.
    pub fn replace(
        &mut self,
        layout: &DiagramLayout,
    ) -> Result<watch::Receiver<RevealState>, RevealError> {
        self.start(layout.nodes.len())
    }

    /// Reset to counter 0 over `total` nodes and start ticking.
    ///
    /// Must be called from within a tokio runtime. With zero nodes no task is
    /// spawned and the returned channel closes immediately.
    pub fn start(&mut self, total: usize) -> Result<watch::Receiver<RevealState>, RevealError> {
        self.cancel();

        let initial = RevealState::begin(total);
        let (state_tx, state_rx) = watch::channel(initial);
        self.generation = self.generation.wrapping_add(1);
        let cancel = CancellationToken::new();

        let handle = if initial.is_finished() {
            debug!(generation = self.generation, "nothing to reveal");
            drop(state_tx);
            None
        } else {
            let runtime =
                tokio::runtime::Handle::try_current().map_err(|_| RevealError::NoRuntime)?;
            debug!(
                generation = self.generation,
                total,
                interval_ms = self.interval_ms(),
                "reveal started"
            );
            Some(runtime.spawn(run_reveal(
                initial,
                self.interval,
                self.generation,
                cancel.clone(),
                state_tx,
            )))
        };

        self.active = Some(ActiveReveal {
            cancel,
            handle,
            state_rx: state_rx.clone(),
        });
        Ok(state_rx)
    }

    /// Latest published state, `Idle` when nothing was started.
    #[must_use]
    pub fn state(&self) -> RevealState {
        self.active
            .as_ref()
            .map_or(RevealState::Idle, |active| *active.state_rx.borrow())
    }

    #[must_use]
    pub fn subscribe(&self) -> Option<watch::Receiver<RevealState>> {
        self.active.as_ref().map(|active| active.state_rx.clone())
    }

    /// Stop the running reveal, keeping its last state readable.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.cancel.cancel();
            if active.handle.take().is_some() {
                trace!(generation = self.generation, "reveal cancelled");
            }
        }
    }

    /// Cancel and forget the current reveal; the state returns to `Idle`.
    pub fn shutdown(&mut self) {
        self.cancel();
        self.active = None;
    }

    /// Wait for the current reveal task to exit.
    pub async fn join(&mut self) {
        let Some(handle) = self.active.as_mut().and_then(|active| active.handle.take()) else {
            return;
        };
        if let Err(err) = handle.await {
            debug!(error = %err, "reveal task ended abnormally");
        }
    }
}

impl Drop for RevealScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_reveal(
    mut state: RevealState,
    interval: Duration,
    generation: u64,
    cancel: CancellationToken,
    state_tx: watch::Sender<RevealState>,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(generation, counter = state.counter(), "reveal stopped");
                return;
            }
            () = tokio::time::sleep(interval) => {}
        }

        match state.tick() {
            TickOutcome::Advanced(counter) => {
                trace!(generation, counter, "reveal tick");
                state_tx.send_replace(state);
                if state.is_finished() {
                    debug!(generation, total = state.total(), "reveal finished");
                    return;
                }
            }
            TickOutcome::Finished | TickOutcome::Idle => return,
        }
    }
}
