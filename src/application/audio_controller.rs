//! Audio session controller.
//!
//! A single worker task owns the [`AudioMachine`] and is the only writer of
//! audio state. User toggles, lifecycle transitions, and backend completions
//! all arrive as events and are handled one at a time. Each new state is
//! published before its side effects run.
//!
//! Backend calls never run on the worker itself: setup and the current
//! play/pause command each run in their own task, so an unmount is always
//! read promptly. Teardown aborts whatever is still in flight.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::{
    AppError, AppLifecycle, AudioEffect, AudioEvent, AudioMachine, AudioSession, AudioState,
    LifecycleSignal, Result, Subscription, Track,
};

/// What observers see of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioSnapshot {
    pub state: AudioState,
    pub intent: bool,
}

type PendingSetup = Option<(u64, JoinHandle<anyhow::Result<()>>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Pause,
}

/// The play/pause call currently awaiting the backend.
struct InFlight {
    seq: u64,
    command: Command,
    handle: JoinHandle<anyhow::Result<()>>,
}

/// Handle to a mounted audio session.
pub struct AudioSessionController {
    events: mpsc::UnboundedSender<AudioEvent>,
    snapshot: watch::Receiver<AudioSnapshot>,
    worker: Option<JoinHandle<()>>,
    lifecycle: Option<Subscription>,
}

impl AudioSessionController {
    /// Spawn the worker on the current tokio runtime and start setup.
    ///
    /// # Errors
    /// Returns error if called outside a tokio runtime.
    pub fn mount(session: Arc<dyn AudioSession>, track: Track, intent: bool) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| AppError::Config {
            message: format!("Audio session needs a tokio runtime: {e}"),
        })?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(AudioSnapshot {
            state: AudioState::Uninitialized,
            intent,
        });

        let worker = Worker {
            machine: AudioMachine::new(intent),
            session,
            track,
            events: events_rx,
            snapshot: snapshot_tx,
            setup: None,
            in_flight: None,
            next_seq: 0,
        };
        let handle = runtime.spawn(worker.run());

        let controller = Self {
            events: events_tx,
            snapshot: snapshot_rx,
            worker: Some(handle),
            lifecycle: None,
        };
        controller.send(AudioEvent::Mount);
        Ok(controller)
    }

    /// Record the user's music on/off choice.
    pub fn toggle(&self, on: bool) {
        self.send(AudioEvent::Toggle(on));
    }

    /// Feed an app lifecycle transition.
    pub fn on_lifecycle(&self, phase: AppLifecycle) {
        self.send(AudioEvent::Lifecycle(phase));
    }

    /// Follow a lifecycle source until unmount.
    pub fn attach_lifecycle(&mut self, signal: &dyn LifecycleSignal) {
        let events = self.events.clone();
        self.lifecycle = Some(signal.on_change(Arc::new(move |phase: &AppLifecycle| {
            // A closed channel means the session is gone.
            let _ = events.send(AudioEvent::Lifecycle(*phase));
        })));
    }

    #[must_use]
    pub fn current_state(&self) -> AudioState {
        self.snapshot.borrow().state
    }

    /// Last intent processed by the worker.
    #[must_use]
    pub fn intent(&self) -> bool {
        self.snapshot.borrow().intent
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<AudioSnapshot> {
        self.snapshot.clone()
    }

    /// Tear down: detach from lifecycle, dispose, and wait for the worker.
    pub async fn unmount(mut self) -> AudioState {
        self.lifecycle.take();
        self.send(AudioEvent::Unmount);

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "Audio worker ended abnormally");
            }
        }

        self.current_state()
    }

    fn send(&self, event: AudioEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Audio worker stopped, event dropped");
        }
    }
}

impl Drop for AudioSessionController {
    fn drop(&mut self) {
        self.lifecycle.take();
        if self.worker.is_some() {
            self.send(AudioEvent::Unmount);
        }
    }
}

struct Worker {
    machine: AudioMachine,
    session: Arc<dyn AudioSession>,
    track: Track,
    events: mpsc::UnboundedReceiver<AudioEvent>,
    snapshot: watch::Sender<AudioSnapshot>,
    setup: PendingSetup,
    in_flight: Option<InFlight>,
    next_seq: u64,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let event = tokio::select! {
                biased;
                event = self.events.recv() => Some(event.unwrap_or(AudioEvent::Unmount)),
                event = next_setup_outcome(&mut self.setup) => Some(event),
                event = next_command_outcome(&mut self.in_flight) => event,
            };

            if let Some(event) = event {
                self.dispatch(event);
            }

            if self.machine.state().is_disposed() {
                break;
            }
        }
        tracing::debug!("Audio worker stopped");
    }

    fn dispatch(&mut self, first: AudioEvent) {
        let mut queue = VecDeque::from([first]);
        while let Some(event) = queue.pop_front() {
            let effects = self.machine.handle(event);
            self.publish();

            for effect in effects {
                if let Some(follow_up) = self.apply(effect) {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(AudioSnapshot {
            state: self.machine.state(),
            intent: self.machine.intent(),
        });
    }

    fn apply(&mut self, effect: AudioEffect) -> Option<AudioEvent> {
        match effect {
            AudioEffect::BeginSetup { generation } => {
                let session = Arc::clone(&self.session);
                let track = self.track.clone();
                let handle = tokio::spawn(async move {
                    session.setup().await?;
                    session.enqueue(track);
                    Ok::<(), anyhow::Error>(())
                });
                self.setup = Some((generation, handle));
                None
            }
            AudioEffect::Play => {
                self.issue(Command::Play);
                None
            }
            AudioEffect::Pause => {
                self.issue(Command::Pause);
                None
            }
            AudioEffect::Dispose => {
                if let Some((generation, handle)) = self.setup.take() {
                    tracing::debug!(generation, "Cancelling pending audio setup");
                    handle.abort();
                }
                if let Some(op) = self.in_flight.take() {
                    tracing::debug!(seq = op.seq, command = ?op.command, "Cancelling pending audio command");
                    op.handle.abort();
                }
                self.session.dispose();
                None
            }
            AudioEffect::ReportFailure { reason } => {
                tracing::warn!(%reason, "Audio unavailable, continuing without sound");
                None
            }
        }
    }

    /// Start a play/pause call; the newest command replaces one still pending.
    fn issue(&mut self, command: Command) {
        if let Some(previous) = self.in_flight.take() {
            tracing::debug!(seq = previous.seq, command = ?previous.command, "Superseding pending audio command");
            previous.handle.abort();
        }

        self.next_seq += 1;
        let session = Arc::clone(&self.session);
        let handle = tokio::spawn(async move {
            match command {
                Command::Play => session.play().await,
                Command::Pause => session.pause().await,
            }
        });
        self.in_flight = Some(InFlight {
            seq: self.next_seq,
            command,
            handle,
        });
    }
}

/// Resolve the pending setup task into an event; never resolves if none.
async fn next_setup_outcome(pending: &mut PendingSetup) -> AudioEvent {
    let Some((generation, handle)) = pending.as_mut() else {
        return std::future::pending().await;
    };
    let generation = *generation;
    let outcome = handle.await;
    *pending = None;

    match outcome {
        Ok(Ok(())) => AudioEvent::SetupSucceeded { generation },
        Ok(Err(e)) => AudioEvent::SetupFailed {
            generation,
            reason: AppError::audio_setup(e).to_string(),
        },
        Err(e) => AudioEvent::SetupFailed {
            generation,
            reason: e.to_string(),
        },
    }
}

/// Resolve the in-flight play/pause call; only a rejected `play()` yields an
/// event. Never resolves if nothing is in flight.
async fn next_command_outcome(in_flight: &mut Option<InFlight>) -> Option<AudioEvent> {
    let Some(op) = in_flight.as_mut() else {
        return std::future::pending().await;
    };
    let outcome = (&mut op.handle).await;
    let (seq, command) = (op.seq, op.command);
    *in_flight = None;

    let reason = match outcome {
        Ok(Ok(())) => return None,
        Ok(Err(e)) => format!("{e:#}"),
        Err(e) if e.is_cancelled() => return None,
        Err(e) => e.to_string(),
    };

    match command {
        Command::Play => Some(AudioEvent::PlaybackFailed { reason }),
        Command::Pause => {
            tracing::warn!(seq, %reason, "Audio pause failed");
            None
        }
    }
}
