//! Background event loop and its handle
//!
//! One task owns the [`Engine`] and drains the backend's event and error
//! queues in arrival order. The caller keeps a [`Mirror`] handle to run the
//! initial copy, observe the engine state and request shutdown.

use crate::engine::{initial_copy, Engine, EngineState, MirrorStats};
use crate::event::translate;
use crate::registry::Subscriber;
use crate::WatchError;
use cpw_core::{CopyError, CopyOptions, CopyStats, MirrorSettings, WatchTarget};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Handle to a running mirror
pub struct Mirror {
    target: WatchTarget,
    destination: PathBuf,
    options: CopyOptions,
    state: watch::Receiver<EngineState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<MirrorStats>>,
}

impl Mirror {
    /// Subscribe `target` with the platform's notification backend and start
    /// the event loop
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        target: WatchTarget,
        destination: PathBuf,
        settings: &MirrorSettings,
    ) -> Result<Self, WatchError> {
        let capacity = settings.event_queue_capacity;
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let (error_tx, error_rx) = mpsc::channel(capacity);

        let watcher = notify::recommended_watcher(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if let Err(TrySendError::Full(event)) = event_tx.try_send(event) {
                        warn!("Event queue full, dropping {:?} for {:?}", event.kind, event.paths);
                    }
                }
                Err(e) => {
                    if let Err(TrySendError::Full(e)) = error_tx.try_send(e) {
                        warn!("Error queue full, dropping: {}", e);
                    }
                }
            },
        )
        .map_err(|e| WatchError::new(target.root(), e))?;

        Self::start_with(target, destination, settings, watcher, event_rx, error_rx)
    }

    /// Start the event loop over an arbitrary backend
    ///
    /// `events` and `errors` must be fed by whatever `subscriber` registers.
    /// When both senders are dropped the loop ends on its own.
    pub fn start_with<S: Subscriber>(
        target: WatchTarget,
        destination: PathBuf,
        settings: &MirrorSettings,
        subscriber: S,
        events: mpsc::Receiver<notify::Event>,
        errors: mpsc::Receiver<notify::Error>,
    ) -> Result<Self, WatchError> {
        let mut engine = Engine::new(target.clone(), destination.clone(), subscriber, settings);
        engine.initialize()?;

        let (state_tx, state_rx) = watch::channel(engine.state());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(engine, events, errors, shutdown_rx, state_tx));

        Ok(Self {
            target,
            destination,
            options: settings.copy_options(),
            state: state_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Copy the whole source once, on the caller's thread
    ///
    /// The event loop is already running, so events for files copied here
    /// may cause a second, identical copy.
    pub fn initial_copy(&self) -> Result<CopyStats, CopyError> {
        let stats = initial_copy(&self.target, &self.destination, &self.options)?;
        info!(
            "Initial copy completed from {} to {} ({} files, {} bytes)",
            self.target.root().display(),
            self.destination.display(),
            stats.files,
            stats.bytes
        );
        Ok(stats)
    }

    /// Current engine state
    pub fn state(&self) -> EngineState {
        *self.state.borrow()
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Resolve once the event loop has stopped for any reason
    pub async fn closed(&mut self) {
        while *self.state.borrow_and_update() != EngineState::Closed {
            if self.state.changed().await.is_err() {
                break;
            }
        }
    }

    /// Stop the event loop, unsubscribe everything and return final totals
    pub async fn close(mut self) -> MirrorStats {
        if let Some(shutdown) = self.shutdown.take() {
            // Loop may already be gone if the backend closed its channels
            let _ = shutdown.send(());
        }

        match self.task.take() {
            Some(task) => match task.await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!("Event loop ended abnormally: {}", e);
                    MirrorStats::default()
                }
            },
            None => MirrorStats::default(),
        }
    }
}

/// Event loop: one event at a time, in arrival order
async fn run<S: Subscriber>(
    mut engine: Engine<S>,
    mut events: mpsc::Receiver<notify::Event>,
    mut errors: mpsc::Receiver<notify::Error>,
    mut shutdown: oneshot::Receiver<()>,
    state: watch::Sender<EngineState>,
) -> MirrorStats {
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                debug!("Shutdown requested");
                break;
            }

            event = events.recv() => match event {
                Some(event) => {
                    for fs_event in translate(event) {
                        let path = fs_event.path.clone();
                        let outcome = engine.process(fs_event);
                        trace!("{} -> {:?}", path.display(), outcome);
                    }
                }
                None => {
                    debug!("Notification channel closed");
                    break;
                }
            },

            error = errors.recv() => match error {
                Some(e) => warn!("Watcher error: {}", e),
                None => {
                    debug!("Notification error channel closed");
                    break;
                }
            },
        }
    }

    engine.close();
    let stats = engine.stats();
    let _ = state.send(EngineState::Closed);
    stats
}
