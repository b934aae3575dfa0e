//! # Scan Controller
//!
//! One actor per open scan dialog. It owns the [`ScanSession`] and every
//! resource behind it; the dialog talks to it through a [`ScanHandle`].
//!
//! ## Event Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ScanController::run                             │
//! │                                                                         │
//! │   ScanHandle ──cmd──►┐                                                  │
//! │                      │                                                  │
//! │   acquisition ──┐    ▼                                                  │
//! │   decode loop ──┼──► select! ──► ScanSession ──► publish ──► watch +   │
//! │   lookup      ──┘    ▲              transition     snapshot   emitter   │
//! │                      │                                                  │
//! │   found delay ───────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All transitions happen on this one task, so the session needs no lock.
//! Background tasks tag their results with the attempt that started them;
//! results from an older attempt, or after exit, are dropped.
//!
//! ## Side Effects per Transition
//! | Entering   | Effect                                              |
//! |------------|-----------------------------------------------------|
//! | Requesting | release everything, spawn camera acquisition        |
//! | Scanning   | install camera lease, start decode loop             |
//! | Processing | spawn bounded lookup                                |
//! | Found      | release camera, arm the display delay               |
//! | NotFound   | release camera                                      |
//! | Error      | release camera                                      |
//! | (exit)     | release everything, navigate if applicable          |

use std::sync::Arc;

use shelf_core::{
    DetectionDebouncer, ScanSession, ScanSnapshot, ScanState, SessionExit, FOUND_DISPLAY_DELAY,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::camera::{CameraCapture, VideoSink};
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, ScanCommand};
use crate::lifecycle::LifecycleManager;
use crate::lookup::{LookupCoordinator, ProductLookup};
use crate::navigation::{NavigationTarget, Navigator};

// =============================================================================
// Event Emitter
// =============================================================================

/// Receives every published snapshot, in order.
pub trait ScanEventEmitter: Send + Sync {
    fn emit_state(&self, snapshot: &ScanSnapshot);
}

/// No-op event emitter.
pub struct NoOpEmitter;

impl ScanEventEmitter for NoOpEmitter {
    fn emit_state(&self, _snapshot: &ScanSnapshot) {}
}

// =============================================================================
// Dependencies
// =============================================================================

const DEFAULT_EVENT_CAPACITY: usize = 32;
const COMMAND_CAPACITY: usize = 8;

/// Collaborators of one scan dialog.
pub struct ScanDeps {
    pub camera: Arc<dyn CameraCapture>,
    pub lookup: Arc<dyn ProductLookup>,
    pub navigator: Arc<dyn Navigator>,
    pub emitter: Arc<dyn ScanEventEmitter>,
    /// Buffer between background tasks and the controller.
    pub event_capacity: usize,
}

impl ScanDeps {
    pub fn new(
        camera: Arc<dyn CameraCapture>,
        lookup: Arc<dyn ProductLookup>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            camera,
            lookup,
            navigator,
            emitter: Arc::new(NoOpEmitter),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn ScanEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

// =============================================================================
// Handle
// =============================================================================

/// The dialog's side of a running scan session.
///
/// Dropping the handle closes the session.
pub struct ScanHandle {
    session_id: Uuid,
    cmd_tx: mpsc::Sender<ScanCommand>,
    state_rx: watch::Receiver<ScanSnapshot>,
    task: JoinHandle<SessionExit>,
}

impl ScanHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> ScanState {
        self.state_rx.borrow().state
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<ScanSnapshot> {
        self.state_rx.clone()
    }

    /// Waits until the published snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> EngineResult<ScanSnapshot>
    where
        F: FnMut(&ScanSnapshot) -> bool,
    {
        let mut rx = self.state_rx.clone();
        let snapshot = rx
            .wait_for(predicate)
            .await
            .map_err(|_| EngineError::SessionEnded)?;
        Ok(snapshot.clone())
    }

    pub async fn wait_for_state(&self, state: ScanState) -> EngineResult<ScanSnapshot> {
        self.wait_for(|s| s.state == state).await
    }

    /// Starts a new attempt. Ignored unless NotFound or Error.
    pub async fn retry(&self) -> EngineResult<()> {
        self.send(ScanCommand::Retry).await
    }

    /// Leaves for manual search. Ignored unless NotFound.
    pub async fn fallback(&self) -> EngineResult<()> {
        self.send(ScanCommand::Fallback).await
    }

    /// Dismisses the dialog from any state.
    pub async fn close(&self) -> EngineResult<()> {
        self.send(ScanCommand::Close).await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the session to end on its own terms (navigation,
    /// fallback or a close already sent).
    pub async fn join(self) -> EngineResult<SessionExit> {
        let ScanHandle { cmd_tx, task, .. } = self;
        let exit = task.await;
        drop(cmd_tx);
        Ok(exit?)
    }

    async fn send(&self, cmd: ScanCommand) -> EngineResult<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| EngineError::ChannelError("Scan command channel closed".into()))
    }
}

// =============================================================================
// Controller
// =============================================================================

pub struct ScanController {
    session: ScanSession,
    debouncer: DetectionDebouncer,
    coordinator: LookupCoordinator,
    lifecycle: LifecycleManager,
    navigator: Arc<dyn Navigator>,
    emitter: Arc<dyn ScanEventEmitter>,
    state_tx: watch::Sender<ScanSnapshot>,
    events_rx: mpsc::Receiver<EngineEvent>,
    found_deadline: Option<Instant>,
}

impl ScanController {
    /// Opens a scan dialog rendering into `sink` and starts requesting a
    /// camera immediately.
    pub fn open(deps: ScanDeps, sink: VideoSink) -> ScanHandle {
        let session = ScanSession::new();
        let session_id = session.id();

        let (events_tx, events_rx) = mpsc::channel(deps.event_capacity.max(1));
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (state_tx, state_rx) = watch::channel(session.snapshot());

        let controller = ScanController {
            session,
            debouncer: DetectionDebouncer::default(),
            coordinator: LookupCoordinator::new(deps.lookup),
            lifecycle: LifecycleManager::new(deps.camera, sink, events_tx),
            navigator: deps.navigator,
            emitter: deps.emitter,
            state_tx,
            events_rx,
            found_deadline: None,
        };

        let task = tokio::spawn(controller.run(cmd_rx));

        ScanHandle {
            session_id,
            cmd_tx,
            state_rx,
            task,
        }
    }

    async fn run(mut self, mut cmd_rx: mpsc::Receiver<ScanCommand>) -> SessionExit {
        info!(session_id = %self.session.id(), "Scan session opened");
        self.start_attempt();

        let exit = loop {
            let found_deadline = self.found_deadline;

            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    if let Some(exit) = self.handle_command(cmd) {
                        break exit;
                    }
                }
                _ = sleep_until(found_deadline.unwrap_or_else(Instant::now)), if found_deadline.is_some() => {
                    if let Some(exit) = self.handle_found_delay() {
                        break exit;
                    }
                }
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event);
                }
            }
        };

        self.lifecycle.release_all();
        self.found_deadline = None;
        self.events_rx.close();

        info!(session_id = %self.session.id(), exit = ?exit, "Scan session ended");
        exit
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn handle_command(&mut self, cmd: Option<ScanCommand>) -> Option<SessionExit> {
        match cmd {
            Some(ScanCommand::Retry) => {
                self.handle_retry();
                None
            }
            Some(ScanCommand::Fallback) => self.handle_fallback(),
            Some(ScanCommand::Close) => Some(self.handle_close()),
            None => {
                debug!(session_id = %self.session.id(), "Scan handle dropped");
                Some(self.handle_close())
            }
        }
    }

    fn handle_retry(&mut self) {
        match self.session.retry() {
            Ok(attempt) => {
                info!(session_id = %self.session.id(), attempt, "Retrying scan");
                self.start_attempt();
            }
            Err(e) => debug!(error = %e, "Ignoring retry"),
        }
    }

    fn handle_fallback(&mut self) -> Option<SessionExit> {
        match self.session.fallback() {
            Ok(barcode) => {
                self.lifecycle.release_all();
                info!(session_id = %self.session.id(), barcode = %barcode, "Falling back to manual search");
                self.navigator.navigate(NavigationTarget::Search {
                    query: barcode.clone(),
                });
                self.publish();
                Some(SessionExit::Fallback(barcode))
            }
            Err(e) => {
                debug!(error = %e, "Ignoring fallback");
                None
            }
        }
    }

    fn handle_close(&mut self) -> SessionExit {
        self.lifecycle.release_all();
        self.found_deadline = None;
        let exit = self.session.close();
        self.publish();
        exit
    }

    fn handle_found_delay(&mut self) -> Option<SessionExit> {
        self.found_deadline = None;
        match self.session.complete() {
            Ok(product_id) => {
                info!(session_id = %self.session.id(), product_id = %product_id, "Opening product page");
                self.navigator.navigate(NavigationTarget::Product(product_id));
                self.publish();
                Some(SessionExit::Navigated(product_id))
            }
            Err(e) => {
                warn!(error = %e, "Found delay elapsed outside Found");
                None
            }
        }
    }

    // =========================================================================
    // Engine Events
    // =========================================================================

    fn handle_event(&mut self, event: EngineEvent) {
        let attempt = event.attempt();
        if !self.session.is_current(attempt) {
            // Dropping the event releases any camera it carries
            debug!(
                attempt,
                current = self.session.attempt(),
                event = ?event,
                "Dropping stale engine event"
            );
            return;
        }

        match event {
            EngineEvent::Acquired { lease, stream, .. } => {
                match self.session.device_selected(lease.device().clone()) {
                    Ok(()) => {
                        info!(attempt, device_id = %lease.device(), "Camera ready, scanning");
                        self.lifecycle.install(attempt, lease, stream);
                        self.publish();
                    }
                    Err(e) => warn!(attempt, error = %e, "Discarding acquired camera"),
                }
            }

            EngineEvent::AcquisitionFailed { error, .. } => {
                let reason = error.to_string();
                match self.session.acquisition_failed(error) {
                    Ok(()) => {
                        warn!(attempt, error = %reason, "Camera acquisition failed");
                        self.lifecycle.release_camera();
                        self.publish();
                    }
                    Err(e) => debug!(attempt, error = %e, "Ignoring acquisition failure"),
                }
            }

            EngineEvent::Candidate { candidate, .. } => {
                if self.debouncer.accept(&candidate, &mut self.session) {
                    let barcode = self
                        .session
                        .last_accepted_barcode()
                        .unwrap_or_default()
                        .to_string();
                    info!(attempt, barcode = %barcode, "Barcode accepted");
                    self.lifecycle
                        .start_lookup(attempt, barcode, self.coordinator.clone());
                    self.publish();
                } else {
                    trace!(
                        attempt,
                        raw = %candidate.raw_text,
                        verdict = ?self.debouncer.evaluate(&candidate, &self.session),
                        "Detection rejected"
                    );
                }
            }

            EngineEvent::DecodeFailed { reason, .. } => match self.session.decode_failed(reason) {
                Ok(()) => {
                    self.lifecycle.release_camera();
                    self.publish();
                }
                Err(e) => debug!(attempt, error = %e, "Ignoring decoder failure"),
            },

            EngineEvent::LookupFinished { outcome, .. } => {
                self.lifecycle.finish_lookup();
                match self.session.lookup_finished(outcome) {
                    Ok(state) => {
                        if state.releases_camera() {
                            self.lifecycle.release_camera();
                        }
                        if state == ScanState::Found {
                            self.found_deadline = Some(Instant::now() + FOUND_DISPLAY_DELAY);
                        }
                        info!(attempt, state = %state, "Lookup settled");
                        self.publish();
                    }
                    Err(e) => debug!(attempt, error = %e, "Ignoring lookup result"),
                }
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn start_attempt(&mut self) {
        self.lifecycle.begin_acquisition(self.session.attempt());
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.session.snapshot();
        self.emitter.emit_state(&snapshot);
        self.state_tx.send_replace(snapshot);
    }
}
