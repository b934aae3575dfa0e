//! # Lifecycle Manager
//!
//! Owns every resource a scan dialog holds: the acquisition task, the open
//! camera with its decode loop, and the in-flight lookup.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ LifecycleManager                                                        │
//! │                                                                         │
//! │   acquisition: TaskGuard ──► negotiator → open → CameraLease           │
//! │                                                      │ EngineEvent      │
//! │                                                      ▼                  │
//! │   lease: CameraLease  ◄────────── install ───── controller              │
//! │     ├── device (released on drop)                                       │
//! │     └── decode loop: TaskGuard (stopped before the device)              │
//! │                                                                         │
//! │   lookup: TaskGuard ──► LookupCoordinator::resolve                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here releases on `Drop`. A lease that never reaches the
//! controller (closed channel, aborted task, stale attempt) still frees its
//! camera.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use shelf_core::DeviceId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::camera::{CameraCapture, DecodeStream, VideoSink};
use crate::decode_loop;
use crate::events::EngineEvent;
use crate::lookup::LookupCoordinator;
use crate::negotiator::DeviceNegotiator;

// =============================================================================
// Task Guard
// =============================================================================

/// A spawned task that is cancelled and aborted when the guard is dropped.
#[derive(Debug)]
pub struct TaskGuard {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TaskGuard {
    /// Spawns `f(token)`. The token fires when the guard stops.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(f(cancel.clone()));
        Self { cancel, task }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Camera Lease
// =============================================================================

/// Exclusive hold on one open camera device.
pub struct CameraLease {
    camera: Arc<dyn CameraCapture>,
    device: DeviceId,
    decode_loop: Option<TaskGuard>,
    released: bool,
}

impl CameraLease {
    pub fn new(camera: Arc<dyn CameraCapture>, device: DeviceId) -> Self {
        Self {
            camera,
            device,
            decode_loop: None,
            released: false,
        }
    }

    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    /// Starts pumping `stream` into `events`, replacing any previous loop.
    pub fn start_decoding(
        &mut self,
        attempt: u32,
        stream: DecodeStream,
        events: mpsc::Sender<EngineEvent>,
    ) {
        self.decode_loop = Some(decode_loop::spawn(attempt, stream, events));
    }

    /// Stops the decode loop, then the device. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Some(task) = self.decode_loop.take() {
            task.stop();
        }
        self.camera.release(&self.device);
        debug!(device_id = %self.device, "Camera released");
    }
}

impl Drop for CameraLease {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for CameraLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraLease")
            .field("device", &self.device)
            .field("decoding", &self.decode_loop.is_some())
            .field("released", &self.released)
            .finish()
    }
}

// =============================================================================
// Lifecycle Manager
// =============================================================================

pub struct LifecycleManager {
    camera: Arc<dyn CameraCapture>,
    sink: VideoSink,
    events: mpsc::Sender<EngineEvent>,
    acquisition: Option<TaskGuard>,
    lease: Option<CameraLease>,
    lookup: Option<TaskGuard>,
}

impl LifecycleManager {
    pub fn new(
        camera: Arc<dyn CameraCapture>,
        sink: VideoSink,
        events: mpsc::Sender<EngineEvent>,
    ) -> Self {
        Self {
            camera,
            sink,
            events,
            acquisition: None,
            lease: None,
            lookup: None,
        }
    }

    /// Releases whatever is held, then starts negotiating a camera for
    /// `attempt`. The result arrives as `Acquired` or `AcquisitionFailed`.
    pub fn begin_acquisition(&mut self, attempt: u32) {
        self.release_all();

        let negotiator = DeviceNegotiator::new(self.camera.clone());
        let camera = self.camera.clone();
        let sink = self.sink.clone();
        let events = self.events.clone();

        self.acquisition = Some(TaskGuard::spawn(move |cancel| async move {
            let acquired = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(attempt, "Camera acquisition cancelled");
                    return;
                }
                acquired = negotiator.acquire(&sink) => acquired,
            };

            let event = match acquired {
                Ok((device, stream)) => EngineEvent::Acquired {
                    attempt,
                    lease: CameraLease::new(camera, device),
                    stream,
                },
                Err(error) => EngineEvent::AcquisitionFailed { attempt, error },
            };

            // On cancel or a closed channel the event is dropped, and with
            // it any lease
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = events.send(event) => {}
            }
        }));
    }

    /// Takes ownership of an acquired camera and starts its decode loop.
    pub fn install(&mut self, attempt: u32, mut lease: CameraLease, stream: DecodeStream) {
        self.acquisition = None;
        if let Some(mut previous) = self.lease.take() {
            previous.release();
        }

        lease.start_decoding(attempt, stream, self.events.clone());
        debug!(attempt, device_id = %lease.device(), "Camera installed");
        self.lease = Some(lease);
    }

    /// Spawns the lookup for `barcode`; the result arrives as `LookupFinished`.
    pub fn start_lookup(&mut self, attempt: u32, barcode: String, coordinator: LookupCoordinator) {
        let events = self.events.clone();
        self.lookup = Some(TaskGuard::spawn(move |cancel| async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                outcome = coordinator.resolve(&barcode) => outcome,
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = events.send(EngineEvent::LookupFinished { attempt, outcome }) => {}
            }
        }));
    }

    pub fn finish_lookup(&mut self) {
        self.lookup = None;
    }

    /// Stops acquisition and decoding and frees the camera.
    pub fn release_camera(&mut self) {
        self.acquisition = None;
        if let Some(mut lease) = self.lease.take() {
            lease.release();
        }
    }

    /// Releases everything, including an in-flight lookup.
    pub fn release_all(&mut self) {
        self.release_camera();
        self.lookup = None;
    }
}

impl Drop for LifecycleManager {
    fn drop(&mut self) {
        self.release_all();
    }
}
