//! Test doubles for driving a scan session end to end.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use shelf_core::{DecodeOutcome, DeviceId, ProductId, ScanSnapshot, ScanState, VideoDevice};
use shelf_scan::{
    CameraCapture, CameraError, DecodeStream, LookupError, NavigationTarget, Navigator,
    ProductLookup, ScanController, ScanDeps, ScanEventEmitter, ScanHandle, VideoSink,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

// =============================================================================
// Camera
// =============================================================================

/// A camera whose frames are pushed by the test.
pub struct MockCamera {
    devices: Vec<VideoDevice>,
    list_error: Mutex<Option<CameraError>>,
    frames: Mutex<Option<mpsc::UnboundedSender<DecodeOutcome>>>,
    opened: Mutex<Vec<DeviceId>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    releases: AtomicUsize,
}

impl MockCamera {
    pub fn with_devices(devices: Vec<VideoDevice>) -> Self {
        Self {
            devices,
            list_error: Mutex::new(None),
            frames: Mutex::new(None),
            opened: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
        }
    }

    /// A phone: front camera listed first.
    pub fn phone() -> Self {
        Self::with_devices(vec![
            VideoDevice::new("front-0", "Front Camera"),
            VideoDevice::new("rear-0", "Back Camera"),
        ])
    }

    pub fn fail_listing(self, error: CameraError) -> Self {
        *self.list_error.lock().unwrap() = Some(error);
        self
    }

    /// Feeds one frame that decodes to `text`.
    pub fn show(&self, text: &str) -> bool {
        self.push(DecodeOutcome::Decoded(text.to_string()))
    }

    pub fn show_empty_frame(&self) -> bool {
        self.push(DecodeOutcome::NoSymbol)
    }

    pub fn crash(&self, reason: &str) -> bool {
        self.push(DecodeOutcome::Fatal(reason.to_string()))
    }

    fn push(&self, outcome: DecodeOutcome) -> bool {
        match self.frames.lock().unwrap().as_ref() {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    pub fn opened(&self) -> Vec<DeviceId> {
        self.opened.lock().unwrap().clone()
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraCapture for MockCamera {
    async fn list_video_inputs(&self) -> Result<Vec<VideoDevice>, CameraError> {
        if let Some(error) = self.list_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.devices.clone())
    }

    async fn open_decode_stream(
        &self,
        device: &DeviceId,
        _sink: &VideoSink,
    ) -> Result<DecodeStream, CameraError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.frames.lock().unwrap() = Some(tx);
        self.opened.lock().unwrap().push(device.clone());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    fn release(&self, _device: &DeviceId) {
        self.frames.lock().unwrap().take();
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Lookup
// =============================================================================

pub struct MockLookup {
    products: HashMap<String, ProductId>,
    delay: Duration,
    failure: Option<LookupError>,
    calls: Mutex<Vec<String>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self {
            products: HashMap::new(),
            delay: Duration::from_millis(50),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_product(mut self, barcode: &str, id: i64) -> Self {
        self.products.insert(barcode.to_string(), ProductId::new(id));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, error: LookupError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductLookup for MockLookup {
    async fn find_product_by_barcode(&self, barcode: &str) -> Result<Option<ProductId>, LookupError> {
        self.calls.lock().unwrap().push(barcode.to_string());
        tokio::time::sleep(self.delay).await;
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.products.get(barcode).copied())
    }
}

// =============================================================================
// Navigator & Emitter
// =============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn targets(&self) -> Vec<NavigationTarget> {
        self.targets.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: NavigationTarget) {
        self.targets.lock().unwrap().push(target);
    }
}

#[derive(Default)]
pub struct RecordingEmitter {
    snapshots: Mutex<Vec<ScanSnapshot>>,
}

impl RecordingEmitter {
    /// Emitted states with consecutive repeats collapsed.
    pub fn states(&self) -> Vec<ScanState> {
        let mut states: Vec<ScanState> = self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.state)
            .collect();
        states.dedup();
        states
    }
}

impl ScanEventEmitter for RecordingEmitter {
    fn emit_state(&self, snapshot: &ScanSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub camera: Arc<MockCamera>,
    pub lookup: Arc<MockLookup>,
    pub navigator: Arc<RecordingNavigator>,
    pub emitter: Arc<RecordingEmitter>,
}

impl Harness {
    pub fn new(camera: MockCamera, lookup: MockLookup) -> Self {
        Self {
            camera: Arc::new(camera),
            lookup: Arc::new(lookup),
            navigator: Arc::new(RecordingNavigator::default()),
            emitter: Arc::new(RecordingEmitter::default()),
        }
    }

    pub fn open(&self) -> ScanHandle {
        let deps = ScanDeps::new(self.camera.clone(), self.lookup.clone(), self.navigator.clone())
            .with_emitter(self.emitter.clone());
        ScanController::open(deps, VideoSink::new("scanner-preview"))
    }
}

/// Lets spawned tasks run without moving the clock far.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
