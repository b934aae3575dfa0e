//! Terminal stand-ins for the camera, the router and the dialog.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use shelf_core::{DecodeOutcome, DeviceId, ScanSnapshot, ScanState, VideoDevice};
use shelf_scan::{
    CameraCapture, CameraError, DecodeStream, NavigationTarget, Navigator, ScanEventEmitter,
    VideoSink,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

// =============================================================================
// Camera
// =============================================================================

type FrameSender = mpsc::UnboundedSender<DecodeOutcome>;

/// A camera whose "frames" are lines typed on stdin.
///
/// A blank line is a frame without a symbol; anything else decodes to the
/// line itself.
#[derive(Default)]
pub struct TerminalCamera {
    frames: Mutex<Option<FrameSender>>,
}

impl TerminalCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when no camera is open.
    pub fn feed(&self, line: &str) -> bool {
        let outcome = if line.trim().is_empty() {
            DecodeOutcome::NoSymbol
        } else {
            DecodeOutcome::Decoded(line.to_string())
        };

        match self.slot().as_ref() {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<FrameSender>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CameraCapture for TerminalCamera {
    async fn list_video_inputs(&self) -> Result<Vec<VideoDevice>, CameraError> {
        Ok(vec![VideoDevice::new("stdin", "Terminal input (back)")])
    }

    async fn open_decode_stream(
        &self,
        device: &DeviceId,
        sink: &VideoSink,
    ) -> Result<DecodeStream, CameraError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.slot() = Some(tx);
        debug!(device_id = %device, sink = sink.id(), "Terminal camera opened");
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    fn release(&self, device: &DeviceId) {
        if self.slot().take().is_some() {
            debug!(device_id = %device, "Terminal camera released");
        }
    }
}

// =============================================================================
// Navigator
// =============================================================================

pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, target: NavigationTarget) {
        println!("→ {}", target.route());
    }
}

// =============================================================================
// Emitter
// =============================================================================

/// Prints each snapshot, either as a dialog line or as JSON.
pub struct TerminalEmitter {
    json: bool,
}

impl TerminalEmitter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl ScanEventEmitter for TerminalEmitter {
    fn emit_state(&self, snapshot: &ScanSnapshot) {
        if self.json {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Failed to encode snapshot: {}", e),
            }
            return;
        }

        println!("{}", render(snapshot));
    }
}

fn render(snapshot: &ScanSnapshot) -> String {
    let mut line = format!("[{}] ", snapshot.state);

    if let Some(description) = &snapshot.description {
        line.push_str(description);
    }
    if let Some(barcode) = &snapshot.barcode {
        line.push_str(&format!(" ({})", barcode));
    }
    if let Some(message) = &snapshot.error_message {
        line.push_str(&format!(": {}", message));
    }

    let hint = match snapshot.state {
        _ if !snapshot.can_retry && !snapshot.shows_camera_feed => None,
        ScanState::Scanning => Some("type a barcode, q to cancel"),
        ScanState::NotFound => Some("r retry, f search manually, q close"),
        ScanState::Error => Some("r retry, q close"),
        _ => None,
    };
    if let Some(hint) = hint {
        line.push_str(&format!("  [{}]", hint));
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::ScanSession;

    #[tokio::test]
    async fn test_feed_requires_open_camera() {
        let camera = TerminalCamera::new();
        assert!(!camera.feed("4005808521175"));

        let device = DeviceId::new("stdin");
        let mut stream = camera
            .open_decode_stream(&device, &VideoSink::new("terminal"))
            .await
            .unwrap();

        assert!(camera.feed("  "));
        assert!(camera.feed("4005808521175"));
        assert_eq!(stream.next().await, Some(DecodeOutcome::NoSymbol));
        assert_eq!(
            stream.next().await,
            Some(DecodeOutcome::Decoded("4005808521175".into()))
        );

        camera.release(&device);
        assert!(!camera.feed("4005808521175"));
        assert_eq!(stream.next().await, None);
    }

    #[test]
    fn test_render_requesting() {
        let line = render(&ScanSession::new().snapshot());
        assert!(line.starts_with("[requesting]"));
    }
}
