//! # Camera Capture
//!
//! The platform seam: whatever owns real video hardware (a browser bridge,
//! V4L2, a test double) implements [`CameraCapture`].
//!
//! ## Contract
//! ```text
//! list_video_inputs()             → devices (labels may be blank)
//!        │
//!        ▼
//! open_decode_stream(device, sink) → stream of DecodeOutcome, one per frame
//!        │                            (frames rendered into `sink`)
//!        ▼
//! release(device)                  → stop all tracks, detach from sink
//! ```
//!
//! `release` must be idempotent and cheap: it is called from `Drop`.
//! `open_decode_stream` must leave nothing open if its future is dropped
//! before completing.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use shelf_core::{DecodeOutcome, DeviceId, VideoDevice};

use crate::error::CameraError;

/// Per-frame decoder results for one open device.
///
/// Ending the stream (returning `None`) is treated the same as
/// [`DecodeOutcome::Fatal`].
pub type DecodeStream = BoxStream<'static, DecodeOutcome>;

/// Where the live preview is rendered. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoSink(String);

impl VideoSink {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait CameraCapture: Send + Sync {
    /// Enumerates video inputs. Usually the step that prompts for permission.
    async fn list_video_inputs(&self) -> Result<Vec<VideoDevice>, CameraError>;

    /// Opens `device`, binds its preview to `sink` and starts decoding.
    async fn open_decode_stream(
        &self,
        device: &DeviceId,
        sink: &VideoSink,
    ) -> Result<DecodeStream, CameraError>;

    /// Stops every media track of `device`.
    fn release(&self, device: &DeviceId);
}
