//! # Device Negotiator
//!
//! Enumerates cameras and picks one, mapping platform failures onto the
//! user-facing taxonomy.
//!
//! ```text
//! list_video_inputs()
//!    ├── Err(PermissionDenied) ──► ScanError::PermissionDenied
//!    ├── Err(NotFound)         ──► ScanError::NoCameraFound
//!    ├── Err(Platform)         ──► ScanError::CameraUnavailable
//!    ├── Ok([])                ──► ScanError::NoCameraFound
//!    └── Ok(devices)           ──► select_preferred_device → DeviceId
//! ```

use std::sync::Arc;

use shelf_core::{select_preferred_device, DeviceId, ScanError};
use tracing::{debug, info, warn};

use crate::camera::{CameraCapture, DecodeStream, VideoSink};

pub struct DeviceNegotiator {
    camera: Arc<dyn CameraCapture>,
}

impl DeviceNegotiator {
    pub fn new(camera: Arc<dyn CameraCapture>) -> Self {
        Self { camera }
    }

    /// Chooses the device to open, preferring a rear-facing camera.
    pub async fn select_device(&self) -> Result<DeviceId, ScanError> {
        let devices = self.camera.list_video_inputs().await.map_err(|e| {
            warn!(error = %e, "Camera enumeration failed");
            ScanError::from(e)
        })?;

        debug!(count = devices.len(), "Enumerated video inputs");

        let device = select_preferred_device(&devices).ok_or_else(|| {
            warn!("No video inputs available");
            ScanError::NoCameraFound
        })?;

        info!(
            device_id = %device.device_id,
            label = %device.label,
            "Selected camera"
        );
        Ok(device.device_id.clone())
    }

    /// Selects a device and opens its decode stream.
    pub async fn acquire(&self, sink: &VideoSink) -> Result<(DeviceId, DecodeStream), ScanError> {
        let device = self.select_device().await?;
        let stream = self
            .camera
            .open_decode_stream(&device, sink)
            .await
            .map_err(|e| {
                warn!(device_id = %device, error = %e, "Failed to open camera");
                ScanError::from(e)
            })?;
        Ok((device, stream))
    }
}
