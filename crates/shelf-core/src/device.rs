//! Camera selection policy.
//!
//! Barcodes are held up to the back of a phone, so a rear-facing camera is
//! preferred whenever the platform labels one as such.

use crate::types::VideoDevice;
use crate::REAR_CAMERA_HINTS;

/// Whether a device label marks a rear-facing camera.
pub fn is_rear_facing(label: &str) -> bool {
    let label = label.to_lowercase();
    REAR_CAMERA_HINTS.iter().any(|hint| label.contains(hint))
}

/// Picks the device to open.
///
/// The first rear-facing device in enumeration order wins; otherwise the
/// first device. `None` only for an empty list.
pub fn select_preferred_device(devices: &[VideoDevice]) -> Option<&VideoDevice> {
    devices
        .iter()
        .find(|device| is_rear_facing(&device.label))
        .or_else(|| devices.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_back_camera() {
        let devices = vec![
            VideoDevice::new("front", "FaceTime HD Camera (front)"),
            VideoDevice::new("rear", "Back Camera"),
        ];
        let chosen = select_preferred_device(&devices).unwrap();
        assert_eq!(chosen.device_id.as_str(), "rear");
    }

    #[test]
    fn test_environment_label() {
        let devices = vec![
            VideoDevice::new("a", "camera2 1, facing front"),
            VideoDevice::new("b", "camera2 0, facing ENVIRONMENT"),
        ];
        assert_eq!(select_preferred_device(&devices).unwrap().device_id.as_str(), "b");
    }

    #[test]
    fn test_first_rear_match_wins() {
        let devices = vec![
            VideoDevice::new("wide", "Back Ultra Wide Camera"),
            VideoDevice::new("main", "Back Camera"),
        ];
        assert_eq!(select_preferred_device(&devices).unwrap().device_id.as_str(), "wide");
    }

    #[test]
    fn test_falls_back_to_first() {
        // Labels are blank until permission is granted
        let devices = vec![VideoDevice::new("x", ""), VideoDevice::new("y", "")];
        assert_eq!(select_preferred_device(&devices).unwrap().device_id.as_str(), "x");
    }

    #[test]
    fn test_empty_list() {
        assert!(select_preferred_device(&[]).is_none());
    }
}
