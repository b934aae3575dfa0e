//! # Domain Types
//!
//! Core types shared by the scan engine, the catalog and the UI.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Scan Data Flow                                  │
//! │                                                                         │
//! │  VideoDevice ──► DeviceId ──► DecodeOutcome ──► DetectionCandidate     │
//! │                                                    │                    │
//! │                                                    ▼                    │
//! │              ScanSnapshot ◄── ScanState ◄── LookupOutcome ◄── barcode  │
//! │                    │                            │                       │
//! │                    ▼                            ▼                       │
//! │             UI (ts-rs types)             SessionExit (ProductId)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// =============================================================================
// Camera Types
// =============================================================================

/// Opaque identifier of a video input, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the platform's video input enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDevice {
    pub device_id: DeviceId,
    /// Human-readable label. May be empty before permission is granted.
    pub label: String,
}

impl VideoDevice {
    pub fn new(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: DeviceId::new(device_id),
            label: label.into(),
        }
    }
}

/// What the decoder made of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A symbol was read. The text is untrimmed and unvalidated.
    Decoded(String),
    /// The frame held no readable symbol. Routine, never surfaced.
    NoSymbol,
    /// The decoder broke and will produce nothing further.
    Fatal(String),
}

/// A decoded string together with the moment it reached the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionCandidate {
    pub raw_text: String,
    pub arrived_at: Instant,
}

impl DetectionCandidate {
    pub fn new(raw_text: impl Into<String>, arrived_at: Instant) -> Self {
        Self {
            raw_text: raw_text.into(),
            arrived_at,
        }
    }
}

// =============================================================================
// Catalog Types
// =============================================================================

/// Catalog primary key of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
#[ts(export)]
pub struct ProductId(#[ts(type = "number")] i64);

impl ProductId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication status of a catalog product.
///
/// Both `publish` and `published` occur in catalog data and count as live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    Publish,
    Published,
    Archived,
}

impl ProductStatus {
    /// Statuses a scan may resolve to.
    pub const LIVE: [ProductStatus; 2] = [Self::Publish, Self::Published];
}

impl Default for ProductStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// A row of the product catalog, reduced to what scanning needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CatalogProduct {
    pub product_id: ProductId,
    pub name: String,
    /// Not every product carries a barcode.
    pub barcode: Option<String>,
    pub product_status: ProductStatus,
}

/// Result of one bounded lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Resolved(ProductId),
    NotFound,
    TimedOut,
    /// Transport or backend failure, with a diagnostic for logs.
    Failed(String),
}

// =============================================================================
// Scan State
// =============================================================================

/// The six states of a scan dialog.
///
/// ```text
///            ┌──────────── retry ────────────┐
///            ▼                               │
///      Requesting ──► Scanning ──► Processing ──► Found ──► (navigate)
///            │            │            │
///            └──► Error ◄─┘            ├──► NotFound ──► (fallback)
///                   ▲                  │
///                   └──────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    /// Waiting for camera permission and a device.
    Requesting,
    /// Camera open, decode loop running.
    Scanning,
    /// A barcode was accepted and is being looked up.
    Processing,
    /// The barcode resolved to a product; navigation is pending.
    Found,
    /// The barcode resolved to nothing.
    NotFound,
    /// Something failed; see the session's [`ScanError`](crate::ScanError).
    Error,
}

impl ScanState {
    /// Dialog subtitle for this state, if it has one.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::Requesting => None,
            Self::Scanning => Some("Hold the barcode in front of your camera"),
            Self::Processing => Some("Looking up product..."),
            Self::Found => Some("Product found! Redirecting..."),
            Self::NotFound => Some("Product not found in database"),
            Self::Error => Some("Camera error"),
        }
    }

    /// Label of the dialog's dismiss button.
    pub fn close_label(&self) -> &'static str {
        match self {
            Self::Requesting | Self::Scanning => "Cancel",
            _ => "Close",
        }
    }

    /// Whether the live camera view is part of this state's screen.
    pub fn shows_camera_feed(&self) -> bool {
        matches!(self, Self::Requesting | Self::Scanning | Self::Processing)
    }

    pub fn can_retry(&self) -> bool {
        matches!(self, Self::NotFound | Self::Error)
    }

    pub fn can_fallback(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// States in which no camera may be held.
    pub fn releases_camera(&self) -> bool {
        matches!(self, Self::Found | Self::NotFound | Self::Error)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Requesting => "requesting",
            Self::Scanning => "scanning",
            Self::Processing => "processing",
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SessionExit {
    /// Found, and the product page was requested.
    Navigated(ProductId),
    /// NotFound, and manual search was requested with this barcode.
    Fallback(String),
    /// Dismissed by the user or torn down by the host.
    Closed,
}

// =============================================================================
// UI Snapshot
// =============================================================================

/// Everything the dialog needs to render one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    #[ts(as = "String")]
    pub session_id: Uuid,
    pub attempt: u32,
    pub state: ScanState,
    pub description: Option<String>,
    /// Shown while processing and on the result screens.
    pub barcode: Option<String>,
    pub product_id: Option<ProductId>,
    pub error_message: Option<String>,
    pub close_label: String,
    pub can_retry: bool,
    pub can_fallback: bool,
    pub shows_camera_feed: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_label() {
        assert_eq!(ScanState::Requesting.close_label(), "Cancel");
        assert_eq!(ScanState::Scanning.close_label(), "Cancel");
        assert_eq!(ScanState::Processing.close_label(), "Close");
        assert_eq!(ScanState::NotFound.close_label(), "Close");
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(ScanState::Requesting.description(), None);
        assert_eq!(
            ScanState::Found.description(),
            Some("Product found! Redirecting...")
        );
        assert_eq!(ScanState::Error.description(), Some("Camera error"));
    }

    #[test]
    fn test_terminal_states_release_camera() {
        for state in [ScanState::Found, ScanState::NotFound, ScanState::Error] {
            assert!(state.releases_camera(), "{state} should release");
            assert!(!state.shows_camera_feed());
        }
        assert!(!ScanState::Processing.releases_camera());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ScanState::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
        assert_eq!(ScanState::NotFound.to_string(), "not_found");
    }

    #[test]
    fn test_live_statuses() {
        assert!(ProductStatus::LIVE.contains(&ProductStatus::Publish));
        assert!(ProductStatus::LIVE.contains(&ProductStatus::Published));
        assert!(!ProductStatus::LIVE.contains(&ProductStatus::Draft));
        assert!(!ProductStatus::LIVE.contains(&ProductStatus::Archived));
    }

    #[test]
    fn test_product_id_serializes_as_number() {
        let json = serde_json::to_string(&ProductId::new(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(serde_json::from_str::<ProductId>("42").unwrap(), ProductId::new(42));
    }
}
