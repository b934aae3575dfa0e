//! # shelf-core: Pure Scan Logic for Shelf Scanner
//!
//! The rules of a barcode scan dialog as plain data and functions. The async
//! engine in `shelf-scan` feeds events in; this crate decides what they mean.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Shelf Scanner Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Scanner dialog (web / terminal)                 │   │
//! │  │      renders ScanSnapshot, sends Retry / Fallback / Close       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  shelf-scan (async engine)                      │   │
//! │  │     camera negotiation, decode loop, lookup, timers             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shelf-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  session  │  │ debounce  │  │ validation│  │   │
//! │  │   │ ScanState │  │ScanSession│  │ Debouncer │  │  barcode  │  │   │
//! │  │   │ Snapshot  │  │transitions│  │ cooldown  │  │  format   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • NO TASKS • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ScanState, ProductId, ScanSnapshot, etc.)
//! - [`session`] - The scan state machine
//! - [`debounce`] - Filters raw detections down to one accepted barcode
//! - [`device`] - Rear-camera preference
//! - [`validation`] - Barcode format rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use std::time::Instant;
//! use shelf_core::{DetectionCandidate, DetectionDebouncer, DeviceId, ScanSession, ScanState};
//!
//! let mut session = ScanSession::new();
//! session.device_selected(DeviceId::new("cam-1")).unwrap();
//!
//! let debouncer = DetectionDebouncer::default();
//! let candidate = DetectionCandidate::new("4005808521175", Instant::now());
//!
//! assert!(debouncer.accept(&candidate, &mut session));
//! assert_eq!(session.state(), ScanState::Processing);
//! assert_eq!(session.last_accepted_barcode(), Some("4005808521175"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod debounce;
pub mod device;
pub mod error;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use debounce::{DetectionDebouncer, Rejection, Verdict};
pub use device::select_preferred_device;
pub use error::{CoreError, CoreResult, ScanError, ValidationError};
pub use session::ScanSession;
pub use types::*;
pub use validation::{is_valid_barcode_format, validate_barcode};

// =============================================================================
// Crate-Level Constants
// =============================================================================

use std::time::Duration;

/// Minimum spacing between two accepted detections.
///
/// Decoders report the same symbol many times per second while it stays in
/// frame; anything inside this window after an acceptance is dropped.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(1_000);

/// Upper bound on a single product lookup.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_millis(10_000);

/// How long the Found state stays on screen before navigating.
pub const FOUND_DISPLAY_DELAY: Duration = Duration::from_millis(1_500);

/// Accepted barcode lengths: EAN-8, UPC-A, EAN-13.
pub const VALID_BARCODE_LENGTHS: [usize; 3] = [8, 12, 13];

/// Case-insensitive label fragments that mark a rear-facing camera.
pub const REAR_CAMERA_HINTS: [&str; 2] = ["back", "environment"];
