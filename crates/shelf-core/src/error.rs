//! # Error Types
//!
//! Domain-specific error types for shelf-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shelf-core errors (this file)                                         │
//! │  ├── ScanError        - Why a scan dialog shows its error screen       │
//! │  ├── CoreError        - Invalid state-machine operations               │
//! │  └── ValidationError  - Barcode format rejections                      │
//! │                                                                         │
//! │  shelf-db errors (separate crate)                                      │
//! │  └── DbError          - Catalog failures                               │
//! │                                                                         │
//! │  shelf-scan errors (separate crate)                                    │
//! │  ├── CameraError      - Platform camera failures → ScanError           │
//! │  ├── LookupError      - Lookup transport failures → ScanError          │
//! │  └── EngineError      - Config, channel, task failures                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ScanError` is the only one the user ever sees, through
//! [`ScanError::user_message`].

use thiserror::Error;

use crate::types::ScanState;

// =============================================================================
// Scan Error
// =============================================================================

/// The reason a session is sitting in the `Error` state.
///
/// Every failure in the engine collapses to exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The user (or the platform) refused camera access.
    #[error("camera permission denied")]
    PermissionDenied,

    /// Enumeration came back with no video inputs.
    #[error("no camera found")]
    NoCameraFound,

    /// Any other acquisition failure (device busy, hardware fault, ...).
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// The decoder reported an error that ends the decode loop.
    #[error("decoder failed: {0}")]
    DecodeFatal(String),

    /// The lookup did not answer within the timeout.
    #[error("product lookup timed out after {timeout_ms} ms")]
    LookupTimeout { timeout_ms: u64 },

    /// The lookup service itself failed.
    #[error("product lookup failed: {0}")]
    LookupFailed(String),
}

impl ScanError {
    /// The copy shown on the dialog's error screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Camera permission denied. Please allow camera access in your browser settings."
            }
            Self::NoCameraFound => "No camera found on this device.",
            Self::CameraUnavailable(_) => "Failed to access camera. Please check your permissions.",
            Self::DecodeFatal(_) => "The camera stopped scanning unexpectedly. Please try again.",
            Self::LookupTimeout { .. } => "Product lookup timed out. Please try again.",
            Self::LookupFailed(_) => "Failed to search for product. Please try again.",
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Invalid operations on a [`ScanSession`](crate::session::ScanSession).
///
/// These never reach the user. The engine logs them and drops the event
/// that caused them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The trigger is not accepted in the current state.
    #[error("cannot {trigger} while {state}")]
    InvalidTransition {
        state: ScanState,
        trigger: &'static str,
    },

    /// The session has already exited (closed, navigated or fell back).
    #[error("scan session has already ended")]
    SessionEnded,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Why a decoded string is not a usable barcode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Nothing left after trimming.
    #[error("barcode is empty")]
    Empty,

    /// Contains something other than ASCII digits.
    #[error("barcode '{value}' must contain only digits")]
    NotNumeric { value: String },

    /// Digit count is not an accepted symbology length.
    #[error("barcode length {length} must be one of {allowed:?}")]
    InvalidLength {
        length: usize,
        allowed: &'static [usize],
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
