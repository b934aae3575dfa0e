//! # Engine Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       shelf-scan errors                                 │
//! │                                                                         │
//! │  CameraError   platform camera failures    → ScanError (user-facing)   │
//! │  LookupError   lookup service failures     → LookupOutcome::Failed     │
//! │  EngineError   config, channels, tasks     → caller of ScanHandle      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shelf_core::ScanError;
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors surfaced to code driving the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Catalog Errors
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("Scan session has ended")]
    SessionEnded,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<shelf_db::DbError> for EngineError {
    fn from(err: shelf_db::DbError) -> Self {
        EngineError::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigSaveFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::Internal(format!("scan controller task failed: {err}"))
    }
}

// =============================================================================
// Camera Error
// =============================================================================

/// Failures reported by a [`CameraCapture`](crate::camera::CameraCapture)
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The user or platform refused access.
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    /// No video input exists.
    #[error("no camera device: {0}")]
    NotFound(String),

    /// Anything else: device busy, constraints unsatisfiable, driver fault.
    #[error("camera failure: {0}")]
    Platform(String),
}

impl From<CameraError> for ScanError {
    fn from(err: CameraError) -> Self {
        match err {
            CameraError::PermissionDenied(_) => ScanError::PermissionDenied,
            CameraError::NotFound(_) => ScanError::NoCameraFound,
            CameraError::Platform(detail) => ScanError::CameraUnavailable(detail),
        }
    }
}

// =============================================================================
// Lookup Error
// =============================================================================

/// Transport or backend failure of a [`ProductLookup`](crate::lookup::ProductLookup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("lookup transport failed: {0}")]
    Transport(String),

    #[error("lookup backend error: {0}")]
    Backend(String),
}

impl From<shelf_db::DbError> for LookupError {
    fn from(err: shelf_db::DbError) -> Self {
        if err.is_transient() {
            LookupError::Transport(err.to_string())
        } else {
            LookupError::Backend(err.to_string())
        }
    }
}
