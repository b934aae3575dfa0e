//! # Controller Messages
//!
//! Everything that reaches the [`ScanController`](crate::controller::ScanController)
//! arrives as one of two message types:
//!
//! - [`ScanCommand`]: user intent from the dialog, via `ScanHandle`.
//! - [`EngineEvent`]: results of the controller's own background tasks.
//!
//! Every engine event carries the attempt that started its task. The
//! controller drops events whose attempt is no longer current.

use std::fmt;

use shelf_core::{DetectionCandidate, LookupOutcome, ScanError};

use crate::camera::DecodeStream;
use crate::lifecycle::CameraLease;

/// User intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCommand {
    Retry,
    Fallback,
    Close,
}

/// Background task results.
pub enum EngineEvent {
    /// A camera is open and its decode stream is ready. Dropping the
    /// event releases the camera.
    Acquired {
        attempt: u32,
        lease: CameraLease,
        stream: DecodeStream,
    },
    AcquisitionFailed {
        attempt: u32,
        error: ScanError,
    },
    /// The decode loop read a symbol.
    Candidate {
        attempt: u32,
        candidate: DetectionCandidate,
    },
    /// The decode loop stopped on its own.
    DecodeFailed {
        attempt: u32,
        reason: String,
    },
    LookupFinished {
        attempt: u32,
        outcome: LookupOutcome,
    },
}

impl EngineEvent {
    pub fn attempt(&self) -> u32 {
        match self {
            EngineEvent::Acquired { attempt, .. }
            | EngineEvent::AcquisitionFailed { attempt, .. }
            | EngineEvent::Candidate { attempt, .. }
            | EngineEvent::DecodeFailed { attempt, .. }
            | EngineEvent::LookupFinished { attempt, .. } => *attempt,
        }
    }
}

impl fmt::Debug for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::Acquired { attempt, lease, .. } => f
                .debug_struct("Acquired")
                .field("attempt", attempt)
                .field("device", lease.device())
                .finish_non_exhaustive(),
            EngineEvent::AcquisitionFailed { attempt, error } => f
                .debug_struct("AcquisitionFailed")
                .field("attempt", attempt)
                .field("error", error)
                .finish(),
            EngineEvent::Candidate { attempt, candidate } => f
                .debug_struct("Candidate")
                .field("attempt", attempt)
                .field("raw_text", &candidate.raw_text)
                .finish(),
            EngineEvent::DecodeFailed { attempt, reason } => f
                .debug_struct("DecodeFailed")
                .field("attempt", attempt)
                .field("reason", reason)
                .finish(),
            EngineEvent::LookupFinished { attempt, outcome } => f
                .debug_struct("LookupFinished")
                .field("attempt", attempt)
                .field("outcome", outcome)
                .finish(),
        }
    }
}
