//! # Detection Debouncer
//!
//! Turns the decoder's firehose into at most one accepted barcode per
//! window.
//!
//! ## Filter Order
//! ```text
//! DetectionCandidate
//!      │
//!      ▼
//! session Scanning? ───── no ──► Rejected(NotScanning)     (lookup in flight)
//!      │ yes
//!      ▼
//! within DEBOUNCE_WINDOW of last acceptance? ── yes ──► Rejected(Cooldown)
//!      │ no
//!      ▼
//! valid EAN-8 / UPC-A / EAN-13? ── no ──► Rejected(InvalidFormat)
//!      │ yes
//!      ▼
//! Accepted(trimmed barcode)  →  session moves to Processing
//! ```
//!
//! Rejections are silent: they never change the session and never reach
//! the user. The cooldown measures from the last *accepted* detection,
//! whatever its text, so rejected candidates do not extend it.

use std::time::Duration;

use crate::error::ValidationError;
use crate::session::ScanSession;
use crate::types::{DetectionCandidate, ScanState};
use crate::validation::validate_barcode;
use crate::DEBOUNCE_WINDOW;

/// Why a candidate was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Not in `Scanning`; typically a lookup is already in flight.
    NotScanning(ScanState),
    /// Too soon after the previous acceptance.
    Cooldown { elapsed: Duration },
    InvalidFormat(ValidationError),
}

/// Decision for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(String),
    Rejected(Rejection),
}

/// Stateless filter; the history it needs lives on the session.
#[derive(Debug, Clone, Copy)]
pub struct DetectionDebouncer {
    window: Duration,
}

impl Default for DetectionDebouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

impl DetectionDebouncer {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Judges a candidate without touching the session.
    pub fn evaluate(&self, candidate: &DetectionCandidate, session: &ScanSession) -> Verdict {
        if session.is_ended() || session.state() != ScanState::Scanning {
            return Verdict::Rejected(Rejection::NotScanning(session.state()));
        }

        if let Some(last) = session.last_accepted_at() {
            let elapsed = candidate.arrived_at.saturating_duration_since(last);
            if elapsed < self.window {
                return Verdict::Rejected(Rejection::Cooldown { elapsed });
            }
        }

        match validate_barcode(&candidate.raw_text) {
            Ok(barcode) => Verdict::Accepted(barcode.to_string()),
            Err(e) => Verdict::Rejected(Rejection::InvalidFormat(e)),
        }
    }

    /// Accepts the candidate into the session if it passes every filter.
    ///
    /// On `true` the session is in `Processing` with the trimmed barcode
    /// recorded as the last accepted one.
    pub fn accept(&self, candidate: &DetectionCandidate, session: &mut ScanSession) -> bool {
        match self.evaluate(candidate, session) {
            Verdict::Accepted(barcode) => session
                .begin_processing(barcode, candidate.arrived_at)
                .is_ok(),
            Verdict::Rejected(_) => false,
        }
    }
}
