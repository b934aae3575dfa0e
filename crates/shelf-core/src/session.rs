//! # Scan Session
//!
//! The state machine of one scan dialog.
//!
//! ## Transitions
//! ```text
//! ┌────────────┬──────────────────────────────┬────────────┐
//! │ From       │ Trigger                      │ To         │
//! ├────────────┼──────────────────────────────┼────────────┤
//! │ Requesting │ device_selected              │ Scanning   │
//! │ Requesting │ acquisition_failed           │ Error      │
//! │ Scanning   │ detection accepted           │ Processing │
//! │ Scanning   │ decode_failed                │ Error      │
//! │ Processing │ lookup_finished(Resolved)    │ Found      │
//! │ Processing │ lookup_finished(NotFound)    │ NotFound   │
//! │ Processing │ lookup_finished(TimedOut)    │ Error      │
//! │ Processing │ lookup_finished(Failed)      │ Error      │
//! │ Found      │ complete                     │ (exit)     │
//! │ NotFound   │ fallback                     │ (exit)     │
//! │ NotFound   │ retry                        │ Requesting │
//! │ Error      │ retry                        │ Requesting │
//! │ any        │ close                        │ (exit)     │
//! └────────────┴──────────────────────────────┴────────────┘
//! ```
//!
//! ## Attempts
//! Each pass through `Requesting` is an *attempt*. Retry bumps the counter.
//! Async work is tagged with the attempt that started it, and
//! [`ScanSession::is_current`] tells the engine whether a late result still
//! belongs to this dialog.
//!
//! The session never touches a camera or a clock. The engine performs the
//! side effects each transition implies.

use std::time::Instant;

use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ScanError};
use crate::types::{DeviceId, LookupOutcome, ProductId, ScanSnapshot, ScanState, SessionExit};
use crate::LOOKUP_TIMEOUT;

/// State of one scan dialog, from open to exit.
#[derive(Debug, Clone)]
pub struct ScanSession {
    id: Uuid,
    attempt: u32,
    state: ScanState,
    /// Fixed once chosen; cleared only by retry.
    selected_device_id: Option<DeviceId>,
    last_accepted_barcode: Option<String>,
    last_accepted_at: Option<Instant>,
    error: Option<ScanError>,
    product_id: Option<ProductId>,
    exit: Option<SessionExit>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    /// Opens a session in `Requesting`, attempt 1.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt: 1,
            state: ScanState::Requesting,
            selected_device_id: None,
            last_accepted_barcode: None,
            last_accepted_at: None,
            error: None,
            product_id: None,
            exit: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn selected_device_id(&self) -> Option<&DeviceId> {
        self.selected_device_id.as_ref()
    }

    pub fn last_accepted_barcode(&self) -> Option<&str> {
        self.last_accepted_barcode.as_deref()
    }

    pub fn last_accepted_at(&self) -> Option<Instant> {
        self.last_accepted_at
    }

    pub fn error(&self) -> Option<&ScanError> {
        self.error.as_ref()
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn exit(&self) -> Option<&SessionExit> {
        self.exit.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.exit.is_some()
    }

    /// Whether work started for `attempt` may still affect this session.
    pub fn is_current(&self, attempt: u32) -> bool {
        !self.is_ended() && self.attempt == attempt
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// A camera was opened and the decode loop is about to start.
    pub fn device_selected(&mut self, device_id: DeviceId) -> CoreResult<()> {
        self.expect_state(&[ScanState::Requesting], "select a camera")?;
        self.selected_device_id = Some(device_id);
        self.state = ScanState::Scanning;
        Ok(())
    }

    /// Permission, enumeration or open failed.
    pub fn acquisition_failed(&mut self, error: ScanError) -> CoreResult<()> {
        self.expect_state(&[ScanState::Requesting], "fail acquisition")?;
        self.fail(error);
        Ok(())
    }

    /// Records an accepted barcode. Only the debouncer calls this.
    pub(crate) fn begin_processing(&mut self, barcode: String, at: Instant) -> CoreResult<()> {
        self.expect_state(&[ScanState::Scanning], "accept a detection")?;
        self.last_accepted_barcode = Some(barcode);
        self.last_accepted_at = Some(at);
        self.state = ScanState::Processing;
        Ok(())
    }

    /// The decoder reported a fatal error while scanning.
    pub fn decode_failed(&mut self, reason: impl Into<String>) -> CoreResult<()> {
        self.expect_state(&[ScanState::Scanning], "fail decoding")?;
        self.fail(ScanError::DecodeFatal(reason.into()));
        Ok(())
    }

    /// Applies the lookup result and returns the new state.
    pub fn lookup_finished(&mut self, outcome: LookupOutcome) -> CoreResult<ScanState> {
        self.expect_state(&[ScanState::Processing], "finish a lookup")?;
        match outcome {
            LookupOutcome::Resolved(product_id) => {
                self.product_id = Some(product_id);
                self.state = ScanState::Found;
            }
            LookupOutcome::NotFound => self.state = ScanState::NotFound,
            LookupOutcome::TimedOut => self.fail(ScanError::LookupTimeout {
                timeout_ms: LOOKUP_TIMEOUT.as_millis() as u64,
            }),
            LookupOutcome::Failed(reason) => self.fail(ScanError::LookupFailed(reason)),
        }
        Ok(self.state)
    }

    /// Starts a fresh attempt and returns its number.
    ///
    /// The cooldown history is kept, so a barcode still in frame is not
    /// accepted again the instant scanning resumes.
    pub fn retry(&mut self) -> CoreResult<u32> {
        self.expect_state(&[ScanState::NotFound, ScanState::Error], "retry")?;
        self.attempt += 1;
        self.state = ScanState::Requesting;
        self.selected_device_id = None;
        self.error = None;
        self.product_id = None;
        Ok(self.attempt)
    }

    /// Ends the session with a manual search for the last barcode.
    pub fn fallback(&mut self) -> CoreResult<String> {
        self.expect_state(&[ScanState::NotFound], "fall back to search")?;
        let barcode = self
            .last_accepted_barcode
            .clone()
            .ok_or(CoreError::InvalidTransition {
                state: self.state,
                trigger: "fall back without a barcode",
            })?;
        self.exit = Some(SessionExit::Fallback(barcode.clone()));
        Ok(barcode)
    }

    /// Ends the session with navigation once the found delay has elapsed.
    pub fn complete(&mut self) -> CoreResult<ProductId> {
        self.expect_state(&[ScanState::Found], "navigate")?;
        let product_id = self.product_id.ok_or(CoreError::InvalidTransition {
            state: self.state,
            trigger: "navigate without a product",
        })?;
        self.exit = Some(SessionExit::Navigated(product_id));
        Ok(product_id)
    }

    /// Ends the session from any state. Idempotent.
    pub fn close(&mut self) -> SessionExit {
        self.exit.get_or_insert(SessionExit::Closed).clone()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// User-facing error copy, present only in `Error`.
    pub fn error_message(&self) -> Option<&'static str> {
        match self.state {
            ScanState::Error => self.error.as_ref().map(ScanError::user_message),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        let barcode = match self.state {
            ScanState::Processing | ScanState::Found | ScanState::NotFound => {
                self.last_accepted_barcode.clone()
            }
            _ => None,
        };
        let live = !self.is_ended();

        ScanSnapshot {
            session_id: self.id,
            attempt: self.attempt,
            state: self.state,
            description: self.state.description().map(str::to_string),
            barcode,
            product_id: self.product_id,
            error_message: self.error_message().map(str::to_string),
            close_label: self.state.close_label().to_string(),
            can_retry: live && self.state.can_retry(),
            can_fallback: live && self.state.can_fallback(),
            shows_camera_feed: live && self.state.shows_camera_feed(),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn expect_state(&self, allowed: &[ScanState], trigger: &'static str) -> CoreResult<()> {
        if self.is_ended() {
            return Err(CoreError::SessionEnded);
        }
        if !allowed.contains(&self.state) {
            return Err(CoreError::InvalidTransition {
                state: self.state,
                trigger,
            });
        }
        Ok(())
    }

    fn fail(&mut self, error: ScanError) {
        self.error = Some(error);
        self.state = ScanState::Error;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scanning_session() -> ScanSession {
        let mut session = ScanSession::new();
        session.device_selected(DeviceId::new("cam-0")).unwrap();
        session
    }

    fn processing_session(barcode: &str) -> ScanSession {
        let mut session = scanning_session();
        session
            .begin_processing(barcode.to_string(), Instant::now())
            .unwrap();
        session
    }

    #[test]
    fn test_new_session_is_requesting() {
        let session = ScanSession::new();
        assert_eq!(session.state(), ScanState::Requesting);
        assert_eq!(session.attempt(), 1);
        assert!(session.selected_device_id().is_none());
        assert!(!session.is_ended());
    }

    #[test]
    fn test_device_selected_once_per_attempt() {
        let mut session = scanning_session();
        assert_eq!(session.state(), ScanState::Scanning);
        assert_eq!(session.selected_device_id().unwrap().as_str(), "cam-0");

        // Not Requesting any more
        let err = session.device_selected(DeviceId::new("cam-1")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(session.selected_device_id().unwrap().as_str(), "cam-0");
    }

    #[test]
    fn test_acquisition_failure() {
        let mut session = ScanSession::new();
        session.acquisition_failed(ScanError::PermissionDenied).unwrap();
        assert_eq!(session.state(), ScanState::Error);
        assert_eq!(
            session.error_message(),
            Some("Camera permission denied. Please allow camera access in your browser settings.")
        );
    }

    #[test]
    fn test_lookup_resolved() {
        let mut session = processing_session("4005808521175");
        let state = session
            .lookup_finished(LookupOutcome::Resolved(ProductId::new(42)))
            .unwrap();
        assert_eq!(state, ScanState::Found);
        assert_eq!(session.product_id(), Some(ProductId::new(42)));

        assert_eq!(session.complete().unwrap(), ProductId::new(42));
        assert_eq!(
            session.exit(),
            Some(&SessionExit::Navigated(ProductId::new(42)))
        );
    }

    #[test]
    fn test_lookup_timeout_is_error() {
        let mut session = processing_session("96385074");
        session.lookup_finished(LookupOutcome::TimedOut).unwrap();
        assert_eq!(session.state(), ScanState::Error);
        assert_eq!(
            session.error(),
            Some(&ScanError::LookupTimeout { timeout_ms: 10_000 })
        );
    }

    #[test]
    fn test_lookup_failure_is_error() {
        let mut session = processing_session("96385074");
        session
            .lookup_finished(LookupOutcome::Failed("network down".into()))
            .unwrap();
        assert_eq!(
            session.error(),
            Some(&ScanError::LookupFailed("network down".into()))
        );
    }

    #[test]
    fn test_lookup_outside_processing_rejected() {
        let mut session = scanning_session();
        assert!(session.lookup_finished(LookupOutcome::NotFound).is_err());
        assert_eq!(session.state(), ScanState::Scanning);
    }

    #[test]
    fn test_decode_failed_only_while_scanning() {
        let mut session = processing_session("96385074");
        assert!(session.decode_failed("stream closed").is_err());
        assert_eq!(session.state(), ScanState::Processing);

        let mut session = scanning_session();
        session.decode_failed("stream closed").unwrap();
        assert_eq!(session.state(), ScanState::Error);
    }

    #[test]
    fn test_retry_starts_new_attempt() {
        let mut session = processing_session("96385074");
        session.lookup_finished(LookupOutcome::NotFound).unwrap();

        assert_eq!(session.retry().unwrap(), 2);
        assert_eq!(session.state(), ScanState::Requesting);
        assert!(session.selected_device_id().is_none());
        assert!(session.error().is_none());
        assert!(!session.is_current(1));
        assert!(session.is_current(2));
        // Cooldown history survives the retry
        assert_eq!(session.last_accepted_barcode(), Some("96385074"));
    }

    #[test]
    fn test_retry_rejected_while_scanning() {
        let mut session = scanning_session();
        assert!(session.retry().is_err());
        assert_eq!(session.attempt(), 1);
    }

    #[test]
    fn test_fallback_carries_barcode() {
        let mut session = processing_session("036000291452");
        session.lookup_finished(LookupOutcome::NotFound).unwrap();
        assert_eq!(session.fallback().unwrap(), "036000291452");
        assert!(session.is_ended());
        assert!(!session.is_current(1));
    }

    #[test]
    fn test_fallback_requires_not_found() {
        let mut session = ScanSession::new();
        session.acquisition_failed(ScanError::NoCameraFound).unwrap();
        assert!(session.fallback().is_err());
    }

    #[test]
    fn test_close_is_idempotent_and_final() {
        let mut session = scanning_session();
        assert_eq!(session.close(), SessionExit::Closed);
        assert_eq!(session.close(), SessionExit::Closed);
        assert_eq!(
            session.decode_failed("late"),
            Err(CoreError::SessionEnded)
        );
    }

    #[test]
    fn test_close_after_navigation_keeps_exit() {
        let mut session = processing_session("96385074");
        session
            .lookup_finished(LookupOutcome::Resolved(ProductId::new(7)))
            .unwrap();
        session.complete().unwrap();
        assert_eq!(session.close(), SessionExit::Navigated(ProductId::new(7)));
    }

    #[test]
    fn test_snapshot() {
        let mut session = processing_session("4005808521175");
        let snap = session.snapshot();
        assert_eq!(snap.state, ScanState::Processing);
        assert_eq!(snap.barcode.as_deref(), Some("4005808521175"));
        assert_eq!(snap.description.as_deref(), Some("Looking up product..."));
        assert!(snap.shows_camera_feed);
        assert!(!snap.can_retry);

        session.lookup_finished(LookupOutcome::NotFound).unwrap();
        let snap = session.snapshot();
        assert!(snap.can_retry);
        assert!(snap.can_fallback);
        assert_eq!(snap.close_label, "Close");
        assert!(snap.error_message.is_none());
    }

    #[test]
    fn test_snapshot_json_is_camel_case() {
        let snap = ScanSession::new().snapshot();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["state"], "requesting");
        assert_eq!(json["closeLabel"], "Cancel");
        assert_eq!(json["showsCameraFeed"], true);
    }
}
