//! # Decode Loop
//!
//! Pumps a [`DecodeStream`] into the controller as [`EngineEvent`]s.
//!
//! ```text
//! DecodeOutcome::NoSymbol    ──► dropped (routine, every empty frame)
//! DecodeOutcome::Decoded(s)  ──► EngineEvent::Candidate { s, arrived_at: now }
//! DecodeOutcome::Fatal(r)    ──► EngineEvent::DecodeFailed, loop ends
//! stream end                 ──► EngineEvent::DecodeFailed, loop ends
//! cancel                     ──► loop ends, nothing sent
//! ```
//!
//! The stream is owned by the task, so stopping the task drops it and the
//! platform decoder with it.

use futures_util::StreamExt;
use shelf_core::{DecodeOutcome, DetectionCandidate};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::camera::DecodeStream;
use crate::events::EngineEvent;
use crate::lifecycle::TaskGuard;

/// Spawns the loop for `attempt`. Dropping the guard stops it.
pub fn spawn(attempt: u32, stream: DecodeStream, events: mpsc::Sender<EngineEvent>) -> TaskGuard {
    TaskGuard::spawn(move |cancel| run(attempt, stream, events, cancel))
}

async fn run(
    attempt: u32,
    mut stream: DecodeStream,
    events: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    debug!(attempt, "Decode loop started");

    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(attempt, "Decode loop cancelled");
                return;
            }
            outcome = stream.next() => outcome,
        };

        let event = match outcome {
            Some(DecodeOutcome::NoSymbol) => continue,
            Some(DecodeOutcome::Decoded(text)) => {
                trace!(attempt, raw = %text, "Symbol decoded");
                EngineEvent::Candidate {
                    attempt,
                    candidate: DetectionCandidate::new(text, Instant::now().into_std()),
                }
            }
            Some(DecodeOutcome::Fatal(reason)) => {
                warn!(attempt, reason = %reason, "Decoder failed");
                EngineEvent::DecodeFailed { attempt, reason }
            }
            None => {
                warn!(attempt, "Decode stream ended");
                EngineEvent::DecodeFailed {
                    attempt,
                    reason: "decode stream ended".to_string(),
                }
            }
        };

        let terminal = matches!(event, EngineEvent::DecodeFailed { .. });

        // A full channel applies back-pressure; cancellation still wins
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = events.send(event) => sent.is_ok(),
        };

        if !sent || terminal {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::time::Duration;

    fn outcomes(items: Vec<DecodeOutcome>) -> DecodeStream {
        stream::iter(items).chain(stream::pending()).boxed()
    }

    #[tokio::test]
    async fn test_forwards_decoded_and_skips_empty_frames() {
        let (tx, mut rx) = mpsc::channel(8);
        let _handle = spawn(
            3,
            outcomes(vec![
                DecodeOutcome::NoSymbol,
                DecodeOutcome::Decoded("96385074".into()),
                DecodeOutcome::NoSymbol,
                DecodeOutcome::Decoded("hello".into()),
            ]),
            tx,
        );

        match rx.recv().await.unwrap() {
            EngineEvent::Candidate { attempt, candidate } => {
                assert_eq!(attempt, 3);
                assert_eq!(candidate.raw_text, "96385074");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await.unwrap() {
            EngineEvent::Candidate { candidate, .. } => assert_eq!(candidate.raw_text, "hello"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fatal_ends_loop() {
        let (tx, mut rx) = mpsc::channel(8);
        let _handle = spawn(
            1,
            outcomes(vec![
                DecodeOutcome::Fatal("decoder crashed".into()),
                DecodeOutcome::Decoded("96385074".into()),
            ]),
            tx,
        );

        match rx.recv().await.unwrap() {
            EngineEvent::DecodeFailed { reason, .. } => assert_eq!(reason, "decoder crashed"),
            other => panic!("unexpected event: {other:?}"),
        }
        // Sender dropped with the finished task
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_end_is_failure() {
        let (tx, mut rx) = mpsc::channel(8);
        let _handle = spawn(1, stream::empty().boxed(), tx);
        assert!(matches!(
            rx.recv().await.unwrap(),
            EngineEvent::DecodeFailed { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_silences_loop() {
        let (tx, mut rx) = mpsc::channel(8);
        let (frame_tx, frame_rx) = mpsc::unbounded_channel::<DecodeOutcome>();
        let frames = futures_util::stream::unfold(frame_rx, |mut rx| async move {
            rx.recv().await.map(|frame| (frame, rx))
        })
        .boxed();

        let handle = spawn(1, frames, tx);
        handle.stop();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let _ = frame_tx.send(DecodeOutcome::Decoded("96385074".into()));
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Task gone, sender dropped, nothing delivered
        assert!(rx.recv().await.is_none());
        assert!(frame_tx.is_closed());
    }
}
