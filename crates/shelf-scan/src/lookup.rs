//! # Lookup Coordinator
//!
//! Resolves an accepted barcode against the catalog, bounded by
//! [`LOOKUP_TIMEOUT`].
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ ProductLookup::find(barcode) │──► Ok(Some(id)) ──► Resolved(id)
//! │                              │──► Ok(None)     ──► NotFound
//! │                              │──► Err(e)       ──► Failed(e)
//! └──────────────┬───────────────┘
//!                │ races
//!        sleep(LOOKUP_TIMEOUT) ───────────────────► TimedOut
//! ```
//!
//! Whichever side finishes first decides the outcome; the loser is dropped.

use std::sync::Arc;

use async_trait::async_trait;
use shelf_core::{LookupOutcome, ProductId, LOOKUP_TIMEOUT};
use shelf_db::ProductRepository;
use tracing::{debug, info, warn};

use crate::error::LookupError;

/// A service that maps a barcode to a product id.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// `Ok(None)` means the catalog has no live product with this barcode.
    async fn find_product_by_barcode(&self, barcode: &str) -> Result<Option<ProductId>, LookupError>;
}

/// The SQLite catalog as a lookup service.
#[async_trait]
impl ProductLookup for ProductRepository {
    async fn find_product_by_barcode(&self, barcode: &str) -> Result<Option<ProductId>, LookupError> {
        Ok(self.find_published_id_by_barcode(barcode).await?)
    }
}

/// Runs one lookup at a time under a deadline.
#[derive(Clone)]
pub struct LookupCoordinator {
    service: Arc<dyn ProductLookup>,
}

impl LookupCoordinator {
    pub fn new(service: Arc<dyn ProductLookup>) -> Self {
        Self { service }
    }

    pub async fn resolve(&self, barcode: &str) -> LookupOutcome {
        debug!(barcode = %barcode, "Looking up product");

        match tokio::time::timeout(LOOKUP_TIMEOUT, self.service.find_product_by_barcode(barcode)).await {
            Ok(Ok(Some(product_id))) => {
                info!(barcode = %barcode, product_id = %product_id, "Product resolved");
                LookupOutcome::Resolved(product_id)
            }
            Ok(Ok(None)) => {
                info!(barcode = %barcode, "No product for barcode");
                LookupOutcome::NotFound
            }
            Ok(Err(e)) => {
                warn!(barcode = %barcode, error = %e, "Product lookup failed");
                LookupOutcome::Failed(e.to_string())
            }
            Err(_) => {
                warn!(
                    barcode = %barcode,
                    timeout_ms = LOOKUP_TIMEOUT.as_millis() as u64,
                    "Product lookup timed out"
                );
                LookupOutcome::TimedOut
            }
        }
    }
}
