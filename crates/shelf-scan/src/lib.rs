//! # shelf-scan: Scan Engine for Shelf Scanner
//!
//! Turns a live camera feed into a product page. One [`ScanController`] runs
//! per open scan dialog and owns the camera, the decode loop, the catalog
//! lookup and the timers for as long as the dialog is open.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Scan Engine Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 ScanController (one per dialog)                  │  │
//! │  │                                                                  │  │
//! │  │  Spawned as a Tokio task by ScanController::open                 │  │
//! │  │  Sole owner of the ScanSession state machine                     │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ DeviceNegot.   │  │  DecodeLoop    │  │  LookupCoordinator     │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Enumerates     │  │ Frames →       │  │ ProductLookup raced    │    │
//! │  │ cameras, picks │  │ candidates,    │  │ against a 10 s         │    │
//! │  │ the rear one   │  │ NoSymbol muted │  │ deadline               │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      LifecycleManager                           │   │
//! │  │                                                                 │   │
//! │  │ Holds the CameraLease and background tasks                      │   │
//! │  │ Releases the camera on every terminal state and on exit         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  STATE UPDATES (to the dialog):                                        │
//! │  • ScanHandle::subscribe - watch channel of ScanSnapshot               │
//! │  • ScanEventEmitter - push callback per published snapshot             │
//! │  • Navigator - product page or search page on exit                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`camera`] - Platform camera seam (`CameraCapture`)
//! - [`config`] - Scanner configuration (catalog path, logging)
//! - [`controller`] - `ScanController` actor and its `ScanHandle`
//! - [`decode_loop`] - Decode stream pump
//! - [`error`] - Engine, camera and lookup errors
//! - [`events`] - Commands and engine events
//! - [`lifecycle`] - Camera lease and task ownership
//! - [`lookup`] - Bounded product lookup
//! - [`navigation`] - Exit routes
//! - [`negotiator`] - Camera selection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelf_scan::{ScanController, ScanDeps, VideoSink};
//!
//! let deps = ScanDeps::new(camera, Arc::new(db.products()), navigator);
//! let handle = ScanController::open(deps, VideoSink::new("scanner-preview"));
//!
//! let mut states = handle.subscribe();
//! while states.changed().await.is_ok() {
//!     println!("{}", states.borrow().description);
//! }
//! let exit = handle.join().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod camera;
pub mod config;
pub mod controller;
pub mod decode_loop;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod lookup;
pub mod navigation;
pub mod negotiator;

// =============================================================================
// Re-exports
// =============================================================================

pub use camera::{CameraCapture, DecodeStream, VideoSink};
pub use config::{CatalogSettings, DecoderSettings, LoggingSettings, ShelfConfig};
pub use controller::{NoOpEmitter, ScanController, ScanDeps, ScanEventEmitter, ScanHandle};
pub use error::{CameraError, EngineError, EngineResult, LookupError};
pub use events::{EngineEvent, ScanCommand};
pub use lifecycle::{CameraLease, LifecycleManager, TaskGuard};
pub use lookup::{LookupCoordinator, ProductLookup};
pub use navigation::{NavigationTarget, Navigator};
pub use negotiator::DeviceNegotiator;
