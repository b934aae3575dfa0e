//! # shelf-db: Product Catalog for Shelf Scanner
//!
//! SQLite storage for the catalog that scans resolve against.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          shelf-db                                       │
//! │                                                                         │
//! │  ┌──────────────┐     ┌───────────────────┐     ┌──────────────────┐   │
//! │  │  Database    │────►│ ProductRepository │────►│  products table  │   │
//! │  │  (pool.rs)   │     │ barcode → id      │     │  (SQLite, WAL)   │   │
//! │  └──────────────┘     └───────────────────┘     └──────────────────┘   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  migrations.rs: embedded `migrations/sqlite/*.sql`                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./shelf.db")).await?;
//! let id = db.products().find_published_id_by_barcode("4005808521175").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::product::ProductRepository;
