//! # till-store: JSON Store Layer for Till
//!
//! This crate reads and writes the three stores the engine works against.
//! Each is a single pretty-printed JSON file, loaded whole, changed in
//! memory with till-core, and written back whole.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till Data Flow                                   │
//! │                                                                         │
//! │  Register::commit / ReturnsDesk::finalize (terminal app)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   till-store (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │  Repositories │    │  WriteBatch  │  │   │
//! │  │   │  (store.rs)   │    │               │    │  (batch.rs)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ StoreConfig   │◄───│ SaleRepo      │───►│ temp+rename  │  │   │
//! │  │   │ file paths    │    │ ReturnRepo    │    │ + rollback   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                               │                                 │   │
//! │  │                        codec.rs (validate on load)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  products.json • sales.json • returns.json                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Data directory configuration and the `Store` handle
//! - [`repository`] - Inventory Store, Sales Ledger and Returns Ledger
//! - [`batch`] - All-or-nothing replacement of several files
//! - [`codec`] - Record DTOs and load-time validation
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_store::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("./data"))?;
//! let checkout = cart.checkout()?;
//! let sale = store.sales().commit(&checkout, now)?;
//! cart.complete_commit(sale.id);
//! ```
//!
//! Single writer: two processes sharing a data directory will lose updates.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod batch;
pub mod codec;
pub mod error;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use batch::WriteBatch;
pub use error::{StoreError, StoreResult};
pub use store::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::returns::ReturnRepository;
pub use repository::sale::SaleRepository;
