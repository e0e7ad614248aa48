//! # axle-db: Storage and Reconciliation for Axle
//!
//! This crate provides database access and the invoice reconciliation engine
//! for the Axle workshop invoicing system. It uses SQLite for local storage
//! with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Axle Data Flow                                  │
//! │                                                                         │
//! │  Caller (API handler, CLI, test)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     axle-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ Reconciler +  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ Repositories  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ InvoiceRepo   │    │ 001_initial  │  │   │
//! │  │   │ Connection    │    │ MaterialRepo  │    │ _schema.sql  │  │   │
//! │  │   │ Management    │    │ ReferenceRepo │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                          ▲                                     │
//! │       ▼                          │ pure: codec, diff, amount           │
//! │  SQLite Database            axle-core                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Row-level repositories (invoice, material, reference)
//! - [`reconcile`] - The transactional create/update/delete entry points
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axle_db::{Database, DbConfig, DocumentKind};
//!
//! let db = Database::new(DbConfig::new("path/to/axle.db")).await?;
//!
//! let created = db
//!     .reconciler()
//!     .create(DocumentKind::Invoice, &request)
//!     .await?;
//! println!("invoice {} total {}", created.header.invoice_no, created.header.amount());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod reconcile;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use reconcile::{Created, DraftCleanup, InvoiceReconciler, ReconcileError, ReconcileResult};

// Repository re-exports for convenience
pub use repository::invoice::InvoiceRepository;
pub use repository::material::MaterialRepository;
pub use repository::reference::ReferenceRepository;

// The domain vocabulary callers need alongside the handles
pub use axle_core::{CreateRequest, DocumentKind, UpdateRequest};
