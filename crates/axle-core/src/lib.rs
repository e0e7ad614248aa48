//! # axle-core: Pure Business Logic for Axle Invoicing
//!
//! This crate is the **heart** of the invoicing engine. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Axle Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Request Layer (external)                     │   │
//! │  │    create_invoice_or_draft, update_invoice_or_draft            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ axle-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   codec   │  │   diff    │  │  amount   │  │   money   │  │   │
//! │  │   │ "1:2,5:1" │  │ add/mod/  │  │ fee-op    │  │   Money   │  │   │
//! │  │   │  parsing  │  │ keep/rm   │  │ pipeline  │  │   Rate    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    axle-db (Database Layer)                     │   │
//! │  │        SQLite repositories + the invoice reconciler             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Material, InvoiceHeader, InvoiceLine, ...)
//! - [`money`] - Money and Rate types with integer arithmetic (no floats!)
//! - [`codec`] - The compact `id:qty,id:qty` material list encoding
//! - [`diff`] - Requested-vs-persisted line-item classification
//! - [`amount`] - The ordered fee pipeline producing the invoice amount
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64), rates in
//!    basis points (u32), so no floating point ever touches an amount
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use axle_core::codec;
//! use axle_core::money::{Money, Rate};
//!
//! // Parse the wire encoding of a material list
//! let requested = codec::parse("3:2,7:1").unwrap();
//! assert_eq!(requested.len(), 2);
//!
//! // Integer money, basis-point rates
//! let charge = Money::from_cents(10_000); // 100.00
//! let vat = Rate::from_bps(500);          // 5%
//! assert_eq!(charge.percent_of(vat).cents(), 500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amount;
pub mod codec;
pub mod diff;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use axle_core::Money` instead of
// `use axle_core::money::Money`

pub use amount::{AmountInputs, Discount};
pub use diff::LineDiff;
pub use error::{CoreError, CoreResult};
pub use money::{Money, Rate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of line items on a single invoice or draft.
///
/// ## Business Reason
/// Prevents runaway material lists from a malformed or hostile request.
pub const MAX_INVOICE_LINES: usize = 200;

/// Maximum quantity of a single material on a line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Maximum catalog unit price, in cents (1,000,000.00).
///
/// ## Business Reason
/// With prices, quantities and line counts bounded, the worst-case invoice
/// total stays around 2 × 10^14 cents - four orders of magnitude under
/// `i64::MAX`, so the integer amount arithmetic cannot overflow.
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;

/// Maximum service charge, in cents. Same overflow headroom reasoning as
/// [`MAX_UNIT_PRICE_CENTS`].
pub const MAX_SERVICE_CHARGE_CENTS: i64 = 100_000_000;
