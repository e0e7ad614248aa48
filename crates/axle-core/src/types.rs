//! # Domain Types
//!
//! Core domain types used throughout the Axle invoicing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Material     │   │  InvoiceHeader  │   │   InvoiceLine   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64 ≥ 1)   │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  invoice_no     │   │  invoice_id(FK) │       │
//! │  │  unit_price     │   │  kind           │   │  material_id    │       │
//! │  │                 │   │  amount_cents   │   │  unit_price     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ MaterialRequest │   │  DocumentKind   │   │  DiscountKind   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  material_id    │   │  Draft          │   │  Amount         │       │
//! │  │  quantity       │   │  Invoice        │   │  Percentage     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! - Catalog materials and reference entities (customers, vehicles, job
//!   types) carry integer ids: the wire encoding `id:qty` speaks integers.
//! - Invoices and their lines carry UUID v4 ids: created locally, never
//!   coordinated, and safe to generate inside a transaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Material Key
// =============================================================================

/// The join key shared by the requested and the persisted side of a diff.
///
/// Both `MaterialRequest` and `InvoiceLine` identify a catalog material; the
/// differ and the persistence layer match rows through this one trait, so a
/// renamed field on either side cannot silently desynchronize them.
pub trait MaterialKey {
    /// The catalog material this record points at.
    fn material_id(&self) -> i64;
}

// =============================================================================
// Catalog Material
// =============================================================================

/// A priceable part or consumable from the workshop catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Material {
    /// Catalog identifier (positive integer, referenced by the wire encoding).
    pub id: i64,

    /// Display name shown on the invoice.
    pub name: String,

    /// Current catalog price in cents. Snapshotted onto lines at add time.
    pub unit_price_cents: i64,

    /// Whether the material can still be added to new invoices (soft delete).
    pub is_active: bool,

    /// When the material was created.
    pub created_at: DateTime<Utc>,

    /// When the material was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Returns the current catalog price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Material Request
// =============================================================================

/// One `id:qty` pair from the wire encoding.
///
/// Exists only transiently during a single create/update call; it is the
/// requested side of the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRequest {
    /// Catalog material id (≥ 1, enforced by the codec).
    pub material_id: i64,

    /// Requested quantity (≥ 0; zero yields a line that prices to nothing).
    pub quantity: i64,
}

impl MaterialKey for MaterialRequest {
    #[inline]
    fn material_id(&self) -> i64 {
        self.material_id
    }
}

// =============================================================================
// Document Kind
// =============================================================================

/// Whether a header row is a final invoice or a draft.
///
/// Drafts share the invoice shape but are exempt from the paid-immutability
/// guard and from the required-reference checks on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Not yet finalized; every field optional, never locked.
    Draft,
    /// A real invoice; references required, locked once paid.
    Invoice,
}

// =============================================================================
// Discount Kind
// =============================================================================

/// How the header's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Flat deduction in cents.
    Amount,
    /// Percentage of the running total, in basis points (0..=10000).
    Percentage,
}

// =============================================================================
// Invoice Header
// =============================================================================

/// The invoice (or draft) header row.
///
/// ## Invariant
/// `amount_cents` is always the output of the amount pipeline over the
/// header's fee fields and the invoice's current line set. It is derived,
/// recomputed on every reconciliation, and never accepted from a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceHeader {
    pub id: String,
    /// Sequential human-facing number, assigned at creation.
    pub invoice_no: i64,
    pub kind: DocumentKind,
    /// Required for invoices; drafts may leave references unset.
    pub customer_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub job_type_id: Option<i64>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub service_charge_cents: Option<i64>,
    /// Cents when `discount_kind` is Amount, basis points when Percentage.
    pub discount_value: Option<i64>,
    pub discount_kind: Option<DiscountKind>,
    /// VAT rate in basis points.
    pub vat_bps: Option<u32>,
    /// Derived total. See the type-level invariant.
    pub amount_cents: i64,
    /// A paid invoice is immutable to material and amount edits.
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceHeader {
    /// Returns the derived total as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// True when material/amount edits must be rejected.
    ///
    /// Drafts never lock; only a paid final invoice does.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.kind == DocumentKind::Invoice && self.paid
    }
}

// =============================================================================
// Invoice Line
// =============================================================================

/// A priced, quantified link between an invoice/draft and a catalog material.
///
/// Uses the snapshot pattern: `unit_price_cents` is a point-in-time copy of
/// the catalog price taken when the line was created, and is never refreshed
/// on update. Only the quantity may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceLine {
    pub id: String,
    pub invoice_id: String,
    pub material_id: i64,
    pub quantity: i64,
    /// Catalog price in cents at the instant the line was added (frozen).
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl InvoiceLine {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

impl MaterialKey for InvoiceLine {
    #[inline]
    fn material_id(&self) -> i64 {
        self.material_id
    }
}

// =============================================================================
// Request DTOs
// =============================================================================

/// Input to the create entry point.
///
/// Carries the raw textual material encoding and the fee fields; amounts are
/// never supplied directly. For `kind = Invoice` the three references are
/// required; drafts may leave everything unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRequest {
    pub customer_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub job_type_id: Option<i64>,
    pub description: Option<String>,
    /// Due date in `YYYY-MM-DD`, validated before any store access.
    pub due_date: Option<String>,
    /// Compact `id:qty,id:qty` material encoding. Absent = no lines.
    pub materials: Option<String>,
    pub service_charge_cents: Option<i64>,
    /// Cents for Amount discounts, basis points for Percentage discounts.
    pub discount_value: Option<i64>,
    pub discount_kind: Option<DiscountKind>,
    pub vat_bps: Option<u32>,
    /// Draft to delete (best effort) once the invoice is created.
    pub draft_id: Option<String>,
}

/// Input to the update entry point.
///
/// Patch semantics: an absent fee field leaves the stored value untouched.
/// The material encoding is always present - it is the full requested line
/// set that the persisted lines are reconciled against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub job_type_id: Option<i64>,
    /// The complete requested material list, `id:qty,id:qty`.
    pub materials: String,
    pub service_charge_cents: Option<i64>,
    pub discount_value: Option<i64>,
    pub discount_kind: Option<DiscountKind>,
    pub vat_bps: Option<u32>,
    /// Marks an unpaid invoice as paid (locking it for future edits).
    pub paid: Option<bool>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn header(kind: DocumentKind, paid: bool) -> InvoiceHeader {
        InvoiceHeader {
            id: "h1".into(),
            invoice_no: 1,
            kind,
            customer_id: None,
            vehicle_id: None,
            job_type_id: None,
            description: None,
            due_date: None,
            service_charge_cents: None,
            discount_value: None,
            discount_kind: None,
            vat_bps: None,
            amount_cents: 0,
            paid,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_locking_only_applies_to_paid_invoices() {
        assert!(header(DocumentKind::Invoice, true).is_locked());
        assert!(!header(DocumentKind::Invoice, false).is_locked());
        // Drafts are exempt even if a paid flag somehow ends up set
        assert!(!header(DocumentKind::Draft, true).is_locked());
    }

    #[test]
    fn test_line_total_uses_frozen_price() {
        let line = InvoiceLine {
            id: "l1".into(),
            invoice_id: "h1".into(),
            material_id: 3,
            quantity: 2,
            unit_price_cents: 5_000,
            created_at: Utc::now(),
        };
        assert_eq!(line.line_total().cents(), 10_000);
        assert_eq!(line.material_id(), 3);
    }
}
