//! # Validation Module
//!
//! Input validation rules for invoice and draft requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Reconciler entry (Rust)                                      │
//! │  ├── THIS MODULE: format and range rules, fail-fast                    │
//! │  └── Nothing is written until every rule has passed                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: either layer alone would catch the error            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Discount pairing/range validation lives next to the type it produces, in
//! [`crate::amount::validate_discount`].

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};
use crate::types::MaterialRequest;
use crate::{
    MAX_INVOICE_LINES, MAX_LINE_QUANTITY, MAX_SERVICE_CHARGE_CENTS, MAX_UNIT_PRICE_CENTS,
};

// =============================================================================
// Date Validators
// =============================================================================

/// Validates and parses a due date.
///
/// ## Rules
/// - Exactly `YYYY-MM-DD`, and a real calendar date
///
/// ## Example
/// ```rust
/// use axle_core::validation::validate_due_date;
///
/// assert!(validate_due_date("2026-08-31").is_ok());
/// assert!(validate_due_date("31-08-2026").is_err());
/// assert!(validate_due_date("2026-02-30").is_err());
/// ```
pub fn validate_due_date(raw: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| CoreError::InvalidFormat {
        field: "due_date",
        reason: format!("expected YYYY-MM-DD, got {raw:?}"),
    })
}

// =============================================================================
// Material List Validators
// =============================================================================

/// Validates a parsed material list against business limits.
///
/// ## Rules
/// - At most [`MAX_INVOICE_LINES`] materials per request
/// - No quantity above [`MAX_LINE_QUANTITY`]
/// - No material id requested twice (the store holds at most one line per
///   material, so a duplicated id would make the diff unspecified)
pub fn validate_material_list(requests: &[MaterialRequest]) -> CoreResult<()> {
    if requests.len() > MAX_INVOICE_LINES {
        return Err(CoreError::OutOfRange {
            field: "materials",
            min: 0,
            max: MAX_INVOICE_LINES as i64,
        });
    }

    for request in requests {
        if request.quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::OutOfRange {
                field: "quantity",
                min: 0,
                max: MAX_LINE_QUANTITY,
            });
        }
    }

    let mut ids: Vec<i64> = requests.iter().map(|r| r.material_id).collect();
    ids.sort_unstable();
    let before = ids.len();
    ids.dedup();
    if ids.len() != before {
        return Err(CoreError::InvalidFormat {
            field: "materials",
            reason: "material ids must not repeat within one request".into(),
        });
    }

    Ok(())
}

// =============================================================================
// Fee Validators
// =============================================================================

/// Validates a service charge in cents.
///
/// ## Rules
/// - Must be non-negative (zero is allowed: waived charge)
/// - Capped at [`MAX_SERVICE_CHARGE_CENTS`] (overflow headroom)
pub fn validate_service_charge(cents: i64) -> CoreResult<()> {
    if !(0..=MAX_SERVICE_CHARGE_CENTS).contains(&cents) {
        return Err(CoreError::OutOfRange {
            field: "service_charge",
            min: 0,
            max: MAX_SERVICE_CHARGE_CENTS,
        });
    }

    Ok(())
}

/// Validates a catalog unit price in cents.
///
/// ## Rules
/// - Non-negative and capped at [`MAX_UNIT_PRICE_CENTS`]: bounded prices
///   keep every line total, and therefore every invoice amount, far away
///   from `i64` overflow at the quantity and line-count limits
pub fn validate_unit_price(cents: i64) -> CoreResult<()> {
    if !(0..=MAX_UNIT_PRICE_CENTS).contains(&cents) {
        return Err(CoreError::OutOfRange {
            field: "unit_price",
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a VAT rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_vat_bps(bps: u32) -> CoreResult<()> {
    if bps > 10_000 {
        return Err(CoreError::OutOfRange {
            field: "vat",
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn req(material_id: i64, quantity: i64) -> MaterialRequest {
        MaterialRequest {
            material_id,
            quantity,
        }
    }

    #[test]
    fn test_validate_due_date() {
        assert_eq!(
            validate_due_date("2026-08-31").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()
        );

        assert!(validate_due_date("").is_err());
        assert!(validate_due_date("2026/08/31").is_err());
        assert!(validate_due_date("08-31-2026").is_err());
        assert!(validate_due_date("2026-13-01").is_err());
        assert!(validate_due_date("2026-02-30").is_err());
        assert!(validate_due_date("tomorrow").is_err());
    }

    #[test]
    fn test_validate_material_list_limits() {
        assert!(validate_material_list(&[req(1, 0), req(2, MAX_LINE_QUANTITY)]).is_ok());
        assert!(validate_material_list(&[req(1, MAX_LINE_QUANTITY + 1)]).is_err());

        let too_many: Vec<MaterialRequest> = (1..=(MAX_INVOICE_LINES as i64 + 1))
            .map(|id| req(id, 1))
            .collect();
        assert!(validate_material_list(&too_many).is_err());
    }

    #[test]
    fn test_validate_material_list_rejects_duplicates() {
        assert!(validate_material_list(&[req(3, 1), req(3, 2)]).is_err());
        assert!(validate_material_list(&[req(3, 1), req(4, 2)]).is_ok());
    }

    #[test]
    fn test_fee_validators() {
        assert!(validate_service_charge(0).is_ok());
        assert!(validate_service_charge(10_000).is_ok());
        assert!(validate_service_charge(-1).is_err());
        assert!(validate_service_charge(MAX_SERVICE_CHARGE_CENTS).is_ok());
        assert!(validate_service_charge(MAX_SERVICE_CHARGE_CENTS + 1).is_err());

        assert!(validate_vat_bps(0).is_ok());
        assert!(validate_vat_bps(10_000).is_ok());
        assert!(validate_vat_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_unit_price_bounds() {
        assert!(validate_unit_price(0).is_ok());
        assert!(validate_unit_price(MAX_UNIT_PRICE_CENTS).is_ok());
        assert!(validate_unit_price(-1).is_err());
        assert!(validate_unit_price(MAX_UNIT_PRICE_CENTS + 1).is_err());

        // The bound exists for overflow headroom: even a maximal invoice
        // stays far inside i64.
        let worst = MAX_UNIT_PRICE_CENTS
            .checked_mul(MAX_LINE_QUANTITY)
            .and_then(|line| line.checked_mul(MAX_INVOICE_LINES as i64));
        assert!(worst.is_some());
    }
}
