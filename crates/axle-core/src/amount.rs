//! # Amount Pipeline
//!
//! Computes the derived invoice total from service charge, material lines,
//! discount and VAT.
//!
//! ## Fixed Evaluation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      The Fee Pipeline                                   │
//! │                                                                         │
//! │   0.00                                                                  │
//! │     │  1. + service charge            (0 when absent)                   │
//! │     ▼                                                                   │
//! │   running total                                                         │
//! │     │  2. + Σ unit_price × quantity   (post-reconciliation line set)    │
//! │     ▼                                                                   │
//! │   running total                                                         │
//! │     │  3. − discount                  (AMOUNT: flat cents;              │
//! │     │                                  PERCENTAGE: of the RUNNING       │
//! │     ▼                                  total, not a subtotal)           │
//! │   running total                                                         │
//! │     │  4. + VAT % of the running total (compounds on the DISCOUNTED     │
//! │     ▼                                  total)                           │
//! │   final amount                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Changing this order changes the financial result, so the computation is a
//! fold over an explicit ordered list of fee operations rather than call-site
//! accumulation. The order lives in exactly one place ([`pipeline`]) and is
//! pinned by a regression test.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate, FULL_RATE_BPS};
use crate::types::DiscountKind;

// =============================================================================
// Discount
// =============================================================================

/// A validated discount: flat cents or a percentage of the running total.
///
/// Constructed through [`validate_discount`] from the raw `(value, kind)`
/// request pair, so an unpaired or out-of-range discount cannot reach the
/// pipeline at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Discount {
    /// Flat deduction.
    Amount(Money),
    /// Percentage of the running total after materials and service charge.
    Percentage(Rate),
}

/// Builds a [`Discount`] from the raw request fields.
///
/// ## Rules
/// - `value` and `kind` are both-or-neither: one without the other fails
/// - percentage discounts must be within `0..=100%` (0..=10000 bps)
/// - `(None, None)` is a valid "no discount"
///
/// ## Errors
/// `CoreError::InvalidDiscount`, always before any computation or store
/// access.
pub fn validate_discount(
    value: Option<i64>,
    kind: Option<DiscountKind>,
) -> CoreResult<Option<Discount>> {
    match (value, kind) {
        (None, None) => Ok(None),
        (Some(_), None) | (None, Some(_)) => Err(CoreError::InvalidDiscount {
            reason: "discount value and discount kind must be provided together".into(),
        }),
        (Some(v), Some(DiscountKind::Amount)) => {
            if v < 0 {
                return Err(CoreError::InvalidDiscount {
                    reason: format!("amount discount must not be negative, got {v}"),
                });
            }
            Ok(Some(Discount::Amount(Money::from_cents(v))))
        }
        (Some(v), Some(DiscountKind::Percentage)) => {
            if v < 0 || v > FULL_RATE_BPS as i64 {
                return Err(CoreError::InvalidDiscount {
                    reason: format!(
                        "percentage discount must be between 0 and {FULL_RATE_BPS} bps, got {v}"
                    ),
                });
            }
            Ok(Some(Discount::Percentage(Rate::from_bps(v as u32))))
        }
    }
}

// =============================================================================
// Amount Inputs
// =============================================================================

/// Everything the pipeline consumes.
///
/// `line_totals_cents` is the sum over the POST-reconciliation line set
/// (`to_add ∪ to_modify ∪ to_keep` with their requested quantities), never
/// the pre-edit snapshot. The reconciler computes it from the diff it is
/// about to commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountInputs {
    pub service_charge: Option<Money>,
    /// Σ unit_price × quantity over the post-reconciliation lines.
    pub line_totals: Money,
    pub discount: Option<Discount>,
    pub vat: Option<Rate>,
}

// =============================================================================
// Pipeline
// =============================================================================

/// One step of the fee pipeline.
#[derive(Debug, Clone, Copy)]
enum FeeOp {
    ServiceCharge(Money),
    Materials(Money),
    Discount(Discount),
    Vat(Rate),
}

impl FeeOp {
    /// Applies this operation to the running total.
    fn apply(self, total: Money) -> Money {
        match self {
            FeeOp::ServiceCharge(charge) => total + charge,
            FeeOp::Materials(sum) => total + sum,
            FeeOp::Discount(Discount::Amount(amount)) => total - amount,
            FeeOp::Discount(Discount::Percentage(rate)) => total.sub_percentage(rate),
            FeeOp::Vat(rate) => total.add_percentage(rate),
        }
    }
}

/// The one place that knows the fee order. Absent fees simply do not appear.
fn pipeline(inputs: &AmountInputs) -> Vec<FeeOp> {
    let mut ops = Vec::with_capacity(4);
    ops.push(FeeOp::ServiceCharge(
        inputs.service_charge.unwrap_or_else(Money::zero),
    ));
    ops.push(FeeOp::Materials(inputs.line_totals));
    if let Some(discount) = inputs.discount {
        ops.push(FeeOp::Discount(discount));
    }
    if let Some(vat) = inputs.vat {
        ops.push(FeeOp::Vat(vat));
    }
    ops
}

/// Computes the final invoice amount.
///
/// Deterministic fold over the ordered pipeline; no rounding beyond the
/// single half-up rounding inside each percentage step.
///
/// ## Example
/// ```rust
/// use axle_core::amount::{compute, AmountInputs, Discount};
/// use axle_core::money::{Money, Rate};
///
/// // 100.00 charge + 100.00 materials, 10% discount, 5% VAT = 189.00
/// let inputs = AmountInputs {
///     service_charge: Some(Money::from_cents(10_000)),
///     line_totals: Money::from_cents(10_000),
///     discount: Some(Discount::Percentage(Rate::from_bps(1_000))),
///     vat: Some(Rate::from_bps(500)),
/// };
/// assert_eq!(compute(&inputs).cents(), 18_900);
/// ```
pub fn compute(inputs: &AmountInputs) -> Money {
    pipeline(inputs)
        .into_iter()
        .fold(Money::zero(), |total, op| op.apply(total))
}

/// Sums `unit_price × quantity` over priced lines.
///
/// Helper for building [`AmountInputs::line_totals`] from whatever line
/// representation the caller holds.
pub fn sum_line_totals<I>(lines: I) -> Money
where
    I: IntoIterator<Item = (Money, i64)>,
{
    lines
        .into_iter()
        .fold(Money::zero(), |sum, (unit_price, quantity)| {
            sum + unit_price.multiply_quantity(quantity)
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_a() {
        // serviceCharge=100, one material 50 × 2, discount=10%, vat=5%
        // (100+100)=200 → −10% = 180 → +5% VAT = 189
        let inputs = AmountInputs {
            service_charge: Some(Money::from_cents(10_000)),
            line_totals: sum_line_totals([(Money::from_cents(5_000), 2)]),
            discount: Some(Discount::Percentage(Rate::from_bps(1_000))),
            vat: Some(Rate::from_bps(500)),
        };
        assert_eq!(compute(&inputs).cents(), 18_900);
    }

    #[test]
    fn test_all_fees_absent_is_zero() {
        assert_eq!(compute(&AmountInputs::default()).cents(), 0);
    }

    #[test]
    fn test_amount_discount_is_flat() {
        let inputs = AmountInputs {
            service_charge: None,
            line_totals: Money::from_cents(10_000),
            discount: Some(Discount::Amount(Money::from_cents(2_500))),
            vat: None,
        };
        assert_eq!(compute(&inputs).cents(), 7_500);
    }

    #[test]
    fn test_vat_compounds_on_discounted_total() {
        // 100.00 − 25.00 = 75.00, then 10% VAT on 75.00 = 82.50,
        // NOT 100.00 × 1.10 − 25.00 = 85.00.
        let inputs = AmountInputs {
            service_charge: None,
            line_totals: Money::from_cents(10_000),
            discount: Some(Discount::Amount(Money::from_cents(2_500))),
            vat: Some(Rate::from_bps(1_000)),
        };
        assert_eq!(compute(&inputs).cents(), 8_250);
    }

    /// Regression pin on the documented order: discount BEFORE VAT.
    /// Swapping the two steps must change the result whenever both are
    /// present and nonzero - with an AMOUNT discount the difference is the
    /// VAT on the discount itself.
    #[test]
    fn test_fee_order_is_discount_then_vat() {
        let charge = Money::from_cents(10_000);
        let discount = Money::from_cents(2_000);
        let vat = Rate::from_bps(500);

        let inputs = AmountInputs {
            service_charge: Some(charge),
            line_totals: Money::zero(),
            discount: Some(Discount::Amount(discount)),
            vat: Some(vat),
        };
        let documented = compute(&inputs);
        // (100.00 − 20.00) + 5% = 84.00
        assert_eq!(documented.cents(), 8_400);

        // The swapped order: VAT first, then the discount.
        let swapped = charge.add_percentage(vat) - discount;
        // 100.00 + 5% − 20.00 = 85.00
        assert_eq!(swapped.cents(), 8_500);
        assert_ne!(documented, swapped);
    }

    #[test]
    fn test_percentage_discount_taken_on_running_total() {
        // Percentage applies after BOTH service charge and materials.
        let inputs = AmountInputs {
            service_charge: Some(Money::from_cents(5_000)),
            line_totals: Money::from_cents(5_000),
            discount: Some(Discount::Percentage(Rate::from_bps(5_000))), // 50%
            vat: None,
        };
        assert_eq!(compute(&inputs).cents(), 5_000);
    }

    #[test]
    fn test_validate_discount_pairing() {
        assert_eq!(validate_discount(None, None).unwrap(), None);
        assert!(validate_discount(Some(100), None).is_err());
        assert!(validate_discount(None, Some(DiscountKind::Amount)).is_err());

        let d = validate_discount(Some(2_500), Some(DiscountKind::Amount))
            .unwrap()
            .unwrap();
        assert_eq!(d, Discount::Amount(Money::from_cents(2_500)));
    }

    #[test]
    fn test_validate_discount_percentage_range() {
        // Scenario C: discount_type=PERCENTAGE, discount=150% → rejected.
        let err = validate_discount(Some(15_000), Some(DiscountKind::Percentage));
        assert!(matches!(
            err,
            Err(CoreError::InvalidDiscount { .. })
        ));

        assert!(validate_discount(Some(-1), Some(DiscountKind::Percentage)).is_err());
        assert!(validate_discount(Some(0), Some(DiscountKind::Percentage)).is_ok());
        assert!(validate_discount(Some(10_000), Some(DiscountKind::Percentage)).is_ok());
    }

    #[test]
    fn test_negative_amount_discount_rejected() {
        assert!(validate_discount(Some(-500), Some(DiscountKind::Amount)).is_err());
    }

    #[test]
    fn test_sum_line_totals() {
        let sum = sum_line_totals([
            (Money::from_cents(5_000), 2),
            (Money::from_cents(1_000), 0),
            (Money::from_cents(250), 4),
        ]);
        assert_eq!(sum.cents(), 11_000);
    }
}
