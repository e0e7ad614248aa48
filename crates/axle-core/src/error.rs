//! # Error Types
//!
//! Domain-specific error types for axle-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  axle-core errors (this file)                                          │
//! │  └── CoreError        - invalid input (format, discount)               │
//! │                                                                         │
//! │  axle-db errors (separate crate)                                       │
//! │  ├── DbError          - database operation failures                    │
//! │  └── ReconcileError   - the full reconciliation taxonomy:              │
//! │                         InvalidFormat | InvalidDiscount | NotFound     │
//! │                         | Immutable | Store                            │
//! │                                                                         │
//! │  Flow: CoreError ──► ReconcileError ──► request layer                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, offending value)
//! 3. Errors are enum variants, never String
//! 4. Every rejected path maps to a distinct, machine-checkable kind

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Input errors detected by the pure core.
///
/// These are always raised before any store access happens: a request that
/// fails here never caused a write.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A field does not match its required format.
    ///
    /// ## When This Occurs
    /// - The material encoding deviates from the `id:qty,id:qty` grammar
    /// - A due date is not `YYYY-MM-DD`
    #[error("invalid {field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: String,
    },

    /// The discount fields violate pairing or range rules.
    ///
    /// ## When This Occurs
    /// - A discount value without a kind, or a kind without a value
    /// - A percentage discount outside 0..=100%
    /// - A negative flat discount
    #[error("invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    /// A numeric input is outside its allowed range.
    ///
    /// ## When This Occurs
    /// - A line quantity above `MAX_LINE_QUANTITY`
    /// - More materials requested than `MAX_INVOICE_LINES`
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidFormat {
            field: "materials",
            reason: "expected id:qty pairs, got segment \"3:x\"".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid materials: expected id:qty pairs, got segment \"3:x\""
        );

        let err = CoreError::InvalidDiscount {
            reason: "discount value and discount kind must be provided together".into(),
        };
        assert!(err.to_string().starts_with("invalid discount:"));
    }
}
