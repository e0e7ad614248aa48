//! # Line-Item Differ
//!
//! Classifies a requested material list against the currently persisted
//! line-items into four disjoint buckets.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              requested (by material id)   persisted (by material id)    │
//! │                                                                         │
//! │   to_add      present                     absent                        │
//! │   to_modify   present, qty differs        present                       │
//! │   to_keep     present, qty equal          present                       │
//! │   to_remove   absent                      present                       │
//! │                                                                         │
//! │  Invariants:                                                            │
//! │  • every persisted line lands in exactly one of modify/keep/remove      │
//! │  • every requested material lands in exactly one of add/modify/keep     │
//! │  • order within each bucket matches input order (no re-sorting)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The join key on both sides is the catalog material id, taken through the
//! [`MaterialKey`] trait so the differ and the persistence lookups can never
//! disagree about what identifies a line. At most one persisted line per
//! material id is assumed; the store upholds that invariant.
//!
//! Pure function, no side effects: same inputs always produce the same
//! four sequences.

use serde::{Deserialize, Serialize};

use crate::types::{InvoiceLine, MaterialKey, MaterialRequest};

// =============================================================================
// Diff Result
// =============================================================================

/// A quantity change to apply to an existing persisted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChange {
    /// The persisted line's own id (the row to update).
    pub line_id: String,
    /// The material the line points at (diagnostics and invariant checks).
    pub material_id: i64,
    /// The requested quantity that replaces the stored one.
    pub new_quantity: i64,
}

/// The four disjoint buckets produced by [`diff`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineDiff {
    /// Requested materials with no persisted line yet.
    pub to_add: Vec<MaterialRequest>,
    /// Persisted lines whose requested quantity differs.
    pub to_modify: Vec<QuantityChange>,
    /// Persisted lines already matching the request.
    pub to_keep: Vec<InvoiceLine>,
    /// Persisted lines absent from the request entirely.
    pub to_remove: Vec<InvoiceLine>,
}

impl LineDiff {
    /// True when applying the diff would change nothing.
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_modify.is_empty() && self.to_remove.is_empty()
    }
}

// =============================================================================
// Diff
// =============================================================================

/// Classifies requested materials against persisted lines.
///
/// See the module docs for the bucket rules and invariants.
///
/// ## Example
/// ```rust
/// use axle_core::diff::diff;
/// use axle_core::types::MaterialRequest;
///
/// let requested = vec![MaterialRequest { material_id: 1, quantity: 3 }];
/// let d = diff(&requested, &[]);
/// assert_eq!(d.to_add.len(), 1);
/// assert!(d.to_modify.is_empty() && d.to_keep.is_empty() && d.to_remove.is_empty());
/// ```
pub fn diff(requested: &[MaterialRequest], persisted: &[InvoiceLine]) -> LineDiff {
    let mut result = LineDiff::default();

    // Requested side: add when no persisted line matches, modify when the
    // quantity changed. Matching-with-equal-quantity lands in to_keep below,
    // driven from the persisted side so to_keep carries the full line rows.
    for request in requested {
        match persisted
            .iter()
            .find(|line| line.material_id() == request.material_id())
        {
            None => result.to_add.push(*request),
            Some(line) if line.quantity != request.quantity => {
                result.to_modify.push(QuantityChange {
                    line_id: line.id.clone(),
                    material_id: line.material_id(),
                    new_quantity: request.quantity,
                });
            }
            Some(_) => {}
        }
    }

    // Persisted side: keep when the request matches exactly, remove when the
    // material no longer appears in the request at all.
    for line in persisted {
        match requested
            .iter()
            .find(|request| request.material_id() == line.material_id())
        {
            None => result.to_remove.push(line.clone()),
            Some(request) if request.quantity == line.quantity => {
                result.to_keep.push(line.clone());
            }
            Some(_) => {}
        }
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn req(material_id: i64, quantity: i64) -> MaterialRequest {
        MaterialRequest {
            material_id,
            quantity,
        }
    }

    fn line(id: &str, material_id: i64, quantity: i64) -> InvoiceLine {
        InvoiceLine {
            id: id.into(),
            invoice_id: "inv".into(),
            material_id,
            quantity,
            unit_price_cents: 1_000,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_all_new_materials_are_adds() {
        let d = diff(&[req(1, 2), req(2, 1)], &[]);
        assert_eq!(d.to_add.len(), 2);
        assert!(d.to_modify.is_empty());
        assert!(d.to_keep.is_empty());
        assert!(d.to_remove.is_empty());
    }

    #[test]
    fn test_scenario_b_modify_and_add() {
        // Persisted {M1:2}, requested {M1:3, M2:1}
        let persisted = vec![line("l1", 1, 2)];
        let d = diff(&[req(1, 3), req(2, 1)], &persisted);

        assert_eq!(d.to_modify.len(), 1);
        assert_eq!(d.to_modify[0].line_id, "l1");
        assert_eq!(d.to_modify[0].new_quantity, 3);
        assert_eq!(d.to_add, vec![req(2, 1)]);
        assert!(d.to_keep.is_empty());
        assert!(d.to_remove.is_empty());
    }

    #[test]
    fn test_identical_request_is_noop() {
        let persisted = vec![line("l1", 1, 2), line("l2", 5, 1)];
        let d = diff(&[req(1, 2), req(5, 1)], &persisted);

        assert!(d.is_noop());
        assert_eq!(d.to_keep.len(), 2);
    }

    #[test]
    fn test_absent_materials_are_removed() {
        let persisted = vec![line("l1", 1, 2), line("l2", 5, 1)];
        let d = diff(&[req(1, 2)], &persisted);

        assert_eq!(d.to_remove.len(), 1);
        assert_eq!(d.to_remove[0].id, "l2");
        assert_eq!(d.to_keep.len(), 1);
    }

    #[test]
    fn test_empty_request_removes_everything() {
        let persisted = vec![line("l1", 1, 2), line("l2", 5, 1)];
        let d = diff(&[], &persisted);

        assert_eq!(d.to_remove.len(), 2);
        assert!(d.to_add.is_empty());
        assert!(d.to_modify.is_empty());
        assert!(d.to_keep.is_empty());
    }

    #[test]
    fn test_buckets_partition_both_inputs_exactly() {
        let persisted = vec![line("l1", 1, 2), line("l2", 2, 4), line("l3", 3, 1)];
        let requested = vec![req(1, 2), req(2, 9), req(4, 1)];
        let d = diff(&requested, &persisted);

        // Every persisted line in exactly one of modify/keep/remove.
        let placed = d.to_modify.len() + d.to_keep.len() + d.to_remove.len();
        assert_eq!(placed, persisted.len());

        // Every requested material in exactly one of add/modify/keep.
        let placed = d.to_add.len() + d.to_modify.len() + d.to_keep.len();
        assert_eq!(placed, requested.len());

        // No material id appears in two buckets.
        let mut seen: Vec<i64> = Vec::new();
        seen.extend(d.to_add.iter().map(|r| r.material_id));
        seen.extend(d.to_modify.iter().map(|m| m.material_id));
        seen.extend(d.to_keep.iter().map(|l| l.material_id));
        seen.extend(d.to_remove.iter().map(|l| l.material_id));
        let mut deduped = seen.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(seen.len(), deduped.len());
    }

    #[test]
    fn test_order_matches_input_not_sorted() {
        let persisted = vec![line("l9", 9, 1), line("l2", 2, 1)];
        let d = diff(&[req(7, 1), req(3, 1)], &persisted);

        let add_ids: Vec<i64> = d.to_add.iter().map(|r| r.material_id).collect();
        assert_eq!(add_ids, vec![7, 3]);
        let remove_ids: Vec<i64> = d.to_remove.iter().map(|l| l.material_id).collect();
        assert_eq!(remove_ids, vec![9, 2]);
    }

    #[test]
    fn test_zero_quantity_for_absent_material_is_an_add() {
        // Documented decision: quantity 0 flows through like any quantity.
        let d = diff(&[req(4, 0)], &[]);
        assert_eq!(d.to_add, vec![req(4, 0)]);
    }

    #[test]
    fn test_determinism() {
        let persisted = vec![line("l1", 1, 2), line("l2", 2, 4)];
        let requested = vec![req(1, 3), req(9, 1)];
        let a = diff(&requested, &persisted);
        let b = diff(&requested, &persisted);
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }
}
