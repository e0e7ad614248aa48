//! # Material List Codec
//!
//! Parses and renders the compact textual encoding of a requested material
//! list: `id:qty,id:qty,...`.
//!
//! ## Grammar
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list  := ""                      (empty list)                          │
//! │         | pair ("," pair)*                                              │
//! │  pair  := int ":" int             (material id ":" quantity)            │
//! │  int   := digit+                  (no sign, no whitespace)              │
//! │                                                                         │
//! │  Extra rules:                                                           │
//! │  • material id must be ≥ 1                                              │
//! │  • quantity may be 0 (a zero-quantity line prices to nothing)           │
//! │  • no leading/trailing separators, no embedded whitespace               │
//! │  • any deviation fails the WHOLE string - never a partial parse         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The strict whole-string validation means downstream stages (differ,
//! catalog lookups, amount pipeline) can assume well-formed integers and
//! never see half a request.
//!
//! ## Usage
//! ```rust
//! use axle_core::codec;
//!
//! let list = codec::parse("3:2,7:1").unwrap();
//! assert_eq!(list[0].material_id, 3);
//! assert_eq!(codec::render(&list), "3:2,7:1");
//!
//! assert!(codec::parse("1:2,,3:x").is_err());
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::MaterialRequest;

/// Field name reported in `InvalidFormat` errors from this module.
const FIELD: &str = "materials";

/// Parses the compact material encoding into a list of requests.
///
/// ## Errors
/// `CoreError::InvalidFormat` when the string does not fully match the
/// grammar. The error carries a reason naming the first offending segment.
///
/// ## Example
/// ```rust
/// use axle_core::codec::parse;
///
/// assert_eq!(parse("").unwrap(), vec![]);
/// assert_eq!(parse("5:0").unwrap().len(), 1);
/// assert!(parse("5:").is_err());
/// assert!(parse(" 5:1").is_err());
/// assert!(parse("5:1,").is_err());
/// ```
pub fn parse(text: &str) -> CoreResult<Vec<MaterialRequest>> {
    // Empty string is a legal empty list; everything else must match fully.
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut requests = Vec::new();

    // split keeps empty segments, so "1:2,,3:4" and trailing commas
    // surface here as empty pairs and fail.
    for segment in text.split(',') {
        let (id_part, qty_part) = segment.split_once(':').ok_or_else(|| invalid(segment))?;

        let material_id = parse_int(id_part).ok_or_else(|| invalid(segment))?;
        let quantity = parse_int(qty_part).ok_or_else(|| invalid(segment))?;

        if material_id < 1 {
            return Err(invalid(segment));
        }

        requests.push(MaterialRequest {
            material_id,
            quantity,
        });
    }

    Ok(requests)
}

/// Renders a material list back into the canonical wire encoding.
///
/// Canonical inverse of [`parse`]: for every valid encoding `s`,
/// `render(&parse(s)?) == s`.
pub fn render(requests: &[MaterialRequest]) -> String {
    let pairs: Vec<String> = requests
        .iter()
        .map(|r| format!("{}:{}", r.material_id, r.quantity))
        .collect();
    pairs.join(",")
}

/// Digits-only integer parse. Rejects empty strings, signs, whitespace and
/// leading `+`; `i64::from_str` would accept `+3`, the grammar does not.
fn parse_int(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok()
}

fn invalid(segment: &str) -> CoreError {
    CoreError::InvalidFormat {
        field: FIELD,
        reason: format!("expected id:qty pairs, got segment {segment:?}"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_is_empty_list() {
        assert_eq!(parse("").unwrap(), Vec::new());
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_single_pair() {
        let list = parse("3:2").unwrap();
        assert_eq!(
            list,
            vec![MaterialRequest {
                material_id: 3,
                quantity: 2
            }]
        );
    }

    #[test]
    fn test_multiple_pairs_preserve_order() {
        let list = parse("7:1,3:2,9:5").unwrap();
        let ids: Vec<i64> = list.iter().map(|r| r.material_id).collect();
        assert_eq!(ids, vec![7, 3, 9]);
    }

    #[test]
    fn test_zero_quantity_is_legal() {
        let list = parse("4:0").unwrap();
        assert_eq!(list[0].quantity, 0);
    }

    #[test]
    fn test_round_trip() {
        for s in ["", "1:1", "3:2,7:1", "10:0,2:999"] {
            let parsed = parse(s).unwrap();
            assert_eq!(render(&parsed), s, "round trip failed for {s:?}");
        }
    }

    #[test]
    fn test_rejects_malformed_strings() {
        let bad = [
            "1:2,,3:4",  // empty segment
            "1:2,3:x",   // non-numeric quantity
            "1:2,",      // trailing separator
            ",1:2",      // leading separator
            "1:",        // missing quantity
            ":2",        // missing id
            "1",         // no colon
            "1:2:3",     // extra colon
            " 1:2",      // leading whitespace
            "1:2 ",      // trailing whitespace
            "1 :2",      // embedded whitespace
            "-1:2",      // signed id
            "1:-2",      // signed quantity
            "+1:2",      // explicit plus
            "0:2",       // material id below 1
            "a:b",       // letters
        ];
        for s in bad {
            assert!(parse(s).is_err(), "expected rejection for {s:?}");
        }
    }

    #[test]
    fn test_scenario_e_encoding() {
        // The documented malformed example fails as a whole, nothing parses.
        assert!(parse("1:2,,3:x").is_err());
    }

    #[test]
    fn test_duplicate_ids_pass_the_codec() {
        // Uniqueness is not a grammar concern; the reconciler rejects
        // duplicates before touching the store.
        let list = parse("3:1,3:2").unwrap();
        assert_eq!(list.len(), 2);
    }
}
