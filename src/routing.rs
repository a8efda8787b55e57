//! Deterministic owner routing.
//!
//! A routing key is hashed with a djb2/XOR recurrence over its UTF-16 code
//! units using 32-bit wrapping arithmetic, and the hash picks one entry of
//! the candidate list. The recurrence must stay bit-for-bit identical so
//! that other implementations of the same router assign the same owners.

use crate::error::{PipeRunApiError, PipeRunResult};
use serde::Serialize;

/// The owner picked for a routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    pub owner_id: i64,
    pub index: usize,
}

/// djb2 variant: `h = (h * 33) ^ unit`, starting at 5381, read back as unsigned 32-bit.
pub fn stable_hash(key: &str) -> u32 {
    let mut h: i32 = 5381;
    for unit in key.encode_utf16() {
        h = h.wrapping_mul(33) ^ i32::from(unit);
    }
    h as u32
}

/// Map `key` onto one of `candidates`.
///
/// # Errors
///
/// Returns `PipeRunApiError::InvalidParams` if the key is blank or there are no candidates.
pub fn route(key: &str, candidates: &[i64]) -> PipeRunResult<RouteDecision> {
    if key.trim().is_empty() {
        return Err(PipeRunApiError::invalid("'key' (string) is required"));
    }
    if candidates.is_empty() {
        return Err(PipeRunApiError::invalid(
            "'candidates_owner_ids' must contain at least one owner id",
        ));
    }

    let index = stable_hash(key) as usize % candidates.len();
    Ok(RouteDecision {
        owner_id: candidates[index],
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_known_values() {
        assert_eq!(stable_hash(""), 5381);
        // 5381 * 33 ^ 'a'(97) = 177573 ^ 97
        assert_eq!(stable_hash("a"), 177573 ^ 97);
        assert_eq!(stable_hash("ab"), ((177573u32 ^ 97) * 33) ^ 98);
    }

    #[test]
    fn test_hash_wraps_like_32_bit_integers() {
        // Reference values from the JavaScript router this one must agree with.
        assert_eq!(
            stable_hash("lead-routing-key-that-is-long-enough-to-overflow@example.com"),
            462538469
        );
        assert_eq!(stable_hash("maria@acme.com"), 2515406422);
        assert_eq!(stable_hash("\u{1F600}"), 5308056);
    }

    #[test]
    fn test_route_matches_reference_owner() {
        let decision = route("maria@acme.com", &[11, 22, 33]).unwrap();
        assert_eq!(decision, RouteDecision { owner_id: 22, index: 1 });
    }

    #[test]
    fn test_hash_uses_utf16_units() {
        // A character outside the BMP contributes two code units.
        let mut h: i32 = 5381;
        for unit in [0xD83Du16, 0xDE00] {
            h = h.wrapping_mul(33) ^ i32::from(unit);
        }
        assert_eq!(stable_hash("\u{1F600}"), h as u32);
    }

    #[test]
    fn test_route_is_deterministic() {
        let candidates = [11, 22, 33];
        let first = route("maria@acme.com", &candidates).unwrap();
        for _ in 0..10 {
            assert_eq!(route("maria@acme.com", &candidates).unwrap(), first);
        }
    }

    #[test]
    fn test_route_stays_in_range() {
        let candidates = [11, 22, 33, 44, 55];
        for i in 0..200 {
            let key = format!("lead-{}", i);
            let decision = route(&key, &candidates).unwrap();
            assert!(decision.index < candidates.len());
            assert_eq!(candidates[decision.index], decision.owner_id);
        }
    }

    #[test]
    fn test_singleton_list_always_wins() {
        for key in ["a", "b", "maria@acme.com", "+5511987654321"] {
            let decision = route(key, &[7]).unwrap();
            assert_eq!(decision, RouteDecision { owner_id: 7, index: 0 });
        }
    }

    #[test]
    fn test_route_index_follows_hash() {
        let candidates = [11, 22, 33];
        let decision = route("a", &candidates).unwrap();
        let expected = (stable_hash("a") as usize) % 3;
        assert_eq!(decision.index, expected);
        assert_eq!(decision.owner_id, candidates[expected]);
    }

    #[test]
    fn test_route_rejects_bad_input() {
        assert!(matches!(
            route("", &[1, 2]),
            Err(PipeRunApiError::InvalidParams(_))
        ));
        assert!(matches!(
            route("   ", &[1, 2]),
            Err(PipeRunApiError::InvalidParams(_))
        ));
        assert!(matches!(
            route("key", &[]),
            Err(PipeRunApiError::InvalidParams(_))
        ));
    }
}
