//! Deterministic string bucketing.
//!
//! The hash must stay bit-exact across implementations: clients in other
//! languages bucket the same user ids, and changing a single constant would
//! silently move users in or out of a rollout.

/// Hashes a string to a non-negative 32-bit integer.
///
/// Iterates UTF-16 code units; per unit the accumulator is updated as
/// `h = h * 31 - h + unit`, wrapping as a 32-bit signed integer after every
/// step. The result is the absolute value. The empty string hashes to 0.
pub fn bucket_hash(s: &str) -> u32 {
    let mut h: i32 = 0;
    for unit in s.encode_utf16() {
        h = h
            .wrapping_mul(31)
            .wrapping_sub(h)
            .wrapping_add(i32::from(unit));
    }
    h.unsigned_abs()
}

/// Rollout percentile for a user id, in 0..=99.
pub fn percentile(user_id: &str) -> u32 {
    bucket_hash(user_id) % 100
}

/// Experiment group index for a user id. `group_count` must be > 0; the
/// evaluation engine only calls this behind a non-empty check.
pub fn group_index(user_id: &str, group_count: usize) -> usize {
    bucket_hash(user_id) as usize % group_count
}
