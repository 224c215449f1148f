//! String-to-key fingerprint.
//!
//! A pure function mapping a byte string of known length to a 64-bit
//! unsigned value. The engine treats the output as opaque and never inverts
//! it; any well-distributed 64-bit hash is acceptable (the source uses a
//! FarmHash-family function; collisions at 64 bits are ignored here as
//! there). [`fingerprint64`] uses FNV-1a, the simplest member of that family
//! that needs no external crate — keeping the rest of this `no_std` crate
//! dependency-free for a concern the spec treats as swappable.

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Maps `bytes` to a 64-bit fingerprint. The empty slice always maps to
/// `0`, matching the spec's "empty or null string maps to zero" — this is
/// checked explicitly rather than relying on FNV's offset basis to happen to
/// be zero (it isn't).
pub fn fingerprint64(bytes: &[u8]) -> u64 {
    if bytes.is_empty() {
        return 0;
    }
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_hashes_to_zero() {
        assert_eq!(fingerprint64(&[]), 0);
    }

    #[test]
    fn same_input_hashes_identically() {
        assert_eq!(fingerprint64(b"hello"), fingerprint64(b"hello"));
    }

    #[test]
    fn different_input_is_very_likely_to_differ() {
        assert_ne!(fingerprint64(b"hello"), fingerprint64(b"hellp"));
    }

    #[test]
    fn single_byte_changes_propagate() {
        assert_ne!(fingerprint64(b"a"), fingerprint64(b"b"));
    }
}
