// MurmurHash3, x86 32-bit variant. Feature slots must not change between processes or
// platforms, so we carry our own implementation instead of relying on std's randomized hasher.

const C1: u32 = 0xcc9e2d51;
const C2: u32 = 0x1b873593;
const R1: u32 = 15;
const R2: u32 = 13;
const M: u32 = 5;
const N: u32 = 0xe6546b64;
const STEP: usize = 4;

#[inline(always)]
fn mix_k(mut k: u32) -> u32 {
    k = k.wrapping_mul(C1);
    k = k.rotate_left(R1);
    k.wrapping_mul(C2)
}

#[inline]
pub fn hash32_with_seed(key: &[u8], seed: u32) -> u32 {
    let mut hash = seed;

    let mut blocks = key.chunks_exact(STEP);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        hash ^= mix_k(k);
        hash = hash.rotate_left(R2).wrapping_mul(M).wrapping_add(N);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, byte) in tail.iter().enumerate() {
            k ^= u32::from(*byte) << (8 * i as u32);
        }
        hash ^= mix_k(k);
    }

    hash ^= key.len() as u32;

    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x85ebca6b);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(0xc2b2ae35);
    hash ^= hash >> 16;

    hash
}

/// Hash of two byte strings joined by `separator`, equal to hashing the concatenation.
/// Lets interaction features be hashed without building the joined string.
pub fn hash32_joined_with_seed(left: &[u8], separator: u8, right: &[u8], seed: u32) -> u32 {
    let mut hash = seed;
    let total_len = left.len() + 1 + right.len();
    let mut pending = [0u8; STEP];
    let mut pending_len = 0;

    let bytes = left
        .iter()
        .chain(std::iter::once(&separator))
        .chain(right.iter());
    for byte in bytes {
        pending[pending_len] = *byte;
        pending_len += 1;
        if pending_len == STEP {
            hash ^= mix_k(u32::from_le_bytes(pending));
            hash = hash.rotate_left(R2).wrapping_mul(M).wrapping_add(N);
            pending_len = 0;
        }
    }

    if pending_len > 0 {
        let mut k = 0u32;
        for (i, byte) in pending[..pending_len].iter().enumerate() {
            k ^= u32::from(*byte) << (8 * i as u32);
        }
        hash ^= mix_k(k);
    }

    hash ^= total_len as u32;

    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x85ebca6b);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(0xc2b2ae35);
    hash ^= hash >> 16;

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vectors() {
        assert_eq!(hash32_with_seed(b"", 0), 0);
        assert_eq!(hash32_with_seed(b"", 1), 0x514E28B7);
        assert_eq!(hash32_with_seed(b"", 0xffffffff), 0x81F16F39);
        assert_eq!(hash32_with_seed(&[0, 0, 0, 0], 0), 0x2362F9DE);
        assert_eq!(hash32_with_seed(b"aaaa", 0x9747b28c), 0x5A97808A);
    }

    #[test]
    fn test_seed_changes_hash() {
        assert_ne!(hash32_with_seed(b"1:abc", 0), hash32_with_seed(b"1:abc", 7));
    }

    #[test]
    fn test_joined_matches_concatenation() {
        let cases: [(&str, &str); 5] = [
            ("", ""),
            ("a", "b"),
            ("1:abc", "2:de"),
            ("12:xyzw", "3:"),
            ("0:some_longer_token", "3:another_longer_one"),
        ];
        for (left, right) in cases.iter() {
            let joined = format!("{}_{}", left, right);
            for seed in [0u32, 1, 0x9747b28c].iter() {
                assert_eq!(
                    hash32_joined_with_seed(left.as_bytes(), b'_', right.as_bytes(), *seed),
                    hash32_with_seed(joined.as_bytes(), *seed)
                );
            }
        }
    }
}
