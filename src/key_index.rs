//! Bucket selection: maps key bytes and a table size to a bucket index.

/// Maps a key's bytes to a bucket index in `[0, size)`.
///
/// `size` is always non-zero when called by `SortedHashTable`. Implementations
/// must be deterministic: the same key and size always yield the same index,
/// otherwise entries become unreachable through their bucket chain.
pub trait KeyIndex {
    fn key_index(&self, key: &[u8], size: usize) -> usize;
}

impl<F> KeyIndex for F
where
    F: Fn(&[u8], usize) -> usize,
{
    #[inline]
    fn key_index(&self, key: &[u8], size: usize) -> usize {
        self(key, size)
    }
}

/// djb2 string hash: `h = 5381; h = h * 33 + byte`, wrapping on overflow.
#[inline]
pub fn hash_djb2(bytes: &[u8]) -> u64 {
    bytes.iter().fold(5381u64, |h, &c| {
        h.wrapping_shl(5).wrapping_add(h).wrapping_add(u64::from(c))
    })
}

/// Bucket index for `key` in a table of `size` buckets, using djb2.
///
/// # Panics
/// Panics if `size` is zero.
#[inline]
pub fn key_index(key: &[u8], size: usize) -> usize {
    (hash_djb2(key) % size as u64) as usize
}

/// Default strategy: djb2 modulo table size.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Djb2;

impl KeyIndex for Djb2 {
    #[inline]
    fn key_index(&self, key: &[u8], size: usize) -> usize {
        key_index(key, size)
    }
}

/// 64-bit FNV-1a modulo table size.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Fnv1a;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl KeyIndex for Fnv1a {
    #[inline]
    fn key_index(&self, key: &[u8], size: usize) -> usize {
        let h = key.iter().fold(FNV_OFFSET_BASIS, |h, &b| {
            (h ^ u64::from(b)).wrapping_mul(FNV_PRIME)
        });
        (h % size as u64) as usize
    }
}
