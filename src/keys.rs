//! Key encoding for LMDB storage.
//!
//! - Pair keys: two big-endian u64s, so a prefix scan on the first half
//!   lists every second half in ascending order.
//! - Metadata keys: big-endian item id followed by the raw metadata name.
//! - Slug keys: length-prefixed parts `[len][item_type][len][slug]`.

use crate::item::{ItemId, ItemType};

/// Create a 16-byte key from two u64 values
#[inline]
pub fn key(a: u64, b: u64) -> [u8; 16] {
    let mut k = [0u8; 16];
    k[..8].copy_from_slice(&a.to_be_bytes());
    k[8..].copy_from_slice(&b.to_be_bytes());
    k
}

/// Split a 16-byte pair key back into its halves
#[inline]
pub fn split_key(bytes: &[u8]) -> Option<(u64, u64)> {
    if bytes.len() != 16 {
        return None;
    }
    let a = u64::from_be_bytes(bytes[..8].try_into().ok()?);
    let b = u64::from_be_bytes(bytes[8..].try_into().ok()?);
    Some((a, b))
}

/// Build a metadata key: [id: 8 bytes][name]
#[inline]
pub fn meta_key(id: ItemId, name: &str) -> Vec<u8> {
    let mut k = Vec::with_capacity(8 + name.len());
    k.extend_from_slice(&id.to_be_bytes());
    k.extend_from_slice(name.as_bytes());
    k
}

/// Metadata name stored in a metadata key
#[inline]
pub fn meta_name(bytes: &[u8]) -> Option<&str> {
    bytes.get(8..).and_then(|n| std::str::from_utf8(n).ok())
}

/// Build a length-prefixed key from parts. Parts longer than 255 bytes are
/// rejected by the caller; slugs are capped well below that.
#[inline]
pub fn build_key(parts: &[&str]) -> Vec<u8> {
    let total_len: usize = parts.iter().map(|p| 1 + p.len()).sum();
    let mut key = Vec::with_capacity(total_len);
    for part in parts {
        key.push(part.len().min(u8::MAX as usize) as u8);
        key.extend_from_slice(&part.as_bytes()[..part.len().min(u8::MAX as usize)]);
    }
    key
}

/// Slug index key for an item type
#[inline]
pub fn slug_key(item_type: ItemType, slug: &str) -> Vec<u8> {
    build_key(&[item_type.as_str(), slug])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_roundtrip_and_order() {
        let k = key(7, 42);
        assert_eq!(split_key(&k), Some((7, 42)));
        assert!(key(7, 2) < key(7, 10));
        assert!(key(7, u64::MAX) < key(8, 0));
        assert_eq!(split_key(&k[..15]), None);
    }

    #[test]
    fn test_meta_key() {
        let k = meta_key(3, "privacy");
        assert!(k.starts_with(&3u64.to_be_bytes()));
        assert_eq!(meta_name(&k), Some("privacy"));
        assert_eq!(meta_name(&k[..4]), None);
    }

    #[test]
    fn test_slug_key_layout() {
        let k = slug_key(ItemType::File, "readme-txt");
        let mut expected = vec![4u8];
        expected.extend_from_slice(b"file");
        expected.push(10);
        expected.extend_from_slice(b"readme-txt");
        assert_eq!(k, expected);
    }

    #[test]
    fn test_slug_keys_do_not_collide_across_types() {
        assert_ne!(slug_key(ItemType::File, "docs"), slug_key(ItemType::Folder, "docs"));
    }
}
