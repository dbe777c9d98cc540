//! Capability bits, metadata keys and defaults

// Capability bit constants
pub const UPLOAD: u64 = 1;
pub const EDIT_OTHERS: u64 = 1 << 1;
pub const MODERATE: u64 = 1 << 63;

// Metadata keys stored alongside each item
pub const META_PRIVACY: &str = "privacy";
pub const META_GUID: &str = "guid";

// Store defaults
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;
pub const DEFAULT_PER_PAGE: usize = 20;
pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
pub const MAX_DBS: u32 = 6;

// Upper bound on "-N" suffixes tried when a slug is taken
pub const MAX_SLUG_SUFFIX: u32 = 10_000;

// Capability name mappings
const CAPS: &[(&str, u64)] = &[
    ("upload", UPLOAD),
    ("edit_others", EDIT_OTHERS),
    ("moderate", MODERATE),
];

/// Convert a capability mask to a list of capability names
pub fn caps_to_names(mask: u64) -> Vec<&'static str> {
    CAPS.iter()
        .filter(|(_, b)| mask & b == *b)
        .map(|(n, _)| *n)
        .collect()
}

/// Convert a list of capability names to a mask. Unknown names are ignored.
pub fn names_to_caps<S: AsRef<str>>(names: &[S]) -> u64 {
    names
        .iter()
        .filter_map(|n| CAPS.iter().find(|(k, _)| *k == n.as_ref()).map(|(_, v)| v))
        .fold(0, |a, b| a | b)
}
