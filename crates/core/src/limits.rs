//! Size limits for keys, paths and store names
//!
//! These limits are enforced by the façade before any backend I/O.

/// Maximum key length in bytes
pub const MAX_KEY_BYTES: usize = 1024;

/// Maximum path length in segments
///
/// Limits the depth of paths like "a.b.c.d..." so path traversal stays
/// shallow.
pub const MAX_PATH_LENGTH: usize = 256;

/// Maximum length of a table/collection name in bytes
pub const MAX_TABLE_NAME_BYTES: usize = 64;

/// Default table/collection name
pub const DEFAULT_TABLE: &str = "keyv";
