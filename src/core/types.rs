/*!
 * Core Types
 * Shared type aliases used across the service
 */

/// Stored value type
///
/// Write payloads parse into this; the set deduplicates on it.
pub type Value = i64;
