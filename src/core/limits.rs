/*!
 * Service Limits and Constants
 *
 * Centralized location for limits and thresholds.
 * All values include rationale comments explaining WHY they exist.
 */

// =============================================================================
// CONTROL SURFACE LIMITS
// =============================================================================

/// Maximum accepted write payload in raw bytes, checked before the payload
/// is buffered or parsed.
///
/// 12 bytes is the width of a minimal signed 32-bit integer (`-2147483648`)
/// plus a terminator. An unchecked copy of an exact-fit payload into a fixed
/// buffer of this size writes one byte past the end, so the bound is a hard
/// precondition of every write: oversize input is rejected with a size
/// error, never truncated.
/// [SECURITY]
pub const MAX_PAYLOAD_BYTES: usize = 12;

// =============================================================================
// SET LIMITS
// =============================================================================

/// Default bound on distinct stored values.
///
/// Inserting past the configured bound fails before any entry is linked, so
/// resource exhaustion surfaces as a typed result instead of unbounded
/// growth.
pub const DEFAULT_MAX_ENTRIES: usize = 100_000;

// =============================================================================
// OBSERVABILITY THRESHOLDS
// =============================================================================

/// Threshold above which a control request is logged as slow (milliseconds).
/// Writer critical sections are short; anything past this points at a
/// contended or oversized set.
pub const SLOW_REQUEST_MS: u128 = 50;
