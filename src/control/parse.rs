/*!
 * Payload Parsing
 * Validation of write payloads into stored values
 */

use crate::core::errors::ControlError;
use crate::core::limits::MAX_PAYLOAD_BYTES;
use crate::core::types::Value;

/// Parse a raw write payload into a value
///
/// The raw length is checked against [`MAX_PAYLOAD_BYTES`] before the bytes
/// are touched; oversize input is rejected with a size error, never
/// truncated. What remains is trimmed of surrounding whitespace and parsed
/// as a base-10 signed integer.
///
/// # Errors
///
/// [`ControlError::InvalidInput`] for oversize, non-UTF-8, empty, or
/// unparseable payloads. The set is never touched on a parse failure.
pub fn parse_payload(raw: &[u8]) -> Result<Value, ControlError> {
    if raw.len() > MAX_PAYLOAD_BYTES {
        return Err(ControlError::InvalidInput(format!(
            "payload is {} bytes, limit is {MAX_PAYLOAD_BYTES}",
            raw.len()
        )));
    }

    let text = std::str::from_utf8(raw)
        .map_err(|_| ControlError::InvalidInput("payload is not valid UTF-8".to_string()))?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ControlError::InvalidInput(
            "payload holds no digits".to_string(),
        ));
    }

    trimmed
        .parse::<Value>()
        .map_err(|e| ControlError::InvalidInput(format!("{trimmed:?} is not an integer: {e}")))
}
