use crate::attendance::SessionWindow;
use crate::error::RollcallError;

/// Longest raw identifier accepted, in bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 256;

/// Reject a window whose start is not strictly before its end.
///
/// The engine itself treats such a window as zero attendance; callers that want
/// to fail fast validate first.
pub fn validate_window(start: i64, end: i64) -> Result<SessionWindow, RollcallError> {
    if start >= end {
        return Err(RollcallError::InvalidInput(format!(
            "session window start ({}) must be before end ({})",
            start, end
        )));
    }
    Ok(SessionWindow::new(start, end))
}

pub fn validate_required_percent(percent: i64) -> Result<u32, RollcallError> {
    if !(0..=100).contains(&percent) {
        return Err(RollcallError::InvalidInput(format!(
            "required attendance percent must be 0-100, got {}",
            percent
        )));
    }
    Ok(percent as u32)
}

/// Strip ASCII control characters (keeping space), trim whitespace, and enforce
/// [`MAX_IDENTIFIER_LENGTH`].
pub fn sanitize_identifier(input: &str) -> Result<String, RollcallError> {
    if input.len() > MAX_IDENTIFIER_LENGTH {
        return Err(RollcallError::InvalidInput(format!(
            "identifier exceeds maximum length of {} bytes",
            MAX_IDENTIFIER_LENGTH
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(RollcallError::InvalidInput(
            "identifier is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
