use thiserror::Error;

use super::truncate::Payload;

/// Errors from report payload recovery.
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// No recovery tier produced valid JSON from any sufficiently large prefix.
    #[error(
        "Failed to recover JSON from report payload: {parse_error}\n\
         Payload length: {length} characters\n\
         First characters: {head:?}\n\
         Last characters: {tail:?}\n\
         Suggestions:\n\
         \x20 - retry the generation\n\
         \x20 - check whether the output was truncated by a length or token limit\n\
         \x20 - validate the raw text with an external JSON tool"
    )]
    Unrecoverable {
        /// First error reported when parsing the extracted payload as-is
        parse_error: String,
        length: usize,
        head: String,
        tail: String,
    },
}

impl RecoveryError {
    pub(crate) fn unrecoverable(payload: &Payload<'_>, excerpt_chars: usize) -> Self {
        // Only reached after the direct parse failed, so this is always an error
        let parse_error = serde_json::from_str::<serde_json::Value>(payload.as_str())
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();

        RecoveryError::Unrecoverable {
            parse_error,
            length: payload.len(),
            head: payload.prefix(excerpt_chars).to_string(),
            tail: payload.suffix(excerpt_chars).to_string(),
        }
    }
}
