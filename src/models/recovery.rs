use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recovery tier that produced a parsed report, in order of increasing
/// aggressiveness and decreasing trust in the result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    /// The extracted payload parsed as-is
    Direct,
    /// Open strings/brackets were closed and syntax noise removed
    StandardFix,
    /// The damaged tail was cut at the last structural boundary
    SmartTruncate,
    /// Backward scan for the longest prefix that could be repaired
    AggressiveTruncate,
}

impl RecoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStrategy::Direct => "direct",
            RecoveryStrategy::StandardFix => "standard_fix",
            RecoveryStrategy::SmartTruncate => "smart_truncate",
            RecoveryStrategy::AggressiveTruncate => "aggressive_truncate",
        }
    }

    /// Whether this tier discards part of the payload.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            RecoveryStrategy::SmartTruncate | RecoveryStrategy::AggressiveTruncate
        )
    }
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort parse of a report payload plus provenance about how it was obtained.
///
/// `was_incomplete` is false exactly when `strategy` is [`RecoveryStrategy::Direct`].
/// `original_length` and `parsed_length` are only recorded by the truncation tiers,
/// measured in characters of the extracted payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryResult {
    pub data: Value,
    pub strategy: RecoveryStrategy,
    pub was_incomplete: bool,
    /// Set when recovery had to append content or cut the tail
    #[serde(default)]
    pub appears_truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_message: Option<String>,
}

impl RecoveryResult {
    /// Result for a payload that parsed without any repair.
    pub fn direct(data: Value) -> Self {
        Self {
            data,
            strategy: RecoveryStrategy::Direct,
            was_incomplete: false,
            appears_truncated: false,
            original_length: None,
            parsed_length: None,
            warning_message: None,
        }
    }

    /// Result for a payload fixed by the standard repair pipeline.
    ///
    /// `appended` is true when repair had to add closing quotes or delimiters,
    /// which is the reliable signal that the stream was cut off.
    pub fn repaired(data: Value, appended: bool) -> Self {
        let warning = if appended {
            "The report payload appeared truncated and was completed by closing open \
             strings and brackets. Some content may be missing; regenerating the report \
             is recommended."
        } else {
            "The report payload contained syntax errors (trailing commas or control \
             characters) that were repaired. Content should be intact but may need review."
        };

        Self {
            data,
            strategy: RecoveryStrategy::StandardFix,
            was_incomplete: true,
            appears_truncated: appended,
            original_length: None,
            parsed_length: None,
            warning_message: Some(warning.to_string()),
        }
    }

    /// Result for a payload recovered by cutting its tail.
    pub fn truncated(
        data: Value,
        strategy: RecoveryStrategy,
        original_length: usize,
        parsed_length: usize,
    ) -> Self {
        let parsed_length = parsed_length.min(original_length);
        let percent = discarded_percent(original_length, parsed_length);
        let warning = match strategy {
            RecoveryStrategy::AggressiveTruncate => format!(
                "Report generation is severely incomplete: {}% of the content was discarded \
                 by aggressive truncation. Credits should be refunded and the report \
                 regenerated.",
                percent
            ),
            _ => format!(
                "Report generation is incomplete: {}% of the content was discarded to recover \
                 a valid document. Credits should be refunded and the report regenerated.",
                percent
            ),
        };

        Self {
            data,
            strategy,
            was_incomplete: true,
            appears_truncated: true,
            original_length: Some(original_length),
            parsed_length: Some(parsed_length),
            warning_message: Some(warning),
        }
    }

    /// Rounded percentage of the payload that was cut away, if lengths were recorded.
    pub fn discarded_percent(&self) -> Option<u32> {
        match (self.original_length, self.parsed_length) {
            (Some(original), Some(parsed)) => Some(discarded_percent(original, parsed)),
            _ => None,
        }
    }

    /// Whether the caller should treat the generation as failed for billing purposes.
    pub fn should_refund(&self) -> bool {
        self.strategy.is_truncation()
    }
}

fn discarded_percent(original: usize, parsed: usize) -> u32 {
    if original == 0 {
        return 0;
    }
    ((1.0 - parsed as f64 / original as f64) * 100.0).round() as u32
}
