//! Multi-stage recovery of JSON report payloads from raw LLM output.
//!
//! Stages run in order and stop at the first success:
//! - direct parse of the extracted payload
//! - standard repair (close strings/brackets, drop trailing commas)
//! - smart truncation at the last structural boundary
//! - aggressive backward scan for the longest repairable prefix
//!
//! When every stage fails the caller gets [`RecoveryError::Unrecoverable`],
//! never an empty placeholder.

mod error;
mod extract;
mod repair;
mod truncate;

pub use error::RecoveryError;
pub use extract::extract_json_payload;
pub use repair::repair;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::RecoveryTuning;
use crate::models::{RecoveryResult, RecoveryStrategy};

use truncate::{Payload, aggressive_cuts, smart_cut};

type Stage = fn(&RecoveryParser, &Payload<'_>) -> Option<RecoveryResult>;

const STAGES: [(RecoveryStrategy, Stage); 4] = [
    (RecoveryStrategy::Direct, RecoveryParser::direct),
    (RecoveryStrategy::StandardFix, RecoveryParser::standard_fix),
    (RecoveryStrategy::SmartTruncate, RecoveryParser::smart_truncate),
    (
        RecoveryStrategy::AggressiveTruncate,
        RecoveryParser::aggressive_truncate,
    ),
];

/// Parser that recovers the largest valid JSON document from a raw generation.
#[derive(Debug, Clone, Default)]
pub struct RecoveryParser {
    tuning: RecoveryTuning,
}

impl RecoveryParser {
    pub fn new(tuning: RecoveryTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &RecoveryTuning {
        &self.tuning
    }

    /// Recover a structured report from raw generation output.
    pub fn parse(&self, text: &str) -> Result<RecoveryResult, RecoveryError> {
        let payload = Payload::new(extract_json_payload(text));
        debug!(
            "Extracted payload of {} characters from {} bytes of input",
            payload.len(),
            text.len()
        );

        for (strategy, stage) in STAGES {
            debug!("Attempting {} recovery", strategy);
            if let Some(result) = stage(self, &payload) {
                match result.discarded_percent() {
                    Some(percent) => warn!(
                        "Recovered report via {} ({}% of content discarded)",
                        strategy, percent
                    ),
                    None if result.was_incomplete => {
                        info!("Recovered report via {}", strategy)
                    }
                    None => debug!("Report parsed directly"),
                }
                return Ok(result);
            }
        }

        let err = RecoveryError::unrecoverable(&payload, self.tuning.excerpt_chars);
        warn!("All recovery stages failed: {}", err);
        Err(err)
    }

    fn direct(&self, payload: &Payload<'_>) -> Option<RecoveryResult> {
        serde_json::from_str(payload.as_str())
            .ok()
            .map(RecoveryResult::direct)
    }

    fn standard_fix(&self, payload: &Payload<'_>) -> Option<RecoveryResult> {
        let fixed = repair(payload.as_str());
        let data = parse_recovered(&fixed)?;
        Some(RecoveryResult::repaired(
            data,
            fixed.len() > payload.as_str().len(),
        ))
    }

    fn smart_truncate(&self, payload: &Payload<'_>) -> Option<RecoveryResult> {
        let cut = smart_cut(payload, &self.tuning)?;
        debug!("Smart truncation cut point at {} of {}", cut, payload.len());
        let data = parse_recovered(&repair(payload.prefix(cut)))?;
        Some(RecoveryResult::truncated(
            data,
            RecoveryStrategy::SmartTruncate,
            payload.len(),
            cut,
        ))
    }

    fn aggressive_truncate(&self, payload: &Payload<'_>) -> Option<RecoveryResult> {
        aggressive_cuts(payload, &self.tuning).find_map(|cut| {
            let data = parse_recovered(&repair(payload.prefix(cut)))?;
            Some(RecoveryResult::truncated(
                data,
                RecoveryStrategy::AggressiveTruncate,
                payload.len(),
                cut,
            ))
        })
    }
}

/// Parse a repaired payload, accepting only non-empty objects and arrays.
///
/// Repairs that collapse to `{}`, `[]` or a bare scalar carry no report content.
fn parse_recovered(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(map) if !map.is_empty() => Some(Value::Object(map)),
        Value::Array(items) if !items.is_empty() => Some(Value::Array(items)),
        _ => None,
    }
}

/// Recover a report using the default tuning.
pub fn parse_report(text: &str) -> Result<RecoveryResult, RecoveryError> {
    RecoveryParser::default().parse(text)
}
