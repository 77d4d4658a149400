//! Shape validation for recovered reports.
//!
//! Validation never fails: every problem found is collected into a
//! [`ValidationOutcome`] so callers see all issues in one pass.

mod shape;

pub use shape::*;

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::ValidationOutcome;

/// Validator that checks a report against a [`ReportShape`].
#[derive(Debug, Clone, Default)]
pub struct ReportValidator {
    shape: ReportShape,
}

impl ReportValidator {
    pub fn new(shape: ReportShape) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> &ReportShape {
        &self.shape
    }

    /// Validate a report value, collecting every problem found.
    pub fn validate(&self, report: &Value) -> ValidationOutcome {
        let empty = Map::new();
        let mut errors = Vec::new();

        let fields = match report.as_object() {
            Some(map) => map,
            None => {
                errors.push("Report must be a JSON object".to_string());
                &empty
            }
        };

        for error in self.shape.run_all(fields) {
            if !errors.contains(&error) {
                errors.push(error);
            }
        }

        debug!("Report validation found {} problem(s)", errors.len());
        ValidationOutcome::from_errors(errors)
    }
}

/// Validate a report against the default life report shape.
pub fn validate_report(report: &Value) -> ValidationOutcome {
    ReportValidator::default().validate(report)
}
