use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Required point fields for the default life report shape
pub const LIFE_REPORT_POINT_FIELDS: &[&str] =
    &["age", "year", "open", "close", "high", "low", "score", "reason"];

/// JSON kind a required field must have.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Array,
    Object,
    String,
    Number,
    Any,
}

impl FieldKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Any => true,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldKind::Array => "an array",
            FieldKind::Object => "an object",
            FieldKind::String => "a string",
            FieldKind::Number => "a number",
            FieldKind::Any => "a value",
        }
    }
}

fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A single shape assertion over a report object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum ShapeCheck {
    /// Field must be present, non-null and of the given kind
    Required { field: String, kind: FieldKind },
    /// Array field must hold at least `min` entries
    MinItems { field: String, min: usize },
    /// First entry of an array field must contain every listed field
    FirstItemFields { field: String, fields: Vec<String> },
    /// At least one of several alternate fields must be present
    AnyOf { fields: Vec<String> },
}

impl ShapeCheck {
    /// Evaluate against a report, returning a problem description on failure.
    ///
    /// Checks that depend on a field another check already reported (absent,
    /// or not an array) pass silently.
    pub fn evaluate(&self, report: &Map<String, Value>) -> Option<String> {
        match self {
            ShapeCheck::Required { field, kind } => match present(report, field) {
                None => Some(format!("Missing required field `{}`", field)),
                Some(value) if !kind.matches(value) => Some(format!(
                    "Field `{}` must be {}, found {}",
                    field,
                    kind.describe(),
                    describe_value(value)
                )),
                Some(_) => None,
            },
            ShapeCheck::MinItems { field, min } => {
                let items = present(report, field)?.as_array()?;
                (items.len() < *min).then(|| {
                    format!(
                        "Field `{}` has {} entries, at least {} required",
                        field,
                        items.len(),
                        min
                    )
                })
            }
            ShapeCheck::FirstItemFields { field, fields } => {
                let first = present(report, field)?.as_array()?.first()?;
                let Some(entry) = first.as_object() else {
                    return Some(format!("First entry of `{}` must be an object", field));
                };
                let missing: Vec<&str> = fields
                    .iter()
                    .filter(|f| !entry.contains_key(f.as_str()))
                    .map(String::as_str)
                    .collect();
                (!missing.is_empty()).then(|| {
                    format!(
                        "First entry of `{}` is missing fields: {}",
                        field,
                        missing.join(", ")
                    )
                })
            }
            ShapeCheck::AnyOf { fields } => {
                let found = fields.iter().any(|f| present(report, f).is_some());
                (!found).then(|| {
                    let names: Vec<String> = fields.iter().map(|f| format!("`{}`", f)).collect();
                    format!("At least one of {} must be present", names.join(", "))
                })
            }
        }
    }
}

fn present<'a>(report: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    report.get(field).filter(|v| !v.is_null())
}

/// Expected shape of a recovered report, as an ordered list of checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportShape {
    pub checks: Vec<ShapeCheck>,
}

impl Default for ReportShape {
    fn default() -> Self {
        Self::life_report()
    }
}

impl ReportShape {
    /// Shape of an astrology life report: a chart of yearly points, a summary,
    /// and either the trader or the general-life reading.
    pub fn life_report() -> Self {
        let points = "chartPoints".to_string();
        Self {
            checks: vec![
                ShapeCheck::Required {
                    field: points.clone(),
                    kind: FieldKind::Array,
                },
                ShapeCheck::MinItems {
                    field: points.clone(),
                    min: 10,
                },
                ShapeCheck::FirstItemFields {
                    field: points,
                    fields: LIFE_REPORT_POINT_FIELDS
                        .iter()
                        .map(|f| f.to_string())
                        .collect(),
                },
                ShapeCheck::Required {
                    field: "summary".to_string(),
                    kind: FieldKind::String,
                },
                ShapeCheck::AnyOf {
                    fields: vec!["traderVibe".to_string(), "lifeVibe".to_string()],
                },
            ],
        }
    }

    /// Run all checks against a report object
    pub fn run_all(&self, report: &Map<String, Value>) -> Vec<String> {
        self.checks
            .iter()
            .filter_map(|check| check.evaluate(report))
            .collect()
    }
}
