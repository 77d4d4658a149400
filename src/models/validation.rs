use serde::{Deserialize, Serialize};

/// Outcome of checking a recovered report against its expected shape.
///
/// `errors` holds distinct human-readable problems in check order and is empty
/// exactly when `valid` is true.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Render the errors as a bulleted list for display.
    pub fn describe(&self) -> String {
        if self.valid {
            return "Report shape is valid".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("- {}", e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
