pub mod config;
pub mod models;
pub mod recovery;
pub mod validation;

// Re-export main types
pub use config::{RecoveryTuning, SalvageConfig};
pub use models::{RecoveryResult, RecoveryStrategy, ValidationOutcome};
pub use recovery::{RecoveryError, RecoveryParser, extract_json_payload, parse_report, repair};
pub use validation::{FieldKind, ReportShape, ReportValidator, ShapeCheck, validate_report};
