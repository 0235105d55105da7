//! Export module for Fedha
//!
//! - CSV: expenses and income, one row per record (spreadsheet-compatible)
//! - JSON: machine-readable export of everything the user owns
//! - YAML: the same export, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::{export_expenses_csv, export_income_csv};
pub use json::{export_user_json, ExportMetadata, UserExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_user_yaml;
