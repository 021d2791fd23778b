//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Output format for report endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl ReportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => "text/csv",
        }
    }
}

/// Attribution used on reports when the caller does not name anyone
pub const DEFAULT_REPORT_AUTHOR: &str = "System";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_parses_lowercase() {
        let format: ReportFormat = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(format, ReportFormat::Csv);
        assert_eq!(ReportFormat::default(), ReportFormat::Json);
        assert_eq!(format.content_type(), "text/csv");
    }
}
