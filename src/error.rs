// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the dashboard pipeline.

/// Result type for loading, filtering and charting.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors that stop the dashboard from rendering.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The source has a header row but no data, or no content at all.
    #[error("Empty dataset")]
    EmptyDataset,

    /// One or more required columns are absent. Listed in required-column order.
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A value could not be parsed (malformed Date, non-numeric Sales, ...).
    #[error("{}", parse_message(.line, .message))]
    Parse { line: Option<u64>, message: String },

    /// Anything else: network, I/O, malformed CSV framing, chart drawing.
    #[error("{0}")]
    Unknown(String),
}

fn parse_message(line: &Option<u64>, message: &str) -> String {
    match line {
        Some(line) => format!("Parse error on line {}: {}", line, message),
        None => format!("Parse error: {}", message),
    }
}

impl DashboardError {
    /// The message shown in the page's error banner.
    pub fn banner(&self) -> String {
        match self {
            DashboardError::EmptyDataset => "Error: Empty dataset.".to_string(),
            DashboardError::Schema { missing } => match missing.split_first() {
                Some((first, [])) => format!("Column '{}' not found in the dataset.", first),
                Some((first, rest)) => format!(
                    "Column '{}' not found in the dataset. (also missing: {})",
                    first,
                    rest.iter()
                        .map(|c| format!("'{}'", c))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                None => "Error: dataset schema is invalid.".to_string(),
            },
            other => format!("Error: {}", other),
        }
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::Unknown(format!("I/O error: {}", err))
    }
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        DashboardError::Unknown(format!("CSV error: {}", err))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Unknown(format!("Failed to fetch dataset: {}", err))
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Unknown(format!("JSON error: {}", err))
    }
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::Unknown(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_messages() {
        assert_eq!(DashboardError::EmptyDataset.banner(), "Error: Empty dataset.");

        let schema = DashboardError::Schema {
            missing: vec!["Profit".to_string()],
        };
        assert_eq!(schema.banner(), "Column 'Profit' not found in the dataset.");

        let unknown = DashboardError::Unknown("connection refused".to_string());
        assert_eq!(unknown.banner(), "Error: connection refused");
    }

    #[test]
    fn test_schema_banner_lists_remaining_columns() {
        let err = DashboardError::Schema {
            missing: vec![
                "Profit".to_string(),
                "Marketing".to_string(),
                "Total_expenses".to_string(),
            ],
        };
        let banner = err.banner();
        assert!(banner.starts_with("Column 'Profit' not found"));
        assert!(banner.contains("'Marketing', 'Total_expenses'"));
        assert_eq!(
            err.to_string(),
            "Missing required columns: Profit, Marketing, Total_expenses"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = DashboardError::Parse {
            line: Some(4),
            message: "bad date".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error on line 4: bad date");
        assert_eq!(err.banner(), "Error: Parse error on line 4: bad date");
    }
}
