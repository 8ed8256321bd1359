// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use csv::{ReaderBuilder, StringRecord, Trim};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DashboardError, DashboardResult};
use crate::models::{Dataset, SalesRecord, FILTER_AND_CHART_COLUMNS, REQUIRED_COLUMNS};

/// Where the sales CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    Path(PathBuf),
}

impl DataSource {
    /// `http(s)://` locations are fetched, anything else is read from disk.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::Path(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load and validate the dataset. A single attempt, no retries.
pub async fn load_dataset(source: &DataSource) -> DashboardResult<Dataset> {
    let dataset = match source {
        DataSource::Url(url) => {
            let body = fetch_csv(url).await?;
            parse_dataset(body.as_bytes())?
        }
        DataSource::Path(path) => {
            let file = File::open(path).map_err(|e| {
                DashboardError::Unknown(format!("Failed to open {}: {}", path.display(), e))
            })?;
            parse_dataset(file)?
        }
    };

    info!(source = %source, rows = dataset.len(), "dataset loaded");
    Ok(dataset)
}

async fn fetch_csv(url: &str) -> DashboardResult<String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching {}", url));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = request_csv(url).await;

    spinner.finish_and_clear();
    let text = result?;
    debug!(bytes = text.len(), "dataset downloaded");
    Ok(text)
}

async fn request_csv(url: &str) -> DashboardResult<String> {
    let response = Client::new().get(url).send().await?;
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(DashboardError::Unknown(format!(
            "Request to {} failed with status {}",
            url, status
        )));
    }
    Ok(text)
}

/// Parse CSV content into a [`Dataset`].
///
/// The header is validated before any row is read, so a missing column stops
/// the load without touching the data.
pub fn parse_dataset<R: Read>(input: R) -> DashboardResult<Dataset> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::EmptyDataset);
    }
    validate_schema(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line());
        let record: SalesRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| row_error(e, line))?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(DashboardError::EmptyDataset);
    }

    Ok(Dataset::new(
        headers.iter().map(str::to_string).collect(),
        records,
    ))
}

/// Every required column absent from `headers`, in required-column order.
pub fn missing_columns(headers: &StringRecord) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .chain(FILTER_AND_CHART_COLUMNS.iter())
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect()
}

pub fn validate_schema(headers: &StringRecord) -> DashboardResult<()> {
    let missing = missing_columns(headers);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::Schema { missing })
    }
}

fn row_error(err: csv::Error, line: Option<u64>) -> DashboardError {
    match err.kind() {
        csv::ErrorKind::Deserialize { err: de, .. } => DashboardError::Parse {
            line,
            message: de.to_string(),
        },
        _ => DashboardError::from(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use std::io::Write;

    const HEADER: &str =
        "AreaCode,Date,Marketing,Product,Product_line,Product_type,Profit,Sales,State,Target_sales,Total_expenses,Type";

    fn csv_with(header: &str, rows: &[&str]) -> String {
        let mut content = String::from(header);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content.push('\n');
        content
    }

    #[test]
    fn test_parse_valid_dataset() {
        let content = csv_with(
            HEADER,
            &[
                "719,12-01-31,24,Columbian,Beans,Coffee,94,219,Colorado,220,36,Regular",
                "970,12-02-29,27,Lemon,Leaves,Tea,68,190,Colorado,210,39,Decaf",
            ],
        );

        let dataset = parse_dataset(content.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.has_target_sales());

        let first = &dataset.records()[0];
        assert_eq!(first.product_line, "Beans");
        assert_eq!(first.area_code, "719");
        assert_eq!(first.kind, "Regular");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2012, 1, 31).unwrap());
        assert_relative_eq!(first.sales, 219.0);
        assert_eq!(first.target_sales, Some(220.0));

        let second = &dataset.records()[1];
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2012, 2, 29).unwrap());
    }

    #[test]
    fn test_missing_profit_column() {
        let header = HEADER.replace("Profit,", "");
        let content = csv_with(
            &header,
            &["719,12-01-31,24,Columbian,Beans,Coffee,219,Colorado,220,36,Regular"],
        );

        match parse_dataset(content.as_bytes()) {
            Err(DashboardError::Schema { missing }) => assert_eq!(missing, vec!["Profit"]),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns_reported_together() {
        let headers = StringRecord::from(vec!["Product_line", "Date", "Sales"]);
        let missing = missing_columns(&headers);
        assert_eq!(
            missing,
            vec![
                "AreaCode",
                "Profit",
                "Marketing",
                "Total_expenses",
                "Product_type",
                "State",
                "Product",
                "Type"
            ]
        );
    }

    #[test]
    fn test_headers_only_is_empty_dataset() {
        let content = csv_with(HEADER, &[]);
        assert!(matches!(
            parse_dataset(content.as_bytes()),
            Err(DashboardError::EmptyDataset)
        ));
    }

    #[test]
    fn test_no_content_is_empty_dataset() {
        assert!(matches!(
            parse_dataset("".as_bytes()),
            Err(DashboardError::EmptyDataset)
        ));
    }

    #[test]
    fn test_malformed_date_is_parse_error() {
        let content = csv_with(
            HEADER,
            &[
                "719,12-01-31,24,Columbian,Beans,Coffee,94,219,Colorado,220,36,Regular",
                "719,01/31/2012,24,Columbian,Beans,Coffee,94,219,Colorado,220,36,Regular",
            ],
        );

        match parse_dataset(content.as_bytes()) {
            Err(DashboardError::Parse { line, message }) => {
                assert_eq!(line, Some(3));
                assert!(message.contains("01/31/2012"), "message: {}", message);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_target_sales_is_optional() {
        let header = HEADER.replace("Target_sales,", "");
        let content = csv_with(
            &header,
            &["719,12-01-31,24,Columbian,Beans,Coffee,94,219,Colorado,36,Regular"],
        );

        let dataset = parse_dataset(content.as_bytes()).unwrap();
        assert!(!dataset.has_target_sales());
        assert_eq!(dataset.records()[0].target_sales, None);
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!(
            DataSource::parse("https://example.com/sales.csv"),
            DataSource::Url("https://example.com/sales.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("data/sales.csv"),
            DataSource::Path(PathBuf::from("data/sales.csv"))
        );
    }

    #[tokio::test]
    async fn test_load_dataset_from_path() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            "{}",
            csv_with(
                HEADER,
                &["719,12-01-31,24,Columbian,Beans,Coffee,94,219,Colorado,220,36,Regular"]
            )
        )?;

        let source = DataSource::Path(file.path().to_path_buf());
        let dataset = load_dataset(&source).await?;
        assert_eq!(dataset.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_dataset_missing_file() {
        let source = DataSource::Path(PathBuf::from("does/not/exist.csv"));
        assert!(matches!(
            load_dataset(&source).await,
            Err(DashboardError::Unknown(_))
        ));
    }
}
