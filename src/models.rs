// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Format of the `Date` column, e.g. `12-01-31` for 31 January 2012.
pub const DATE_FORMAT: &str = "%y-%m-%d";

/// Columns the dashboard cannot render without.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Product_line",
    "AreaCode",
    "Date",
    "Sales",
    "Profit",
    "Marketing",
    "Total_expenses",
];

/// Columns read by the filters and charts on top of [`REQUIRED_COLUMNS`].
pub const FILTER_AND_CHART_COLUMNS: [&str; 4] = ["Product_type", "State", "Product", "Type"];

pub const TARGET_SALES_COLUMN: &str = "Target_sales";

/// One row of the sales dataset. Columns not listed here are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Product_line")]
    pub product_line: String,
    #[serde(rename = "AreaCode")]
    pub area_code: String,
    #[serde(rename = "Product_type")]
    pub product_type: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Date", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(rename = "Sales")]
    pub sales: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
    #[serde(rename = "Marketing")]
    pub marketing: f64,
    #[serde(rename = "Total_expenses")]
    pub total_expenses: f64,
    #[serde(rename = "Target_sales", default)]
    pub target_sales: Option<f64>,
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
        serde::de::Error::custom(format!(
            "Date value '{}' does not match format {}: {}",
            raw, DATE_FORMAT, e
        ))
    })
}

/// A categorical column that can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    ProductLine,
    AreaCode,
    ProductType,
    State,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::ProductLine,
        Dimension::AreaCode,
        Dimension::ProductType,
        Dimension::State,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Dimension::ProductLine => "Product_line",
            Dimension::AreaCode => "AreaCode",
            Dimension::ProductType => "Product_type",
            Dimension::State => "State",
        }
    }

    /// Sidebar label for the multi-select control.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::ProductLine => "Select Product Lines",
            Dimension::AreaCode => "Select Area Codes",
            Dimension::ProductType => "Select Product Types",
            Dimension::State => "Select States",
        }
    }

    pub fn value(self, record: &SalesRecord) -> &str {
        match self {
            Dimension::ProductLine => &record.product_line,
            Dimension::AreaCode => &record.area_code,
            Dimension::ProductType => &record.product_type,
            Dimension::State => &record.state,
        }
    }
}

/// The loaded dataset. Immutable once built; everything downstream borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<SalesRecord>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, records: Vec<SalesRecord>) -> Self {
        Self { headers, records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn has_target_sales(&self) -> bool {
        self.has_column(TARGET_SALES_COLUMN)
    }
}
