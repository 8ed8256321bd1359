// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Chart specifications for the six dashboard queries.
//!
//! Specs serialize to Vega-Lite v5 JSON with inline data, and the same spec
//! drives the SVG renderer in [`crate::render`]. Charts never filter; they are
//! built from an already filtered view or an aggregate of it.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::aggregate::{AggregateResult, MeltedRow};
use crate::models::SalesRecord;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Temporal values inside chart data are ISO dates.
pub const CHART_DATE_FORMAT: &str = "%Y-%m-%d";

pub const CHART_WIDTH: u32 = 600;
pub const CHART_HEIGHT: u32 = 300;

/// Green shades for categorical color encodings, assigned in order.
pub const PALETTE: [&str; 5] = ["#238b45", "#66c2a4", "#ccece6", "#a1d99b", "#005824"];

/// One data point: field name to JSON value.
pub type Datum = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Line,
    Circle,
    Arc,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Temporal,
    Quantitative,
    Nominal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scale {
    /// Categories in the order they take palette colors. Filled from the
    /// chart data so Vega-Lite does not fall back to sorted order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
    pub range: Vec<String>,
}

impl Scale {
    pub fn palette() -> Self {
        Self {
            domain: Vec::new(),
            range: PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
}

impl FieldDef {
    pub fn new(field: &str, field_type: FieldType) -> Self {
        Self {
            field: field.to_string(),
            field_type,
            scale: None,
        }
    }

    pub fn with_palette(mut self) -> Self {
        self.scale = Some(Scale::palette());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorEncoding {
    /// A constant color for every mark.
    Value { value: String },
    /// Color by a category field.
    Field(FieldDef),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorEncoding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub values: Vec<Datum>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub title: String,
    pub mark: Mark,
    pub encoding: Encoding,
    pub width: u32,
    pub height: u32,
    pub data: ChartData,
}

impl ChartSpec {
    fn new(title: &str, mark: Mark, encoding: Encoding, values: Vec<Datum>) -> Self {
        let mut spec = Self {
            schema: VEGA_LITE_SCHEMA,
            title: title.to_string(),
            mark,
            encoding,
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            data: ChartData { values },
        };
        spec.pin_color_domain();
        spec
    }

    fn pin_color_domain(&mut self) {
        if let Some(ColorEncoding::Field(def)) = &mut self.encoding.color {
            if let Some(scale) = &mut def.scale {
                scale.domain = category_domain(&self.data.values, &def.field);
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Distinct values of the color field in first-seen order, paired with
    /// their palette color. Empty for constant-colored charts.
    pub fn color_domain(&self) -> Vec<(String, &'static str)> {
        match &self.encoding.color {
            Some(ColorEncoding::Field(def)) => category_domain(&self.data.values, &def.field)
                .into_iter()
                .enumerate()
                .map(|(i, category)| (category, palette_color(i)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Distinct values of `field` as text, in the order they first appear.
pub fn category_domain(values: &[Datum], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter_map(|datum| category_value(datum, field))
        .filter(|category| seen.insert(category.clone()))
        .collect()
}

/// A field rendered as a category label. Numbers are printed, nulls skipped.
pub fn category_value(datum: &Datum, field: &str) -> Option<String> {
    match datum.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn constant_color() -> Option<ColorEncoding> {
    Some(ColorEncoding::Value {
        value: PALETTE[0].to_string(),
    })
}

fn datum(value: Value) -> Datum {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Query 1: Sales over time as a line.
pub fn sales_over_time(view: &[SalesRecord]) -> ChartSpec {
    let values = view
        .iter()
        .map(|r| {
            datum(json!({
                "Date": r.date.format(CHART_DATE_FORMAT).to_string(),
                "Sales": r.sales,
            }))
        })
        .collect();

    ChartSpec::new(
        "Query 1: Sales Performance Over Time",
        Mark::Line,
        Encoding {
            x: Some(FieldDef::new("Date", FieldType::Temporal)),
            y: Some(FieldDef::new("Sales", FieldType::Quantitative)),
            color: constant_color(),
            ..Encoding::default()
        },
        values,
    )
}

/// Query 2: Sales against Profit, colored by Product.
pub fn product_profitability(view: &[SalesRecord]) -> ChartSpec {
    let values = view
        .iter()
        .map(|r| {
            datum(json!({
                "Sales": r.sales,
                "Profit": r.profit,
                "Product": r.product,
            }))
        })
        .collect();

    ChartSpec::new(
        "Query 2: Product-wise Profitability",
        Mark::Circle,
        Encoding {
            x: Some(FieldDef::new("Sales", FieldType::Quantitative)),
            y: Some(FieldDef::new("Profit", FieldType::Quantitative)),
            color: Some(ColorEncoding::Field(
                FieldDef::new("Product", FieldType::Nominal).with_palette(),
            )),
            ..Encoding::default()
        },
        values,
    )
}

/// Query 3: Marketing spend against Sales.
pub fn marketing_vs_sales(view: &[SalesRecord]) -> ChartSpec {
    let values = view
        .iter()
        .map(|r| {
            datum(json!({
                "Marketing": r.marketing,
                "Sales": r.sales,
            }))
        })
        .collect();

    ChartSpec::new(
        "Query 3: Marketing Expense vs. Sales",
        Mark::Circle,
        Encoding {
            x: Some(FieldDef::new("Marketing", FieldType::Quantitative)),
            y: Some(FieldDef::new("Sales", FieldType::Quantitative)),
            color: constant_color(),
            ..Encoding::default()
        },
        values,
    )
}

/// Query 4: share of Sales per Product_line, from `sum_by_product_line`.
pub fn sales_contribution(sales_by_line: &AggregateResult) -> ChartSpec {
    let values = sales_by_line
        .groups()
        .iter()
        .map(|(line, total)| datum(json!({ "Product_line": line, "Sales": total })))
        .collect();

    ChartSpec::new(
        "Query 4: Contribution to Total Sales",
        Mark::Arc,
        Encoding {
            theta: Some(FieldDef::new("Sales", FieldType::Quantitative)),
            color: Some(ColorEncoding::Field(
                FieldDef::new("Product_line", FieldType::Nominal).with_palette(),
            )),
            ..Encoding::default()
        },
        values,
    )
}

/// Query 5: Total_expenses per Type, from `sum_expense_by_type`.
pub fn expense_breakdown(expenses_by_type: &AggregateResult) -> ChartSpec {
    let values = expenses_by_type
        .groups()
        .iter()
        .map(|(kind, total)| datum(json!({ "Type": kind, "Total_expenses": total })))
        .collect();

    ChartSpec::new(
        "Query 5: Type of Expense Breakdown",
        Mark::Bar,
        Encoding {
            x: Some(FieldDef::new("Type", FieldType::Nominal)),
            y: Some(FieldDef::new("Total_expenses", FieldType::Quantitative)),
            color: Some(ColorEncoding::Field(
                FieldDef::new("Type", FieldType::Nominal).with_palette(),
            )),
            ..Encoding::default()
        },
        values,
    )
}

/// Query 6: Target_sales and Sales per Product, from the melted view.
pub fn target_vs_actual(melted: &[MeltedRow]) -> ChartSpec {
    let values = melted
        .iter()
        .map(|row| {
            datum(json!({
                "Product": row.product,
                "variable": row.variable,
                "value": row.value,
            }))
        })
        .collect();

    ChartSpec::new(
        "Query 6: Product-wise Target vs. Actual Sales",
        Mark::Bar,
        Encoding {
            x: Some(FieldDef::new("Product", FieldType::Nominal)),
            y: Some(FieldDef::new("value", FieldType::Quantitative)),
            color: Some(ColorEncoding::Field(
                FieldDef::new("variable", FieldType::Nominal).with_palette(),
            )),
            ..Encoding::default()
        },
        values,
    )
}
