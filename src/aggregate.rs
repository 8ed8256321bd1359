// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::BTreeMap;

use crate::models::SalesRecord;

/// Sums per category key, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    groups: Vec<(String, f64)>,
}

impl AggregateResult {
    fn sum_by<K, V>(rows: &[SalesRecord], key: K, value: V) -> Self
    where
        K: Fn(&SalesRecord) -> &str,
        V: Fn(&SalesRecord) -> f64,
    {
        let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
        for record in rows {
            *sums.entry(key(record)).or_insert(0.0) += value(record);
        }
        Self {
            groups: sums
                .into_iter()
                .map(|(k, total)| (k.to_string(), total))
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.groups
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, total)| *total)
    }

    pub fn groups(&self) -> &[(String, f64)] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn total(&self) -> f64 {
        self.groups.iter().map(|(_, total)| total).sum()
    }
}

/// Total Sales per Product_line.
pub fn sum_by_product_line(view: &[SalesRecord]) -> AggregateResult {
    AggregateResult::sum_by(view, |r| r.product_line.as_str(), |r| r.sales)
}

/// Total Total_expenses per Type.
pub fn sum_expense_by_type(view: &[SalesRecord]) -> AggregateResult {
    AggregateResult::sum_by(view, |r| r.kind.as_str(), |r| r.total_expenses)
}

pub const TARGET_SALES_VARIABLE: &str = "Target_sales";
pub const SALES_VARIABLE: &str = "Sales";

/// One long-format observation of the target-vs-actual reshape.
#[derive(Debug, Clone, PartialEq)]
pub struct MeltedRow {
    pub product: String,
    pub variable: &'static str,
    /// `None` when the Target_sales cell was blank.
    pub value: Option<f64>,
}

/// Unpivot Target_sales and Sales keyed by Product.
///
/// Emits every Target_sales observation in row order, then every Sales
/// observation, so `2 * view.len()` rows in total.
pub fn reshape_target_vs_actual(view: &[SalesRecord]) -> Vec<MeltedRow> {
    let targets = view.iter().map(|r| MeltedRow {
        product: r.product.clone(),
        variable: TARGET_SALES_VARIABLE,
        value: r.target_sales,
    });
    let actuals = view.iter().map(|r| MeltedRow {
        product: r.product.clone(),
        variable: SALES_VARIABLE,
        value: Some(r.sales),
    });
    targets.chain(actuals).collect()
}
