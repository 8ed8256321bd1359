// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use tracing::{debug, warn};

use crate::aggregate::{reshape_target_vs_actual, sum_by_product_line, sum_expense_by_type};
use crate::chart::{self, ChartSpec};
use crate::error::{DashboardError, DashboardResult};
use crate::filter::{self, FilterOptions, FilterSelection};
use crate::loader::{load_dataset, DataSource};
use crate::models::{Dataset, TARGET_SALES_COLUMN};
use crate::page::{ChartSection, Page, Section, SidebarControl};
use crate::render::render_svg;

/// Load the dataset and build the page. Any failure becomes an error page
/// carrying the banner for that failure.
pub async fn render_dashboard(source: &DataSource, selection: &FilterSelection) -> Page {
    let result = match load_dataset(source).await {
        Ok(dataset) => build_page(&dataset, selection),
        Err(e) => Err(e),
    };

    match result {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "dashboard failed");
            Page::error(e.banner())
        }
    }
}

/// Build the full page for one (dataset, selection) pair.
pub fn build_page(dataset: &Dataset, selection: &FilterSelection) -> DashboardResult<Page> {
    if dataset.is_empty() {
        return Err(DashboardError::EmptyDataset);
    }

    let options = FilterOptions::from_dataset(dataset);
    for (dimension, value) in options.unknown_selections(selection) {
        warn!(
            column = dimension.column(),
            value, "selected value does not occur in the dataset"
        );
    }

    let view = filter::apply(dataset.records(), selection);
    debug!(rows = view.len(), total = dataset.len(), "filter applied");

    let sales_by_line = sum_by_product_line(&view);
    let expenses_by_type = sum_expense_by_type(&view);
    debug!(
        product_lines = sales_by_line.len(),
        sales = sales_by_line.total(),
        types = expenses_by_type.len(),
        expenses = expenses_by_type.total(),
        "aggregated view"
    );

    let specs = [
        chart::sales_over_time(&view),
        chart::product_profitability(&view),
        chart::marketing_vs_sales(&view),
        chart::sales_contribution(&sales_by_line),
        chart::expense_breakdown(&expenses_by_type),
    ];
    let mut sections = specs
        .into_iter()
        .map(chart_section)
        .collect::<DashboardResult<Vec<_>>>()?;

    if dataset.has_target_sales() {
        let melted = reshape_target_vs_actual(&view);
        sections.push(chart_section(chart::target_vs_actual(&melted))?);
    } else {
        warn!("{} column missing, skipping target vs. actual chart", TARGET_SALES_COLUMN);
        sections.push(Section::Warning(missing_column_warning(TARGET_SALES_COLUMN)));
    }

    Ok(Page::new(
        sidebar(&options, selection),
        sections,
        view.len(),
        dataset.len(),
    ))
}

pub fn missing_column_warning(column: &str) -> String {
    format!("Column '{}' not found in the dataset.", column)
}

fn chart_section(spec: ChartSpec) -> DashboardResult<Section> {
    let svg = render_svg(&spec).map_err(|e| {
        DashboardError::Unknown(format!("Failed to render '{}': {}", spec.title, e))
    })?;
    Ok(Section::Chart(ChartSection {
        subheader: spec.title.clone(),
        spec,
        svg,
    }))
}

fn sidebar(options: &FilterOptions, selection: &FilterSelection) -> Vec<SidebarControl> {
    options
        .iter()
        .map(|(dimension, values)| SidebarControl {
            label: dimension.label(),
            column: dimension.column(),
            options: values.to_vec(),
            selected: selection.values(dimension).iter().cloned().collect(),
        })
        .collect()
}
