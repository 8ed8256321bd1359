// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! The dashboard page: sidebar of filter controls, one section per chart,
//! and warning/error banners. Written to disk as static HTML.

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::{Path, PathBuf};

use crate::chart::ChartSpec;

pub const PAGE_TITLE: &str = "Sales and Marketing Dashboard";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; color: #1f2933; }
aside.sidebar { width: 240px; padding: 16px; background: #f0f7f2; min-height: 100vh; }
aside.sidebar label { display: block; font-weight: bold; margin: 12px 0 4px; }
aside.sidebar select { width: 100%; min-height: 80px; }
main { padding: 16px 32px; }
h2 { font-size: 1.1em; margin-top: 32px; }
.banner { padding: 12px 16px; border-radius: 4px; margin: 16px 0; }
.banner.error { background: #fde8e8; color: #9b1c1c; }
.banner.warning { background: #fdf6b2; color: #723b13; }
.caption { color: #52606d; }
"#;

/// One multi-select control in the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarControl {
    pub label: &'static str,
    pub column: &'static str,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChartSection {
    pub subheader: String,
    pub spec: ChartSpec,
    pub svg: String,
}

#[derive(Debug, Clone)]
pub enum Section {
    Chart(ChartSection),
    Warning(String),
}

#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub sidebar: Vec<SidebarControl>,
    pub sections: Vec<Section>,
    /// Rows in the filtered view and in the full dataset.
    pub rows_shown: usize,
    pub rows_total: usize,
    /// When set the page shows only this banner.
    pub error: Option<String>,
}

impl Page {
    pub fn new(
        sidebar: Vec<SidebarControl>,
        sections: Vec<Section>,
        rows_shown: usize,
        rows_total: usize,
    ) -> Self {
        Self {
            title: PAGE_TITLE.to_string(),
            sidebar,
            sections,
            rows_shown,
            rows_total,
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            title: PAGE_TITLE.to_string(),
            sidebar: Vec::new(),
            sections: Vec::new(),
            rows_shown: 0,
            rows_total: 0,
            error: Some(message),
        }
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSection> {
        self.sections.iter().filter_map(|s| match s {
            Section::Chart(chart) => Some(chart),
            Section::Warning(_) => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().filter_map(|s| match s {
            Section::Warning(message) => Some(message.as_str()),
            Section::Chart(_) => None,
        })
    }

    pub fn to_html(&self) -> String {
        self.markup().into_string()
    }

    fn markup(&self) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    @if let Some(message) = &self.error {
                        main {
                            div.banner.error { (message) }
                        }
                    } @else {
                        aside.sidebar {
                            @for control in &self.sidebar {
                                label for=(control.column) { (control.label) }
                                select id=(control.column) name=(control.column) multiple {
                                    @for option in &control.options {
                                        option value=(option) selected[control.selected.contains(option)] {
                                            (option)
                                        }
                                    }
                                }
                            }
                        }
                        main {
                            h1 { (self.title) }
                            p.caption {
                                "Showing " (self.rows_shown) " of " (self.rows_total) " rows"
                            }
                            @for section in &self.sections {
                                @match section {
                                    Section::Chart(chart) => {
                                        h2 { (chart.subheader) }
                                        figure { (PreEscaped(&chart.svg)) }
                                    }
                                    Section::Warning(message) => {
                                        div.banner.warning { (message) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Write `index.html` plus `chart_<n>.svg` and `chart_<n>.vl.json` per
    /// chart into `dir`. Chart files from an earlier render are removed first.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        remove_stale_charts(dir)?;

        let mut written = Vec::new();
        for (i, chart) in self.charts().enumerate() {
            let svg_path = dir.join(format!("chart_{}.svg", i + 1));
            fs::write(&svg_path, &chart.svg)
                .with_context(|| format!("Failed to write {}", svg_path.display()))?;
            written.push(svg_path);

            let spec_path = dir.join(format!("chart_{}.vl.json", i + 1));
            fs::write(&spec_path, chart.spec.to_json()?)
                .with_context(|| format!("Failed to write {}", spec_path.display()))?;
            written.push(spec_path);
        }

        let index = dir.join("index.html");
        fs::write(&index, self.to_html())
            .with_context(|| format!("Failed to write {}", index.display()))?;
        written.push(index);

        Ok(written)
    }
}

fn remove_stale_charts(dir: &Path) -> Result<()> {
    let pattern = dir.join("chart_*");
    let pattern = pattern.to_string_lossy();
    for entry in glob::glob(&pattern).context("Invalid output directory pattern")? {
        let path = entry?;
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}
