// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

mod aggregate;
mod chart;
mod config;
mod dashboard;
mod error;
mod filter;
mod loader;
mod models;
mod page;
mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::filter::{FilterOptions, FilterSelection};
use crate::loader::DataSource;
use crate::models::Dimension;

#[derive(Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Render the sales and marketing dashboard as static HTML")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, filter and chart the dataset, then write the page
    Render {
        #[command(flatten)]
        filters: FilterArgs,

        /// CSV location (URL or local path)
        #[arg(long)]
        data: Option<String>,

        /// Directory for index.html and the chart files
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the values offered for each filter
    Options {
        /// CSV location (URL or local path)
        #[arg(long)]
        data: Option<String>,
    },

    /// Write a config.toml with the default settings
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Product lines to keep (repeatable or comma-separated)
    #[arg(long = "product-line", value_delimiter = ',')]
    product_lines: Vec<String>,

    /// Area codes to keep
    #[arg(long = "area-code", value_delimiter = ',')]
    area_codes: Vec<String>,

    /// Product types to keep
    #[arg(long = "product-type", value_delimiter = ',')]
    product_types: Vec<String>,

    /// States to keep
    #[arg(long = "state", value_delimiter = ',')]
    states: Vec<String>,
}

impl FilterArgs {
    fn values(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::ProductLine => &self.product_lines,
            Dimension::AreaCode => &self.area_codes,
            Dimension::ProductType => &self.product_types,
            Dimension::State => &self.states,
        }
    }

    /// Flags win per dimension; the config fills in the rest.
    fn to_selection(&self, config: &Config) -> FilterSelection {
        Dimension::ALL
            .iter()
            .fold(FilterSelection::new(), |selection, dimension| {
                let flags = self.values(*dimension);
                let values = if flags.is_empty() {
                    config.filters.values(*dimension)
                } else {
                    flags
                };
                selection.with(
                    *dimension,
                    values
                        .iter()
                        .map(|v| v.trim())
                        .filter(|v| !v.is_empty())
                        .map(str::to_string),
                )
            })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Render {
            filters,
            data,
            output,
        } => {
            let config = config::apply_env(config::load_config(config_path)?);
            let selection = filters.to_selection(&config);
            let source = DataSource::parse(data.as_deref().unwrap_or(&config.data_url));
            let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
            render(&source, &selection, &output_dir).await
        }
        Commands::Options { data } => {
            let config = config::apply_env(config::load_config(config_path)?);
            let source = DataSource::parse(data.as_deref().unwrap_or(&config.data_url));
            list_options(&source).await
        }
        Commands::Init { force } => {
            let path = config::init_config(config_path, force)?;
            println!("✅ Config written to {}", path.display());
            Ok(())
        }
    }
}

async fn render(source: &DataSource, selection: &FilterSelection, output_dir: &Path) -> Result<()> {
    println!("Loading sales data from {} ⌛️", source);
    let page = dashboard::render_dashboard(source, selection).await;
    page.write_to(output_dir)
        .with_context(|| format!("Failed to write dashboard to {}", output_dir.display()))?;

    let index = output_dir.join("index.html");
    if let Some(message) = &page.error {
        eprintln!("❌ {}", message);
        anyhow::bail!("dashboard rendered with an error, see {}", index.display());
    }

    println!(
        "Showing {} of {} rows across {} charts",
        page.rows_shown,
        page.rows_total,
        page.charts().count()
    );
    for (i, chart) in page.charts().enumerate() {
        println!("  chart_{}: {}", i + 1, chart.subheader);
    }
    for warning in page.warnings() {
        eprintln!("⚠️  {}", warning);
    }
    println!("\n✅ Dashboard written to {}", index.display());
    Ok(())
}

async fn list_options(source: &DataSource) -> Result<()> {
    let dataset = loader::load_dataset(source)
        .await
        .map_err(|e| anyhow::anyhow!(e.banner()))?;
    let options = FilterOptions::from_dataset(&dataset);

    for (dimension, values) in options.iter() {
        println!("{} ({}):", dimension.label(), dimension.column());
        for value in values {
            println!("  {}", value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated_and_repeated_flags() {
        let cli = Cli::parse_from([
            "sales-dashboard",
            "render",
            "--product-line",
            "Beans,Leaves",
            "--state",
            "Colorado",
            "--state",
            "Texas",
        ]);
        let Commands::Render { filters, .. } = cli.command else {
            panic!("expected render");
        };
        let selection = filters.to_selection(&Config::default());

        assert_eq!(selection.values(Dimension::ProductLine).len(), 2);
        assert!(selection.values(Dimension::State).contains("Texas"));
        assert!(selection.values(Dimension::AreaCode).is_empty());
    }

    #[test]
    fn test_init_force_flag() {
        let cli = Cli::parse_from(["sales-dashboard", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init { force: true }));

        let cli = Cli::parse_from(["sales-dashboard", "--config", "site.toml", "init"]);
        assert!(matches!(cli.command, Commands::Init { force: false }));
        assert_eq!(cli.config, Some(PathBuf::from("site.toml")));
    }

    #[test]
    fn test_flags_override_config_per_dimension() {
        let mut config = Config::default();
        config.filters.states = vec!["Utah".to_string()];
        config.filters.area_codes = vec!["303".to_string()];
        let args = FilterArgs {
            states: vec!["Colorado".to_string()],
            ..FilterArgs::default()
        };
        let selection = args.to_selection(&config);

        assert!(selection.values(Dimension::State).contains("Colorado"));
        assert!(!selection.values(Dimension::State).contains("Utah"));
        assert!(selection.values(Dimension::AreaCode).contains("303"));
    }
}
