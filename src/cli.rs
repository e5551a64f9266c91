//! Command-line interface argument parsing.

use crate::config::Config;
use crate::filter::{CountrySelector, FatalityFilter, Selectors, TriggerSelection, YearRange};
use crate::records::Table;
use clap::Parser;
use std::path::PathBuf;

/// landslide-dash - explore landslide event catalogues in the terminal
///
/// Examples:
///   landslide-dash --data data/landslide.csv
///   landslide-dash --summary --from 2010 --to 2015 --country Nepal
///   landslide-dash --summary --trigger rain --trigger monsoon --fatality fatal-only
///   landslide-dash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CSV file with landslide events
    #[arg(short, long, value_name = "FILE", env = "LANDSLIDE_DATA")]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for landslide-dash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory with Natural Earth GeoJSON files for the map backdrop
    #[arg(long, value_name = "DIR")]
    pub map_data: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Print the views as text instead of starting the dashboard
    #[arg(long)]
    pub summary: bool,

    /// First year to include (summary mode)
    #[arg(long, value_name = "YEAR", requires = "summary")]
    pub from: Option<i32>,

    /// Last year to include (summary mode)
    #[arg(long, value_name = "YEAR", requires = "summary")]
    pub to: Option<i32>,

    /// Country to include, or "All" (summary mode)
    #[arg(long, value_name = "NAME", requires = "summary")]
    pub country: Option<String>,

    /// Trigger to include; repeat for several (summary mode)
    #[arg(long = "trigger", value_name = "NAME", requires = "summary")]
    pub triggers: Vec<String>,

    /// Fatality status filter (summary mode)
    #[arg(long, value_name = "STATUS", requires = "summary")]
    pub fatality: Option<FatalityFilter>,

    /// Generate a default landslide-dash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate flag combinations clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(format!("--from ({from}) must not be after --to ({to})"));
            }
        }
        Ok(())
    }

    /// Apply flag overrides on top of the file configuration.
    pub fn merge_into(&self, config: &mut Config) {
        if let Some(data) = &self.data {
            config.data.path = data.clone();
        }
        if let Some(dir) = &self.map_data {
            config.map.data_dir = dir.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }

    /// Selectors described by the summary-mode flags. Missing year bounds
    /// default to the table's observed range.
    pub fn selectors(&self, table: &Table) -> Selectors {
        let defaults = Selectors::defaults_for(table);
        let years = match (defaults.years, self.from, self.to) {
            (Some(range), from, to) => Some(YearRange::new(
                from.unwrap_or(range.min),
                to.unwrap_or(range.max),
            )),
            (None, Some(from), Some(to)) => Some(YearRange::new(from, to)),
            (None, _, _) => None,
        };

        Selectors {
            years,
            country: self
                .country
                .as_deref()
                .map_or(CountrySelector::All, CountrySelector::from_label),
            triggers: if self.triggers.is_empty() {
                TriggerSelection::all()
            } else {
                TriggerSelection::from_labels(&self.triggers)
            },
            fatality: self.fatality.unwrap_or_default(),
        }
    }
}
