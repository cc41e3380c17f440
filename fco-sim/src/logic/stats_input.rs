//! Building a stat table from command-line flags and JSON files.
use anyhow::{Context, Result, bail};
use clap::Args;
use fco_core::{PositionCatalog, StatTable};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Stat inputs shared by the scoring subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct StatsArgs {
    /// Stat value as NAME=VALUE (repeatable)
    #[arg(long = "stat", value_name = "NAME=VALUE")]
    pub stats: Vec<String>,

    /// JSON file mapping stat names to values
    #[arg(long = "stats", value_name = "FILE")]
    pub stats_file: Option<PathBuf>,

    /// Value for every known stat not set otherwise
    #[arg(long, value_name = "VALUE")]
    pub fill: Option<i32>,
}

/// Parse one `NAME=VALUE` pair.
///
/// # Errors
///
/// Returns an error for a missing `=`, an empty name or a non-integer value.
pub fn parse_stat_pair(token: &str) -> Result<(String, i32)> {
    let Some((name, value)) = token.split_once('=') else {
        bail!("expected NAME=VALUE, got {token:?}");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("stat name missing in {token:?}");
    }
    let value = value
        .trim()
        .parse::<i32>()
        .with_context(|| format!("invalid value for stat {name}"))?;
    Ok((name.to_string(), value))
}

/// Read a `{"stat": value}` JSON object.
///
/// # Errors
///
/// Returns an error when the file cannot be read or is not a flat object of integers.
pub fn load_stats_file(path: &std::path::Path) -> Result<StatTable> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read stats file {}", path.display()))?;
    let table: HashMap<String, i32> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse stats file {}", path.display()))?;
    Ok(table)
}

impl StatsArgs {
    /// Fill first, then the file, then individual pairs; later sources win.
    ///
    /// # Errors
    ///
    /// Propagates file and pair parsing errors.
    pub fn build(&self, catalog: &PositionCatalog) -> Result<StatTable> {
        let mut table = StatTable::new();
        if let Some(value) = self.fill {
            for stat in catalog.all_stat_names() {
                table.insert(stat.to_string(), value);
            }
        }
        if let Some(path) = &self.stats_file {
            table.extend(load_stats_file(path)?);
        }
        for token in &self.stats {
            let (name, value) = parse_stat_pair(token)?;
            table.insert(name, value);
        }

        if table.is_empty() {
            log::warn!("no stats given; every stat scores as 0");
        }
        let known = catalog.all_stat_names();
        for name in table.keys() {
            if !known.contains(&name.as_str()) {
                log::warn!("stat {name} is not weighted by any position");
            }
        }
        Ok(table)
    }
}
