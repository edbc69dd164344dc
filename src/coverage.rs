//! Coverage and gap statistics over annotated observation data.
//!
//! Consumes frames already carrying the standardized territory columns
//! (see [`crate::annotate`]) and computes, per (variable, year), how many
//! territories at the chosen level actually have a value. No name
//! resolution happens here; the standardized columns are taken as given.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use polars::prelude::*;
use serde::Serialize;

use crate::annotate::{LEVEL_COL, PROVINCE_COL, REGION_COL};
use crate::error::{Result, TerritoryError};

pub const VARIABLE_COL: &str = "variable";
pub const YEAR_COL: &str = "year";
pub const VALUE_COL: &str = "value";

/// Territorial level coverage is computed at. Macro-areas are too few to
/// make a meaningful coverage grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageLevel {
    Province,
    Region,
}

impl CoverageLevel {
    pub fn territory_col(&self) -> &'static str {
        match self {
            CoverageLevel::Province => PROVINCE_COL,
            CoverageLevel::Region => REGION_COL,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            CoverageLevel::Province => "province",
            CoverageLevel::Region => "region",
        }
    }
}

/// What counts as the expected territory universe for a variable-year cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedUniverse {
    /// Every territory observed anywhere in the frame.
    All,
    /// Only territories observed in that same year.
    ByYear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRecord {
    pub level: &'static str,
    pub variable: String,
    pub year: i64,
    pub present_count: usize,
    pub expected_count: usize,
    pub missing_count: usize,
    /// `present / expected`, absent when the expected universe is empty.
    pub coverage: Option<f64>,
}

struct Observation {
    variable: String,
    year: i64,
    territory: String,
    has_value: bool,
}

/// Pull the level-filtered observations out of the frame, skipping rows
/// with a null variable, year or territory (they belong to no cell).
fn extract_observations(df: &DataFrame, level: CoverageLevel) -> Result<Vec<Observation>> {
    let territory_col = level.territory_col();
    for required in [VARIABLE_COL, YEAR_COL, VALUE_COL, LEVEL_COL, territory_col] {
        if df.column(required).is_err() {
            return Err(TerritoryError::Coverage(format!(
                "required column '{required}' not found"
            )));
        }
    }

    let variables = df.column(VARIABLE_COL)?.cast(&DataType::String)?;
    let variables = variables.str()?;
    let years = df.column(YEAR_COL)?.cast(&DataType::Int64)?;
    let years = years.i64()?;
    let levels = df.column(LEVEL_COL)?.cast(&DataType::String)?;
    let levels = levels.str()?;
    let territories = df.column(territory_col)?.cast(&DataType::String)?;
    let territories = territories.str()?;
    let value_present = df.column(VALUE_COL)?.is_not_null();

    let mut observations = Vec::new();
    for i in 0..df.height() {
        if levels.get(i) != Some(level.tag()) {
            continue;
        }
        let (Some(variable), Some(year), Some(territory)) =
            (variables.get(i), years.get(i), territories.get(i))
        else {
            continue;
        };
        observations.push(Observation {
            variable: variable.to_string(),
            year,
            territory: territory.to_string(),
            has_value: value_present.get(i).unwrap_or(false),
        });
    }
    Ok(observations)
}

/// Coverage per variable-year cell at the chosen territorial level,
/// sorted by (variable, year).
pub fn compute_coverage(
    df: &DataFrame,
    level: CoverageLevel,
    expected: ExpectedUniverse,
) -> Result<Vec<CoverageRecord>> {
    let observations = extract_observations(df, level)?;

    let universe: HashSet<&str> = observations
        .iter()
        .map(|o| o.territory.as_str())
        .collect();
    let mut universe_by_year: BTreeMap<i64, HashSet<&str>> = BTreeMap::new();
    for obs in &observations {
        universe_by_year
            .entry(obs.year)
            .or_default()
            .insert(obs.territory.as_str());
    }

    // Every observed (variable, year) cell appears, even when all its
    // values are null.
    let mut present: BTreeMap<(String, i64), HashSet<&str>> = BTreeMap::new();
    for obs in &observations {
        let cell = present
            .entry((obs.variable.clone(), obs.year))
            .or_default();
        if obs.has_value {
            cell.insert(obs.territory.as_str());
        }
    }

    let mut records = Vec::with_capacity(present.len());
    for ((variable, year), territories) in present {
        let expected_count = match expected {
            ExpectedUniverse::All => universe.len(),
            ExpectedUniverse::ByYear => {
                universe_by_year.get(&year).map_or(0, HashSet::len)
            }
        };
        let present_count = territories.len();
        let coverage = if expected_count > 0 {
            Some((present_count as f64 / expected_count as f64).clamp(0.0, 1.0))
        } else {
            None
        };
        records.push(CoverageRecord {
            level: level.tag(),
            variable,
            year,
            present_count,
            expected_count,
            missing_count: expected_count.saturating_sub(present_count),
            coverage,
        });
    }
    Ok(records)
}

/// Variable-year cells whose coverage falls below `threshold`.
/// With the default threshold of 1.0 this lists every cell with any gap.
pub fn find_gaps(coverage: &[CoverageRecord], threshold: f64) -> Vec<CoverageRecord> {
    coverage
        .iter()
        .filter(|r| r.coverage.is_some_and(|c| c < threshold))
        .cloned()
        .collect()
}

/// The explicit, sorted list of territories missing a value for one
/// variable-year cell.
pub fn missing_territories(
    df: &DataFrame,
    variable: &str,
    year: i64,
    level: CoverageLevel,
    expected: ExpectedUniverse,
) -> Result<Vec<String>> {
    let observations = extract_observations(df, level)?;

    let universe: BTreeSet<&str> = observations
        .iter()
        .filter(|o| match expected {
            ExpectedUniverse::All => true,
            ExpectedUniverse::ByYear => o.year == year,
        })
        .map(|o| o.territory.as_str())
        .collect();

    let present: HashSet<&str> = observations
        .iter()
        .filter(|o| o.variable == variable && o.year == year && o.has_value)
        .map(|o| o.territory.as_str())
        .collect();

    Ok(universe
        .into_iter()
        .filter(|t| !present.contains(t))
        .map(str::to_string)
        .collect())
}
