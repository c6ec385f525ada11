use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ahp::PairwiseMatrix;
use crate::criteria::{Criterion, CRITERIA};

/// Engine configuration supplied by the shell. Everything here is read-only
/// input: criteria order, seed comparisons, study area and reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Display names of the criteria, in weight-vector order.
    pub criteria: Vec<String>,
    /// Initial pairwise comparison matrix, row-major.
    pub seed_matrix: [[f64; CRITERIA]; CRITERIA],
    /// Decimal places weights are rounded to before scoring.
    pub weight_decimals: u32,
    /// GeoJSON boundary of the study area.
    pub study_area: PathBuf,
    /// GeoJSON FeatureCollection of attributed candidate sites.
    pub sites: PathBuf,
    /// GeoJSON FeatureCollection of schools.
    pub schools: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            criteria: Criterion::ALL.iter().map(ToString::to_string).collect(),
            seed_matrix: [
                [1.0,   2.0,   3.0,   4.0,   5.0, 6.0],
                [0.5,   1.0,   3.0,   2.0,   5.0, 4.0],
                [0.333, 0.333, 1.0,   2.0,   3.0, 4.0],
                [0.25,  0.5,   0.5,   1.0,   2.0, 3.0],
                [0.2,   0.2,   0.333, 0.5,   1.0, 2.0],
                [0.167, 0.25,  0.25,  0.333, 0.5, 1.0],
            ],
            weight_decimals: 3,
            study_area: PathBuf::from("data/study_area.geojson"),
            sites: PathBuf::from("data/sites.geojson"),
            schools: PathBuf::from("data/schools.geojson"),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; relative data paths resolve against `base`.
    pub fn from_json(bytes: &[u8], base: Option<&Path>) -> Result<Self> {
        let mut config: Self = serde_json::from_slice(bytes).context("Failed to parse engine config")?;
        if let Some(base) = base {
            for path in [&mut config.study_area, &mut config.sites, &mut config.schools] {
                if path.is_relative() { *path = base.join(&*path) }
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = crate::io::read_file(path)?;
        Self::from_json(&bytes, path.parent())
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// The criteria list is fixed; a config may rename nothing and reorder nothing.
    pub fn validate(&self) -> Result<()> {
        let expected = Criterion::ALL.iter().map(ToString::to_string).collect::<Vec<_>>();
        if self.criteria != expected {
            bail!("criteria must be {expected:?}, got {:?}", self.criteria);
        }
        if self.weight_decimals > 12 {
            bail!("weight_decimals must be at most 12, got {}", self.weight_decimals);
        }
        Ok(())
    }

    /// The seed matrix, checked for the diagonal and reciprocal invariants.
    pub fn seed_matrix(&self) -> crate::error::Result<PairwiseMatrix> {
        PairwiseMatrix::from_rows(self.seed_matrix)
    }
}
