pub mod geojson;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::EngineConfig;
use crate::nearest::{NearestIndex, StudyArea};

/// Read-only data the engine is configured with: the study-area boundary
/// and the two reference collections.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub study_area: StudyArea,
    pub sites: NearestIndex,
    pub schools: NearestIndex,
}

/// Load the study area and both reference collections named in `config`.
pub fn load_reference(config: &EngineConfig) -> Result<ReferenceData> {
    let study_area = read_file(&config.study_area)
        .and_then(|bytes| geojson::read_boundary(&bytes)
            .with_context(|| format!("Failed to read study area {}", config.study_area.display())))?;
    let sites = read_file(&config.sites)
        .and_then(|bytes| geojson::read_features(&bytes)
            .with_context(|| format!("Failed to read sites {}", config.sites.display())))?;
    let schools = read_file(&config.schools)
        .and_then(|bytes| geojson::read_features(&bytes)
            .with_context(|| format!("Failed to read schools {}", config.schools.display())))?;

    tracing::info!(sites = sites.len(), schools = schools.len(), "loaded reference data");

    Ok(ReferenceData {
        study_area: StudyArea::new(study_area),
        sites: NearestIndex::new(sites),
        schools: NearestIndex::new(schools),
    })
}

/// Read a whole file, naming it in the error.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
