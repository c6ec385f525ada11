use geo::{Centroid, Point, Polygon};
use serde_json::{Map, Value};

use crate::criteria::{Criterion, CRITERIA};
use crate::score::Category;

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
}

/// An attributed reference feature (candidate site or school).
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: FeatureGeometry,
    /// Per-criterion ranks, indexed by `Criterion::index`; `None` when absent from the source data.
    pub ranks: [Option<f64>; CRITERIA],
    /// Every other source property, kept verbatim (ids, school names, categories).
    pub properties: Map<String, Value>,
    /// Derived suitability index; `None` until scored or when a rank is missing.
    pub index: Option<i64>,
    pub accessibility: Option<Category>,
}

impl Feature {
    pub fn new(geometry: FeatureGeometry) -> Self {
        Self {
            geometry,
            ranks: [None; CRITERIA],
            properties: Map::new(),
            index: None,
            accessibility: None,
        }
    }

    /// Builder-style rank assignment.
    pub fn with_rank(mut self, criterion: Criterion, rank: f64) -> Self {
        self.ranks[criterion.index()] = Some(rank);
        self
    }

    #[inline] pub fn rank(&self, criterion: Criterion) -> Option<f64> { self.ranks[criterion.index()] }

    /// All six ranks, or `None` if any is missing.
    pub fn complete_ranks(&self) -> Option<[f64; CRITERIA]> {
        let mut out = [0.0; CRITERIA];
        for (slot, rank) in out.iter_mut().zip(self.ranks) {
            *slot = rank?;
        }
        Some(out)
    }

    /// Point used for distance queries: the point itself, or a polygon's centroid.
    pub fn anchor(&self) -> Option<Point<f64>> {
        match &self.geometry {
            FeatureGeometry::Point(point) => Some(*point),
            FeatureGeometry::Polygon(polygon) => polygon.centroid(),
        }
    }

    /// Convenience accessor for string properties such as a school name.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}
