//! Nearest reference feature to a query point, constrained to a study area.

use geo::{Contains, Point, Polygon};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::error::{EngineError, Result};
use crate::feature::Feature;
use crate::geom::haversine_m;

/// Extra chord length, on the unit sphere, admitted past the closest
/// candidate so that rounding in the 3-D coordinates cannot hide an
/// equally close feature. About 6 µm on the ground.
const CHORD_SLACK: f64 = 1e-12;

/// A feature anchor on the unit sphere, associated with a Feature by index.
#[derive(Debug, Clone)]
struct Anchor {
    idx: usize, // Index of corresponding Feature in the collection
    point: Point<f64>,
    xyz: [f64; 3],
}

impl RTreeObject for Anchor {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope { AABB::from_point(self.xyz) }
}

impl PointDistance for Anchor {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        self.xyz.iter().zip(point).map(|(a, b)| (a - b) * (a - b)).sum()
    }
}

/// Unit vector of a lon/lat point. Chord length between two such vectors
/// grows strictly with great-circle distance, so R-tree order matches it.
fn unit_vector(point: Point<f64>) -> [f64; 3] {
    let (lon, lat) = (point.x().to_radians(), point.y().to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Read-only reference collection with an R-tree over feature anchors.
#[derive(Debug, Clone)]
pub struct NearestIndex {
    features: Vec<Feature>,
    rtree: RTree<Anchor>,
}

/// Nearest match within one collection.
#[derive(Debug, Clone, Copy)]
pub struct Nearest<'a> {
    /// Position of the feature in its collection.
    pub idx: usize,
    pub feature: &'a Feature,
    /// Great-circle distance from the query to the feature anchor.
    pub distance_m: f64,
}

impl NearestIndex {
    /// Index a collection. Features without an anchor (empty polygons) are never returned.
    pub fn new(features: Vec<Feature>) -> Self {
        let rtree = RTree::bulk_load(
            features.iter().enumerate()
                .filter_map(|(idx, f)| f.anchor().map(|point| Anchor { idx, point, xyz: unit_vector(point) }))
                .collect()
        );

        Self { features, rtree }
    }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline] pub fn features(&self) -> &[Feature] { &self.features }

    /// Closest feature to `query` by great-circle distance. Equidistant
    /// candidates resolve to the one that comes first in the collection.
    pub fn nearest(&self, query: Point<f64>) -> Option<Nearest<'_>> {
        let mut candidates = self.rtree.nearest_neighbor_iter_with_distance_2(&unit_vector(query));
        let (first, best) = candidates.next()?;
        let limit = (best.sqrt() + CHORD_SLACK).powi(2);

        let (idx, distance_m) = std::iter::once(first)
            .chain(candidates.take_while(|(_, d2)| *d2 <= limit).map(|(anchor, _)| anchor))
            .map(|anchor| (anchor.idx, haversine_m(query, anchor.point)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))?;

        Some(Nearest { idx, feature: &self.features[idx], distance_m })
    }
}

/// Boundary constraining valid query points.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyArea(Polygon<f64>);

impl StudyArea {
    pub fn new(boundary: Polygon<f64>) -> Self { Self(boundary) }

    #[inline] pub fn boundary(&self) -> &Polygon<f64> { &self.0 }

    /// Strict containment: points on the boundary are outside.
    pub fn check(&self, point: Point<f64>) -> Result<()> {
        if self.0.contains(&point) { Ok(()) }
        else { Err(EngineError::OutOfBounds { lat: point.y(), lon: point.x() }) }
    }
}

/// Nearest feature from each collection, in collection order. Queries
/// outside the study area are rejected before any lookup.
pub fn nearest<'a>(
    query: Point<f64>,
    collections: &[&'a NearestIndex],
    study_area: &StudyArea,
) -> Result<Vec<Option<Nearest<'a>>>> {
    study_area.check(query)?;
    Ok(collections.iter().map(|index| index.nearest(query)).collect())
}
