//! The analyst's session: loaded layers, comparison matrix, weights and the
//! current point selection, passed explicitly to every engine call.

use std::path::PathBuf;

use ahash::AHashMap;
use geo::Point;
use tracing::{debug, info};

use crate::ahp::{compute_weights, PairwiseMatrix, WeightVector};
use crate::color;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::feature::Feature;
use crate::io::ReferenceData;
use crate::kml;
use crate::layer::Layer;
use crate::nearest::nearest;
use crate::overlay::{self, BufferDistance};
use crate::task::{CancelFlag, Task};

/// Owns every layer of the session. Layers are only ever appended or
/// cleared all at once.
#[derive(Debug, Default, Clone)]
pub struct GeometryStore {
    layers: Vec<Layer>,
    index: AHashMap<String, usize>, // Map between layer ids and positions in `layers`
}

impl GeometryStore {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn len(&self) -> usize { self.layers.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.layers.is_empty() }

    #[inline] pub fn layers(&self) -> &[Layer] { &self.layers }

    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.index.get(id).map(|&i| &self.layers[i])
    }

    /// Append a layer, assigning it the id `{name}_layer_{n}`.
    pub fn insert(&mut self, mut layer: Layer) -> &Layer {
        let position = self.layers.len();
        layer.id = format!("{}_layer_{}", layer.name.to_lowercase(), position + 1);
        self.index.insert(layer.id.clone(), position);
        info!(id = %layer.id, polygons = layer.polygons.len(), lines = layer.lines.len(), points = layer.points.len(), "added layer");
        self.layers.push(layer);
        &self.layers[position]
    }

    /// Show or hide a layer; returns false if the id is unknown.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.index.get(id) {
            Some(&i) => { self.layers[i].visible = visible; true }
            None => false,
        }
    }

    /// Drop every layer.
    pub fn reset(&mut self) {
        self.layers.clear();
        self.index.clear();
    }
}

/// An overlay request that can be run inline or on a background task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayOp {
    Union,
    Intersection,
    Dissolve,
    Clip,
    Buffer(BufferDistance),
}

impl OverlayOp {
    pub fn run(self, layers: &[Layer], cancel: &CancelFlag) -> Result<Layer> {
        match self {
            OverlayOp::Union => overlay::union(layers, cancel),
            OverlayOp::Intersection => overlay::intersection(layers, cancel),
            OverlayOp::Dissolve => overlay::dissolve(layers, cancel),
            OverlayOp::Clip => overlay::clip(layers, cancel),
            OverlayOp::Buffer(distance) => overlay::buffer(layers, distance, cancel),
        }
    }
}

/// Result of selecting a point on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub point: Point<f64>,
    /// Nearest candidate site, scored against the current weights.
    pub site: Option<Feature>,
    pub site_distance_m: Option<f64>,
    pub school: Option<Feature>,
    pub school_distance_m: Option<f64>,
}

pub struct Session {
    store: GeometryStore,
    working: Vec<usize>, // Store positions of the layers the next overlay reads
    matrix: PairwiseMatrix,
    weights: WeightVector,
    weight_decimals: u32,
    reference: Option<ReferenceData>,
    selection: Option<Selection>,
}

impl Session {
    /// Start a session from the configured seed matrix. Point selection
    /// needs reference data; see `with_reference`.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let matrix = config.seed_matrix()?;
        let weights = compute_weights(&matrix)?.rounded(config.weight_decimals);
        Ok(Self {
            store: GeometryStore::new(),
            working: Vec::new(),
            matrix,
            weights,
            weight_decimals: config.weight_decimals,
            reference: None,
            selection: None,
        })
    }

    /// Attach the study area and reference collections.
    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = Some(reference);
        self
    }

    #[inline] pub fn store(&self) -> &GeometryStore { &self.store }

    /// Layers the next overlay operates on: documents loaded since the last
    /// overlay, or the last overlay result alone.
    pub fn working_set(&self) -> Vec<&Layer> {
        self.working.iter().map(|&i| &self.store.layers()[i]).collect()
    }

    #[inline] pub fn matrix(&self) -> &PairwiseMatrix { &self.matrix }

    #[inline] pub fn weights(&self) -> &WeightVector { &self.weights }

    #[inline] pub fn selection(&self) -> Option<&Selection> { self.selection.as_ref() }

    #[inline] pub fn reference(&self) -> Option<&ReferenceData> { self.reference.as_ref() }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool { self.store.set_visible(id, visible) }

    /// Clear every layer. The matrix, weights and selection are kept.
    pub fn reset(&mut self) {
        info!(layers = self.store.len(), "reset geometry store");
        self.store.reset();
        self.working.clear();
    }

    /// Parse a document and add it as a new layer. On error the store is unchanged.
    pub fn load(&mut self, document: &[u8], filename: &str) -> Result<&Layer> {
        let layer = kml::parse_with_color(document, filename, color::palette(self.store.len()))?;
        Ok(self.push_working(layer))
    }

    fn push_working(&mut self, layer: Layer) -> &Layer {
        self.working.push(self.store.len());
        self.store.insert(layer)
    }

    fn owned_working_set(&self) -> Vec<Layer> {
        self.working_set().into_iter().cloned().collect()
    }

    /// Read and parse a document on a background thread. Commit the joined
    /// layer with `commit_load`; it is recolored there to match its load order.
    pub fn spawn_load(path: PathBuf) -> Task<Layer> {
        Task::spawn(move |cancel| {
            let bytes = std::fs::read(&path)?;
            cancel.check()?;
            let filename = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            kml::parse(&bytes, &filename)
        })
    }

    /// Run an overlay on the working set and insert its result, which then
    /// becomes the whole working set.
    pub fn apply(&mut self, op: OverlayOp) -> Result<&Layer> {
        let layer = op.run(&self.owned_working_set(), &CancelFlag::new())?;
        Ok(self.commit_result(layer))
    }

    /// Run an overlay on a snapshot of the working set in the background.
    pub fn spawn_overlay(&self, op: OverlayOp) -> Task<Layer> {
        let snapshot = self.owned_working_set();
        Task::spawn(move |cancel| op.run(&snapshot, cancel))
    }

    /// Insert a document layer from a joined `spawn_load` task, colored by
    /// load order, and add it to the working set.
    pub fn commit_load(&mut self, mut layer: Layer) -> &Layer {
        layer.color = color::palette(self.store.len());
        self.push_working(layer)
    }

    /// Insert an overlay result from a joined `spawn_overlay` task. It
    /// replaces the working set.
    pub fn commit_result(&mut self, layer: Layer) -> &Layer {
        self.working.clear();
        self.push_working(layer)
    }

    pub fn union(&mut self) -> Result<&Layer> { self.apply(OverlayOp::Union) }

    pub fn intersect(&mut self) -> Result<&Layer> { self.apply(OverlayOp::Intersection) }

    pub fn dissolve(&mut self) -> Result<&Layer> { self.apply(OverlayOp::Dissolve) }

    pub fn clip(&mut self) -> Result<&Layer> { self.apply(OverlayOp::Clip) }

    pub fn buffer(&mut self, distance: BufferDistance) -> Result<&Layer> { self.apply(OverlayOp::Buffer(distance)) }

    /// Edit one pairwise comparison (and its reciprocal). Weights are
    /// recomputed and the selection rescored whenever the matrix is complete.
    pub fn set_comparison(&mut self, i: usize, j: usize, value: Option<f64>) -> Result<()> {
        self.matrix.set(i, j, value)?;
        if self.matrix.is_complete() {
            self.recompute_weights()?;
        } else {
            debug!(i, j, "matrix incomplete; weights left unchanged");
        }
        Ok(())
    }

    /// Recompute weights from the matrix and rescore the current selection.
    pub fn recompute_weights(&mut self) -> Result<&WeightVector> {
        let weights = compute_weights(&self.matrix)?.rounded(self.weight_decimals);
        if weights != self.weights {
            debug!(?weights, "weights changed");
            self.weights = weights;
            self.rescore_selection();
        }
        Ok(&self.weights)
    }

    /// Select a point: look up the nearest site and school and score the site.
    /// Points outside the study area are rejected and the previous selection kept.
    pub fn select(&mut self, point: Point<f64>) -> Result<&Selection> {
        let reference = self.reference.as_ref()
            .ok_or_else(|| EngineError::InvalidReference("no study area or reference data loaded".into()))?;
        let found = nearest(point, &[&reference.sites, &reference.schools], &reference.study_area)?;
        let [site, school] = <[_; 2]>::try_from(found)
            .map_err(|_| EngineError::op_failed("select", "expected one result per collection"))?;

        let mut site_feature = site.map(|n| n.feature.clone());
        // Carry over the stored index so the update guard applies across selections.
        if let (Some(feature), Some(previous)) = (site_feature.as_mut(), self.selection.as_ref().and_then(|s| s.site.as_ref())) {
            if previous.anchor() == feature.anchor() && previous.properties == feature.properties {
                feature.index = previous.index;
                feature.accessibility = previous.accessibility;
            }
        }
        if let Some(feature) = site_feature.as_mut() {
            feature.rescore(&self.weights);
        }

        let selection = Selection {
            point,
            site: site_feature,
            site_distance_m: site.map(|n| n.distance_m),
            school: school.map(|n| n.feature.clone()),
            school_distance_m: school.map(|n| n.distance_m),
        };
        info!(lat = point.y(), lon = point.x(), index = ?selection.site.as_ref().and_then(|f| f.index), "selected point");
        Ok(self.selection.insert(selection))
    }

    fn rescore_selection(&mut self) {
        let Some(site) = self.selection.as_mut().and_then(|s| s.site.as_mut()) else { return };
        if site.rescore(&self.weights) {
            debug!(index = ?site.index, "rescored selected site");
        }
    }
}
