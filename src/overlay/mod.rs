//! Set-style overlay operations over loaded layers.
//!
//! Every operation borrows its input layers and returns a brand-new layer;
//! inputs are never mutated. Long loops poll the supplied `CancelFlag`.

mod buffer;

pub use buffer::{buffer, BufferDistance, DistanceUnit};

use geo::{Area, BooleanOps, CoordsIter, MultiPolygon, Polygon};
use tracing::debug;

use crate::color;
use crate::error::{EngineError, Result};
use crate::layer::Layer;
use crate::task::CancelFlag;

/// Reject polygons the boolean routines cannot work with.
fn check_polygon(op: &'static str, polygon: &Polygon<f64>) -> Result<()> {
    if polygon.exterior().0.len() < 4 {
        return Err(EngineError::op_failed(op, "polygon ring has fewer than 4 coordinates"));
    }
    if polygon.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(EngineError::op_failed(op, "polygon has non-finite coordinates"));
    }
    Ok(())
}

/// Keep the non-degenerate parts of a boolean result.
#[inline]
fn non_empty(result: MultiPolygon<f64>) -> impl Iterator<Item = Polygon<f64>> {
    result.0.into_iter().filter(|polygon| polygon.unsigned_area() > 0.0)
}

/// Multi-part union: every polygon of every layer, boundaries left untouched.
pub fn union(layers: &[Layer], cancel: &CancelFlag) -> Result<Layer> {
    let total = layers.iter().map(|layer| layer.polygons.len()).sum::<usize>();
    if total < 2 {
        return Err(EngineError::insufficient("union", format!("need at least 2 polygons, found {total}")));
    }
    cancel.check()?;

    let mut out = Layer::new("Union", color::OVERLAY);
    out.polygons = layers.iter()
        .flat_map(|layer| layer.polygons.iter().cloned())
        .collect();

    debug!(polygons = out.polygons.len(), "union");
    Ok(out)
}

/// Pairwise intersection of every polygon across every pair of distinct layers.
///
/// Output order is layer pair (i < j), then polygon of i, then polygon of j.
pub fn intersection(layers: &[Layer], cancel: &CancelFlag) -> Result<Layer> {
    if layers.len() < 2 {
        return Err(EngineError::insufficient("intersection", format!("need at least 2 layers, found {}", layers.len())));
    }

    let mut out = Layer::new("Intersection", color::OVERLAY);
    for i in 0..layers.len() - 1 {
        for j in i + 1..layers.len() {
            for a in &layers[i].polygons {
                check_polygon("intersection", a)?;
                for b in &layers[j].polygons {
                    cancel.check()?;
                    check_polygon("intersection", b)?;
                    out.polygons.extend(non_empty(a.intersection(b)));
                }
            }
        }
    }

    debug!(polygons = out.polygons.len(), "intersection");
    Ok(out)
}

/// Topological union of every polygon across all layers.
///
/// Disjoint inputs are not forced into one ring: every connected component
/// of the union is returned, so touching or overlapping inputs give exactly
/// one polygon and separated groups give one polygon each.
pub fn dissolve(layers: &[Layer], cancel: &CancelFlag) -> Result<Layer> {
    let polygons = layers.iter()
        .flat_map(|layer| layer.polygons.iter())
        .collect::<Vec<_>>();
    if polygons.is_empty() {
        return Err(EngineError::insufficient("dissolve", "no polygons loaded"));
    }

    let mut merged = MultiPolygon::<f64>::new(vec![]);
    for polygon in polygons {
        cancel.check()?;
        check_polygon("dissolve", polygon)?;
        merged = merged.union(&MultiPolygon::new(vec![polygon.clone()]));
    }

    let mut out = Layer::new("Dissolved", color::DISSOLVED);
    out.polygons = non_empty(merged).collect();
    if out.polygons.is_empty() {
        return Err(EngineError::op_failed("dissolve", "union produced no polygon"));
    }

    debug!(components = out.polygons.len(), "dissolve");
    Ok(out)
}

/// Clip every polygon of layers `1..` against the first polygon of layer 0.
pub fn clip(layers: &[Layer], cancel: &CancelFlag) -> Result<Layer> {
    if layers.len() < 2 {
        return Err(EngineError::insufficient("clip", format!("need at least 2 layers, found {}", layers.len())));
    }
    let mask = layers[0].polygons.first()
        .ok_or_else(|| EngineError::insufficient("clip", format!("mask layer {} has no polygon", layers[0].name)))?;
    check_polygon("clip", mask)?;

    let mut out = Layer::new("Clipped", color::OVERLAY);
    for layer in &layers[1..] {
        for polygon in &layer.polygons {
            cancel.check()?;
            check_polygon("clip", polygon)?;
            out.polygons.extend(non_empty(mask.intersection(polygon)));
        }
    }

    debug!(polygons = out.polygons.len(), "clip");
    Ok(out)
}
