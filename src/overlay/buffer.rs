use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

use geo::{BooleanOps, Coord, LineString, MapCoords, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color;
use crate::error::{EngineError, Result};
use crate::geom::{pad_ring, Utm};
use crate::layer::Layer;
use crate::task::CancelFlag;

/// Vertices used to approximate a full circle.
const CIRCLE_STEPS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Metres,
    Kilometres,
    Miles,
}

impl DistanceUnit {
    fn metres_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Metres => 1.0,
            DistanceUnit::Kilometres => 1_000.0,
            DistanceUnit::Miles => 1_609.344,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DistanceUnit::Metres => "metres",
            DistanceUnit::Kilometres => "kilometres",
            DistanceUnit::Miles => "miles",
        })
    }
}

/// Buffer distance with its unit; applied identically to points, lines and polygons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferDistance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl BufferDistance {
    pub fn new(value: f64, unit: DistanceUnit) -> Self { Self { value, unit } }

    pub fn metres(value: f64) -> Self { Self::new(value, DistanceUnit::Metres) }

    #[inline] pub fn in_metres(&self) -> f64 { self.value * self.unit.metres_per_unit() }
}

/// Arc of radius `r` around `center` from angle `from` to `to` (radians, CCW), endpoints included.
fn arc(center: Coord<f64>, r: f64, from: f64, to: f64, steps: usize) -> impl Iterator<Item = Coord<f64>> {
    (0..=steps).map(move |i| {
        let t = from + (to - from) * i as f64 / steps as f64;
        Coord { x: center.x + r * t.cos(), y: center.y + r * t.sin() }
    })
}

/// Closed circle, first vertex repeated at the end.
fn circle(center: Coord<f64>, r: f64) -> Polygon<f64> {
    let mut coords = (0..CIRCLE_STEPS)
        .map(|i| {
            let t = TAU * i as f64 / CIRCLE_STEPS as f64;
            Coord { x: center.x + r * t.cos(), y: center.y + r * t.sin() }
        })
        .collect::<Vec<_>>();
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![])
}

/// Stadium around the segment `p`-`q` with half-width `r`.
fn capsule(p: Coord<f64>, q: Coord<f64>, r: f64) -> Polygon<f64> {
    if p == q { return circle(p, r) }

    let theta = (q.y - p.y).atan2(q.x - p.x);
    let half = CIRCLE_STEPS / 2;
    let mut coords = arc(q, r, theta - FRAC_PI_2, theta + FRAC_PI_2, half)
        .chain(arc(p, r, theta + FRAC_PI_2, theta + FRAC_PI_2 + PI, half))
        .collect::<Vec<_>>();
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![])
}

/// Union `base` with a capsule around every segment of `rings`.
fn sweep<'a>(
    base: MultiPolygon<f64>,
    rings: impl IntoIterator<Item = &'a LineString<f64>>,
    r: f64,
    cancel: &CancelFlag,
) -> Result<MultiPolygon<f64>> {
    let mut acc = base;
    for ring in rings {
        match ring.0.len() {
            0 => {}
            1 => acc = acc.union(&MultiPolygon::new(vec![circle(ring.0[0], r)])),
            _ => for segment in ring.lines() {
                cancel.check()?;
                acc = acc.union(&MultiPolygon::new(vec![capsule(segment.start, segment.end, r)]));
            },
        }
    }
    Ok(acc)
}

fn project<G>(geometry: &G, utm: &Utm) -> Result<G::Output>
where
    G: MapCoords<f64, f64>,
{
    geometry.try_map_coords(|c| utm.forward(c))
        .map_err(|reason| EngineError::op_failed("buffer", reason))
}

fn unproject<G>(geometry: &G, utm: &Utm) -> Result<G::Output>
where
    G: MapCoords<f64, f64>,
{
    geometry.try_map_coords(|c| utm.inverse(c))
        .map_err(|reason| EngineError::op_failed("buffer", reason))
}

/// Dilate every point, line and polygon of every layer by `distance`.
///
/// The result carries all source geometry unchanged, with the new shapes in
/// `Layer::buffers`. Geometry is buffered in metres in the UTM zone at the
/// centre of the combined extent.
pub fn buffer(layers: &[Layer], distance: BufferDistance, cancel: &CancelFlag) -> Result<Layer> {
    let r = distance.in_metres();
    if !r.is_finite() || r <= 0.0 {
        return Err(EngineError::InvalidDistance(distance.value));
    }
    if layers.is_empty() {
        return Err(EngineError::insufficient("buffer", "no layers loaded"));
    }

    let mut out = Layer::new("Buffered", color::BUFFERED);
    for layer in layers {
        out.polygons.extend(layer.polygons.iter().cloned());
        out.lines.extend(layer.lines.iter().cloned());
        out.points.extend(layer.points.iter().cloned());
    }

    let extent = layers.iter()
        .filter_map(Layer::bounds)
        .reduce(crate::geom::merge_rects);
    let Some(extent) = extent else { return Ok(out) };
    let utm = Utm::for_extent(extent)
        .map_err(|reason| EngineError::op_failed("buffer", reason))?;

    for point in &out.points {
        cancel.check()?;
        let center = project(point, &utm)?;
        out.buffers.push(unproject(&circle(center.0, r), &utm)?);
    }

    for polygon in &out.polygons {
        let metric = project(polygon, &utm)?;
        let rings = std::iter::once(metric.exterior()).chain(metric.interiors());
        let dilated = sweep(MultiPolygon::new(vec![metric.clone()]), rings, r, cancel)?;
        for part in dilated {
            out.buffers.push(unproject(&part, &utm)?);
        }
    }

    for line in &out.lines {
        let metric = project(line, &utm)?;
        let corridor = sweep(MultiPolygon::new(vec![]), std::iter::once(&metric), r, cancel)?;
        for part in corridor {
            let (exterior, interiors) = part.into_inner();
            let mut coords = exterior.0;
            pad_ring(&mut coords);
            let padded = Polygon::new(LineString::from(coords), interiors);
            out.buffers.push(unproject(&padded, &utm)?);
        }
    }

    debug!(distance_m = r, buffers = out.buffers.len(), "buffer");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, Area, Contains, Point};

    fn layer_with(polygons: Vec<Polygon<f64>>, lines: Vec<LineString<f64>>, points: Vec<Point<f64>>) -> Layer {
        let mut layer = Layer::new("src.kml", color::palette(0));
        layer.polygons = polygons;
        layer.lines = lines;
        layer.points = points;
        layer
    }

    fn field() -> Polygon<f64> {
        polygon![(x: 82.60, y: 17.90), (x: 82.62, y: 17.90), (x: 82.62, y: 17.92), (x: 82.60, y: 17.92), (x: 82.60, y: 17.90)]
    }

    #[test]
    fn units_convert_to_metres() {
        assert_eq!(BufferDistance::new(2.0, DistanceUnit::Kilometres).in_metres(), 2_000.0);
        assert_eq!(BufferDistance::new(1.0, DistanceUnit::Miles).in_metres(), 1_609.344);
        assert_eq!(DistanceUnit::Miles.to_string(), "miles");
    }

    #[test]
    fn point_buffer_is_closed_circle() {
        let layer = layer_with(vec![], vec![], vec![Point::new(82.66, 17.91)]);
        let out = buffer(&[layer], BufferDistance::metres(500.0), &CancelFlag::new()).unwrap();

        assert_eq!(out.points.len(), 1);
        assert_eq!(out.buffers.len(), 1);
        let ring = out.buffers[0].exterior();
        assert_eq!(ring.0.len(), CIRCLE_STEPS + 1);
        assert_eq!(ring.0.first(), ring.0.last());
        assert!(out.buffers[0].contains(&Point::new(82.66, 17.91)));
    }

    #[test]
    fn polygon_buffer_contains_source() {
        let layer = layer_with(vec![field()], vec![], vec![]);
        let out = buffer(&[layer], BufferDistance::metres(200.0), &CancelFlag::new()).unwrap();

        assert_eq!(out.polygons, vec![field()]);
        assert_eq!(out.buffers.len(), 1);
        assert!(out.buffers[0].unsigned_area() > field().unsigned_area());
        assert!(out.buffers[0].contains(&Point::new(82.61, 17.91)));
    }

    #[test]
    fn polygon_buffer_grows_with_distance() {
        let layer = layer_with(vec![field()], vec![], vec![]);
        let cancel = CancelFlag::new();
        let mut last = 0.0;
        for d in [50.0, 100.0, 400.0, 1_000.0] {
            let out = buffer(std::slice::from_ref(&layer), BufferDistance::metres(d), &cancel).unwrap();
            let area = out.buffers[0].unsigned_area();
            assert!(area >= last, "area shrank at {d} m");
            last = area;
        }
    }

    #[test]
    fn line_buffer_is_a_closed_corridor() {
        let line = line_string![(x: 82.60, y: 17.90), (x: 82.61, y: 17.90), (x: 82.61, y: 17.91)];
        let layer = layer_with(vec![], vec![line.clone()], vec![]);
        let out = buffer(&[layer], BufferDistance::metres(100.0), &CancelFlag::new()).unwrap();

        assert_eq!(out.lines, vec![line]);
        assert_eq!(out.buffers.len(), 1);
        let ring = out.buffers[0].exterior();
        assert!(ring.0.len() >= 4);
        assert_eq!(ring.0.first(), ring.0.last());
        assert!(out.buffers[0].contains(&Point::new(82.605, 17.9002)));
    }

    #[test]
    fn rejects_bad_distance() {
        let layer = layer_with(vec![field()], vec![], vec![]);
        for d in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = buffer(std::slice::from_ref(&layer), BufferDistance::metres(d), &CancelFlag::new()).unwrap_err();
            assert!(matches!(err, EngineError::InvalidDistance(_)));
        }
    }

    #[test]
    fn rejects_no_layers() {
        let err = buffer(&[], BufferDistance::metres(10.0), &CancelFlag::new()).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientInput { .. }));
    }

    #[test]
    fn empty_layers_buffer_to_nothing() {
        let layer = layer_with(vec![], vec![], vec![]);
        let out = buffer(&[layer], BufferDistance::metres(10.0), &CancelFlag::new()).unwrap();
        assert!(out.is_empty());
    }
}
