use geo::{Coord, LineString, Point, Polygon};
use serde_json::{json, Map, Value};

use crate::criteria::Criterion;
use crate::error::{EngineError, Result};
use crate::feature::{Feature, FeatureGeometry};
use crate::layer::Layer;

fn invalid(reason: impl Into<String>) -> EngineError { EngineError::InvalidReference(reason.into()) }

/// Parse a position `[x, y, ...]`.
fn parse_position(value: &Value) -> Result<Coord<f64>> {
    let pair = value.as_array().filter(|a| a.len() >= 2)
        .ok_or_else(|| invalid(format!("position must be an array of at least 2 numbers, got {value}")))?;
    let x = pair[0].as_f64().ok_or_else(|| invalid("Invalid coordinate: x must be a number"))?;
    let y = pair[1].as_f64().ok_or_else(|| invalid("Invalid coordinate: y must be a number"))?;
    Ok(Coord { x, y })
}

/// Parse a ring (exterior or interior) from GeoJSON coordinates.
/// Format: [[x, y], [x, y], ...]
fn parse_ring(value: &Value) -> Result<LineString<f64>> {
    let coords = value.as_array().ok_or_else(|| invalid("ring must be an array of positions"))?
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<_>>>()?;
    if coords.len() < 4 || coords.first() != coords.last() {
        return Err(invalid(format!("ring must be closed with at least 4 positions, got {}", coords.len())));
    }
    Ok(LineString(coords))
}

/// Parse polygon coordinates: `[exterior, interior...]`.
fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
    let rings = value.as_array().filter(|r| !r.is_empty())
        .ok_or_else(|| invalid("Invalid Polygon: missing exterior ring"))?;
    let exterior = parse_ring(&rings[0])?;
    let interiors = rings[1..].iter().map(parse_ring).collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_geometry(geometry: &Value) -> Result<FeatureGeometry> {
    let coords = &geometry["coordinates"];
    match geometry["type"].as_str() {
        Some("Point") => Ok(FeatureGeometry::Point(Point::from(parse_position(coords)?))),
        Some("Polygon") => Ok(FeatureGeometry::Polygon(parse_polygon(coords)?)),
        other => Err(invalid(format!("unsupported feature geometry {other:?}"))),
    }
}

/// Ranks arrive as numbers or as numeric strings.
fn parse_rank(value: &Value) -> Option<f64> {
    let rank = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    rank.filter(|r| r.is_finite())
}

fn features_array(collection: &Value) -> Result<&Vec<Value>> {
    collection["features"].as_array()
        .ok_or_else(|| invalid("expected a FeatureCollection with a \"features\" array"))
}

/// Read an attributed reference collection (Point or Polygon features).
///
/// Criterion attributes (`Schools`, `LULC`, `Water`, `Transport`, `Slope`,
/// `Pop`) become ranks; every other property is kept as-is.
pub fn read_features(bytes: &[u8]) -> Result<Vec<Feature>> {
    let collection: Value = serde_json::from_slice(bytes)
        .map_err(|e| invalid(format!("Failed to parse GeoJSON: {e}")))?;

    features_array(&collection)?.iter().enumerate()
        .map(|(i, raw)| {
            let geometry = parse_geometry(&raw["geometry"])
                .map_err(|e| invalid(format!("feature {i}: {e}")))?;
            let mut feature = Feature::new(geometry);

            if let Some(properties) = raw["properties"].as_object() {
                for (key, value) in properties {
                    match Criterion::from_attribute(key) {
                        Some(criterion) => feature.ranks[criterion.index()] = parse_rank(value),
                        None => { feature.properties.insert(key.clone(), value.clone()); }
                    }
                }
            }
            Ok(feature)
        })
        .collect()
}

/// Read a study-area boundary: the first Polygon (or first part of the first
/// MultiPolygon) of a FeatureCollection, Feature, or bare geometry.
pub fn read_boundary(bytes: &[u8]) -> Result<Polygon<f64>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| invalid(format!("Failed to parse GeoJSON: {e}")))?;

    let geometry = match value["type"].as_str() {
        Some("FeatureCollection") => features_array(&value)?.first()
            .map(|f| &f["geometry"])
            .ok_or_else(|| invalid("boundary collection has no features"))?,
        Some("Feature") => &value["geometry"],
        _ => &value,
    };

    match geometry["type"].as_str() {
        Some("Polygon") => parse_polygon(&geometry["coordinates"]),
        Some("MultiPolygon") => {
            let first = geometry["coordinates"].as_array().and_then(|parts| parts.first())
                .ok_or_else(|| invalid("boundary MultiPolygon is empty"))?;
            parse_polygon(first)
        }
        other => Err(invalid(format!("boundary must be a Polygon or MultiPolygon, got {other:?}"))),
    }
}

fn polygon_coords(polygon: &Polygon<f64>) -> Value {
    let ring = |ls: &LineString<f64>| ls.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>();
    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));
    json!(rings)
}

/// Export a layer as a GeoJSON FeatureCollection for the rendering shell.
/// Each feature carries the layer id, name, color and a `kind` tag
/// (`polygon`, `buffer`, `line`, `point`).
pub fn layer_to_geojson(layer: &Layer) -> Value {
    let props = |kind: &str| {
        let mut p = Map::new();
        p.insert("layer".into(), json!(layer.id));
        p.insert("name".into(), json!(layer.name));
        p.insert("color".into(), json!(layer.color.to_string()));
        p.insert("visible".into(), json!(layer.visible));
        p.insert("kind".into(), json!(kind));
        Value::Object(p)
    };

    let polygons = layer.polygons.iter().map(|p| ("polygon", json!({ "type": "Polygon", "coordinates": polygon_coords(p) })));
    let buffers = layer.buffers.iter().map(|p| ("buffer", json!({ "type": "Polygon", "coordinates": polygon_coords(p) })));
    let lines = layer.lines.iter().map(|l| ("line", json!({
        "type": "LineString",
        "coordinates": l.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>(),
    })));
    let points = layer.points.iter().map(|p| ("point", json!({ "type": "Point", "coordinates": [p.x(), p.y()] })));

    let features = polygons.chain(buffers).chain(lines).chain(points)
        .map(|(kind, geometry)| json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": props(kind),
        }))
        .collect::<Vec<_>>();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Properties of a scored feature, including its derived fields.
pub fn feature_properties(feature: &Feature) -> Value {
    let mut p = feature.properties.clone();
    for criterion in Criterion::ALL {
        if let Some(rank) = feature.rank(criterion) {
            p.insert(criterion.attribute().into(), json!(rank));
        }
    }
    p.insert("IndexValue".into(), json!(feature.index));
    p.insert("Accessibility".into(), json!(feature.accessibility));
    Value::Object(p)
}
