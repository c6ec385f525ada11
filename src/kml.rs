//! Coordinate-block reader for KML-style documents.
//!
//! Only `<coordinates>` elements are interpreted; everything else in the
//! document (styles, folders, placemark metadata) is ignored.

use geo::{Coord, LineString, Point};
use tracing::debug;

use crate::color::Rgba;
use crate::error::{EngineError, Result};
use crate::geom::ring;
use crate::layer::Layer;

/// Parse a document into a layer named after `filename`, colored with `color`.
///
/// Any malformed token fails the whole document; no partial layer is produced.
pub fn parse_with_color(document: &[u8], filename: &str, color: Rgba) -> Result<Layer> {
    let text = std::str::from_utf8(document)
        .map_err(|e| EngineError::MalformedDocument { source_name: filename.to_string(), reason: e.to_string() })?;
    let tree = roxmltree::Document::parse(text)
        .map_err(|e| EngineError::MalformedDocument { source_name: filename.to_string(), reason: e.to_string() })?;

    let mut layer = Layer::new(filename, color);

    let blocks = tree.descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "coordinates");

    for (block_idx, node) in blocks.enumerate() {
        // Comments and CDATA sections may split the block into several text nodes.
        let body = node.descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect::<String>();
        let tokens = body.split_whitespace().collect::<Vec<_>>();
        let coords = tokens.iter()
            .map(|token| parse_token(token).map_err(|reason| {
                EngineError::malformed(filename, format!("block {block_idx}: {reason}"))
            }))
            .collect::<Result<Vec<_>>>()?;

        match tokens.len() {
            0 => debug!(block_idx, filename, "skipping empty coordinate block"),
            1 => layer.points.push(Point::from(coords[0])),
            2 => debug!(block_idx, filename, "skipping two-coordinate block"),
            n => {
                // Closure is decided textually, as written in the document.
                if n >= 4 && tokens[0] == tokens[n - 1] {
                    let polygon = ring(coords)
                        .map_err(|reason| EngineError::malformed(filename, format!("block {block_idx}: {reason}")))?;
                    layer.polygons.push(polygon);
                } else {
                    layer.lines.push(LineString::from(coords));
                }
            }
        }
    }

    debug!(
        filename,
        polygons = layer.polygons.len(),
        lines = layer.lines.len(),
        points = layer.points.len(),
        "parsed document"
    );

    Ok(layer)
}

/// Parse a document with the first palette color. The store recolors layers on insertion.
pub fn parse(document: &[u8], filename: &str) -> Result<Layer> {
    parse_with_color(document, filename, crate::color::palette(0))
}

/// Parse one `longitude,latitude[,altitude]` token.
fn parse_token(token: &str) -> std::result::Result<Coord<f64>, String> {
    let mut parts = token.split(',');
    let (Some(lon), Some(lat)) = (parts.next(), parts.next()) else {
        return Err(format!("token {token:?} is missing the ',' separator"));
    };
    if let Some(alt) = parts.next() {
        ordinate(alt, token)?;
    }
    if parts.next().is_some() {
        return Err(format!("token {token:?} has more than three ordinates"));
    }

    Ok(Coord { x: ordinate(lon, token)?, y: ordinate(lat, token)? })
}

fn ordinate(text: &str, token: &str) -> std::result::Result<f64, String> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("token {token:?} has non-numeric ordinate {text:?}")),
    }
}

/// Serialize a ring or path back to the block grammar (`lon,lat` tokens separated by spaces).
pub fn write_coordinates(line: &LineString<f64>) -> String {
    line.coords()
        .map(|c| format!("{},{}", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}
