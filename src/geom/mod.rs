mod proj;

pub(crate) use proj::Utm;

use geo::{BoundingRect, Coord, LineString, Point, Polygon, Rect};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Build a single-ring polygon, checking the ring invariant (at least four
/// coordinates, first equal to last) instead of letting `geo` close it silently.
pub fn ring(coords: Vec<Coord<f64>>) -> Result<Polygon<f64>, String> {
    if coords.len() < 4 {
        return Err(format!("ring needs at least 4 coordinates, got {}", coords.len()));
    }
    if coords.first() != coords.last() {
        return Err("ring is not closed (first coordinate differs from last)".to_string());
    }
    Ok(Polygon::new(LineString::from(coords), vec![]))
}

/// Pad a corridor ring to the 4-coordinate minimum by duplicating its first
/// and last vertices. An empty ring stays empty.
pub(crate) fn pad_ring(coords: &mut Vec<Coord<f64>>) {
    if coords.is_empty() { return }
    while coords.len() < 4 {
        coords.insert(0, coords[0]);
        coords.push(coords[coords.len() - 1]);
    }
}

/// Smallest rectangle covering both inputs.
#[inline]
pub(crate) fn merge_rects(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// Bounding rectangle of a set of polygons, if any has coordinates.
pub(crate) fn polygons_bounds<'a>(polygons: impl IntoIterator<Item = &'a Polygon<f64>>) -> Option<Rect<f64>> {
    polygons.into_iter()
        .filter_map(|polygon| polygon.bounding_rect())
        .reduce(merge_rects)
}

/// Great-circle distance in metres between two lon/lat points.
pub fn haversine_m(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.x() - a.x()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn ring_requires_closure() {
        let open = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }, coord! { x: 0.0, y: 1.0 }];
        assert!(ring(open).is_err());
    }

    #[test]
    fn ring_requires_four_coords() {
        let short = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 }, coord! { x: 0.0, y: 0.0 }];
        assert!(ring(short).is_err());
    }

    #[test]
    fn ring_accepts_closed_square() {
        let square = vec![
            coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 }, coord! { x: 0.0, y: 0.0 },
        ];
        let polygon = ring(square).unwrap();
        assert_eq!(polygon.exterior().0.len(), 4);
    }

    #[test]
    fn pad_ring_reaches_minimum() {
        let mut coords = vec![coord! { x: 1.0, y: 2.0 }, coord! { x: 3.0, y: 4.0 }];
        pad_ring(&mut coords);
        assert_eq!(coords.len(), 4);
        assert_eq!(coords[0], coords[1]);
        assert_eq!(coords[2], coords[3]);

        let mut single = vec![coord! { x: 5.0, y: 5.0 }];
        pad_ring(&mut single);
        assert_eq!(single.len(), 5);
        assert!(single.iter().all(|c| *c == coord! { x: 5.0, y: 5.0 }));

        let mut empty: Vec<Coord<f64>> = vec![];
        pad_ring(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn haversine_zero_and_known() {
        let p = Point::new(82.66, 17.91);
        assert_eq!(haversine_m(p, p), 0.0);

        // One degree of latitude is ~111.2 km.
        let d = haversine_m(Point::new(0.0, 0.0), Point::new(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 50.0, "d = {d}");
    }
}
