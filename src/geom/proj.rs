use geo::{Coord, Rect};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// Round trip between WGS84 lon/lat degrees and the UTM zone covering a
/// given extent, so buffers can be built in metres.
pub(crate) struct Utm {
    geog: Proj4,
    utm: Proj4,
}

impl Utm {
    const GEOG: &'static str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

    /// Build the PROJ.4 string for the UTM zone containing `center`.
    /// - WGS84: 326zz (north) / 327zz (south)
    fn utm_proj4(center: Coord<f64>) -> String {
        let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
        let south = if center.y >= 0.0 { "" } else { " +south" };
        format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs +type=crs")
    }

    /// Projection for the zone at the centre of `extent`.
    pub(crate) fn for_extent(extent: Rect<f64>) -> Result<Self, String> {
        let geog = Proj4::from_proj_string(Self::GEOG)
            .map_err(|e| format!("failed to build source PROJ.4: {e}"))?;
        let proj_string = Self::utm_proj4(extent.center());
        let utm = Proj4::from_proj_string(&proj_string)
            .map_err(|e| format!("failed to build target PROJ.4 {proj_string}: {e}"))?;
        Ok(Self { geog, utm })
    }

    /// lon/lat degrees → UTM metres.
    pub(crate) fn forward(&self, coord: Coord<f64>) -> Result<Coord<f64>, String> {
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.geog, &self.utm, &mut point)
            .map_err(|e| format!("forward projection of ({}, {}) failed: {e}", coord.x, coord.y))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// UTM metres → lon/lat degrees.
    pub(crate) fn inverse(&self, coord: Coord<f64>) -> Result<Coord<f64>, String> {
        let mut point = (coord.x, coord.y, 0.0);
        transform(&self.utm, &self.geog, &mut point)
            .map_err(|e| format!("inverse projection of ({}, {}) failed: {e}", coord.x, coord.y))?;
        Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
    }
}
