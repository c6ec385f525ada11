use geo::{BoundingRect, LineString, Point, Polygon, Rect};

use crate::color::Rgba;
use crate::geom::{merge_rects, polygons_bounds};

/// One loaded overlay: the geometry bundle from a single document, or the
/// output of an overlay operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Assigned by the store on insertion, e.g. `parks.kml_layer_1`; empty before that.
    pub id: String,
    pub name: String,
    pub color: Rgba,
    pub visible: bool,
    pub polygons: Vec<Polygon<f64>>,
    pub lines: Vec<LineString<f64>>,
    pub points: Vec<Point<f64>>,
    /// Buffer output, kept apart from source geometry so the shell can style it.
    pub buffers: Vec<Polygon<f64>>,
}

/// Map framing for a layer: centre plus padded lat/lon spans, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Layer {
    /// Padding applied around the layer extent when framing it.
    const VIEW_PADDING: f64 = 1.1;

    pub fn new(name: impl Into<String>, color: Rgba) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            color,
            visible: true,
            polygons: Vec::new(),
            lines: Vec::new(),
            points: Vec::new(),
            buffers: Vec::new(),
        }
    }

    /// True if the layer has no geometry of any kind.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty() && self.points.is_empty() && self.buffers.is_empty()
    }

    /// Bounding rectangle of every geometry in the layer.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let polygons = polygons_bounds(self.polygons.iter().chain(&self.buffers));
        let lines = self.lines.iter()
            .filter_map(|line| line.bounding_rect())
            .reduce(merge_rects);
        let points = self.points.iter()
            .map(|point| point.bounding_rect())
            .reduce(merge_rects);

        [polygons, lines, points].into_iter().flatten().reduce(merge_rects)
    }

    /// Region that frames the whole layer with a 10% margin.
    pub fn view_region(&self) -> Option<ViewRegion> {
        let rect = self.bounds()?;
        let center = rect.center();
        Some(ViewRegion {
            latitude: center.y,
            longitude: center.x,
            latitude_delta: rect.height() * Self::VIEW_PADDING,
            longitude_delta: rect.width() * Self::VIEW_PADDING,
        })
    }
}
