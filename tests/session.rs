// Integration tests for the analyst session:
//   background loads and commits, overlay results as new layers, reset,
//   point selection against reference data, and weight edits rescoring
//   the selected site.

use std::fs;
use std::path::Path;

use geo::Point;
use sitesuit::{
    color, load_reference, score_feature, BufferDistance, EngineConfig, EngineError, OverlayOp, Session,
};
use tempfile::TempDir;

const SQUARE_A: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Document><Placemark><Polygon><outerBoundaryIs><LinearRing>
<coordinates>82.60,17.90,0 82.62,17.90,0 82.62,17.92,0 82.60,17.92,0 82.60,17.90,0</coordinates>
</LinearRing></outerBoundaryIs></Polygon></Placemark></Document></kml>"#;

const SQUARE_B: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
<Placemark><Polygon><outerBoundaryIs><LinearRing>
<coordinates>82.61,17.91 82.63,17.91 82.63,17.93 82.61,17.93 82.61,17.91</coordinates>
</LinearRing></outerBoundaryIs></Polygon></Placemark>
<Placemark><Point><coordinates>82.615,17.915</coordinates></Point></Placemark>
</Document></kml>"#;

const STUDY_AREA: &str = r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon",
    "coordinates":[[[82.0,17.0],[83.0,17.0],[83.0,18.0],[82.0,18.0],[82.0,17.0]]]}}"#;

const SITES: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"Point","coordinates":[82.50,17.50]},
     "properties":{"Id":"1","Schools":"90","LULC":"80","Water":"70","Transport":"60","Slope":"50","Pop":"40"}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[82.80,17.80]},
     "properties":{"Id":"2","Schools":"10","LULC":"20","Water":"30","Transport":"40","Slope":"50","Pop":"60"}}
]}"#;

const SCHOOLS: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"Point","coordinates":[82.51,17.51]},"properties":{"schname":"ZPHS Gajuwaka"}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[82.90,17.90]},"properties":{"schname":"MPPS Anakapalle"}}
]}"#;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn reference_session() -> (TempDir, Session) {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "study_area.geojson", STUDY_AREA);
    write(dir.path(), "sites.geojson", SITES);
    write(dir.path(), "schools.geojson", SCHOOLS);
    let config_json = r#"{ "study_area": "study_area.geojson", "sites": "sites.geojson", "schools": "schools.geojson" }"#;
    write(dir.path(), "config.json", config_json);

    let config = EngineConfig::load(&dir.path().join("config.json")).unwrap();
    let reference = load_reference(&config).unwrap();
    let session = Session::new(&config).unwrap().with_reference(reference);
    (dir, session)
}

#[test]
fn background_loads_commit_in_order_with_palette_colors() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.kml", SQUARE_A);
    write(dir.path(), "b.kml", SQUARE_B);

    let mut session = Session::new(&EngineConfig::default()).unwrap();
    let tasks = ["a.kml", "b.kml"].map(|name| Session::spawn_load(dir.path().join(name)));
    for task in tasks {
        let layer = task.join().unwrap();
        session.commit_load(layer);
    }

    let layers = session.store().layers();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].id, "a.kml_layer_1");
    assert_eq!(layers[1].id, "b.kml_layer_2");
    assert_eq!(layers[0].color, color::palette(0));
    assert_eq!(layers[1].color, color::palette(1));
    assert_eq!(layers[1].points.len(), 1);
    assert!(session.store().get("b.kml_layer_2").is_some());
}

#[test]
fn missing_file_reports_io_error_and_leaves_store_unchanged() {
    let dir = TempDir::new().unwrap();
    let session = Session::new(&EngineConfig::default()).unwrap();
    let result = Session::spawn_load(dir.path().join("absent.kml")).join();
    assert!(matches!(result, Err(EngineError::Io(_))));
    assert!(session.store().is_empty());
}

#[test]
fn malformed_document_is_rejected_whole() {
    let mut session = Session::new(&EngineConfig::default()).unwrap();
    session.load(SQUARE_A.as_bytes(), "a.kml").unwrap();
    let bad = "<kml><coordinates>82.6,17.9 east,north</coordinates></kml>";
    assert!(matches!(session.load(bad.as_bytes(), "bad.kml"), Err(EngineError::MalformedGeometry { .. })));
    assert_eq!(session.store().len(), 1);
}

#[test]
fn overlays_append_result_layers() {
    let mut session = Session::new(&EngineConfig::default()).unwrap();
    session.load(SQUARE_A.as_bytes(), "a.kml").unwrap();
    session.load(SQUARE_B.as_bytes(), "b.kml").unwrap();

    let intersection = session.intersect().unwrap();
    assert_eq!(intersection.id, "intersection_layer_3");
    assert_eq!(intersection.polygons.len(), 1);
    assert_eq!(intersection.color, color::OVERLAY);

    let task = session.spawn_overlay(OverlayOp::Buffer(BufferDistance::metres(50.0)));
    let buffered = session.commit_result(task.join().unwrap());
    assert_eq!(buffered.color, color::BUFFERED);
    assert_eq!(session.store().len(), 4);

    // Inputs are never mutated by an overlay.
    assert_eq!(session.store().layers()[0].polygons.len(), 1);
    assert!(session.store().layers()[0].buffers.is_empty());
}

#[test]
fn chained_overlays_read_only_the_previous_result() {
    let mut session = Session::new(&EngineConfig::default()).unwrap();
    session.load(SQUARE_A.as_bytes(), "a.kml").unwrap();
    session.load(SQUARE_B.as_bytes(), "b.kml").unwrap();
    assert_eq!(session.working_set().len(), 2);

    session.buffer(BufferDistance::metres(50.0)).unwrap();
    let working = session.working_set();
    assert_eq!(working.len(), 1);
    assert_eq!(working[0].name, "Buffered");

    let union = session.union().unwrap();
    assert_eq!(union.polygons.len(), 2);
    assert_eq!(session.store().len(), 4);
}

#[test]
fn loads_after_an_overlay_join_its_result() {
    let mut session = Session::new(&EngineConfig::default()).unwrap();
    session.load(SQUARE_A.as_bytes(), "a.kml").unwrap();
    session.load(SQUARE_B.as_bytes(), "b.kml").unwrap();
    session.dissolve().unwrap();
    session.load(SQUARE_A.as_bytes(), "a.kml").unwrap();

    let names = session.working_set().iter().map(|l| l.name.clone()).collect::<Vec<_>>();
    assert_eq!(names, ["Dissolved", "a.kml"]);
    assert_eq!(session.intersect().unwrap().polygons.len(), 1);
}

#[test]
fn session_rejects_non_reciprocal_seed() {
    let mut config = EngineConfig::default();
    config.seed_matrix[1][0] = 3.0;
    assert!(matches!(Session::new(&config), Err(EngineError::InvalidMatrix(_))));
}

#[test]
fn cancelled_overlay_commits_nothing() {
    let mut session = Session::new(&EngineConfig::default()).unwrap();
    session.load(SQUARE_A.as_bytes(), "a.kml").unwrap();
    session.load(SQUARE_B.as_bytes(), "b.kml").unwrap();

    let task = session.spawn_overlay(OverlayOp::Dissolve);
    task.cancel();
    assert!(matches!(task.join(), Err(EngineError::Cancelled)));
    assert_eq!(session.store().len(), 2);
}

#[test]
fn visibility_and_reset() {
    let mut session = Session::new(&EngineConfig::default()).unwrap();
    session.load(SQUARE_A.as_bytes(), "a.kml").unwrap();

    assert!(session.set_visible("a.kml_layer_1", false));
    assert!(!session.store().layers()[0].visible);
    assert!(!session.set_visible("missing_layer_9", false));

    session.reset();
    assert!(session.store().is_empty());
    assert!(session.working_set().is_empty());
    assert!(session.store().get("a.kml_layer_1").is_none());

    // Numbering restarts after a reset.
    assert_eq!(session.load(SQUARE_B.as_bytes(), "b.kml").unwrap().id, "b.kml_layer_1");
}

#[test]
fn select_finds_nearest_site_and_school() {
    let (_dir, mut session) = reference_session();
    let selection = session.select(Point::new(82.52, 17.52)).unwrap();

    let site = selection.site.as_ref().unwrap();
    assert_eq!(site.property_str("Id"), Some("1"));
    assert!(site.index.is_some());
    assert!(site.accessibility.is_some());

    let school = selection.school.as_ref().unwrap();
    assert_eq!(school.property_str("schname"), Some("ZPHS Gajuwaka"));
    assert!(selection.school_distance_m.unwrap() < selection.site_distance_m.unwrap());
}

#[test]
fn select_outside_study_area_keeps_previous_selection() {
    let (_dir, mut session) = reference_session();
    session.select(Point::new(82.79, 17.79)).unwrap();

    let result = session.select(Point::new(84.0, 17.5));
    assert!(matches!(result, Err(EngineError::OutOfBounds { .. })));
    let kept = session.selection().unwrap();
    assert_eq!(kept.site.as_ref().unwrap().property_str("Id"), Some("2"));
}

#[test]
fn select_without_reference_data_fails() {
    let mut session = Session::new(&EngineConfig::default()).unwrap();
    assert!(matches!(session.select(Point::new(82.5, 17.5)), Err(EngineError::InvalidReference(_))));
}

#[test]
fn weight_edits_rescore_selected_site() {
    let (_dir, mut session) = reference_session();
    session.select(Point::new(82.50, 17.50)).unwrap();
    let before = *session.weights();

    // Unsetting a cell leaves the matrix incomplete; weights stay put.
    session.set_comparison(0, 1, None).unwrap();
    assert_eq!(session.weights(), &before);
    assert!(!session.matrix().is_complete());

    session.set_comparison(0, 1, Some(9.0)).unwrap();
    assert_eq!(session.matrix().get(1, 0), Some(1.0 / 9.0));
    assert_ne!(session.weights(), &before);
    assert!((session.weights().sum() - 1.0).abs() <= 0.001 + 1e-9);

    let site = session.selection().unwrap().site.as_ref().unwrap();
    let (expected, category) = score_feature(session.weights(), site).unwrap();
    assert_eq!(site.index, Some(expected));
    assert_eq!(site.accessibility, Some(category));
}

#[test]
fn reselecting_same_site_is_idempotent() {
    let (_dir, mut session) = reference_session();
    let first = session.select(Point::new(82.50, 17.50)).unwrap().site.clone();
    let second = session.select(Point::new(82.501, 17.501)).unwrap().site.clone();
    assert_eq!(first, second);
}

#[test]
fn invalid_comparison_is_rejected_without_changes() {
    let (_dir, mut session) = reference_session();
    let before = *session.weights();
    assert!(matches!(session.set_comparison(0, 1, Some(0.0)), Err(EngineError::InvalidMatrix(_))));
    assert!(matches!(session.set_comparison(6, 1, Some(2.0)), Err(EngineError::InvalidMatrix(_))));
    assert_eq!(session.weights(), &before);
}
