use anyhow::Result;
use geo::Point;
use serde_json::json;
use sitesuit::{io::geojson, load_reference, EngineConfig, Session};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ScoreArgs) -> Result<()> {
    let config = EngineConfig::load(&args.config)?;

    eprintln!("[score] loading reference data from {}", config.sites.display());
    let reference = load_reference(&config)?;
    let mut session = Session::new(&config)?.with_reference(reference);

    let selection = session.select(Point::new(args.lon, args.lat))?;
    let report = json!({
        "site": selection.site.as_ref().map(geojson::feature_properties),
        "site_distance_m": selection.site_distance_m,
        "school": selection.school.as_ref().map(geojson::feature_properties),
        "school_distance_m": selection.school_distance_m,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
