use std::fs;

use anyhow::{Context, Result};
use sitesuit::{io::geojson, BufferDistance, EngineConfig, OverlayOp, Session};

use crate::cli::{OverlayArgs, OverlayKind};

pub fn run(_cli: &crate::cli::Cli, args: &OverlayArgs) -> Result<()> {
    let op = match args.op {
        OverlayKind::Union => OverlayOp::Union,
        OverlayKind::Intersection => OverlayOp::Intersection,
        OverlayKind::Dissolve => OverlayOp::Dissolve,
        OverlayKind::Clip => OverlayOp::Clip,
        OverlayKind::Buffer => {
            let distance = BufferDistance::new(args.distance, args.unit.into());
            eprintln!("[overlay] buffer distance {} {}", distance.value, distance.unit);
            OverlayOp::Buffer(distance)
        }
    };

    let mut session = Session::new(&EngineConfig::default())?;

    // Parse every document in parallel, then commit in argument order.
    let tasks = args.inputs.iter()
        .map(|path| (path, Session::spawn_load(path.clone())))
        .collect::<Vec<_>>();
    for (path, task) in tasks {
        let layer = task.join().with_context(|| format!("Failed to load {}", path.display()))?;
        let layer = session.commit_load(layer);
        eprintln!("[overlay] loaded {} as {}", path.display(), layer.id);
    }

    eprintln!("[overlay] running {op:?} on {} layers", session.working_set().len());
    let result = session.spawn_overlay(op).join()?;
    let result = session.commit_result(result);
    eprintln!("[overlay] produced {} ({} polygons, {} buffers)", result.id, result.polygons.len(), result.buffers.len());

    let document = serde_json::to_string_pretty(&geojson::layer_to_geojson(result))?;
    match &args.output {
        Some(path) => {
            fs::write(path, document).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("[overlay] wrote {}", path.display());
        }
        None => println!("{document}"),
    }

    Ok(())
}
