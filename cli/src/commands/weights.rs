use anyhow::{bail, Context, Result};
use sitesuit::{Criterion, EngineConfig, Session};

/// Parse a `row,column,value` override. Indices are zero-based.
fn parse_override(raw: &str) -> Result<(usize, usize, f64)> {
    let parts = raw.split(',').map(str::trim).collect::<Vec<_>>();
    let [i, j, v] = parts.as_slice() else {
        bail!("expected I,J,V but got {raw:?}");
    };
    Ok((
        i.parse().with_context(|| format!("bad row index in {raw:?}"))?,
        j.parse().with_context(|| format!("bad column index in {raw:?}"))?,
        v.parse().with_context(|| format!("bad comparison value in {raw:?}"))?,
    ))
}

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::WeightsArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut session = Session::new(&config)?;

    for raw in &args.set {
        let (i, j, value) = parse_override(raw)?;
        session.set_comparison(i, j, Some(value))?;
        tracing::info!(i, j, value, "set comparison");
    }

    let weights = session.weights();
    for criterion in Criterion::ALL {
        println!("{:<12} {:.3}", criterion.to_string(), weights.get(criterion.index()));
    }
    println!("{:<12} {:.3}", "Total", weights.sum());

    Ok(())
}
