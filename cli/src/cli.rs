use std::path::PathBuf;

/// Overlay and site-suitability CLI
#[derive(clap::Parser, Debug)]
#[command(name = "sitesuit", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Load KML documents and run an overlay operation on them
    Overlay(OverlayArgs),

    /// Compute criterion weights from the configured pairwise matrix
    Weights(WeightsArgs),

    /// Score the site nearest to a point inside the study area
    Score(ScoreArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum OverlayKind {
    Union,
    Intersection,
    Dissolve,
    Clip,
    Buffer,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum UnitArg {
    #[value(alias = "m", alias = "meters")]
    Metres,
    #[value(alias = "km", alias = "kilometers")]
    Kilometres,
    #[value(alias = "mi")]
    Miles,
}

impl From<UnitArg> for sitesuit::DistanceUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Metres => sitesuit::DistanceUnit::Metres,
            UnitArg::Kilometres => sitesuit::DistanceUnit::Kilometres,
            UnitArg::Miles => sitesuit::DistanceUnit::Miles,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct OverlayArgs {
    /// Operation to run
    #[arg(value_enum)]
    pub op: OverlayKind,

    /// Input KML documents, in load order
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub inputs: Vec<PathBuf>,

    /// Buffer distance (buffer only)
    #[arg(short, long, default_value_t = 100.0)]
    pub distance: f64,

    /// Buffer distance unit
    #[arg(short, long, value_enum, default_value_t = UnitArg::Metres)]
    pub unit: UnitArg,

    /// Output GeoJSON file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct WeightsArgs {
    /// Engine config (JSON); defaults are used when omitted
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override one comparison, e.g. `--set 0,1,3` (row, column, value)
    #[arg(long, value_name = "I,J,V")]
    pub set: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ScoreArgs {
    /// Engine config (JSON) naming the study area and reference data
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Latitude of the query point, degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the query point, degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn buffer_unit_accepts_aliases_only() {
        let cli = Cli::try_parse_from(["sitesuit", "overlay", "buffer", "a.kml", "--unit", "km"]).unwrap();
        let Commands::Overlay(args) = cli.command else { panic!("expected overlay") };
        assert!(matches!(args.unit, UnitArg::Kilometres));

        assert!(Cli::try_parse_from(["sitesuit", "overlay", "buffer", "a.kml", "--unit", "furlongs"]).is_err());
    }
}
