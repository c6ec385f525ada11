#![doc = "Vector overlay and AHP site-suitability engine"]
pub mod ahp;
pub mod color;
pub mod config;
pub mod criteria;
pub mod error;
pub mod feature;
pub mod geom;
pub mod io;
pub mod kml;
pub mod layer;
pub mod nearest;
pub mod overlay;
pub mod score;
pub mod session;
pub mod task;

#[doc(inline)]
pub use ahp::{compute_weights, PairwiseMatrix, WeightVector};

#[doc(inline)]
pub use config::EngineConfig;

#[doc(inline)]
pub use criteria::{Criterion, CRITERIA};

#[doc(inline)]
pub use error::{EngineError, Result};

#[doc(inline)]
pub use feature::{Feature, FeatureGeometry};

#[doc(inline)]
pub use io::{load_reference, ReferenceData};

#[doc(inline)]
pub use layer::{Layer, ViewRegion};

#[doc(inline)]
pub use nearest::{nearest, Nearest, NearestIndex, StudyArea};

#[doc(inline)]
pub use overlay::{buffer, clip, dissolve, intersection, union, BufferDistance, DistanceUnit};

#[doc(inline)]
pub use score::{score, score_feature, Category};

#[doc(inline)]
pub use session::{GeometryStore, OverlayOp, Selection, Session};

#[doc(inline)]
pub use task::{CancelFlag, Task};
