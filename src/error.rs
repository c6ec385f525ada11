use thiserror::Error;

/// Errors surfaced by the overlay and suitability engines.
///
/// Every variant except `Io` is deterministic.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A coordinate token is missing its comma separator or has a non-numeric ordinate.
    #[error("malformed geometry in {source_name}: {reason}")]
    MalformedGeometry { source_name: String, reason: String },

    /// The document could not be read as XML at all.
    #[error("malformed document {source_name}: {reason}")]
    MalformedDocument { source_name: String, reason: String },

    /// An overlay precondition was not met (too few layers or polygons).
    #[error("insufficient input for {op}: {reason}")]
    InsufficientInput { op: &'static str, reason: String },

    /// The underlying geometry routine produced no usable result.
    #[error("geometry operation {op} failed: {reason}")]
    GeometryOpFailed { op: &'static str, reason: String },

    /// Query point lies outside the study-area boundary.
    #[error("point (lat {lat:.6}, lon {lon:.6}) is outside the study area")]
    OutOfBounds { lat: f64, lon: f64 },

    /// Pairwise matrix is incomplete, non-reciprocal, or holds non-finite values.
    #[error("invalid pairwise matrix: {0}")]
    InvalidMatrix(String),

    /// Buffer distance must be positive and finite.
    #[error("invalid buffer distance: {0}")]
    InvalidDistance(f64),

    /// Reference data (features or study area) could not be interpreted.
    #[error("invalid reference data: {0}")]
    InvalidReference(String),

    /// A background operation was cancelled before it finished.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn malformed(source_name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedGeometry { source_name: source_name.to_string(), reason: reason.into() }
    }

    pub(crate) fn insufficient(op: &'static str, reason: impl Into<String>) -> Self {
        Self::InsufficientInput { op, reason: reason.into() }
    }

    pub(crate) fn op_failed(op: &'static str, reason: impl Into<String>) -> Self {
        Self::GeometryOpFailed { op, reason: reason.into() }
    }
}
