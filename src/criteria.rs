use std::fmt;

/// Number of suitability criteria; the pairwise matrix is `CRITERIA x CRITERIA`.
pub const CRITERIA: usize = 6;

/// Suitability criteria in weight-vector order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Criterion {
    School,
    Lulc,
    Water,
    Transport,
    Elevation,
    Population,
}

impl Criterion {
    pub const ALL: [Criterion; CRITERIA] = [
        Criterion::School,
        Criterion::Lulc,
        Criterion::Water,
        Criterion::Transport,
        Criterion::Elevation,
        Criterion::Population,
    ];

    /// Position in the matrix and weight vector.
    #[inline] pub fn index(self) -> usize { self as usize }

    /// Property key carrying this criterion's rank in reference feature data.
    pub fn attribute(self) -> &'static str {
        match self {
            Criterion::School => "Schools",
            Criterion::Lulc => "LULC",
            Criterion::Water => "Water",
            Criterion::Transport => "Transport",
            Criterion::Elevation => "Slope",
            Criterion::Population => "Pop",
        }
    }

    /// Look up a criterion by its attribute key.
    pub fn from_attribute(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.attribute() == key)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Criterion::School => "School",
            Criterion::Lulc => "LULC",
            Criterion::Water => "Water",
            Criterion::Transport => "Transport",
            Criterion::Elevation => "Elevation",
            Criterion::Population => "Population",
        })
    }
}
