//! Weighted-sum suitability index and its categorical label.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::ahp::WeightVector;
use crate::criteria::CRITERIA;
use crate::feature::Feature;

/// Suitability classes, best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    VeryHighlySuitable,
    HighlySuitable,
    ModeratelySuitable,
    LowSuitability,
    NotSuitable,
}

impl Category {
    /// Inclusive lower bounds; the first match wins.
    const THRESHOLDS: [(i64, Category); 4] = [
        (80, Category::VeryHighlySuitable),
        (60, Category::HighlySuitable),
        (40, Category::ModeratelySuitable),
        (20, Category::LowSuitability),
    ];

    pub fn classify(index: i64) -> Self {
        Self::THRESHOLDS.iter()
            .find(|(bound, _)| index >= *bound)
            .map_or(Category::NotSuitable, |(_, category)| *category)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::VeryHighlySuitable => "Very highly suitable",
            Category::HighlySuitable => "Highly suitable",
            Category::ModeratelySuitable => "Moderately suitable",
            Category::LowSuitability => "Low suitability",
            Category::NotSuitable => "Not suitable",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Suitability index `round(Σ rank_i · weight_i)` and its category.
pub fn score(weights: &WeightVector, ranks: &[f64; CRITERIA]) -> (i64, Category) {
    let sum = ranks.iter()
        .zip(weights.as_array())
        .map(|(rank, weight)| rank * weight)
        .sum::<f64>();
    let index = sum.round() as i64;
    (index, Category::classify(index))
}

/// Score a feature; `None` if any criterion rank is missing.
pub fn score_feature(weights: &WeightVector, feature: &Feature) -> Option<(i64, Category)> {
    feature.complete_ranks().map(|ranks| score(weights, &ranks))
}

impl Feature {
    /// Recompute the derived index and category. The record is only touched
    /// when the index differs from the stored one; returns whether it changed.
    pub fn rescore(&mut self, weights: &WeightVector) -> bool {
        let scored = score_feature(weights, self);
        let index = scored.map(|(index, _)| index);
        if index == self.index { return false }

        self.index = index;
        self.accessibility = scored.map(|(_, category)| category);
        true
    }
}
