//! Suggestion for a spelling correction.
use crate::types::Weight;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::cmp::Ordering;
use std::cmp::Ordering::Equal;

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Suggestion for a spelling correction, or an analysis of a word-form
pub struct Suggestion {
    /// the suggested word-form
    pub value: SmolStr,
    /// total penalty weight of the word-form
    pub weight: Weight,
}

impl Suggestion {
    /// creates a spelling correction suggestion
    pub fn new(value: SmolStr, weight: Weight) -> Suggestion {
        Suggestion { value, weight }
    }

    /// gets the suggested word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the penalty weight of the suggestion
    pub fn weight(&self) -> Weight {
        self.weight
    }
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        let x = self.weight.partial_cmp(&other.weight).unwrap_or(Equal);

        if let Equal = x {
            return self.value.cmp(&other.value);
        }

        x
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.weight == other.weight
    }
}

impl Eq for Suggestion {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// A correction together with one of its analyses
pub struct AnalysedSuggestion {
    /// the corrected word-form
    pub value: SmolStr,
    /// weight of the correction
    pub correction_weight: Weight,
    /// an analysis of the corrected word-form
    pub analysis: SmolStr,
    /// weight of the analysis
    pub weight: Weight,
}

impl AnalysedSuggestion {
    /// gets the corrected word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the analysis
    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    /// gets the weight of the analysis
    pub fn weight(&self) -> Weight {
        self.weight
    }
}
