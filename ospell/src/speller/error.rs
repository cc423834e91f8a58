/// Speller construction or usage error.
#[derive(Debug, thiserror::Error)]
pub enum SpellerError {
    /// The error model and the lexicon disagree on weightedness.
    #[error("Transducer type mismatch: error model weighted: {mutator_weighted}, lexicon weighted: {lexicon_weighted}")]
    TransducerType {
        /// whether the error model is weighted
        mutator_weighted: bool,
        /// whether the lexicon is weighted
        lexicon_weighted: bool,
    },
    /// A weight-based limit was requested from an unweighted speller.
    #[error("Weight limits require a weighted speller")]
    UnweightedSpeller,
    /// Correction was requested from a speller without an error model.
    #[error("Speller has no error model")]
    NoErrorModel,
}
