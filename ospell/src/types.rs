//! Primitive types shared by the transducer reader and the speller.
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Symbol id. `0` is epsilon.
pub type SymbolNumber = u16;
/// Interned flag diacritic value. `0` is the neutral value.
pub type ValueNumber = i16;
/// Raw table address of a state or transition.
pub type TransitionTableIndex = u32;
/// Tropical weight; lower is better.
pub type Weight = f32;

/// Flag diacritic operator, the letter after the opening `@` of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagDiacriticOperator {
    /// `P`: set the feature to the value.
    PositiveSet,
    /// `N`: set the feature to the negated value.
    NegativeSet,
    /// `R`: require the feature to be set (to the value, if one is given).
    Require,
    /// `D`: disallow the feature being set (to the value, if one is given).
    Disallow,
    /// `C`: reset the feature.
    Clear,
    /// `U`: unify the feature with the value.
    Unification,
}

impl std::str::FromStr for FlagDiacriticOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(FlagDiacriticOperator::PositiveSet),
            "N" => Ok(FlagDiacriticOperator::NegativeSet),
            "R" => Ok(FlagDiacriticOperator::Require),
            "D" => Ok(FlagDiacriticOperator::Disallow),
            "C" => Ok(FlagDiacriticOperator::Clear),
            "U" => Ok(FlagDiacriticOperator::Unification),
            _ => Err(()),
        }
    }
}

/// Boolean properties stored in the transducer header, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFlag {
    /// Transitions and final states carry weights.
    Weighted,
    /// Deterministic on both tapes.
    Deterministic,
    /// Deterministic on the input tape.
    InputDeterministic,
    /// Minimal.
    Minimized,
    /// Contains cycles.
    Cyclic,
    /// Contains epsilon:epsilon transitions.
    HasEpsilonEpsilonTransitions,
    /// Contains transitions with epsilon input.
    HasInputEpsilonTransitions,
    /// Contains cycles made only of input epsilons.
    HasInputEpsilonCycles,
    /// Contains zero-weight input epsilon cycles.
    HasUnweightedInputEpsilonCycles,
}

/// A parsed flag diacritic: operator, feature and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDiacriticOperation {
    /// The operator.
    pub operation: FlagDiacriticOperator,
    /// Dense feature id, index into the flag state.
    pub feature: SymbolNumber,
    /// Dense value id; `0` when the marker names no value.
    pub value: ValueNumber,
}

/// Current value of every feature, shared copy-on-write between search nodes.
pub type FlagDiacriticState = Arc<Vec<ValueNumber>>;
/// Flag diacritic operations keyed by the symbol that carries them.
pub type OperationsMap = hashbrown::HashMap<SymbolNumber, FlagDiacriticOperation>;

/// What a search is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellerWorkerMode {
    /// Membership in the lexicon only.
    Check,
    /// All distinct lexicon outputs for the input.
    Lookup,
    /// Mutator-lexicon product search for corrections.
    Correct,
}
