use crate::types::{SymbolNumber, TransitionTableIndex, Weight};

/// A transition read from a transducer: where it leads, what it emits, and
/// what it costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolTransition {
    target: TransitionTableIndex,
    input: SymbolNumber,
    symbol: SymbolNumber,
    weight: Weight,
}

impl SymbolTransition {
    /// Builds an arc from its parts.
    pub fn new(
        target: TransitionTableIndex,
        input: SymbolNumber,
        symbol: SymbolNumber,
        weight: Weight,
    ) -> SymbolTransition {
        SymbolTransition {
            target,
            input,
            symbol,
            weight,
        }
    }

    /// Transition table index the arc leads to.
    #[inline(always)]
    pub fn target(&self) -> TransitionTableIndex {
        self.target
    }

    /// Input symbol of the arc.
    #[inline(always)]
    pub fn input(&self) -> SymbolNumber {
        self.input
    }

    /// Output symbol of the arc.
    #[inline(always)]
    pub fn symbol(&self) -> SymbolNumber {
        self.symbol
    }

    /// Weight of the arc.
    #[inline(always)]
    pub fn weight(&self) -> Weight {
        self.weight
    }
}
