//! Transducer is a Finite-State Automaton with two tapes / two symbols per
//! transition.
//!
//! The transducer reads the HFST optimized-lookup format. States are not
//! numbered; they are raw addresses into either the index table (below
//! [`TARGET_TABLE`](crate::constants::TARGET_TABLE)) or the transition table
//! (at or above it). The traversal primitives below mirror that layout: most
//! of them take the address *after* a state (`state + 1`), which is where the
//! state's outgoing transitions begin.
pub mod hfst;

mod alphabet;
mod symbol_transition;
pub(crate) mod tree_node;

pub use self::alphabet::TransducerAlphabet;
pub use self::symbol_transition::SymbolTransition;

use crate::tokenizer::Encoder;
use crate::types::{SymbolNumber, TransitionTableIndex, Weight};

/// Error with transducer reading or processing.
#[derive(Debug, thiserror::Error)]
pub enum TransducerError {
    /// Error with mmapping
    #[error("Memory mapping error")]
    Memmap(#[source] std::io::Error),
    /// Error with input/output.
    #[error("IO error")]
    Io(#[source] std::io::Error),
    /// The header is shorter than its fixed layout.
    #[error("Header parsing error: needed {needed} bytes, {available} available")]
    HeaderParsing {
        /// bytes required to finish decoding
        needed: usize,
        /// bytes present in the buffer
        available: usize,
    },
    /// A symbol string runs past the end of the buffer.
    #[error("Alphabet parsing error: symbol {symbol} at offset {offset} is not terminated")]
    AlphabetParsing {
        /// id of the symbol being read
        symbol: SymbolNumber,
        /// buffer offset where the symbol starts
        offset: usize,
    },
    /// The index table does not fit in the buffer.
    #[error("Index table reading error: {entries} entries at offset {offset}, {available} bytes available")]
    IndexTableReading {
        /// buffer offset of the table
        offset: usize,
        /// declared number of records
        entries: usize,
        /// bytes remaining from the offset
        available: usize,
    },
    /// The transition table does not fit in the buffer.
    #[error("Transition table reading error: {entries} entries at offset {offset}, {available} bytes available")]
    TransitionTableReading {
        /// buffer offset of the table
        offset: usize,
        /// declared number of records
        entries: usize,
        /// bytes remaining from the offset
        available: usize,
    },
}

impl TransducerError {
    /// Wrap into i/o error.
    pub fn into_io_error(self) -> std::io::Error {
        match self {
            TransducerError::Memmap(v) => v,
            TransducerError::Io(v) => v,
            v => std::io::Error::new(std::io::ErrorKind::InvalidData, v.to_string()),
        }
    }
}

/// A queryable finite-state transducer.
///
/// The speller is written against this trait; [`hfst::HfstTransducer`] is the
/// implementation for the optimized-lookup binary format.
pub trait Transducer: Sized {
    /// get transducer's alphabet.
    fn alphabet(&self) -> &TransducerAlphabet;
    /// get transducer's alphabet as mutable reference.
    fn mut_alphabet(&mut self) -> &mut TransducerAlphabet;
    /// get the tokenizer for the transducer's input symbols.
    fn encoder(&self) -> &Encoder;
    /// get the tokenizer as mutable reference.
    fn mut_encoder(&mut self) -> &mut Encoder;
    /// whether transitions carry weights.
    fn is_weighted(&self) -> bool;

    /// check if there are transitions with a symbol at given index.
    fn has_transitions(&self, i: TransitionTableIndex, s: Option<SymbolNumber>) -> bool;
    /// get the first transition of a state for a symbol.
    fn next(&self, i: TransitionTableIndex, symbol: SymbolNumber) -> Option<TransitionTableIndex>;
    /// check if there are free transitions at index.
    fn has_epsilons_or_flags(&self, i: TransitionTableIndex) -> bool;
    /// follow free transitions.
    fn take_epsilons_and_flags(&self, i: TransitionTableIndex) -> Option<SymbolTransition>;
    /// follow transitions with given symbol.
    fn take_non_epsilons(
        &self,
        i: TransitionTableIndex,
        symbol: SymbolNumber,
    ) -> Option<SymbolTransition>;
    /// check if given index is an end state.
    fn is_final(&self, i: TransitionTableIndex) -> bool;
    /// get end state weight of a state.
    fn final_weight(&self, i: TransitionTableIndex) -> Option<Weight>;

    /// Registers `string` as a symbol, unless it is known already, and makes
    /// it tokenizable. Returns its id.
    fn add_symbol(&mut self, string: &str) -> SymbolNumber {
        let symbol = match self.alphabet().symbol_for(string) {
            Some(symbol) => symbol,
            None => self.mut_alphabet().add_symbol(string),
        };
        self.mut_encoder().read_input_symbol(string, symbol);
        symbol
    }
}
