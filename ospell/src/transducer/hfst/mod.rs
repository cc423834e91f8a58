//! HFST optimized-lookup transducer reader.
/// Alphabet decoding.
pub mod alphabet;
/// Header and HFST3 prefix decoding.
pub mod header;
/// Index table records.
pub mod index_table;
/// Backing storage for transducer images.
pub mod source;
/// Transition table records.
pub mod transition_table;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::debug;

use self::alphabet::TransducerAlphabetParser;
use self::header::TransducerHeader;
pub use self::index_table::{IndexSlot, IndexTable};
use self::source::ByteSource;
pub use self::transition_table::TransitionTable;
use super::alphabet::TransducerAlphabet;
use super::symbol_transition::SymbolTransition;
use super::{Transducer, TransducerError};
use crate::constants::TARGET_TABLE;
use crate::tokenizer::Encoder;
use crate::types::{HeaderFlag, SymbolNumber, TransitionTableIndex, Weight};

/// A transducer in HFST optimized-lookup format.
///
/// Cloning shares the underlying bytes and copies the alphabet and encoder,
/// which are the only parts that grow after loading.
#[derive(Clone)]
pub struct HfstTransducer {
    header: TransducerHeader,
    alphabet: TransducerAlphabet,
    encoder: Encoder,
    pub(crate) index_table: Arc<IndexTable>,
    pub(crate) transition_table: Arc<TransitionTable>,
}

impl fmt::Debug for HfstTransducer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:?}", self.header)?;
        writeln!(f, "{:?}", self.alphabet)?;
        writeln!(f, "{:?}", self.index_table)?;
        writeln!(f, "{:?}", self.transition_table)?;
        Ok(())
    }
}

impl HfstTransducer {
    fn from_source(buf: Arc<ByteSource>) -> Result<HfstTransducer, TransducerError> {
        let header = TransducerHeader::new(&buf)?;
        let alphabet_offset = header.len();
        let (alphabet, alphabet_len) =
            TransducerAlphabetParser::parse(&buf[alphabet_offset..], header.symbol_count())?;

        let index_table_offset = alphabet_offset + alphabet_len;
        let index_table = IndexTable::new(
            Arc::clone(&buf),
            index_table_offset,
            header.index_table_size(),
        )?;

        let trans_table_offset = index_table_offset + index_table.byte_len();
        let transition_table = TransitionTable::new(
            Arc::clone(&buf),
            trans_table_offset,
            header.target_table_size(),
        )?;

        let encoder = Encoder::new(alphabet.key_table(), header.input_symbol_count());

        debug!(
            "Loaded transducer: {} symbols ({} input), {} index records, {} transitions, weighted: {}",
            header.symbol_count(),
            header.input_symbol_count(),
            index_table.len(),
            transition_table.len(),
            header.has_flag(HeaderFlag::Weighted)
        );

        Ok(HfstTransducer {
            header,
            alphabet,
            encoder,
            index_table: Arc::new(index_table),
            transition_table: Arc::new(transition_table),
        })
    }

    /// Decodes a transducer held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<HfstTransducer, TransducerError> {
        HfstTransducer::from_source(Arc::new(ByteSource::Owned(bytes)))
    }

    /// Memory-maps and decodes the transducer at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<HfstTransducer, TransducerError> {
        let source = ByteSource::map_file(path)?;
        HfstTransducer::from_source(Arc::new(source))
    }

    /// The decoded header.
    #[inline(always)]
    pub fn header(&self) -> &TransducerHeader {
        &self.header
    }
}

impl Transducer for HfstTransducer {
    #[inline(always)]
    fn is_weighted(&self) -> bool {
        self.header.has_flag(HeaderFlag::Weighted)
    }

    #[inline(always)]
    fn is_final(&self, i: TransitionTableIndex) -> bool {
        if i >= TARGET_TABLE {
            self.transition_table.is_final(i - TARGET_TABLE)
        } else {
            self.index_table.is_final(i)
        }
    }

    #[inline(always)]
    fn final_weight(&self, i: TransitionTableIndex) -> Option<Weight> {
        if i >= TARGET_TABLE {
            self.transition_table.weight(i - TARGET_TABLE)
        } else {
            self.index_table.final_weight(i)
        }
    }

    #[inline(always)]
    fn has_transitions(&self, i: TransitionTableIndex, s: Option<SymbolNumber>) -> bool {
        let sym = match s {
            Some(v) => v,
            None => return false,
        };

        if i >= TARGET_TABLE {
            match self.transition_table.input_symbol(i - TARGET_TABLE) {
                Some(res) => sym == res,
                None => false,
            }
        } else {
            match i.checked_add(u32::from(sym)) {
                Some(slot) => self.index_table.input_symbol(slot) == Some(sym),
                None => false,
            }
        }
    }

    #[inline(always)]
    fn has_epsilons_or_flags(&self, i: TransitionTableIndex) -> bool {
        if i >= TARGET_TABLE {
            match self.transition_table.input_symbol(i - TARGET_TABLE) {
                Some(sym) => sym == 0 || self.alphabet.is_flag(sym),
                None => false,
            }
        } else {
            self.index_table.input_symbol(i) == Some(0)
        }
    }

    #[inline(always)]
    fn take_epsilons_and_flags(&self, i: TransitionTableIndex) -> Option<SymbolTransition> {
        let sym = self.transition_table.input_symbol(i)?;
        if sym != 0 && !self.alphabet.is_flag(sym) {
            None
        } else {
            self.transition_table.symbol_transition(i)
        }
    }

    #[inline(always)]
    fn take_non_epsilons(
        &self,
        i: TransitionTableIndex,
        symbol: SymbolNumber,
    ) -> Option<SymbolTransition> {
        let input_sym = self.transition_table.input_symbol(i)?;
        if input_sym != symbol {
            None
        } else {
            self.transition_table.symbol_transition(i)
        }
    }

    #[inline(always)]
    fn next(&self, i: TransitionTableIndex, symbol: SymbolNumber) -> Option<TransitionTableIndex> {
        if i >= TARGET_TABLE {
            Some(i - TARGET_TABLE + 1)
        } else {
            let slot = i.checked_add(1 + u32::from(symbol))?;
            self.index_table.target(slot)?.checked_sub(TARGET_TABLE)
        }
    }

    #[inline(always)]
    fn alphabet(&self) -> &TransducerAlphabet {
        &self.alphabet
    }

    #[inline(always)]
    fn mut_alphabet(&mut self) -> &mut TransducerAlphabet {
        &mut self.alphabet
    }

    #[inline(always)]
    fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    #[inline(always)]
    fn mut_encoder(&mut self) -> &mut Encoder {
        &mut self.encoder
    }
}
