use byteorder::{ByteOrder, NativeEndian};
use std::fmt;
use std::sync::Arc;

use super::source::ByteSource;
use crate::constants::{NO_SYMBOL, NO_TABLE_INDEX, TRANS_TABLE_SIZE};
use crate::transducer::symbol_transition::SymbolTransition;
use crate::transducer::TransducerError;
use crate::types::{SymbolNumber, TransitionTableIndex, Weight};

/// The transition table: one 12-byte record per arc, read in place.
pub struct TransitionTable {
    size: TransitionTableIndex,
    buf: Arc<ByteSource>,
    offset: usize,
}

impl fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Transition table index: {}", self.size)?;
        Ok(())
    }
}

#[allow(clippy::len_without_is_empty)]
impl TransitionTable {
    /// A view of `size` records starting at `offset`. Fails if the records
    /// run past the end of the buffer.
    pub fn new(
        buf: Arc<ByteSource>,
        offset: usize,
        size: usize,
    ) -> Result<TransitionTable, TransducerError> {
        let available = buf.len().saturating_sub(offset);
        let fits = size
            .checked_mul(TRANS_TABLE_SIZE)
            .map(|bytes| bytes <= available)
            .unwrap_or(false);

        if !fits || size > TransitionTableIndex::MAX as usize {
            return Err(TransducerError::TransitionTableReading {
                offset,
                entries: size,
                available,
            });
        }

        Ok(TransitionTable {
            size: size as TransitionTableIndex,
            buf,
            offset,
        })
    }

    /// Number of records.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size as usize
    }

    #[inline(always)]
    fn record(&self, i: TransitionTableIndex) -> Option<&[u8]> {
        if i >= self.size {
            return None;
        }

        let index = self.offset + TRANS_TABLE_SIZE * i as usize;
        self.buf.get(index..index + TRANS_TABLE_SIZE)
    }

    #[inline(always)]
    fn read_symbol(&self, i: TransitionTableIndex, at: usize) -> Option<SymbolNumber> {
        let record = self.record(i)?;
        match NativeEndian::read_u16(&record[at..]) {
            NO_SYMBOL => None,
            sym => Some(sym),
        }
    }

    /// Input symbol of record `i`.
    #[inline(always)]
    pub fn input_symbol(&self, i: TransitionTableIndex) -> Option<SymbolNumber> {
        self.read_symbol(i, 0)
    }

    /// Output symbol of record `i`.
    #[inline(always)]
    pub fn output_symbol(&self, i: TransitionTableIndex) -> Option<SymbolNumber> {
        self.read_symbol(i, 2)
    }

    /// Target of record `i`.
    #[inline(always)]
    pub fn target(&self, i: TransitionTableIndex) -> Option<TransitionTableIndex> {
        let record = self.record(i)?;
        match NativeEndian::read_u32(&record[4..]) {
            NO_TABLE_INDEX => None,
            target => Some(target),
        }
    }

    /// Weight of record `i`; also the final weight of a final record.
    #[inline(always)]
    pub fn weight(&self, i: TransitionTableIndex) -> Option<Weight> {
        let record = self.record(i)?;
        Some(NativeEndian::read_f32(&record[8..]))
    }

    /// Whether record `i` is the final marker of a state.
    #[inline(always)]
    pub fn is_final(&self, i: TransitionTableIndex) -> bool {
        self.input_symbol(i).is_none()
            && self.output_symbol(i).is_none()
            && self.target(i) == Some(1)
    }

    /// The arc at `i`, if `i` holds one.
    #[inline(always)]
    pub fn symbol_transition(&self, i: TransitionTableIndex) -> Option<SymbolTransition> {
        Some(SymbolTransition::new(
            self.target(i)?,
            self.input_symbol(i)?,
            self.output_symbol(i).unwrap_or(0),
            self.weight(i)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(input: u16, output: u16, target: u32, weight: f32) -> Vec<u8> {
        let mut v = input.to_ne_bytes().to_vec();
        v.extend_from_slice(&output.to_ne_bytes());
        v.extend_from_slice(&target.to_ne_bytes());
        v.extend_from_slice(&weight.to_ne_bytes());
        v
    }

    #[test]
    fn decodes_records() {
        let mut buf = record(NO_SYMBOL, NO_SYMBOL, 1, 0.75);
        buf.extend(record(3, 4, 17, 2.0));
        let table = TransitionTable::new(Arc::new(ByteSource::Owned(buf)), 0, 2).unwrap();

        assert!(table.is_final(0));
        assert_eq!(table.weight(0), Some(0.75));
        assert!(table.symbol_transition(0).is_none());

        let t = table.symbol_transition(1).unwrap();
        assert_eq!((t.input(), t.symbol(), t.target(), t.weight()), (3, 4, 17, 2.0));
        assert!(!table.is_final(1));
        assert_eq!(table.input_symbol(2), None);
        assert_eq!(table.weight(2), None);
    }

    #[test]
    fn rejects_overrun() {
        let buf = record(1, 1, 1, 0.0);
        assert!(matches!(
            TransitionTable::new(Arc::new(ByteSource::Owned(buf)), 4, 1),
            Err(TransducerError::TransitionTableReading { .. })
        ));
    }
}
