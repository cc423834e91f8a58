use byteorder::{ByteOrder, NativeEndian};
use std::fmt;
use std::mem;
use std::sync::Arc;

use super::source::ByteSource;
use crate::constants::{INDEX_TABLE_SIZE, NO_SYMBOL, NO_TABLE_INDEX};
use crate::transducer::TransducerError;
use crate::types::{SymbolNumber, TransitionTableIndex, Weight};

/// Decoded contents of one index table record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexSlot {
    /// Transitions on `input` start at `target` in the transition table.
    Target {
        /// input symbol of the slot
        input: SymbolNumber,
        /// transition table index, offset by `TARGET_TABLE`
        target: TransitionTableIndex,
    },
    /// The state owning this slot is final with the given weight.
    Final(Weight),
    /// Nothing here.
    Vacant,
}

/// The index table: one 6-byte record per slot, read in place.
pub struct IndexTable {
    size: TransitionTableIndex,
    buf: Arc<ByteSource>,
    offset: usize,
}

impl fmt::Debug for IndexTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Index table index: {}", self.size)?;
        Ok(())
    }
}

#[allow(clippy::len_without_is_empty)]
impl IndexTable {
    /// A view of `size` records starting at `offset`. Fails if the records
    /// run past the end of the buffer.
    pub fn new(
        buf: Arc<ByteSource>,
        offset: usize,
        size: usize,
    ) -> Result<IndexTable, TransducerError> {
        let available = buf.len().saturating_sub(offset);
        let fits = size
            .checked_mul(INDEX_TABLE_SIZE)
            .map(|bytes| bytes <= available)
            .unwrap_or(false);

        if !fits || size > TransitionTableIndex::MAX as usize {
            return Err(TransducerError::IndexTableReading {
                offset,
                entries: size,
                available,
            });
        }

        Ok(IndexTable {
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

    /// Byte length of the table.
    #[inline(always)]
    pub fn byte_len(&self) -> usize {
        self.size as usize * INDEX_TABLE_SIZE
    }

    #[inline(always)]
    fn record(&self, i: TransitionTableIndex) -> Option<&[u8]> {
        if i >= self.size {
            return None;
        }

        let index = self.offset + INDEX_TABLE_SIZE * i as usize;
        self.buf.get(index..index + INDEX_TABLE_SIZE)
    }

    #[inline(always)]
    fn raw(&self, i: TransitionTableIndex) -> Option<(SymbolNumber, u32)> {
        let record = self.record(i)?;
        let input = NativeEndian::read_u16(record);
        let target = NativeEndian::read_u32(&record[mem::size_of::<SymbolNumber>()..]);
        Some((input, target))
    }

    /// Decodes record `i`. Out of range reads as vacant.
    #[inline(always)]
    pub fn slot(&self, i: TransitionTableIndex) -> IndexSlot {
        match self.raw(i) {
            None | Some((NO_SYMBOL, NO_TABLE_INDEX)) => IndexSlot::Vacant,
            Some((NO_SYMBOL, bits)) => IndexSlot::Final(f32::from_bits(bits)),
            Some((input, target)) => IndexSlot::Target { input, target },
        }
    }

    /// Input symbol of record `i`, if it points at transitions.
    #[inline(always)]
    pub fn input_symbol(&self, i: TransitionTableIndex) -> Option<SymbolNumber> {
        match self.slot(i) {
            IndexSlot::Target { input, .. } => Some(input),
            _ => None,
        }
    }

    /// Transition target of record `i`.
    #[inline(always)]
    pub fn target(&self, i: TransitionTableIndex) -> Option<TransitionTableIndex> {
        match self.slot(i) {
            IndexSlot::Target { target, .. } if target != NO_TABLE_INDEX => Some(target),
            _ => None,
        }
    }

    /// Final weight, if record `i` marks a final state.
    #[inline(always)]
    pub fn final_weight(&self, i: TransitionTableIndex) -> Option<Weight> {
        match self.slot(i) {
            IndexSlot::Final(weight) => Some(weight),
            _ => None,
        }
    }

    /// Whether record `i` marks a final state.
    #[inline(always)]
    pub fn is_final(&self, i: TransitionTableIndex) -> bool {
        matches!(self.slot(i), IndexSlot::Final(_))
    }
}
