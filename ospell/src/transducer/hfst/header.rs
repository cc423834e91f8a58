use byteorder::{NativeEndian, ReadBytesExt};
use smol_str::SmolStr;
use std::io::Cursor;

use crate::constants::{HEADER_FLAG_COUNT, HFST3_MAGIC};
use crate::transducer::TransducerError;
use crate::types::{HeaderFlag, SymbolNumber, TransitionTableIndex};

/// Two symbol counts, four table counts, nine properties.
const FIXED_HEADER_LEN: usize = 2 * 2 + 4 * 4 + HEADER_FLAG_COUNT * 4;

/// The fixed-size header of a transducer image, with the optional HFST3
/// prefix block it may carry.
#[derive(Debug, Clone)]
pub struct TransducerHeader {
    symbols: SymbolNumber,
    input_symbols: SymbolNumber,
    trans_index_table: usize,
    trans_target_table: usize,
    states: TransitionTableIndex,
    transitions: TransitionTableIndex,

    properties: [bool; HEADER_FLAG_COUNT],
    hfst3_properties: Vec<(SmolStr, SmolStr)>,
    header_size: usize,
}

/// Reads the optional HFST3 prefix block. Returns the offset just past it
/// (0 when absent) and its key/value pairs.
fn read_hfst3_prefix(buf: &[u8]) -> Result<(usize, Vec<(SmolStr, SmolStr)>), TransducerError> {
    if !buf.starts_with(HFST3_MAGIC) {
        return Ok((0, vec![]));
    }

    let mut rdr = Cursor::new(buf);
    rdr.set_position(HFST3_MAGIC.len() as u64);

    let block_len = rdr
        .read_u16::<NativeEndian>()
        .map_err(|_| truncated(HFST3_MAGIC.len() + 3, buf.len()))? as usize;

    // length, then a single NUL
    let start = HFST3_MAGIC.len() + 3;
    let end = start + block_len;
    let block = buf
        .get(start..end)
        .ok_or_else(|| truncated(end, buf.len()))?;

    let mut fields = block
        .split(|b| *b == 0)
        .map(|s| SmolStr::from(String::from_utf8_lossy(s)));
    let mut properties = vec![];
    while let (Some(key), Some(value)) = (fields.next(), fields.next()) {
        if key.is_empty() {
            break;
        }
        properties.push((key, value));
    }

    Ok((end, properties))
}

#[inline(always)]
fn truncated(needed: usize, available: usize) -> TransducerError {
    TransducerError::HeaderParsing { needed, available }
}

#[allow(clippy::len_without_is_empty)]
impl TransducerHeader {
    /// Decodes the header at the start of `buf`.
    pub fn new(buf: &[u8]) -> Result<TransducerHeader, TransducerError> {
        let (start, hfst3_properties) = read_hfst3_prefix(buf)?;

        let end = start + FIXED_HEADER_LEN;
        if buf.len() < end {
            return Err(truncated(end, buf.len()));
        }

        let mut rdr = Cursor::new(&buf[start..end]);
        let read_err = |_| truncated(end, buf.len());

        let input_symbols = rdr.read_u16::<NativeEndian>().map_err(read_err)?;
        let symbols = rdr.read_u16::<NativeEndian>().map_err(read_err)?;
        let trans_index_table = rdr.read_u32::<NativeEndian>().map_err(read_err)? as usize;
        let trans_target_table = rdr.read_u32::<NativeEndian>().map_err(read_err)? as usize;
        let states = rdr.read_u32::<NativeEndian>().map_err(read_err)?;
        let transitions = rdr.read_u32::<NativeEndian>().map_err(read_err)?;

        let mut props = [false; HEADER_FLAG_COUNT];

        for prop in props.iter_mut() {
            let v = rdr.read_u32::<NativeEndian>().map_err(read_err)?;
            *prop = v != 0
        }

        Ok(TransducerHeader {
            symbols,
            input_symbols,
            trans_index_table,
            trans_target_table,
            states,
            transitions,
            properties: props,
            hfst3_properties,
            header_size: end,
        })
    }

    /// Total number of symbols in the alphabet.
    pub fn symbol_count(&self) -> SymbolNumber {
        self.symbols
    }

    /// Number of symbols that occur on the input side.
    pub fn input_symbol_count(&self) -> SymbolNumber {
        self.input_symbols
    }

    /// Number of index table records.
    pub fn index_table_size(&self) -> usize {
        self.trans_index_table
    }

    /// Number of transition table records.
    pub fn target_table_size(&self) -> usize {
        self.trans_target_table
    }

    /// Whether the property `flag` is set.
    pub fn has_flag(&self, flag: HeaderFlag) -> bool {
        self.properties[flag as usize]
    }

    /// State count as recorded by the writer.
    pub fn states(&self) -> TransitionTableIndex {
        self.states
    }

    /// Transition count as recorded by the writer.
    pub fn transitions(&self) -> TransitionTableIndex {
        self.transitions
    }

    /// All nine properties, in [`HeaderFlag`] order.
    pub fn properties(&self) -> &[bool; HEADER_FLAG_COUNT] {
        &self.properties
    }

    /// Value of a key in the HFST3 prefix block, e.g. `"type"` or `"name"`.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.hfst3_properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Bytes taken by the prefix block and the header.
    pub fn len(&self) -> usize {
        self.header_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::header_bytes;

    #[test]
    fn reads_plain_header() {
        let buf = header_bytes(3, 5, 7, 11, [true, false, true, false, false, false, false, false, true]);
        let header = TransducerHeader::new(&buf).unwrap();

        assert_eq!(header.input_symbol_count(), 3);
        assert_eq!(header.symbol_count(), 5);
        assert_eq!(header.index_table_size(), 7);
        assert_eq!(header.target_table_size(), 11);
        assert!(header.has_flag(HeaderFlag::Weighted));
        assert!(!header.has_flag(HeaderFlag::Deterministic));
        assert!(header.has_flag(HeaderFlag::InputDeterministic));
        assert!(header.has_flag(HeaderFlag::HasUnweightedInputEpsilonCycles));
        assert_eq!(header.len(), FIXED_HEADER_LEN);
        assert_eq!(header.property("type"), None);
    }

    #[test]
    fn skips_hfst3_prefix() {
        let block = b"version\03.3\0type\0HFST_OLW\0";
        let mut buf = HFST3_MAGIC.to_vec();
        buf.extend_from_slice(&(block.len() as u16).to_ne_bytes());
        buf.push(0);
        buf.extend_from_slice(block);
        let prefix_len = buf.len();
        buf.extend(header_bytes(2, 4, 1, 1, [false; HEADER_FLAG_COUNT]));

        let header = TransducerHeader::new(&buf).unwrap();
        assert_eq!(header.len(), prefix_len + FIXED_HEADER_LEN);
        assert_eq!(header.symbol_count(), 4);
        assert_eq!(header.property("type"), Some("HFST_OLW"));
        assert_eq!(header.property("version"), Some("3.3"));
    }

    #[test]
    fn partial_magic_consumes_nothing() {
        // "HFS" followed by a plain header whose first bytes happen to match
        let mut buf = header_bytes(0, 0, 0, 0, [false; HEADER_FLAG_COUNT]);
        buf[0] = b'H';
        buf[1] = b'F';
        buf[2] = b'S';
        buf[3] = b'X';
        let header = TransducerHeader::new(&buf).unwrap();
        assert_eq!(header.len(), FIXED_HEADER_LEN);
        assert_eq!(
            header.input_symbol_count(),
            u16::from_ne_bytes([b'H', b'F'])
        );
    }

    #[test]
    fn truncated_header_fails() {
        let buf = header_bytes(1, 1, 1, 1, [false; HEADER_FLAG_COUNT]);
        match TransducerHeader::new(&buf[..20]) {
            Err(TransducerError::HeaderParsing { needed, available }) => {
                assert_eq!(needed, FIXED_HEADER_LEN);
                assert_eq!(available, 20);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let mut prefix = HFST3_MAGIC.to_vec();
        prefix.extend_from_slice(&100u16.to_ne_bytes());
        prefix.push(0);
        assert!(TransducerHeader::new(&prefix).is_err());
    }
}
