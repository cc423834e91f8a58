use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::{FlagDiacriticOperation, OperationsMap, SymbolNumber};

/// The symbol table of a transducer, with its flag diacritics and wildcards.
///
/// The key table holds the display string of every symbol; reserved markers
/// (flag diacritics, identity, unknown and unrecognised `@...@` markers) show
/// as the empty string. Symbols may be appended after decoding, see
/// [`add_symbol`](Self::add_symbol).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransducerAlphabet {
    pub(crate) key_table: Vec<SmolStr>,
    pub(crate) initial_symbol_count: SymbolNumber,
    pub(crate) flag_state_size: SymbolNumber,
    pub(crate) string_to_symbol: HashMap<SmolStr, SymbolNumber>,
    pub(crate) operations: OperationsMap,
    pub(crate) identity_symbol: Option<SymbolNumber>,
    pub(crate) unknown_symbol: Option<SymbolNumber>,
}

impl TransducerAlphabet {
    /// Concatenates the display strings of `syms`. Ids past the end of the
    /// key table contribute nothing.
    #[inline(always)]
    pub fn string_from_symbols(&self, syms: &[SymbolNumber]) -> SmolStr {
        syms.iter()
            .filter_map(|s| self.key_table.get(*s as usize))
            .map(|s| &**s)
            .collect()
    }

    /// Display strings indexed by symbol id.
    #[inline(always)]
    pub fn key_table(&self) -> &[SmolStr] {
        &self.key_table
    }

    /// Number of distinct flag diacritic features.
    #[inline(always)]
    pub fn state_size(&self) -> SymbolNumber {
        self.flag_state_size
    }

    /// The flag diacritic operation of `symbol`, if it is a flag.
    #[inline(always)]
    pub fn operation(&self, symbol: SymbolNumber) -> Option<&FlagDiacriticOperation> {
        self.operations.get(&symbol)
    }

    /// Symbol ids of ordinary (non-marker) symbols by spelling.
    #[inline(always)]
    pub fn string_to_symbol(&self) -> &HashMap<SmolStr, SymbolNumber> {
        &self.string_to_symbol
    }

    /// Id of the ordinary symbol spelled `string`.
    #[inline(always)]
    pub fn symbol_for(&self, string: &str) -> Option<SymbolNumber> {
        self.string_to_symbol.get(string).copied()
    }

    /// Whether `symbol` is a flag diacritic.
    #[inline(always)]
    pub fn is_flag(&self, symbol: SymbolNumber) -> bool {
        self.operations.contains_key(&symbol)
    }

    /// Appends `string` as a fresh symbol and returns its id. Does not check
    /// for an existing symbol with the same spelling.
    pub fn add_symbol(&mut self, string: &str) -> SymbolNumber {
        let symbol = self.key_table.len() as SymbolNumber;
        self.string_to_symbol.insert(string.into(), symbol);
        self.key_table.push(string.into());
        symbol
    }

    /// Id of `@_IDENTITY_SYMBOL_@`, if present.
    #[inline(always)]
    pub fn identity(&self) -> Option<SymbolNumber> {
        self.identity_symbol
    }

    /// Id of `@_UNKNOWN_SYMBOL_@`, if present.
    #[inline(always)]
    pub fn unknown(&self) -> Option<SymbolNumber> {
        self.unknown_symbol
    }

    /// Symbol count as decoded from the image, before any growth.
    #[inline(always)]
    pub fn initial_symbol_count(&self) -> SymbolNumber {
        self.initial_symbol_count
    }

    /// Current symbol count, including symbols added at run time.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.key_table.len()
    }

    /// Whether the key table is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.key_table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet(keys: &[&str]) -> TransducerAlphabet {
        let mut string_to_symbol = HashMap::new();
        for (i, key) in keys.iter().enumerate().skip(1) {
            string_to_symbol.insert(SmolStr::from(*key), i as SymbolNumber);
        }
        TransducerAlphabet {
            key_table: keys.iter().map(|k| SmolStr::from(*k)).collect(),
            initial_symbol_count: keys.len() as SymbolNumber,
            flag_state_size: 0,
            string_to_symbol,
            operations: HashMap::new(),
            identity_symbol: None,
            unknown_symbol: None,
        }
    }

    #[test]
    fn add_symbol_appends() {
        let mut alpha = alphabet(&["", "a", "b"]);
        assert_eq!(alpha.add_symbol("ä"), 3);
        assert_eq!(alpha.symbol_for("ä"), Some(3));
        assert_eq!(alpha.len(), 4);
        assert_eq!(alpha.initial_symbol_count(), 3);
    }

    #[test]
    fn string_from_symbols_skips_out_of_range() {
        let alpha = alphabet(&["", "o", "l", "u", "t"]);
        assert_eq!(alpha.string_from_symbols(&[1, 2, 0, 3, 4]), "olut");
        assert_eq!(alpha.string_from_symbols(&[1, 99]), "o");
    }
}
