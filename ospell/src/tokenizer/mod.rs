//! Converts raw input bytes into transducer symbols.
use smol_str::SmolStr;

use crate::types::SymbolNumber;

mod trie;

pub use self::trie::LetterTrie;

/// Longest-match tokenizer for a transducer's input symbols.
///
/// Single-byte ASCII spellings are looked up directly; everything else goes
/// through a byte trie.
#[derive(Debug, Clone)]
pub struct Encoder {
    ascii_symbols: [Option<SymbolNumber>; 256],
    letters: LetterTrie,
}

impl Encoder {
    /// Registers the first `input_symbol_count` entries of `key_table`.
    pub fn new(key_table: &[SmolStr], input_symbol_count: SymbolNumber) -> Encoder {
        let mut encoder = Encoder {
            ascii_symbols: [None; 256],
            letters: LetterTrie::new(),
        };

        for (i, key) in key_table
            .iter()
            .enumerate()
            .take(input_symbol_count as usize)
        {
            encoder.read_input_symbol(key, i as SymbolNumber);
        }

        encoder
    }

    /// Makes `s` tokenize to `symbol`. Empty spellings are ignored.
    pub fn read_input_symbol(&mut self, s: &str, symbol: SymbolNumber) {
        let bytes = s.as_bytes();
        if bytes.is_empty() {
            return;
        }

        if bytes.len() == 1 && bytes[0] <= 127 {
            self.ascii_symbols[bytes[0] as usize] = Some(symbol);
        }

        self.letters.add_string(bytes, symbol);
    }

    /// The symbol at the start of `input` and the number of bytes it spans.
    #[inline]
    pub fn find_key(&self, input: &[u8]) -> Option<(SymbolNumber, usize)> {
        let first = *input.first()?;
        match self.ascii_symbols[first as usize] {
            Some(symbol) => Some((symbol, 1)),
            None => self.letters.find_key(input),
        }
    }

    /// Tokenizes all of `input`, or returns `None` at the first byte that no
    /// symbol covers.
    pub fn encode(&self, input: &[u8]) -> Option<Vec<SymbolNumber>> {
        let mut symbols = Vec::with_capacity(input.len());
        let mut pos = 0;
        while pos < input.len() {
            let (symbol, len) = self.find_key(&input[pos..])?;
            symbols.push(symbol);
            pos += len;
        }
        Some(symbols)
    }
}

/// Byte length of a UTF-8 sequence from its lead byte; 0 for a byte that
/// cannot start one.
#[inline]
pub fn utf8_char_width(lead: u8) -> usize {
    if lead <= 127 {
        1
    } else if lead & 0xF8 == 0xF0 {
        4
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xE0 == 0xC0 {
        2
    } else {
        0
    }
}

/// The next character of `input` if it is valid UTF-8.
pub fn next_char(input: &[u8]) -> Option<&str> {
    let width = utf8_char_width(*input.first()?);
    if width == 0 {
        return None;
    }
    std::str::from_utf8(input.get(..width)?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(k: &[&str]) -> Vec<SmolStr> {
        k.iter().map(|s| SmolStr::from(*s)).collect()
    }

    #[test]
    fn tokenizes_registered_spellings() {
        let encoder = Encoder::new(&keys(&["", "o", "l", "u", "t", "ll", "ö"]), 7);
        assert_eq!(encoder.encode(b"olut"), Some(vec![1, 2, 3, 4]));
        assert_eq!(encoder.encode("öl".as_bytes()), Some(vec![6, 2]));
        assert_eq!(encoder.encode(b""), Some(vec![]));
        assert_eq!(encoder.encode(b"olx"), None);
    }

    #[test]
    fn ascii_table_takes_precedence() {
        // the single-byte fast path wins over a longer trie match
        let encoder = Encoder::new(&keys(&["", "l", "ll"]), 3);
        assert_eq!(encoder.find_key(b"ll"), Some((1, 1)));

        let encoder = Encoder::new(&keys(&["", "ll"]), 2);
        assert_eq!(encoder.find_key(b"ll"), Some((1, 2)));
        assert_eq!(encoder.find_key(b"l"), None);
    }

    #[test]
    fn only_input_symbols_are_registered() {
        let encoder = Encoder::new(&keys(&["", "a", "b"]), 2);
        assert_eq!(encoder.find_key(b"a"), Some((1, 1)));
        assert_eq!(encoder.find_key(b"b"), None);
    }

    #[test]
    fn utf8_widths() {
        assert_eq!(utf8_char_width(b'a'), 1);
        assert_eq!(utf8_char_width("ä".as_bytes()[0]), 2);
        assert_eq!(utf8_char_width("€".as_bytes()[0]), 3);
        assert_eq!(utf8_char_width("😄".as_bytes()[0]), 4);
        assert_eq!(utf8_char_width(0x80), 0);
        assert_eq!(utf8_char_width(0xFF), 0);

        assert_eq!(next_char("äx".as_bytes()), Some("ä"));
        assert_eq!(next_char(&[0xC3]), None);
        assert_eq!(next_char(&[0xC3, 0x28]), None);
        assert_eq!(next_char(&[0x80, 0x80]), None);
    }
}
