use hashbrown::HashMap;
use log::warn;
use smol_str::SmolStr;

use crate::transducer::alphabet::TransducerAlphabet;
use crate::transducer::TransducerError;
use crate::types::{
    FlagDiacriticOperation, FlagDiacriticOperator, OperationsMap, SymbolNumber, ValueNumber,
};

const IDENTITY_SYMBOL: &str = "@_IDENTITY_SYMBOL_@";
const UNKNOWN_SYMBOL: &str = "@_UNKNOWN_SYMBOL_@";
const EPSILON_SYMBOL: &str = "@_EPSILON_SYMBOL_@";

/// Decodes the alphabet section of a transducer image.
pub struct TransducerAlphabetParser {
    key_table: Vec<SmolStr>,
    string_to_symbol: HashMap<SmolStr, SymbolNumber>,
    operations: OperationsMap,
    feature_bucket: HashMap<SmolStr, SymbolNumber>,
    value_bucket: HashMap<SmolStr, ValueNumber>,
    identity_symbol: Option<SymbolNumber>,
    unknown_symbol: Option<SymbolNumber>,
}

impl std::default::Default for TransducerAlphabetParser {
    fn default() -> Self {
        let mut value_bucket = HashMap::new();
        // value 0 is "no value"
        value_bucket.insert(SmolStr::default(), 0);

        TransducerAlphabetParser {
            key_table: Vec::with_capacity(64),
            string_to_symbol: HashMap::new(),
            operations: HashMap::new(),
            feature_bucket: HashMap::new(),
            value_bucket,
            identity_symbol: None,
            unknown_symbol: None,
        }
    }
}

/// `@P.FEATURE.VALUE@` or `@R.FEATURE@`.
fn is_flag_diacritic(key: &str) -> bool {
    key.len() >= 5 && key.starts_with('@') && key.ends_with('@') && key.as_bytes()[2] == b'.'
}

fn is_marker(key: &str) -> bool {
    key.len() > 1 && key.starts_with('@') && key.ends_with('@')
}

impl TransducerAlphabetParser {
    /// An empty parser; value 0 is reserved for "unset".
    pub fn new() -> TransducerAlphabetParser {
        Self::default()
    }

    /// Parses a flag diacritic. Returns false for an unknown operator.
    fn handle_flag_diacritic(&mut self, i: SymbolNumber, key: &str) -> bool {
        let operation = match key.get(1..2).and_then(|o| o.parse::<FlagDiacriticOperator>().ok()) {
            Some(operation) => operation,
            None => return false,
        };

        let body = key.get(3..key.len() - 1).unwrap_or("");
        let mut chunks = body.splitn(2, '.');
        let feature = SmolStr::from(chunks.next().unwrap_or(""));
        let value = SmolStr::from(chunks.next().unwrap_or(""));

        let feat_n = self.feature_bucket.len() as SymbolNumber;
        let feature = *self.feature_bucket.entry(feature).or_insert(feat_n);
        let val_n = self.value_bucket.len() as ValueNumber;
        let value = *self.value_bucket.entry(value).or_insert(val_n);

        self.operations.insert(
            i,
            FlagDiacriticOperation {
                operation,
                feature,
                value,
            },
        );
        true
    }

    fn handle_key(&mut self, i: SymbolNumber, key: SmolStr) {
        if i == 0 {
            self.key_table.push(SmolStr::default());
            return;
        }

        if is_flag_diacritic(&key) {
            if !self.handle_flag_diacritic(i, &key) {
                warn!("Unhandled flag diacritic operator: {}", &key);
            }
            self.key_table.push(SmolStr::default());
        } else if is_marker(&key) {
            match key.as_str() {
                IDENTITY_SYMBOL => self.identity_symbol = Some(i),
                UNKNOWN_SYMBOL => self.unknown_symbol = Some(i),
                EPSILON_SYMBOL => {}
                _ => warn!("Unhandled alphabet key: {}", &key),
            }
            self.key_table.push(SmolStr::default());
        } else {
            self.string_to_symbol.insert(key.clone(), i);
            self.key_table.push(key);
        }
    }

    fn parse_inner(&mut self, buf: &[u8], symbols: SymbolNumber) -> Result<usize, TransducerError> {
        let mut offset = 0usize;

        for i in 0..symbols {
            let end = buf
                .get(offset..)
                .and_then(|rest| rest.iter().position(|b| *b == 0))
                .ok_or(TransducerError::AlphabetParsing { symbol: i, offset })?;

            let key: SmolStr = String::from_utf8_lossy(&buf[offset..offset + end]).into();
            self.handle_key(i, key);

            offset += end + 1;
        }

        Ok(offset)
    }

    /// Decodes `symbols` strings from the start of `buf`. Returns the alphabet
    /// and the number of bytes consumed.
    pub fn parse(
        buf: &[u8],
        symbols: SymbolNumber,
    ) -> Result<(TransducerAlphabet, usize), TransducerError> {
        let mut p = TransducerAlphabetParser::new();
        let length = p.parse_inner(buf, symbols)?;

        let alphabet = TransducerAlphabet {
            key_table: p.key_table,
            initial_symbol_count: symbols,
            flag_state_size: p.feature_bucket.len() as SymbolNumber,
            string_to_symbol: p.string_to_symbol,
            operations: p.operations,
            identity_symbol: p.identity_symbol,
            unknown_symbol: p.unknown_symbol,
        };

        Ok((alphabet, length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(keys: &[&str]) -> Vec<u8> {
        let mut buf = vec![];
        for key in keys {
            buf.extend_from_slice(key.as_bytes());
            buf.push(0);
        }
        buf
    }

    #[test]
    fn parses_ordinary_symbols() {
        let mut buf = bytes(&["@_EPSILON_SYMBOL_@", "a", "b", "ä"]);
        buf.extend_from_slice(&[9, 9]);
        let (alphabet, len) = TransducerAlphabetParser::parse(&buf, 4).unwrap();

        assert_eq!(len, buf.len() - 2);
        assert_eq!(alphabet.key_table(), &["", "a", "b", "ä"]);
        assert_eq!(alphabet.symbol_for("ä"), Some(3));
        assert_eq!(alphabet.symbol_for(""), None);
        assert_eq!(alphabet.state_size(), 0);
    }

    #[test]
    fn parses_flag_diacritics() {
        let buf = bytes(&["", "@P.CASE.NOM@", "@R.CASE@", "@U.CASE.GEN@", "@D.NUM.PL@", "@P.CASE.GEN@"]);
        let (alphabet, _) = TransducerAlphabetParser::parse(&buf, 6).unwrap();

        assert_eq!(alphabet.state_size(), 2);
        assert!(alphabet.is_flag(1));
        assert!(!alphabet.is_flag(0));

        let p = alphabet.operation(1).unwrap();
        assert_eq!(p.operation, FlagDiacriticOperator::PositiveSet);
        assert_eq!((p.feature, p.value), (0, 1));

        let r = alphabet.operation(2).unwrap();
        assert_eq!(r.operation, FlagDiacriticOperator::Require);
        assert_eq!((r.feature, r.value), (0, 0));

        assert_eq!(alphabet.operation(3).unwrap().value, 2);
        assert_eq!(alphabet.operation(4).unwrap().feature, 1);
        assert_eq!(alphabet.operation(4).unwrap().value, 3);
        assert_eq!(alphabet.operation(5).unwrap().value, 2);

        assert!(alphabet.key_table().iter().all(|k| k.is_empty()));
        assert!(alphabet.string_to_symbol().is_empty());
    }

    #[test]
    fn parses_wildcards_and_markers() {
        let buf = bytes(&["", "@_IDENTITY_SYMBOL_@", "@_UNKNOWN_SYMBOL_@", "@FOO@", "x", "@X.A@"]);
        let (alphabet, _) = TransducerAlphabetParser::parse(&buf, 6).unwrap();

        assert_eq!(alphabet.identity(), Some(1));
        assert_eq!(alphabet.unknown(), Some(2));
        assert_eq!(alphabet.key_table()[3], "");
        assert!(!alphabet.is_flag(3));
        // unknown operator letter
        assert!(!alphabet.is_flag(5));
        assert_eq!(alphabet.symbol_for("x"), Some(4));
    }

    #[test]
    fn unterminated_symbol_fails() {
        let mut buf = bytes(&["", "a"]);
        buf.extend_from_slice(b"bc");
        match TransducerAlphabetParser::parse(&buf, 3) {
            Err(TransducerError::AlphabetParsing { symbol, offset }) => {
                assert_eq!(symbol, 2);
                assert_eq!(offset, 3);
            }
            other => panic!("unexpected result: {:?}", other.map(|(_, len)| len)),
        }
    }
}
