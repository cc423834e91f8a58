use hashbrown::HashMap;

use crate::types::SymbolNumber;

#[derive(Debug, Clone, Default)]
struct Node {
    symbol: Option<SymbolNumber>,
    children: HashMap<u8, u32>,
}

/// Byte trie over symbol spellings. Nodes live in one vector and refer to
/// their children by position; node 0 is the root.
#[derive(Debug, Clone)]
pub struct LetterTrie {
    nodes: Vec<Node>,
}

impl Default for LetterTrie {
    fn default() -> Self {
        LetterTrie {
            nodes: vec![Node::default()],
        }
    }
}

impl LetterTrie {
    /// An empty trie.
    pub fn new() -> LetterTrie {
        Self::default()
    }

    /// Registers `key` as the spelling of `symbol`, replacing any earlier
    /// symbol with the same spelling.
    pub fn add_string(&mut self, key: &[u8], symbol: SymbolNumber) {
        let mut cur = 0usize;
        for byte in key {
            cur = match self.nodes[cur].children.get(byte) {
                Some(&next) => next as usize,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[cur].children.insert(*byte, next as u32);
                    next
                }
            };
        }
        self.nodes[cur].symbol = Some(symbol);
    }

    /// The longest registered spelling that prefixes `input`, as its symbol
    /// and byte length.
    pub fn find_key(&self, input: &[u8]) -> Option<(SymbolNumber, usize)> {
        let mut cur = 0usize;
        let mut best = None;
        for (i, byte) in input.iter().enumerate() {
            cur = match self.nodes[cur].children.get(byte) {
                Some(&next) => next as usize,
                None => break,
            };
            if let Some(symbol) = self.nodes[cur].symbol {
                best = Some((symbol, i + 1));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_wins() {
        let mut trie = LetterTrie::new();
        trie.add_string(b"a", 1);
        trie.add_string(b"ab", 2);
        trie.add_string(b"abcd", 3);

        assert_eq!(trie.find_key(b"abc"), Some((2, 2)));
        assert_eq!(trie.find_key(b"abcde"), Some((3, 4)));
        assert_eq!(trie.find_key(b"ax"), Some((1, 1)));
        assert_eq!(trie.find_key(b"x"), None);
        assert_eq!(trie.find_key(b""), None);
    }

    #[test]
    fn re_adding_overwrites() {
        let mut trie = LetterTrie::new();
        trie.add_string("ä".as_bytes(), 4);
        trie.add_string("ä".as_bytes(), 9);
        assert_eq!(trie.find_key("äx".as_bytes()), Some((9, 2)));
    }
}
