use smol_str::SmolStr;

use crate::transducer::tree_node::TreeNode;
use crate::types::Weight;

/// Corrections reachable from a single first input symbol.
#[derive(Debug, Clone, Default)]
pub(crate) struct CacheEntry {
    /// Results for empty input.
    pub results_len_0: Vec<(SmolStr, Weight)>,
    /// Results for input consisting of just the first symbol.
    pub results_len_1: Vec<(SmolStr, Weight)>,
    /// Search nodes that have consumed the first symbol, closed under
    /// epsilon moves.
    pub frontier: Vec<TreeNode>,
    /// Every node and result up to this weight is present.
    pub bound: Weight,
    pub built: bool,
}

impl CacheEntry {
    pub fn results(&self, input_len: usize) -> &[(SmolStr, Weight)] {
        if input_len == 0 {
            &self.results_len_0
        } else {
            &self.results_len_1
        }
    }
}

/// One entry per input symbol of the error model, built lazily.
#[derive(Debug, Clone, Default)]
pub(crate) struct Cache {
    entries: Vec<CacheEntry>,
}

impl Cache {
    pub fn new(len: usize) -> Cache {
        let mut cache = Cache::default();
        cache.grow(len);
        cache
    }

    pub fn grow(&mut self, len: usize) {
        if self.entries.len() < len {
            self.entries.resize_with(len, CacheEntry::default);
        }
    }

    /// The entry for `first_sym` if it was built at least up to `bound`.
    pub fn get(&self, first_sym: usize, bound: Weight) -> Option<&CacheEntry> {
        self.entries
            .get(first_sym)
            .filter(|e| e.built && e.bound >= bound)
    }

    /// Stores `entry` unless the current one covers a wider bound.
    pub fn insert(&mut self, first_sym: usize, entry: CacheEntry) {
        self.grow(first_sym + 1);
        let current = &mut self.entries[first_sym];
        if !current.built || entry.bound >= current.bound {
            *current = entry;
        }
    }

    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = CacheEntry::default();
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
