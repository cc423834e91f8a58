use hashbrown::HashMap;
use log::trace;
use smol_str::SmolStr;
use std::f32;
use std::sync::Arc;

use super::cache::CacheEntry;
use super::limit::WeightLimits;
use super::SpellerConfig;
use crate::constants::NO_SYMBOL;
use crate::speller::suggestion::Suggestion;
use crate::transducer::tree_node::TreeNode;
use crate::transducer::Transducer;
use crate::types::{FlagDiacriticOperation, SpellerWorkerMode, SymbolNumber, Weight};

/// Keeps `weight` for `string` unless an equal or better weight is known.
/// Returns whether it was kept and the weight it replaced.
#[inline(always)]
fn insert_if_better(
    map: &mut HashMap<SmolStr, Weight>,
    string: SmolStr,
    weight: Weight,
) -> (bool, Option<Weight>) {
    let previous = map.get(&string).copied();
    match previous {
        Some(old) if old <= weight => (false, previous),
        _ => {
            map.insert(string, weight);
            (true, previous)
        }
    }
}

/// Filters `results` by the final limit, sorts them and applies `n_best`.
pub(crate) fn sorted_suggestions<I>(results: I, limit: Weight, n_best: Option<usize>) -> Vec<Suggestion>
where
    I: IntoIterator<Item = (SmolStr, Weight)>,
{
    let mut c: Vec<Suggestion> = results
        .into_iter()
        .filter(|(_, w)| *w <= limit)
        .map(|(s, w)| Suggestion::new(s, w))
        .collect();

    c.sort();

    if let Some(n) = n_best {
        c.truncate(n);
    }

    c
}

/// Answers a correction of an input of length 0 or 1 from the cache.
pub(crate) fn cached_suggestions(
    results: &[(SmolStr, Weight)],
    config: &SpellerConfig,
) -> Vec<Suggestion> {
    let mut limits = WeightLimits::new(config);
    for (_, w) in results {
        limits.record(*w, None);
    }
    sorted_suggestions(results.iter().cloned(), limits.limit(), config.n_best)
}

/// A single search over the lexicon, or over the error model and lexicon
/// together. Borrows everything from the speller; nothing is modified.
pub(crate) struct SpellerWorker<'a, T: Transducer> {
    mutator: Option<&'a T>,
    lexicon: &'a T,
    alphabet_translator: &'a [SymbolNumber],
    input: &'a [SymbolNumber],
    mode: SpellerWorkerMode,
}

#[allow(clippy::too_many_arguments)]
impl<'a, T: Transducer> SpellerWorker<'a, T> {
    #[inline(always)]
    pub(crate) fn new(
        mutator: Option<&'a T>,
        lexicon: &'a T,
        alphabet_translator: &'a [SymbolNumber],
        input: &'a [SymbolNumber],
        mode: SpellerWorkerMode,
    ) -> SpellerWorker<'a, T> {
        SpellerWorker {
            mutator,
            lexicon,
            alphabet_translator,
            input,
            mode,
        }
    }

    /// Lexicon features come first in the flag state, then the error model's.
    #[inline(always)]
    fn state_size(&self) -> usize {
        let mutator_size = self.mutator.map(|m| m.alphabet().state_size()).unwrap_or(0);
        (self.lexicon.alphabet().state_size() + mutator_size) as usize
    }

    #[inline(always)]
    fn mutator_operation(&self, op: &FlagDiacriticOperation) -> FlagDiacriticOperation {
        FlagDiacriticOperation {
            feature: op.feature + self.lexicon.alphabet().state_size(),
            ..*op
        }
    }

    #[inline(always)]
    fn start_node(&self) -> TreeNode {
        TreeNode::empty(Arc::new(vec![0; self.state_size()]))
    }

    #[inline(always)]
    fn translate(&self, sym: SymbolNumber) -> SymbolNumber {
        self.alphabet_translator
            .get(sym as usize)
            .copied()
            .unwrap_or(NO_SYMBOL)
    }

    #[inline(always)]
    fn lexicon_epsilons(&self, max_weight: Weight, next_node: &TreeNode, output_nodes: &mut Vec<TreeNode>) {
        let lexicon = self.lexicon;

        if !lexicon.has_epsilons_or_flags(next_node.lexicon_state + 1) {
            return;
        }

        let mut next = match lexicon.next(next_node.lexicon_state, 0) {
            Some(next) => next,
            None => return,
        };

        while let Some(transition) = lexicon.take_epsilons_and_flags(next) {
            next += 1;

            if next_node.weight() + transition.weight() > max_weight {
                continue;
            }

            if transition.input() == 0 {
                let output = match self.mode {
                    SpellerWorkerMode::Correct => 0,
                    _ => transition.symbol(),
                };
                output_nodes.push(next_node.update_lexicon(&transition, output));
            } else if let Some(op) = lexicon.alphabet().operation(transition.input()) {
                if let Some(applied_node) = next_node.apply_lexicon_operation(op, &transition) {
                    output_nodes.push(applied_node);
                }
            }
        }
    }

    #[inline(always)]
    fn mutator_epsilons(&self, max_weight: Weight, next_node: &TreeNode, output_nodes: &mut Vec<TreeNode>) {
        let mutator = match self.mutator {
            Some(mutator) => mutator,
            None => return,
        };

        if !mutator.has_epsilons_or_flags(next_node.mutator_state + 1) {
            return;
        }

        let mut next_m = match mutator.next(next_node.mutator_state, 0) {
            Some(next) => next,
            None => return,
        };

        while let Some(transition) = mutator.take_epsilons_and_flags(next_m) {
            next_m += 1;

            if transition.input() != 0 {
                if next_node.weight() + transition.weight() > max_weight {
                    continue;
                }
                if let Some(op) = mutator.alphabet().operation(transition.input()) {
                    let op = self.mutator_operation(op);
                    if let Some(applied_node) = next_node.apply_mutator_operation(&op, &transition) {
                        output_nodes.push(applied_node);
                    }
                }
            } else if transition.symbol() == 0 {
                if next_node.weight() + transition.weight() <= max_weight {
                    output_nodes.push(next_node.update_mutator(&transition));
                }
            } else {
                self.feed_lexicon(
                    max_weight,
                    next_node,
                    self.translate(transition.symbol()),
                    transition.target(),
                    transition.weight(),
                    0,
                    output_nodes,
                );
            }
        }
    }

    /// Moves the lexicon on `input_sym`, falling back to the unknown and
    /// identity symbols for symbols added at run time.
    #[inline(always)]
    fn feed_lexicon(
        &self,
        max_weight: Weight,
        next_node: &TreeNode,
        input_sym: SymbolNumber,
        mutator_state: u32,
        mutator_weight: Weight,
        input_increment: u32,
        output_nodes: &mut Vec<TreeNode>,
    ) {
        let lexicon = self.lexicon;
        let alphabet = lexicon.alphabet();
        let next_lexicon_state = next_node.lexicon_state + 1;

        if lexicon.has_transitions(next_lexicon_state, Some(input_sym)) {
            self.queue_lexicon_arcs(
                max_weight,
                next_node,
                input_sym,
                input_sym,
                mutator_state,
                mutator_weight,
                input_increment,
                output_nodes,
            );
            return;
        }

        // this input was not originally in the alphabet, so unknown or
        // identity may apply
        if input_sym < alphabet.initial_symbol_count() {
            return;
        }

        for wildcard in [alphabet.unknown(), alphabet.identity()].iter().flatten() {
            if lexicon.has_transitions(next_lexicon_state, Some(*wildcard)) {
                self.queue_lexicon_arcs(
                    max_weight,
                    next_node,
                    *wildcard,
                    input_sym,
                    mutator_state,
                    mutator_weight,
                    input_increment,
                    output_nodes,
                );
            }
        }
    }

    /// Queues every lexicon arc on `arc_sym`. `fed_sym` is the symbol the
    /// lexicon is actually reading, which differs for wildcards.
    #[inline(always)]
    fn queue_lexicon_arcs(
        &self,
        max_weight: Weight,
        next_node: &TreeNode,
        arc_sym: SymbolNumber,
        fed_sym: SymbolNumber,
        mutator_state: u32,
        mutator_weight: Weight,
        input_increment: u32,
        output_nodes: &mut Vec<TreeNode>,
    ) {
        let lexicon = self.lexicon;
        let identity = lexicon.alphabet().identity();
        let mut next = match lexicon.next(next_node.lexicon_state, arc_sym) {
            Some(next) => next,
            None => return,
        };

        while let Some(noneps_trans) = lexicon.take_non_epsilons(next, arc_sym) {
            next += 1;

            let sym = match self.mode {
                SpellerWorkerMode::Correct => fed_sym,
                _ if Some(noneps_trans.symbol()) == identity => fed_sym,
                _ => noneps_trans.symbol(),
            };
            let weight = noneps_trans.weight() + mutator_weight;

            // correction nodes are pruned when popped
            if self.mode == SpellerWorkerMode::Correct || next_node.weight() + weight <= max_weight {
                output_nodes.push(next_node.update(
                    sym,
                    Some(next_node.input_state + input_increment),
                    mutator_state,
                    noneps_trans.target(),
                    weight,
                ));
            }
        }
    }

    #[inline(always)]
    fn queue_mutator_arcs(
        &self,
        mutator: &T,
        max_weight: Weight,
        next_node: &TreeNode,
        arc_sym: SymbolNumber,
        input_sym: SymbolNumber,
        output_nodes: &mut Vec<TreeNode>,
    ) {
        let identity = mutator.alphabet().identity();
        let mut next_m = match mutator.next(next_node.mutator_state, arc_sym) {
            Some(next) => next,
            None => return,
        };

        while let Some(transition) = mutator.take_non_epsilons(next_m, arc_sym) {
            next_m += 1;

            let mut sym = transition.symbol();
            if Some(sym) == identity {
                sym = input_sym;
            }

            if sym == 0 {
                if next_node.weight() + transition.weight() <= max_weight {
                    output_nodes.push(next_node.update(
                        0,
                        Some(next_node.input_state + 1),
                        transition.target(),
                        next_node.lexicon_state,
                        transition.weight(),
                    ));
                }
                continue;
            }

            self.feed_lexicon(
                max_weight,
                next_node,
                self.translate(sym),
                transition.target(),
                transition.weight(),
                1,
                output_nodes,
            );
        }
    }

    #[inline(always)]
    fn consume_input(&self, max_weight: Weight, next_node: &TreeNode, output_nodes: &mut Vec<TreeNode>) {
        let mutator = match self.mutator {
            Some(mutator) => mutator,
            None => return,
        };

        let input_sym = match self.input.get(next_node.input_state as usize) {
            Some(sym) => *sym,
            None => return,
        };

        let next_mutator_state = next_node.mutator_state + 1;

        if mutator.has_transitions(next_mutator_state, Some(input_sym)) {
            self.queue_mutator_arcs(mutator, max_weight, next_node, input_sym, input_sym, output_nodes);
            return;
        }

        if input_sym < mutator.alphabet().initial_symbol_count() {
            return;
        }

        let alphabet = mutator.alphabet();
        for wildcard in [alphabet.identity(), alphabet.unknown()].iter().flatten() {
            if mutator.has_transitions(next_mutator_state, Some(*wildcard)) {
                self.queue_mutator_arcs(mutator, max_weight, next_node, *wildcard, input_sym, output_nodes);
            }
        }
    }

    #[inline(always)]
    fn lexicon_consume(&self, max_weight: Weight, next_node: &TreeNode, output_nodes: &mut Vec<TreeNode>) {
        let input_sym = match self.input.get(next_node.input_state as usize) {
            Some(sym) => self.translate(*sym),
            None => return,
        };

        self.feed_lexicon(
            max_weight,
            next_node,
            input_sym,
            next_node.mutator_state,
            0.0,
            1,
            output_nodes,
        );
    }

    #[inline(always)]
    fn lexicon_string(&self, node: &TreeNode) -> SmolStr {
        self.lexicon.alphabet().string_from_symbols(&node.string)
    }

    #[inline(always)]
    fn final_weight(&self, node: &TreeNode) -> Option<Weight> {
        if !self.lexicon.is_final(node.lexicon_state) {
            return None;
        }
        let lexicon_weight = self.lexicon.final_weight(node.lexicon_state).unwrap_or(0.0);

        match (self.mode, self.mutator) {
            (SpellerWorkerMode::Correct, Some(mutator)) => {
                if !mutator.is_final(node.mutator_state) {
                    return None;
                }
                let mutator_weight = mutator.final_weight(node.mutator_state).unwrap_or(0.0);
                Some(node.weight() + lexicon_weight + mutator_weight)
            }
            _ => Some(node.weight() + lexicon_weight),
        }
    }

    pub(crate) fn is_correct(&self) -> bool {
        let mut nodes = vec![self.start_node()];

        while let Some(next_node) = nodes.pop() {
            if next_node.input_state as usize == self.input.len()
                && self.lexicon.is_final(next_node.lexicon_state)
            {
                return true;
            }

            self.lexicon_epsilons(f32::MAX, &next_node, &mut nodes);
            self.lexicon_consume(f32::MAX, &next_node, &mut nodes);
        }

        false
    }

    pub(crate) fn analyse(&self) -> Vec<Suggestion> {
        trace!("Beginning analyse");

        let mut nodes = vec![self.start_node()];
        let mut outputs = HashMap::new();
        let mut iteration_count = 0usize;

        while let Some(next_node) = nodes.pop() {
            iteration_count += 1;

            if next_node.input_state as usize == self.input.len() {
                if let Some(weight) = self.final_weight(&next_node) {
                    insert_if_better(&mut outputs, self.lexicon_string(&next_node), weight);
                }
            }

            self.lexicon_epsilons(f32::MAX, &next_node, &mut nodes);
            self.lexicon_consume(f32::MAX, &next_node, &mut nodes);
        }

        trace!("Analysed in {} iterations, {} outputs", iteration_count, outputs.len());
        sorted_suggestions(outputs, f32::MAX, None)
    }

    /// Expands everything reachable by consuming at most the first input
    /// symbol. Nodes are pruned against `config` as results for the whole
    /// (at most one symbol) input come in; the entry records the bound it is
    /// complete up to.
    pub(crate) fn build_cache(&self, config: &SpellerConfig) -> CacheEntry {
        trace!("Building cache for {:?}", self.input.first());

        let mut nodes = vec![self.start_node()];
        let mut corrections_len_0 = HashMap::new();
        let mut corrections_len_1 = HashMap::new();
        let mut frontier = vec![];
        let mut limits = WeightLimits::new(config);

        while let Some(next_node) = nodes.pop() {
            let max_weight = limits.limit();

            if next_node.weight() > max_weight {
                continue;
            }

            self.lexicon_epsilons(max_weight, &next_node, &mut nodes);
            self.mutator_epsilons(max_weight, &next_node, &mut nodes);

            if let Some(weight) = self.final_weight(&next_node) {
                if weight <= max_weight {
                    let input_len = next_node.input_state as usize;
                    let corrections = if input_len == 0 {
                        &mut corrections_len_0
                    } else {
                        &mut corrections_len_1
                    };
                    let (kept, previous) =
                        insert_if_better(corrections, self.lexicon_string(&next_node), weight);
                    if kept && input_len == self.input.len() {
                        limits.record(weight, previous);
                    }
                }
            }

            if !self.input.is_empty() && next_node.input_state == 0 {
                self.consume_input(max_weight, &next_node, &mut nodes);
            } else if next_node.input_state == 1 {
                frontier.push(next_node);
            }
        }

        // the limit only tightens, so anything under it was fully expanded
        let bound = limits.limit();
        corrections_len_0.retain(|_, w| *w <= bound);
        corrections_len_1.retain(|_, w| *w <= bound);
        frontier.retain(|node| node.weight() <= bound);

        trace!("Cache frontier holds {} nodes up to {}", frontier.len(), bound);

        CacheEntry {
            results_len_0: corrections_len_0.into_iter().collect(),
            results_len_1: corrections_len_1.into_iter().collect(),
            frontier,
            bound,
            built: true,
        }
    }

    /// Searches for corrections. With a `frontier` from the cache the search
    /// resumes from the nodes that consumed the first input symbol, otherwise
    /// it starts from scratch.
    pub(crate) fn suggest(
        &self,
        config: &SpellerConfig,
        frontier: Option<Vec<TreeNode>>,
    ) -> Vec<Suggestion> {
        // epsilons up to the first symbol were expanded when caching
        let (mut nodes, expand_from) = match frontier {
            Some(frontier) => (frontier, 2),
            None => (vec![self.start_node()], 0),
        };

        trace!("Beginning suggest from {} nodes", nodes.len());

        let mut corrections = HashMap::new();
        let mut limits = WeightLimits::new(config);
        let mut iteration_count = 0usize;

        while let Some(next_node) = nodes.pop() {
            iteration_count += 1;

            let max_weight = limits.limit();

            if next_node.weight() > max_weight {
                continue;
            }

            if next_node.input_state >= expand_from {
                self.lexicon_epsilons(max_weight, &next_node, &mut nodes);
                self.mutator_epsilons(max_weight, &next_node, &mut nodes);
            }

            if next_node.input_state as usize != self.input.len() {
                self.consume_input(max_weight, &next_node, &mut nodes);
                continue;
            }

            let weight = match self.final_weight(&next_node) {
                Some(weight) if weight <= max_weight => weight,
                _ => continue,
            };

            let string = self.lexicon_string(&next_node);
            let (kept, previous) = insert_if_better(&mut corrections, string, weight);
            if kept {
                limits.record(weight, previous);
            }
        }

        trace!(
            "Suggested in {} iterations, {} corrections, best {}",
            iteration_count,
            corrections.len(),
            limits.best()
        );

        sorted_suggestions(corrections, limits.limit(), config.n_best)
    }
}
