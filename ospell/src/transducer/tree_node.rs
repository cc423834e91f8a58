use std::sync::Arc;

use super::symbol_transition::SymbolTransition;
use crate::types::{
    FlagDiacriticOperation, FlagDiacriticOperator, FlagDiacriticState, SymbolNumber,
    TransitionTableIndex, ValueNumber, Weight,
};

/// One in-flight search position. Nodes are never modified once built; every
/// step derives a new node, and the flag state is shared between a node and
/// its successors until one of them changes it.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub lexicon_state: TransitionTableIndex,
    pub mutator_state: TransitionTableIndex,
    pub input_state: u32,
    pub weight: Weight,
    pub flag_state: FlagDiacriticState,
    pub string: Vec<SymbolNumber>,
}

impl std::cmp::PartialEq for TreeNode {
    fn eq(&self, other: &TreeNode) -> bool {
        self.lexicon_state == other.lexicon_state
            && self.mutator_state == other.mutator_state
            && self.input_state == other.input_state
            && self.weight == other.weight
            && self.flag_state == other.flag_state
            && self.string == other.string
    }
}

impl std::cmp::Eq for TreeNode {}

impl TreeNode {
    #[inline(always)]
    pub fn empty(start_state: FlagDiacriticState) -> TreeNode {
        TreeNode {
            string: vec![],
            input_state: 0,
            mutator_state: 0,
            lexicon_state: 0,
            flag_state: start_state,
            weight: 0.0,
        }
    }

    #[inline(always)]
    pub fn weight(&self) -> Weight {
        self.weight
    }

    #[inline(always)]
    fn extended_string(&self, output_symbol: SymbolNumber) -> Vec<SymbolNumber> {
        let mut string = Vec::with_capacity(self.string.len() + 1);
        string.extend_from_slice(&self.string);
        if output_symbol != 0 {
            string.push(output_symbol);
        }
        string
    }

    /// Follows a lexicon transition without consuming input, emitting
    /// `output_symbol` unless it is epsilon.
    #[inline(always)]
    pub fn update_lexicon(
        &self,
        transition: &SymbolTransition,
        output_symbol: SymbolNumber,
    ) -> TreeNode {
        TreeNode {
            string: self.extended_string(output_symbol),
            input_state: self.input_state,
            mutator_state: self.mutator_state,
            lexicon_state: transition.target(),
            flag_state: Arc::clone(&self.flag_state),
            weight: self.weight + transition.weight(),
        }
    }

    /// Follows a mutator transition without consuming input or emitting.
    #[inline(always)]
    pub fn update_mutator(&self, transition: &SymbolTransition) -> TreeNode {
        TreeNode {
            string: self.string.clone(),
            input_state: self.input_state,
            mutator_state: transition.target(),
            lexicon_state: self.lexicon_state,
            flag_state: Arc::clone(&self.flag_state),
            weight: self.weight + transition.weight(),
        }
    }

    #[inline(always)]
    pub fn update(
        &self,
        output_symbol: SymbolNumber,
        next_input: Option<u32>,
        next_mutator: TransitionTableIndex,
        next_lexicon: TransitionTableIndex,
        weight: Weight,
    ) -> TreeNode {
        TreeNode {
            string: self.extended_string(output_symbol),
            input_state: next_input.unwrap_or(self.input_state),
            mutator_state: next_mutator,
            lexicon_state: next_lexicon,
            flag_state: Arc::clone(&self.flag_state),
            weight: self.weight + weight,
        }
    }

    /// Takes a flag diacritic transition in the lexicon if `op` permits it.
    #[inline(always)]
    pub fn apply_lexicon_operation(
        &self,
        op: &FlagDiacriticOperation,
        transition: &SymbolTransition,
    ) -> Option<TreeNode> {
        let flag_state = self.evaluate(op)?;
        Some(TreeNode {
            string: self.string.clone(),
            input_state: self.input_state,
            mutator_state: self.mutator_state,
            lexicon_state: transition.target(),
            flag_state,
            weight: self.weight + transition.weight(),
        })
    }

    /// Takes a flag diacritic transition in the mutator if `op` permits it.
    #[inline(always)]
    pub fn apply_mutator_operation(
        &self,
        op: &FlagDiacriticOperation,
        transition: &SymbolTransition,
    ) -> Option<TreeNode> {
        let flag_state = self.evaluate(op)?;
        Some(TreeNode {
            string: self.string.clone(),
            input_state: self.input_state,
            mutator_state: transition.target(),
            lexicon_state: self.lexicon_state,
            flag_state,
            weight: self.weight + transition.weight(),
        })
    }

    #[inline(always)]
    fn feature(&self, feature: SymbolNumber) -> ValueNumber {
        self.flag_state.get(feature as usize).copied().unwrap_or(0)
    }

    fn with_feature(&self, feature: SymbolNumber, value: ValueNumber) -> FlagDiacriticState {
        let mut flag_state = Arc::clone(&self.flag_state);
        if self.feature(feature) != value {
            if let Some(slot) = Arc::make_mut(&mut flag_state).get_mut(feature as usize) {
                *slot = value;
            }
        }
        flag_state
    }

    /// Evaluates `op` against this node's flag state, returning the state
    /// after the operation or `None` if the operation fails.
    pub(crate) fn evaluate(&self, op: &FlagDiacriticOperation) -> Option<FlagDiacriticState> {
        let current = self.feature(op.feature);

        match op.operation {
            FlagDiacriticOperator::PositiveSet => Some(self.with_feature(op.feature, op.value)),
            FlagDiacriticOperator::NegativeSet => Some(self.with_feature(op.feature, -op.value)),
            FlagDiacriticOperator::Require => {
                let res = if op.value == 0 {
                    current != 0
                } else {
                    current == op.value
                };

                if res {
                    Some(Arc::clone(&self.flag_state))
                } else {
                    None
                }
            }
            FlagDiacriticOperator::Disallow => {
                let res = if op.value == 0 {
                    current == 0
                } else {
                    current != op.value
                };

                if res {
                    Some(Arc::clone(&self.flag_state))
                } else {
                    None
                }
            }
            FlagDiacriticOperator::Clear => Some(self.with_feature(op.feature, 0)),
            FlagDiacriticOperator::Unification => {
                // unset, already this value, or negatively set to another value
                if current == 0 || current == op.value || (current < 0 && -current != op.value) {
                    Some(self.with_feature(op.feature, op.value))
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operation: FlagDiacriticOperator, value: ValueNumber) -> FlagDiacriticOperation {
        FlagDiacriticOperation {
            operation,
            feature: 0,
            value,
        }
    }

    fn node_with(value: ValueNumber) -> TreeNode {
        TreeNode::empty(Arc::new(vec![value, 0]))
    }

    fn result(value: ValueNumber, o: FlagDiacriticOperation) -> Option<ValueNumber> {
        node_with(value).evaluate(&o).map(|s| s[0])
    }

    #[test]
    fn positive_and_negative_set() {
        use FlagDiacriticOperator::*;
        assert_eq!(result(0, op(PositiveSet, 2)), Some(2));
        assert_eq!(result(-3, op(PositiveSet, 2)), Some(2));
        assert_eq!(result(0, op(NegativeSet, 2)), Some(-2));
        assert_eq!(result(5, op(Clear, 0)), Some(0));
    }

    #[test]
    fn require_and_disallow() {
        use FlagDiacriticOperator::*;
        assert_eq!(result(0, op(Require, 0)), None);
        assert_eq!(result(4, op(Require, 0)), Some(4));
        assert_eq!(result(4, op(Require, 4)), Some(4));
        assert_eq!(result(3, op(Require, 4)), None);

        assert_eq!(result(0, op(Disallow, 0)), Some(0));
        assert_eq!(result(1, op(Disallow, 0)), None);
        assert_eq!(result(1, op(Disallow, 2)), Some(1));
        assert_eq!(result(2, op(Disallow, 2)), None);
    }

    #[test]
    fn unification() {
        use FlagDiacriticOperator::*;
        assert_eq!(result(0, op(Unification, 2)), Some(2));
        assert_eq!(result(2, op(Unification, 2)), Some(2));
        assert_eq!(result(-3, op(Unification, 2)), Some(2));
        assert_eq!(result(-2, op(Unification, 2)), None);
        assert_eq!(result(3, op(Unification, 2)), None);
    }

    #[test]
    fn flag_state_is_not_shared_after_change() {
        let parent = node_with(0);
        let t = SymbolTransition::new(7, 1, 0, 0.5);
        let child = parent
            .apply_lexicon_operation(&op(FlagDiacriticOperator::PositiveSet, 1), &t)
            .unwrap();

        assert_eq!(parent.flag_state[0], 0);
        assert_eq!(child.flag_state[0], 1);
        assert_eq!(child.lexicon_state, 7);
        assert_eq!(child.weight, 0.5);

        let unchanged = parent
            .apply_lexicon_operation(&op(FlagDiacriticOperator::Disallow, 0), &t)
            .unwrap();
        assert!(Arc::ptr_eq(&parent.flag_state, &unchanged.flag_state));
    }

    #[test]
    fn update_skips_epsilon_output() {
        let node = node_with(0);
        let next = node.update(0, Some(1), 2, 3, 1.0).update(5, None, 4, 6, 0.25);
        assert_eq!(next.string, vec![5]);
        assert_eq!(next.input_state, 1);
        assert_eq!((next.mutator_state, next.lexicon_state), (4, 6));
        assert_eq!(next.weight, 1.25);
    }
}
