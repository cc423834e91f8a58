//! Weight bounds of a correction search.
use std::f32;

use super::SpellerConfig;
use crate::types::Weight;

/// The lowest weights seen so far, ascending, at most `capacity` of them.
#[derive(Debug, Clone)]
pub struct WeightQueue {
    capacity: usize,
    weights: Vec<Weight>,
}

#[allow(clippy::len_without_is_empty)]
impl WeightQueue {
    /// An empty queue holding at most `capacity` weights.
    pub fn new(capacity: usize) -> WeightQueue {
        WeightQueue {
            capacity,
            weights: Vec::with_capacity(capacity.min(64) + 1),
        }
    }

    /// Inserts `w`, dropping the heaviest weight if over capacity.
    pub fn push(&mut self, w: Weight) {
        let at = self.weights.partition_point(|x| *x <= w);
        self.weights.insert(at, w);
        self.weights.truncate(self.capacity);
    }

    /// Replaces one occurrence of `old` (if still held) with `new`.
    pub fn replace(&mut self, old: Weight, new: Weight) {
        if let Some(at) = self.weights.iter().position(|x| *x == old) {
            self.weights.remove(at);
        }
        self.push(new);
    }

    /// Number of weights held.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Heaviest weight, or `f32::MAX` if empty.
    pub fn highest(&self) -> Weight {
        self.weights.last().copied().unwrap_or(f32::MAX)
    }
}

/// The dynamic weight ceiling of one correction search.
#[derive(Debug, Clone)]
pub(crate) struct WeightLimits {
    max_weight: Weight,
    n_best: Option<usize>,
    beam: Option<Weight>,
    best: Weight,
    queue: WeightQueue,
}

impl WeightLimits {
    pub fn new(config: &SpellerConfig) -> WeightLimits {
        WeightLimits {
            max_weight: config.max_weight.unwrap_or(f32::MAX),
            n_best: config.n_best,
            beam: config.beam,
            best: f32::MAX,
            queue: WeightQueue::new(config.n_best.unwrap_or(0)),
        }
    }

    /// Records a result weight. `previous` is the weight the same string had
    /// before, if it was found already.
    pub fn record(&mut self, weight: Weight, previous: Option<Weight>) {
        if weight < self.best {
            self.best = weight;
        }

        if self.n_best.is_some() {
            match previous {
                Some(old) => self.queue.replace(old, weight),
                None => self.queue.push(weight),
            }
        }
    }

    pub fn best(&self) -> Weight {
        self.best
    }

    /// Current ceiling; results and nodes above it are discarded.
    pub fn limit(&self) -> Weight {
        let mut limit = self.max_weight;

        if let Some(n) = self.n_best {
            if self.queue.len() >= n {
                limit = limit.min(self.queue.highest());
            }
        }

        if let Some(beam) = self.beam {
            if self.best < f32::MAX {
                limit = limit.min(self.best + beam);
            }
        }

        limit
    }

    #[inline(always)]
    pub fn admits(&self, w: Weight) -> bool {
        w <= self.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_keeps_lowest() {
        let mut q = WeightQueue::new(3);
        assert_eq!(q.highest(), f32::MAX);

        for w in [5.0, 1.0, 3.0, 4.0, 2.0] {
            q.push(w);
        }
        assert_eq!(q.weights, vec![1.0, 2.0, 3.0]);
        assert_eq!(q.highest(), 3.0);

        q.replace(3.0, 0.5);
        assert_eq!(q.weights, vec![0.5, 1.0, 2.0]);
        assert_eq!(q.highest(), 2.0);
    }

    #[test]
    fn limits_compose() {
        let config = SpellerConfig::default()
            .with_max_weight(10.0)
            .with_n_best(2)
            .with_beam(3.0);
        let mut limits = WeightLimits::new(&config);
        assert_eq!(limits.limit(), 10.0);

        limits.record(5.0, None);
        // beam applies as soon as a result is known
        assert_eq!(limits.limit(), 8.0);

        limits.record(6.0, None);
        assert_eq!(limits.limit(), 6.0);

        limits.record(4.0, Some(6.0));
        assert_eq!(limits.best(), 4.0);
        assert_eq!(limits.limit(), 5.0);
        assert!(limits.admits(5.0));
        assert!(!limits.admits(5.5));
    }

    #[test]
    fn unlimited_by_default() {
        let limits = WeightLimits::new(&SpellerConfig::default());
        assert_eq!(limits.limit(), f32::MAX);
    }
}
