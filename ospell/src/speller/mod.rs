//! Speller: checking, analysis and correction over a lexicon and an optional
//! error model.
use std::cmp::Ordering::Equal;
use std::f32;

use log::debug;
use serde::{Deserialize, Serialize};

use self::cache::Cache;
use self::worker::SpellerWorker;
use crate::speller::suggestion::{AnalysedSuggestion, Suggestion};
use crate::tokenizer::next_char;
use crate::transducer::hfst::HfstTransducer;
use crate::transducer::Transducer;
use crate::types::{SpellerWorkerMode, SymbolNumber, Weight};

mod cache;
mod error;
/// Weight bounds of a search.
pub mod limit;
/// Search results.
pub mod suggestion;
mod worker;

pub use self::error::SpellerError;

/// Limits applied to a correction search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellerConfig {
    /// return at most this many suggestions
    pub n_best: Option<usize>,
    /// discard suggestions heavier than this
    pub max_weight: Option<Weight>,
    /// discard suggestions heavier than the best one plus this
    pub beam: Option<Weight>,
}

impl SpellerConfig {
    /// No limits.
    pub const fn default() -> SpellerConfig {
        SpellerConfig {
            n_best: None,
            max_weight: None,
            beam: None,
        }
    }

    /// sets the number of suggestions to return
    pub fn with_n_best(mut self, n_best: usize) -> SpellerConfig {
        self.n_best = Some(n_best);
        self
    }

    /// sets the absolute weight ceiling
    pub fn with_max_weight(mut self, max_weight: Weight) -> SpellerConfig {
        self.max_weight = Some(max_weight);
        self
    }

    /// sets the beam relative to the best suggestion
    pub fn with_beam(mut self, beam: Weight) -> SpellerConfig {
        self.beam = Some(beam);
        self
    }
}

/// A spell checker built from a lexicon and, for corrections, an error model.
///
/// Input that contains characters unknown to the transducers registers them
/// as new symbols, which is why the lookup operations take `&mut self`.
#[derive(Debug)]
pub struct HfstSpeller<T: Transducer = HfstTransducer> {
    mutator: Option<T>,
    lexicon: T,
    alphabet_translator: Vec<SymbolNumber>,
    cache: Cache,
}

impl<T: Transducer> HfstSpeller<T> {
    /// Composes an error model with a lexicon. Symbols of the error model
    /// missing from the lexicon are added to the lexicon's alphabet.
    pub fn new(mutator: T, mut lexicon: T) -> Result<HfstSpeller<T>, SpellerError> {
        if mutator.is_weighted() != lexicon.is_weighted() {
            return Err(SpellerError::TransducerType {
                mutator_weighted: mutator.is_weighted(),
                lexicon_weighted: lexicon.is_weighted(),
            });
        }

        let mut alphabet_translator = Vec::with_capacity(mutator.alphabet().len());
        // zeroth element is always epsilon
        alphabet_translator.push(0);

        for from_sym in mutator.alphabet().key_table().iter().skip(1) {
            alphabet_translator.push(lexicon.add_symbol(from_sym));
        }

        debug!(
            "Speller with error model: {} error model symbols, {} lexicon symbols",
            mutator.alphabet().len(),
            lexicon.alphabet().len()
        );

        Ok(HfstSpeller {
            cache: Cache::new(mutator.alphabet().len()),
            mutator: Some(mutator),
            lexicon,
            alphabet_translator,
        })
    }

    /// A speller that can check and analyse but not correct.
    pub fn lexicon_only(lexicon: T) -> HfstSpeller<T> {
        let alphabet_translator = (0..lexicon.alphabet().len())
            .map(|s| s as SymbolNumber)
            .collect();

        debug!(
            "Lexicon-only speller: {} symbols",
            lexicon.alphabet().len()
        );

        HfstSpeller {
            mutator: None,
            lexicon,
            alphabet_translator,
            cache: Cache::default(),
        }
    }

    /// The error model, if any.
    pub fn mutator(&self) -> Option<&T> {
        self.mutator.as_ref()
    }

    /// The lexicon.
    pub fn lexicon(&self) -> &T {
        &self.lexicon
    }

    /// Whether an error model is present.
    pub fn can_correct(&self) -> bool {
        self.mutator.is_some()
    }

    /// Whether the lexicon (and so the error model) carries weights.
    pub fn is_weighted(&self) -> bool {
        self.lexicon.is_weighted()
    }

    /// Drops every cached correction.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// The transducer whose alphabet input is tokenized with.
    fn input_transducer(&self) -> &T {
        self.mutator.as_ref().unwrap_or(&self.lexicon)
    }

    fn register_symbol(&mut self, symbol: &str) -> SymbolNumber {
        let k_lexicon = self.lexicon.add_symbol(symbol);

        let k = match self.mutator.as_mut() {
            Some(mutator) => {
                let k = mutator.add_symbol(symbol);
                if k as usize >= self.alphabet_translator.len() {
                    self.alphabet_translator.push(k_lexicon);
                }
                k
            }
            None => {
                while self.alphabet_translator.len() <= k_lexicon as usize {
                    let next = self.alphabet_translator.len() as SymbolNumber;
                    self.alphabet_translator.push(next);
                }
                k_lexicon
            }
        };

        if self.mutator.is_some() {
            let len = self.input_transducer().alphabet().len();
            self.cache.grow(len);
        }

        debug!("Registered new input symbol {:?} as {}", symbol, k);
        k
    }

    /// Tokenizes `input`, registering characters no symbol covers. Returns
    /// `None` if `input` is not valid UTF-8 where it needs to be decoded.
    fn init_input(&mut self, input: &[u8]) -> Option<Vec<SymbolNumber>> {
        let mut symbols = Vec::with_capacity(input.len());
        let mut pos = 0;

        while pos < input.len() {
            let rest = &input[pos..];

            if let Some((k, len)) = self.input_transducer().encoder().find_key(rest) {
                symbols.push(k);
                pos += len;
                continue;
            }

            let ch = next_char(rest)?;
            pos += ch.len();
            let k = self.register_symbol(ch);
            symbols.push(k);
        }

        Some(symbols)
    }

    fn worker<'a>(&'a self, input: &'a [SymbolNumber], mode: SpellerWorkerMode) -> SpellerWorker<'a, T> {
        SpellerWorker::new(
            self.mutator.as_ref(),
            &self.lexicon,
            &self.alphabet_translator,
            input,
            mode,
        )
    }

    /// Whether the lexicon accepts `input`.
    pub fn check<S: AsRef<[u8]>>(&mut self, input: S) -> bool {
        match self.init_input(input.as_ref()) {
            Some(input) => self.worker(&input, SpellerWorkerMode::Check).is_correct(),
            None => false,
        }
    }

    /// Every distinct lexicon output for `input` with its lowest weight,
    /// lightest first.
    pub fn analyse<S: AsRef<[u8]>>(&mut self, input: S) -> Vec<Suggestion> {
        match self.init_input(input.as_ref()) {
            Some(input) => self.worker(&input, SpellerWorkerMode::Lookup).analyse(),
            None => vec![],
        }
    }

    /// Corrections for `input`, lightest first, limited by `config`.
    pub fn correct<S: AsRef<[u8]>>(
        &mut self,
        input: S,
        config: &SpellerConfig,
    ) -> Result<Vec<Suggestion>, SpellerError> {
        if self.mutator.is_none() {
            return Err(SpellerError::NoErrorModel);
        }

        if !self.is_weighted() && (config.max_weight.is_some() || config.beam.is_some()) {
            return Err(SpellerError::UnweightedSpeller);
        }

        let input = match self.init_input(input.as_ref()) {
            Some(input) => input,
            None => return Ok(vec![]),
        };

        let first_sym = input.first().copied().unwrap_or(0) as usize;
        let bound = config.max_weight.unwrap_or(f32::MAX);

        if input.len() <= 1 {
            let suggestions = match self.cache.get(first_sym, bound) {
                Some(entry) => worker::cached_suggestions(entry.results(input.len()), config),
                None => {
                    let entry = self
                        .worker(&input, SpellerWorkerMode::Correct)
                        .build_cache(config);
                    let suggestions = worker::cached_suggestions(entry.results(input.len()), config);
                    self.cache.insert(first_sym, entry);
                    suggestions
                }
            };
            return Ok(suggestions);
        }

        if self.cache.get(first_sym, bound).is_none() {
            if config.max_weight.is_none() && (config.n_best.is_some() || config.beam.is_some()) {
                // only the search itself can tell how far the frontier must reach
                return Ok(self
                    .worker(&input, SpellerWorkerMode::Correct)
                    .suggest(config, None));
            }

            let cache_config = SpellerConfig {
                max_weight: config.max_weight,
                ..SpellerConfig::default()
            };
            let entry = self
                .worker(&input[..1], SpellerWorkerMode::Correct)
                .build_cache(&cache_config);
            self.cache.insert(first_sym, entry);
        }

        let frontier = match self.cache.get(first_sym, bound) {
            Some(entry) => entry.frontier.clone(),
            None => return Ok(vec![]),
        };

        Ok(self
            .worker(&input, SpellerWorkerMode::Correct)
            .suggest(config, Some(frontier)))
    }

    /// Corrects `input`, then analyses every correction. Sorted by analysis
    /// weight; analyses of equal weight keep the order of their corrections.
    pub fn suggest_analyses<S: AsRef<[u8]>>(
        &mut self,
        input: S,
        config: &SpellerConfig,
    ) -> Result<Vec<AnalysedSuggestion>, SpellerError> {
        let corrections = self.correct(input, config)?;
        let mut analyses = vec![];

        for correction in corrections {
            for analysis in self.analyse(correction.value.as_bytes()) {
                analyses.push(AnalysedSuggestion {
                    value: correction.value.clone(),
                    correction_weight: correction.weight,
                    analysis: analysis.value,
                    weight: analysis.weight,
                });
            }
        }

        analyses.sort_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap_or(Equal));
        Ok(analyses)
    }
}
