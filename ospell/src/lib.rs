/*! Spell-checking, correction and analysis with weighted Finite-State Automata.

Reads transducers compiled with [`HFST`] into the optimized-lookup binary
format and runs them directly from a memory-mapped (or heap) buffer. A speller
is built from a lexicon, optionally composed with an error model ("mutator")
that generates weighted corrections.

[`HFST`]: (https://hfst.github.io)

# Usage examples

```no_run
use ospell::speller::{HfstSpeller, SpellerConfig};
use ospell::transducer::hfst::HfstTransducer;

let lexicon = HfstTransducer::from_path("acceptor.default.hfst").unwrap();
let errmodel = HfstTransducer::from_path("errmodel.default.hfst").unwrap();
let mut speller = HfstSpeller::new(errmodel, lexicon).unwrap();

if !speller.check("oult") {
    let config = SpellerConfig::default().with_n_best(5);
    for suggestion in speller.correct("oult", &config).unwrap() {
        println!("{}\t{}", suggestion.value(), suggestion.weight());
    }
}
```

Further examples of how to use the library can be found in `ospell-bin`
in the same repository.
*/

#![warn(missing_docs)]
/// Checking, analysis and correction.
pub mod speller;
/// Splitting input text into transducer symbols.
pub mod tokenizer;
/// Reading and traversing transducers.
pub mod transducer;
/// Shared primitive types.
pub mod types;

pub(crate) mod constants;
#[cfg(test)]
pub(crate) mod testing;
