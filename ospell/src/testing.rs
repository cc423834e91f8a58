//! Builds small optimized-lookup images for tests.
//!
//! State 0 and every state whose arcs fall into more than one input class
//! (epsilon and flag diacritics count as one class) get a block in the index
//! table; all other states are stored inline in the transition table. This
//! way every image exercises both addressing schemes.
use crate::constants::{HEADER_FLAG_COUNT, HFST3_MAGIC, NO_SYMBOL, NO_TABLE_INDEX, TARGET_TABLE};

pub fn header_bytes(
    input_symbols: u16,
    symbols: u16,
    index_table_size: u32,
    target_table_size: u32,
    flags: [bool; HEADER_FLAG_COUNT],
) -> Vec<u8> {
    let mut buf = vec![];
    buf.extend_from_slice(&input_symbols.to_ne_bytes());
    buf.extend_from_slice(&symbols.to_ne_bytes());
    buf.extend_from_slice(&index_table_size.to_ne_bytes());
    buf.extend_from_slice(&target_table_size.to_ne_bytes());
    buf.extend_from_slice(&0u32.to_ne_bytes());
    buf.extend_from_slice(&0u32.to_ne_bytes());
    for flag in flags.iter() {
        buf.extend_from_slice(&u32::from(*flag).to_ne_bytes());
    }
    buf
}

#[derive(Debug, Clone, Copy)]
pub struct ImageOptions {
    weighted: bool,
    hfst3: bool,
}

impl ImageOptions {
    pub fn weighted() -> ImageOptions {
        ImageOptions {
            weighted: true,
            hfst3: false,
        }
    }

    pub fn unweighted() -> ImageOptions {
        ImageOptions {
            weighted: false,
            hfst3: false,
        }
    }

    pub fn with_hfst3(mut self) -> ImageOptions {
        self.hfst3 = true;
        self
    }
}

#[derive(Debug, Clone)]
struct Arc {
    input: u16,
    output: u16,
    target: usize,
    weight: f32,
}

#[derive(Debug, Clone, Default)]
struct State {
    arcs: Vec<Arc>,
    final_weight: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct Fst {
    symbols: Vec<String>,
    states: Vec<State>,
}

fn is_flag(name: &str) -> bool {
    name.len() >= 5 && name.starts_with('@') && name.ends_with('@') && name.as_bytes()[2] == b'.'
}

struct Record(u16, u16, u32, f32);

impl Fst {
    /// An automaton over `symbols` (epsilon is added as symbol 0) with a
    /// single, non-final start state.
    pub fn new(symbols: &[&str]) -> Fst {
        let mut all = vec!["@_EPSILON_SYMBOL_@".to_string()];
        all.extend(symbols.iter().map(|s| s.to_string()));
        Fst {
            symbols: all,
            states: vec![State::default()],
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Id of `name`; the empty string is epsilon.
    pub fn sym(&self, name: &str) -> u16 {
        if name.is_empty() {
            return 0;
        }
        self.symbols
            .iter()
            .position(|s| s == name)
            .unwrap_or_else(|| panic!("no symbol {}", name)) as u16
    }

    pub fn add_state(&mut self) -> usize {
        self.states.push(State::default());
        self.states.len() - 1
    }

    pub fn set_final(&mut self, state: usize, weight: f32) {
        self.states[state].final_weight = Some(weight);
    }

    pub fn arc(&mut self, from: usize, input: &str, output: &str, to: usize, weight: f32) {
        let arc = Arc {
            input: self.sym(input),
            output: self.sym(output),
            target: to,
            weight,
        };
        self.states[from].arcs.push(arc);
    }

    /// Adds a chain of `x:x` arcs from `from` to a new final state.
    pub fn path(&mut self, from: usize, symbols: &[&str], final_weight: f32) -> usize {
        let mut state = from;
        for s in symbols {
            let next = self.add_state();
            self.arc(state, s, s, next, 0.0);
            state = next;
        }
        self.set_final(state, final_weight);
        state
    }

    fn class(&self, arc: &Arc) -> u16 {
        if arc.input == 0 || is_flag(&self.symbols[arc.input as usize]) {
            0
        } else {
            arc.input
        }
    }

    /// Input classes of a state's arcs, ascending, each with its arcs
    /// (epsilons ahead of flags).
    fn classes(&self, state: &State) -> Vec<(u16, Vec<Arc>)> {
        let mut classes: Vec<(u16, Vec<Arc>)> = vec![];
        for arc in &state.arcs {
            let class = self.class(arc);
            match classes.iter_mut().find(|(c, _)| *c == class) {
                Some((_, arcs)) => arcs.push(arc.clone()),
                None => classes.push((class, vec![arc.clone()])),
            }
        }
        classes.sort_by_key(|(c, _)| *c);
        for (_, arcs) in classes.iter_mut() {
            arcs.sort_by_key(|a| a.input != 0);
        }
        classes
    }

    pub fn build(&self, options: ImageOptions) -> Vec<u8> {
        let n = self.symbols.len();
        let block = n + 1;
        let classes: Vec<_> = self.states.iter().map(|s| self.classes(s)).collect();
        let in_index: Vec<bool> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| i == 0 || c.len() > 1)
            .collect();

        // addresses
        let mut address = vec![0u32; self.states.len()];
        let mut index_size = 0usize;
        for (i, _) in self.states.iter().enumerate().filter(|(i, _)| in_index[*i]) {
            address[i] = index_size as u32;
            index_size += block;
        }

        let mut run_starts: Vec<Vec<u32>> = vec![vec![]; self.states.len()];
        let mut trans_size = 0usize;
        for (i, state_classes) in classes.iter().enumerate() {
            if in_index[i] {
                for (_, arcs) in state_classes {
                    run_starts[i].push(trans_size as u32);
                    trans_size += arcs.len() + 1;
                }
            } else {
                address[i] = TARGET_TABLE + trans_size as u32;
                trans_size += state_classes.iter().map(|(_, a)| a.len()).sum::<usize>() + 2;
            }
        }

        // tables
        let mut index = vec![(NO_SYMBOL, NO_TABLE_INDEX); index_size];
        let mut trans: Vec<Record> = Vec::with_capacity(trans_size);
        let separator = || Record(NO_SYMBOL, NO_SYMBOL, NO_TABLE_INDEX, f32::INFINITY);
        let arc_record = |a: &Arc| Record(a.input, a.output, address[a.target], a.weight);

        for (i, state) in self.states.iter().enumerate() {
            if in_index[i] {
                let base = address[i] as usize;
                if let Some(w) = state.final_weight {
                    index[base] = (NO_SYMBOL, w.to_bits());
                }
                for ((class, arcs), start) in classes[i].iter().zip(&run_starts[i]) {
                    index[base + 1 + *class as usize] = (*class, TARGET_TABLE + start);
                    trans.extend(arcs.iter().map(arc_record));
                    trans.push(separator());
                }
            } else {
                trans.push(match state.final_weight {
                    Some(w) => Record(NO_SYMBOL, NO_SYMBOL, 1, w),
                    None => separator(),
                });
                for (_, arcs) in &classes[i] {
                    trans.extend(arcs.iter().map(arc_record));
                }
                trans.push(separator());
            }
        }

        let mut buf = vec![];
        if options.hfst3 {
            let kind = if options.weighted { "HFST_OLW" } else { "HFST_OL" };
            let block = format!("version\x003.3\x00type\x00{}\x00", kind);
            buf.extend_from_slice(HFST3_MAGIC);
            buf.extend_from_slice(&(block.len() as u16).to_ne_bytes());
            buf.push(0);
            buf.extend_from_slice(block.as_bytes());
        }

        let mut flags = [false; HEADER_FLAG_COUNT];
        flags[0] = options.weighted;
        let mut header = header_bytes(
            n as u16,
            n as u16,
            index_size as u32,
            trans.len() as u32,
            flags,
        );
        let arc_count: usize = self.states.iter().map(|s| s.arcs.len()).sum();
        header[12..16].copy_from_slice(&(self.states.len() as u32).to_ne_bytes());
        header[16..20].copy_from_slice(&(arc_count as u32).to_ne_bytes());
        buf.extend(header);

        for symbol in &self.symbols {
            buf.extend_from_slice(symbol.as_bytes());
            buf.push(0);
        }

        for (input, target) in index {
            buf.extend_from_slice(&input.to_ne_bytes());
            buf.extend_from_slice(&target.to_ne_bytes());
        }

        for Record(input, output, target, weight) in trans {
            buf.extend_from_slice(&input.to_ne_bytes());
            buf.extend_from_slice(&output.to_ne_bytes());
            buf.extend_from_slice(&target.to_ne_bytes());
            buf.extend_from_slice(&weight.to_ne_bytes());
        }

        buf
    }
}

/// An error model over `alphabet`: any symbol maps to itself for free, or to
/// any other symbol at `weight`. Accepts any number of edits.
pub fn substitution_model(alphabet: &[&str], weight: f32) -> Fst {
    let mut fst = Fst::new(alphabet);
    fst.set_final(0, 0.0);
    for a in alphabet {
        for b in alphabet {
            let w = if a == b { 0.0 } else { weight };
            fst.arc(0, a, b, 0, w);
        }
    }
    fst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_states_in_both_tables() {
        let mut fst = Fst::new(&["a", "b"]);
        let s1 = fst.add_state();
        let s2 = fst.add_state();
        fst.arc(0, "a", "a", s1, 0.0);
        fst.arc(0, "b", "b", s2, 0.0);
        fst.set_final(s1, 0.0);
        fst.set_final(s2, 0.0);

        let image = fst.build(ImageOptions::weighted());
        let header = crate::transducer::hfst::header::TransducerHeader::new(&image).unwrap();
        // one index block for state 0
        assert_eq!(header.index_table_size(), 4);
        // two runs with separators, two inline states of finality + separator
        assert_eq!(header.target_table_size(), 4 + 4);
        assert_eq!(header.states(), 3);
        assert_eq!(header.transitions(), 2);
    }
}
