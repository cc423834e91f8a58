use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use gumdrop::Options;
use serde::Serialize;

use ospell::speller::suggestion::{AnalysedSuggestion, Suggestion};
use ospell::speller::{HfstSpeller, SpellerConfig};
use ospell::transducer::hfst::HfstTransducer;
use ospell::transducer::Transducer;

const HEADER_FLAG_NAMES: [&str; 9] = [
    "weighted",
    "deterministic",
    "input_deterministic",
    "minimized",
    "cyclic",
    "has_epsilon_epsilon_transitions",
    "has_input_epsilon_transitions",
    "has_input_epsilon_cycles",
    "has_unweighted_input_epsilon_cycles",
];

trait OutputWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool);
    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]);
    fn write_analyses(&mut self, word: &str, analyses: &[Suggestion]);
    fn write_analysed_suggestions(&mut self, word: &str, suggestions: &[AnalysedSuggestion]);
    fn finish(&mut self);
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        println!(
            "Input: {}\t\t[{}]",
            &word,
            if is_correct { "CORRECT" } else { "INCORRECT" }
        );
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &[Suggestion]) {
        for sugg in suggestions {
            println!("{}\t\t{}", sugg.value, sugg.weight);
        }
        println!();
    }

    fn write_analyses(&mut self, word: &str, analyses: &[Suggestion]) {
        if analyses.is_empty() {
            println!("{}\t{}+?\tinf", word, word);
        }
        for analysis in analyses {
            println!("{}\t{}\t{}", word, analysis.value, analysis.weight);
        }
        println!();
    }

    fn write_analysed_suggestions(&mut self, _word: &str, suggestions: &[AnalysedSuggestion]) {
        for sugg in suggestions {
            println!(
                "{}\t\t{}\t{}\t{}",
                sugg.value, sugg.correction_weight, sugg.analysis, sugg.weight
            );
        }
        println!();
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionRequest {
    word: String,
    is_correct: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    analyses: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    analysed_suggestions: Vec<AnalysedSuggestion>,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<SuggestionRequest>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }

    fn entry(&mut self, word: &str) -> &mut SuggestionRequest {
        if self.results.last().map(|r| r.word != word).unwrap_or(true) {
            self.results.push(SuggestionRequest {
                word: word.to_owned(),
                is_correct: false,
                suggestions: vec![],
                analyses: vec![],
                analysed_suggestions: vec![],
            });
        }
        let i = self.results.len() - 1;
        &mut self.results[i]
    }
}

impl OutputWriter for JsonWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        self.results.push(SuggestionRequest {
            word: word.to_owned(),
            is_correct,
            suggestions: vec![],
            analyses: vec![],
            analysed_suggestions: vec![],
        });
    }

    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]) {
        self.entry(word).suggestions = suggestions.to_vec();
    }

    fn write_analyses(&mut self, word: &str, analyses: &[Suggestion]) {
        let entry = self.entry(word);
        entry.is_correct = !analyses.is_empty();
        entry.analyses = analyses.to_vec();
    }

    fn write_analysed_suggestions(&mut self, word: &str, suggestions: &[AnalysedSuggestion]) {
        self.entry(word).analysed_suggestions = suggestions.to_vec();
    }

    fn finish(&mut self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{:?}", e),
        }
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "check whether the provided words are correct")]
    Check(CheckArgs),

    #[options(help = "get suggestions for provided input")]
    Suggest(SuggestArgs),

    #[options(help = "print analyses of the provided words")]
    Analyse(AnalyseArgs),

    #[options(help = "print header information of a transducer")]
    Info(InfoArgs),
}

#[derive(Debug, Options)]
struct CheckArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "lexicon transducer to be used", required)]
    lexicon: PathBuf,

    #[options(help = "error model transducer to be used")]
    errmodel: Option<PathBuf>,

    #[options(short = "S", help = "show suggestions for incorrect words")]
    suggest: bool,

    #[options(help = "maximum number of results")]
    nbest: Option<usize>,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct SuggestArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "lexicon transducer to be used", required)]
    lexicon: PathBuf,

    #[options(help = "error model transducer to be used", required)]
    errmodel: PathBuf,

    #[options(help = "maximum weight limit for suggestions")]
    weight: Option<f32>,

    #[options(help = "maximum number of results")]
    nbest: Option<usize>,

    #[options(help = "discard suggestions heavier than the best one plus this")]
    beam: Option<f32>,

    #[options(help = "JSON file with speller configuration")]
    config: Option<PathBuf>,

    #[options(short = "a", help = "analyse each suggestion")]
    analyse: bool,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct AnalyseArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "lexicon transducer to be used", required)]
    lexicon: PathBuf,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct InfoArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "transducer to be inspected", required)]
    lexicon: PathBuf,
}

fn read_words(inputs: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !inputs.is_empty() {
        return Ok(inputs);
    }

    eprintln!("Reading from stdin...");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer
        .lines()
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect())
}

fn writer(use_json: bool) -> Box<dyn OutputWriter> {
    if use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    }
}

fn load_transducer(path: &Path) -> anyhow::Result<HfstTransducer> {
    HfstTransducer::from_path(path).with_context(|| format!("loading {}", path.display()))
}

fn load_speller(lexicon: &Path, errmodel: Option<&Path>) -> anyhow::Result<HfstSpeller> {
    let lexicon = load_transducer(lexicon)?;
    match errmodel {
        Some(path) => Ok(HfstSpeller::new(load_transducer(path)?, lexicon)?),
        None => Ok(HfstSpeller::lexicon_only(lexicon)),
    }
}

fn load_config(path: &Path) -> anyhow::Result<SpellerConfig> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn check(args: CheckArgs) -> anyhow::Result<()> {
    let mut speller = load_speller(&args.lexicon, args.errmodel.as_deref())?;
    let mut writer = writer(args.use_json);

    let mut suggest_cfg = SpellerConfig::default();
    if let Some(n) = args.nbest.filter(|n| *n > 0) {
        suggest_cfg.n_best = Some(n);
    }

    let is_suggesting = args.suggest && speller.can_correct();
    if args.suggest && !is_suggesting {
        eprintln!("No error model given, not suggesting.");
    }

    for word in read_words(args.inputs)? {
        let is_correct = speller.check(&word);
        writer.write_correction(&word, is_correct);

        if is_suggesting && !is_correct {
            let suggestions = speller.correct(&word, &suggest_cfg)?;
            writer.write_suggestions(&word, &suggestions);
        }
    }

    writer.finish();
    Ok(())
}

fn suggest(args: SuggestArgs) -> anyhow::Result<()> {
    let mut suggest_cfg = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => SpellerConfig::default(),
    };

    if let Some(v) = args.nbest {
        suggest_cfg.n_best = if v == 0 { None } else { Some(v) };
    }

    if let Some(v) = args.weight.filter(|x| *x >= 0.0) {
        suggest_cfg.max_weight = if v == 0.0 { None } else { Some(v) };
    }

    if let Some(v) = args.beam.filter(|x| *x >= 0.0) {
        suggest_cfg.beam = Some(v);
    }

    log::debug!("Suggesting with {:?}", suggest_cfg);

    let mut speller = load_speller(&args.lexicon, Some(&args.errmodel))?;
    let mut writer = writer(args.use_json);

    for word in read_words(args.inputs)? {
        let is_correct = speller.check(&word);
        writer.write_correction(&word, is_correct);

        if args.analyse {
            let suggestions = speller.suggest_analyses(&word, &suggest_cfg)?;
            writer.write_analysed_suggestions(&word, &suggestions);
        } else {
            let suggestions = speller.correct(&word, &suggest_cfg)?;
            writer.write_suggestions(&word, &suggestions);
        }
    }

    writer.finish();
    Ok(())
}

fn analyse(args: AnalyseArgs) -> anyhow::Result<()> {
    let mut speller = HfstSpeller::lexicon_only(load_transducer(&args.lexicon)?);
    let mut writer = writer(args.use_json);

    for word in read_words(args.inputs)? {
        let analyses = speller.analyse(&word);
        writer.write_analyses(&word, &analyses);
    }

    writer.finish();
    Ok(())
}

fn info(args: InfoArgs) -> anyhow::Result<()> {
    let transducer = load_transducer(&args.lexicon)?;
    let header = transducer.header();
    let alphabet = transducer.alphabet();

    println!("{}:", args.lexicon.display());
    for key in ["name", "version", "type"].iter() {
        if let Some(value) = header.property(key) {
            println!("  {}: {}", key, value);
        }
    }
    println!("  input symbols: {}", header.input_symbol_count());
    println!("  symbols: {}", header.symbol_count());
    println!("  index table size: {}", header.index_table_size());
    println!("  transition table size: {}", header.target_table_size());
    println!("  states: {}", header.states());
    println!("  transitions: {}", header.transitions());
    println!("  flag diacritic features: {}", alphabet.state_size());
    for (name, value) in HEADER_FLAG_NAMES.iter().zip(header.properties().iter()) {
        println!("  {}: {}", name, value);
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Check(args)) => check(args),
        Some(Command::Suggest(args)) => suggest(args),
        Some(Command::Analyse(args)) => analyse(args),
        Some(Command::Info(args)) => info(args),
    }
}
