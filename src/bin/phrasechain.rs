//! Phrasechain CLI: generate, filter and check word-chain levels.
//!
//! Usage:
//!   phrasechain generate --catalog phrases.json [--output levels.json] [--ledger ledger.json]
//!   phrasechain filter --catalog phrases.json [--tier N]
//!   phrasechain check --levels levels.json

use clap::{Parser, Subcommand};
use phrasechain::storage::write_json_atomic;
use phrasechain::{
    Catalog, ChainValidator, EligibilityFilter, FrequencyTable, GenerationConfig, JsonFileStore,
    LevelDocument, LevelStore, Lexicon, Pipeline, RunOutcome, RunReport, Tier,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const EXIT_OK: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_ABORTED: i32 = 2;
const EXIT_INVALID: i32 = 3;

#[derive(Parser)]
#[command(
    name = "phrasechain",
    version,
    about = "Tier-gated word-chain level generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate, validate and commit a batch of levels
    Generate {
        /// Phrase catalog (JSON array of rows)
        #[arg(long)]
        catalog: PathBuf,
        /// Frequency table (JSON object of phrase -> 1..5)
        #[arg(long)]
        frequencies: Option<PathBuf>,
        /// Generation config (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Lexicon replacing the built-in word lists (YAML)
        #[arg(long)]
        lexicon: Option<PathBuf>,
        #[arg(long)]
        levels: Option<usize>,
        /// Phrases per level
        #[arg(long)]
        length: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Difficulty tier (1, 2 or 3); derived from --first-level otherwise
        #[arg(long)]
        tier: Option<u8>,
        /// Index of the first generated level
        #[arg(long)]
        first_level: Option<usize>,
        /// Where committed levels are written
        #[arg(long, default_value = "levels.json")]
        output: PathBuf,
        /// Reuse ledger carried between runs
        #[arg(long)]
        ledger: Option<PathBuf>,
        /// Write the full run diagnostics here, whatever the outcome
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show how a tier's filter treats a catalog
    Filter {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        frequencies: Option<PathBuf>,
        #[arg(long)]
        lexicon: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        tier: u8,
    },
    /// Re-validate a committed level document
    Check {
        #[arg(long)]
        levels: PathBuf,
        /// Minimum phrases per level; defaults to the document's level length
        #[arg(long)]
        min_phrases: Option<usize>,
    },
}

struct GenerateArgs {
    catalog: PathBuf,
    frequencies: Option<PathBuf>,
    config: Option<PathBuf>,
    lexicon: Option<PathBuf>,
    levels: Option<usize>,
    length: Option<usize>,
    seed: Option<u64>,
    tier: Option<u8>,
    first_level: Option<usize>,
    output: PathBuf,
    ledger: Option<PathBuf>,
    report: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_tier(n: u8) -> Result<Tier, String> {
    Tier::try_from(n).map_err(|e| format!("invalid tier {}: {}", n, e))
}

fn load_lexicon(path: Option<&Path>) -> Result<Lexicon, String> {
    match path {
        Some(path) => Lexicon::load_yaml(path)
            .map_err(|e| format!("Failed to load lexicon {}: {}", path.display(), e)),
        None => Ok(Lexicon::default()),
    }
}

/// Load the frequency table, or derive one from the catalog's own column
///
/// A derived table scores every phrase, so nothing can be rejected as
/// unattested. The flag tells callers to say so in their output.
fn load_frequencies(
    path: Option<&Path>,
    catalog: &Catalog,
) -> Result<(FrequencyTable, bool), String> {
    match path {
        Some(path) => FrequencyTable::load_json(path)
            .map(|table| (table, false))
            .map_err(|e| format!("Failed to load frequencies {}: {}", path.display(), e)),
        None => {
            tracing::warn!("no frequency table given; using the catalog's own frequency column");
            Ok((FrequencyTable::from_records(catalog.records()), true))
        }
    }
}

const DERIVED_FREQUENCIES_NOTE: &str =
    "  note:    frequencies derived from the catalog; no phrase can be unattested (pass --frequencies)";

fn build_config(args: &GenerateArgs) -> Result<GenerationConfig, String> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::load_yaml(path)
            .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?,
        None => GenerationConfig::default(),
    };
    if let Some(levels) = args.levels {
        config.levels = levels;
    }
    if let Some(length) = args.length {
        config.chain_length = length;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(first_level) = args.first_level {
        config.first_level = first_level;
    }
    if let Some(tier) = args.tier {
        config.tier = Some(parse_tier(tier)?);
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn print_report(report: &RunReport) {
    println!("Run {} ({})", report.run_id, report.tier);
    println!(
        "  filter:  {} in, {} accepted, {} rejected",
        report.filter.input,
        report.filter.accepted,
        report.filter.rejected()
    );
    for (reason, count) in &report.filter.rejected_by {
        println!("           {:<24} {:>6}", reason, count);
    }
    println!(
        "  graph:   {} words, {} phrases, avg out-degree {:.2}",
        report.graph.node_count, report.graph.edge_count, report.graph.avg_out_degree
    );
    if report.outcome == RunOutcome::Aborted {
        for reason in &report.sufficiency.reasons {
            println!("  abort:   {}", reason);
        }
        return;
    }
    println!(
        "  search:  {} levels in {} attempts ({} backtracks, {} dead ends)",
        report.levels.len(),
        report.search.attempts,
        report.search.backtracks,
        report.search.dead_ends
    );
    let stuck = report.search.top_dead_ends(5);
    if !stuck.is_empty() {
        let words: Vec<String> = stuck.iter().map(|(w, c)| format!("{} ({})", w, c)).collect();
        println!("  stuck:   {}", words.join(", "));
    }
    if let Some(validation) = &report.validation {
        for error in &validation.errors {
            println!("  error:   {}", error);
        }
        for warning in &validation.warnings {
            println!("  warning: {}", warning);
        }
    }
}

fn cmd_generate(args: GenerateArgs) -> i32 {
    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };
    let catalog = match Catalog::load_json(&args.catalog) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: failed to load catalog {}: {}", args.catalog.display(), e);
            return EXIT_ERROR;
        }
    };
    let (frequencies, derived) = match load_frequencies(args.frequencies.as_deref(), &catalog) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };
    let lexicon = match load_lexicon(args.lexicon.as_deref()) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };

    let mut store = JsonFileStore::new(&args.output);
    if let Some(path) = &args.ledger {
        store = store.with_ledger(path);
    }
    let mut ledger = match store.load_ledger() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error: failed to load ledger: {}", e);
            return EXIT_ERROR;
        }
    };

    let pipeline = Pipeline::new(config, &lexicon, &frequencies);
    let report = pipeline.run(&catalog, &mut ledger);
    print_report(&report);
    if derived && report.tier.config().min_frequency > 0 {
        println!("{}", DERIVED_FREQUENCIES_NOTE);
    }

    if let Some(path) = &args.report {
        if let Err(e) = write_json_atomic(path, &report) {
            eprintln!("Error: failed to write report {}: {}", path.display(), e);
            return EXIT_ERROR;
        }
    }

    match report.outcome {
        RunOutcome::Committed => match store.commit(&report, &ledger) {
            Ok(document) => {
                println!(
                    "Committed {} levels to {} (coverage {:.1}%)",
                    document.summary.levels_generated,
                    args.output.display(),
                    document.summary.coverage
                );
                EXIT_OK
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
        RunOutcome::Aborted => {
            eprintln!("Aborted: graph cannot support {} levels", report.config.levels);
            EXIT_ABORTED
        }
        RunOutcome::ValidationFailed => {
            eprintln!("Validation failed: nothing written to {}", args.output.display());
            EXIT_INVALID
        }
    }
}

fn cmd_filter(catalog: &Path, frequencies: Option<&Path>, lexicon: Option<&Path>, tier: u8) -> i32 {
    let tier = match parse_tier(tier) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };
    let catalog = match Catalog::load_json(catalog) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: failed to load catalog {}: {}", catalog.display(), e);
            return EXIT_ERROR;
        }
    };
    let ((frequencies, derived), lexicon) = match (
        load_frequencies(frequencies, &catalog),
        load_lexicon(lexicon),
    ) {
        (Ok(f), Ok(l)) => (f, l),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };

    let filter = EligibilityFilter::new(tier.config(), &lexicon, &frequencies);
    let (_, stats) = filter.partition(catalog.records());

    println!("{}: {} of {} phrases eligible", tier, stats.accepted, stats.input);
    if derived && tier.config().min_frequency > 0 {
        println!("{}", DERIVED_FREQUENCIES_NOTE);
    }
    if !catalog.duplicates().is_empty() {
        println!("  ({} duplicates dropped on load)", catalog.duplicates().len());
    }
    println!("{:<24}  {:>7}", "REJECTION", "COUNT");
    println!("{}", "-".repeat(33));
    for (reason, count) in &stats.rejected_by {
        println!("{:<24}  {:>7}", reason, count);
    }
    EXIT_OK
}

fn cmd_check(path: &Path, min_phrases: Option<usize>) -> i32 {
    let document = match LevelDocument::load_json(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: failed to load {}: {}", path.display(), e);
            return EXIT_ERROR;
        }
    };
    let (chains, frequencies) = match (document.chains(), document.frequency_table()) {
        (Ok(c), Ok(f)) => (c, f),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };

    let min_phrases = min_phrases.unwrap_or(document.config.phrases_per_level);
    let report = ChainValidator::new(min_phrases)
        .with_frequency_floor(document.config.tier.config().min_frequency)
        .validate(
            chains.iter().map(|(level, chain)| (*level, chain.as_slice())),
            &frequencies,
        );

    for error in &report.errors {
        println!("error:   {}", error);
    }
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    if report.is_valid() {
        println!("{}: {} levels valid", path.display(), report.chains_checked);
        EXIT_OK
    } else {
        println!("{}: {} errors", path.display(), report.errors.len());
        EXIT_INVALID
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Generate {
            catalog,
            frequencies,
            config,
            lexicon,
            levels,
            length,
            seed,
            tier,
            first_level,
            output,
            ledger,
            report,
        } => cmd_generate(GenerateArgs {
            catalog,
            frequencies,
            config,
            lexicon,
            levels,
            length,
            seed,
            tier,
            first_level,
            output,
            ledger,
            report,
        }),
        Commands::Filter {
            catalog,
            frequencies,
            lexicon,
            tier,
        } => cmd_filter(&catalog, frequencies.as_deref(), lexicon.as_deref(), tier),
        Commands::Check { levels, min_phrases } => cmd_check(&levels, min_phrases),
    };
    std::process::exit(code);
}
