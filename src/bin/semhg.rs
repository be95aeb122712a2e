//! Semantic Hypergraph command-line client (C12, spec §6.6).
//!
//! Subcommands operate on a JSON sentence fixture (a `Vec<Vec<dependency::Token>>`,
//! since the core never tokenizes text itself — see `dependency::Token`'s
//! doc comment). With no subcommand, drops into an interactive REPL for
//! typing SH notation directly.

use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use semhg::alpha::TableClassifier;
use semhg::kb::Kb;
use semhg::{config::Config, notation, pattern::Pattern, rules::RuleEngine, Engine, Sentence};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "semhg", about = "Semantic Hypergraph engine CLI")]
struct Cli {
    /// Path to a TOML config file (defaults to config.toml/config.local.toml
    /// in the current directory, per `Config::load`).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a JSON sentence fixture into hyperedges and print their
    /// canonical notation, one per line.
    Parse {
        /// Path to a JSON file holding `Vec<Vec<dependency::Token>>`.
        input: PathBuf,
    },
    /// Parse a fixture, insert the result into a KB, and print every
    /// hyperedge matching a pattern.
    Match {
        /// Pattern in SH notation, e.g. `(likes/P $X:s $Y:o)`.
        pattern: String,
        /// Path to a JSON file holding `Vec<Vec<dependency::Token>>`.
        input: PathBuf,
    },
    /// Parse a fixture, insert into a KB, and run the rule engine to a
    /// fixed point, printing the resulting KB.
    Infer {
        /// Path to a JSON file holding `Vec<Vec<dependency::Token>>`.
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .unwrap_or_else(|_| Config::default());

    init_logging(&config);

    let result = match cli.command {
        Some(Command::Parse { input }) => run_parse(&input),
        Some(Command::Match { pattern, input }) => run_match(&pattern, &input),
        Some(Command::Infer { input }) => run_infer(config, &input),
        None => run_repl(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(msg)) => {
            eprintln!("error: {msg}");
            ExitCode::from(1)
        }
        Err(CliError::Data(msg)) => {
            eprintln!("error: {msg}");
            ExitCode::from(2)
        }
        Err(CliError::Engine(msg)) => {
            eprintln!("error: {msg}");
            ExitCode::from(3)
        }
    }
}

fn init_logging(config: &Config) {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// The three exit-code bands a caller can script against: malformed
/// invocation (1), unreadable/malformed input data (2), an engine-level
/// failure such as a non-terminating rule set or exceeded iteration limit (3).
enum CliError {
    Usage(String),
    Data(String),
    Engine(String),
}

fn load_sentences(path: &PathBuf) -> Result<Vec<Sentence>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Data(format!("reading {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Data(format!("parsing {} as sentence JSON: {e}", path.display())))
}

fn run_parse(input: &PathBuf) -> Result<(), CliError> {
    let sentences = load_sentences(input)?;
    let classifier = TableClassifier::new();
    let kb = Kb::new();
    let engine = Engine::with_builtins();
    let diagnostics = engine.ingest_document(&sentences, &classifier, &kb);
    for (_, edge) in kb.iter(None) {
        println!("{}", notation::print(&edge));
    }
    let report = diagnostics.report();
    if report.malformed_sentences > 0 {
        eprintln!(
            "{} of {} sentences did not parse ({} alpha, {} beta)",
            report.malformed_sentences, report.sentences, report.alpha_errors, report.beta_errors
        );
    }
    Ok(())
}

fn run_match(pattern: &str, input: &PathBuf) -> Result<(), CliError> {
    let sentences = load_sentences(input)?;
    let pattern = Pattern::parse(pattern)
        .map_err(|e| CliError::Usage(format!("invalid pattern: {e}")))?;
    let classifier = TableClassifier::new();
    let kb = Kb::new();
    let engine = Engine::with_builtins();
    engine.ingest_document(&sentences, &classifier, &kb);
    let mut found = 0;
    for (_, edge) in kb.iter(None) {
        let bindings = semhg::pattern::match_pattern(&pattern, &edge);
        for binding in &bindings {
            found += 1;
            let vars: Vec<String> = binding
                .iter()
                .map(|(name, value)| format!("{name}={}", notation::print(value)))
                .collect();
            println!("{}  {{{}}}", notation::print(&edge), vars.join(", "));
        }
    }
    if found == 0 {
        eprintln!("no matches");
    }
    Ok(())
}

fn run_infer(config: Config, input: &PathBuf) -> Result<(), CliError> {
    let sentences = load_sentences(input)?;
    let classifier = TableClassifier::new();
    let kb = Kb::new();
    let mut engine = Engine::new(config)
        .map_err(|e| CliError::Engine(format!("loading rules: {e}")))?;
    engine.ingest_document(&sentences, &classifier, &kb);
    let report = engine
        .run_rules(&kb, None)
        .map_err(|e| CliError::Engine(e.to_string()))?;
    for (_, edge) in kb.iter(None) {
        println!("{}", notation::print(&edge));
    }
    eprintln!(
        "{} iterations, {} emitted, {} replaced, {} retracted",
        report.iterations, report.edges_emitted, report.edges_replaced, report.edges_retracted
    );
    Ok(())
}

/// Interactive REPL: each line is parsed as a hyperedge and inserted into a
/// session-scoped KB, or dispatched as a `:` meta command.
fn run_repl() -> Result<(), CliError> {
    let kb = Kb::new();
    let mut rule_engine = RuleEngine::with_builtins();
    let mut rl = DefaultEditor::new()
        .map_err(|e| CliError::Engine(format!("failed to start REPL: {e}")))?;

    println!("Semantic Hypergraph REPL. Type an SH edge to insert it, or :help.");

    loop {
        match rl.readline("sh> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                if let Some(rest) = line.strip_prefix(':') {
                    if !handle_meta(rest, &kb, &mut rule_engine) {
                        break;
                    }
                    continue;
                }
                match notation::parse(line) {
                    Ok(edge) => {
                        let id = kb.insert(edge);
                        println!("inserted {id}");
                    }
                    Err(e) => println!("parse error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }
    Ok(())
}

/// Returns `false` when the REPL should exit.
fn handle_meta(command: &str, kb: &Kb, rule_engine: &mut RuleEngine) -> bool {
    let mut parts = command.splitn(2, ' ');
    match parts.next().unwrap_or("") {
        "quit" | "q" => return false,
        "help" => {
            println!(":match PATTERN   show every edge matching PATTERN");
            println!(":run             run the rule engine to a fixed point");
            println!(":list            print every edge currently in the KB");
            println!(":quit            exit");
        }
        "list" => {
            for (_, edge) in kb.iter(None) {
                println!("{}", notation::print(&edge));
            }
        }
        "match" => match parts.next() {
            Some(pattern_text) => match Pattern::parse(pattern_text) {
                Ok(pattern) => {
                    for (_, edge) in kb.iter(None) {
                        if !semhg::pattern::match_pattern(&pattern, &edge).is_empty() {
                            println!("{}", notation::print(&edge));
                        }
                    }
                }
                Err(e) => println!("invalid pattern: {e}"),
            },
            None => println!("usage: :match PATTERN"),
        },
        "run" => {
            match rule_engine.run(kb, &semhg::execution::ResourceLimits::default(), None) {
                Ok(report) => println!(
                    "{} iterations, {} emitted, {} replaced, {} retracted",
                    report.iterations, report.edges_emitted, report.edges_replaced, report.edges_retracted
                ),
                Err(e) => println!("error: {e}"),
            }
        }
        other => println!("unknown command ':{other}' (try :help)"),
    }
    true
}
