use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::ArgAction::{Append, Set, SetTrue};
use clap::Parser;
use tracing::{event, span, Level};
use tracing_subscriber::prelude::*;

use deferredregex::DeferredRegex;

mod config;
mod filter;

use config::{load_config, ConfigError};
use filter::{Filter, Rule, RunError, Summary};

/// Print the lines which match any of a set of regular expressions.
///
/// Patterns are compiled only when they are first needed, so a large
/// configuration file costs almost nothing to load.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Regular expression to search for.
    #[clap(action = Set, short = 'e', long)]
    pattern: Option<DeferredRegex>,

    /// Replace each match of --pattern with this template ($1 or
    /// ${name} refer to capture groups).
    #[clap(action = Set, short = 'r', long, requires = "pattern")]
    replace: Option<String>,

    /// Insert the --replace text as-is instead of expanding capture
    /// group references.
    #[clap(action = SetTrue, long)]
    literal: bool,

    /// Print only the matching parts of each line, one per line.
    #[clap(action = SetTrue, short = 'o', long)]
    only_matching: bool,

    /// TOML file containing [[rule]] tables.
    #[clap(action = Set, short = 'c', long)]
    config: Option<PathBuf>,

    /// Compile every pattern and report the invalid ones, instead of
    /// reading any input.
    #[clap(action = SetTrue, long)]
    check: bool,

    /// Files to read.  Standard input is read if there are none.
    #[clap(action = Append)]
    inputs: Vec<OsString>,
}

#[derive(Debug)]
enum Fail {
    /// The command line does not make sense.
    Usage(String),
    Config(ConfigError),
    Open { input: OsString, error: io::Error },
    Filter { input: String, error: RunError },
    /// --check found this many invalid patterns.
    InvalidRules(usize),
    /// We were not able to correctly initialise the program.
    InitialisationFailure(String),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::Usage(msg) | Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
            Fail::Config(e) => e.fmt(f),
            Fail::Open { input, error } => {
                write!(f, "failed to open {}: {error}", input.to_string_lossy())
            }
            Fail::Filter { input, error } => write!(f, "{input}: {error}"),
            Fail::InvalidRules(1) => f.write_str("1 pattern is invalid"),
            Fail::InvalidRules(n) => write!(f, "{n} patterns are invalid"),
        }
    }
}

impl Error for Fail {}

enum Outcome {
    Matched,
    NothingMatched,
}

fn collect_rules(cli: &mut Cli) -> Result<Vec<Rule>, Fail> {
    let mut rules: Vec<Rule> = Vec::new();
    if let Some(pattern) = cli.pattern.take() {
        rules.push(Rule {
            name: "--pattern".to_string(),
            pattern,
            replace: cli.replace.take(),
            literal: cli.literal,
        });
    }
    if let Some(path) = &cli.config {
        let config = load_config(path).map_err(Fail::Config)?;
        event!(
            Level::INFO,
            "loaded {} rules from {}",
            config.rules.len(),
            path.display()
        );
        rules.extend(config.rules);
    }
    if rules.is_empty() {
        return Err(Fail::Usage(
            "no patterns to search for; use --pattern or --config".to_string(),
        ));
    }
    Ok(rules)
}

fn check_rules(filter: &Filter) -> Result<Outcome, Fail> {
    let invalid = filter.check();
    for bad in &invalid {
        event!(Level::ERROR, "{bad}");
    }
    if invalid.is_empty() {
        event!(
            Level::INFO,
            "all {} patterns are valid",
            filter.rules().len()
        );
        Ok(Outcome::Matched)
    } else {
        Err(Fail::InvalidRules(invalid.len()))
    }
}

fn filter_inputs(filter: &Filter, inputs: &[OsString]) -> Result<Outcome, Fail> {
    let stdout = io::stdout();
    let mut output = stdout.lock();
    let mut summary = Summary::default();

    if inputs.is_empty() {
        let span = span!(Level::ERROR, "input", name = "standard input");
        let _enter = span.enter();
        filter
            .run(io::stdin().lock(), &mut output, &mut summary)
            .map_err(|error| Fail::Filter {
                input: "standard input".to_string(),
                error,
            })?;
    }
    for input in inputs {
        let span = span!(Level::ERROR, "input", name = ?input);
        let _enter = span.enter();
        let file = File::open(input).map_err(|error| Fail::Open {
            input: input.clone(),
            error,
        })?;
        event!(Level::DEBUG, "reading {}", input.to_string_lossy());
        filter
            .run(BufReader::new(file), &mut output, &mut summary)
            .map_err(|error| Fail::Filter {
                input: input.to_string_lossy().into_owned(),
                error,
            })?;
    }

    event!(
        Level::INFO,
        "{} of {} lines matched; {} of {} patterns were compiled",
        summary.lines_matched,
        summary.lines_read,
        filter.compiled_rules(),
        filter.rules().len()
    );
    if summary.lines_matched > 0 {
        Ok(Outcome::Matched)
    } else {
        Ok(Outcome::NothingMatched)
    }
}

fn run_dregrep() -> Result<Outcome, Fail> {
    let mut cli = Cli::parse();

    // See
    // https://docs.rs/tracing-subscriber/0.3/tracing_subscriber/filter/struct.EnvFilter.html
    // for instructions on how to select which trace messages get
    // printed (via RUST_LOG).
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
            )));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let rules = collect_rules(&mut cli)?;
    let filter = Filter::new(rules, cli.only_matching);
    if cli.check {
        check_rules(&filter)
    } else {
        filter_inputs(&filter, &cli.inputs)
    }
}

fn main() {
    match run_dregrep() {
        Err(e) => {
            eprintln!("dregrep: {e}");
            std::process::exit(2);
        }
        Ok(Outcome::Matched) => {
            std::process::exit(0);
        }
        Ok(Outcome::NothingMatched) => {
            std::process::exit(1);
        }
    }
}
