use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use formula_grammar::{
    parse_with, try_parse_with, CellOrigin, Expr, Notation, ParseOptions, Resume, ResumableParse,
};

#[derive(Debug, Parser)]
#[command(name = "formula-grammar")]
#[command(about = "Parse spreadsheet formulas and print them in canonical form.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a formula and print its canonical text (or its syntax tree as JSON).
    Parse(ParseArgs),
    /// Report whether a formula parses. Exits 1 when it does not.
    Check(CheckArgs),
}

#[derive(Debug, Parser)]
struct ParseArgs {
    /// Formula text, e.g. `=SUM(A1:B2)`.
    #[arg(allow_hyphen_values = true)]
    formula: String,

    /// Print the syntax tree as JSON instead of formula text.
    #[arg(long)]
    json: bool,

    /// Drive the parse one step at a time and report the step count on stderr.
    #[arg(long)]
    stepwise: bool,

    /// JSON file with parse options (see `ParseOptions`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write every reference in this notation instead of the one it was written in.
    #[arg(long, value_enum)]
    notation: Option<NotationArg>,

    /// Cell the formula sits in (A1 text such as `C5`). Needed to convert relative references.
    #[arg(long, requires = "notation")]
    origin: Option<CellOrigin>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NotationArg {
    A1,
    R1c1,
}

impl From<NotationArg> for Notation {
    fn from(arg: NotationArg) -> Self {
        match arg {
            NotationArg::A1 => Notation::A1,
            NotationArg::R1c1 => Notation::R1C1,
        }
    }
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// Formula text, e.g. `=SUM(A1:B2)`.
    #[arg(allow_hyphen_values = true)]
    formula: String,

    /// JSON file with parse options (see `ParseOptions`).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    }
}

fn load_options(path: Option<&Path>) -> Result<ParseOptions> {
    let Some(path) = path else {
        return Ok(ParseOptions::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn parse_stepwise(formula: &str, opts: &ParseOptions) -> Result<Expr> {
    let mut parse = ResumableParse::new(formula, opts);
    loop {
        let steps = parse.steps() + 1;
        match parse.resume() {
            Resume::Suspended(next) => parse = next,
            Resume::Done(result) => {
                eprintln!("finished after {steps} steps");
                return result.with_context(|| format!("parse {formula:?}"));
            }
        }
    }
}

fn run_parse(args: &ParseArgs) -> Result<ExitCode> {
    let opts = load_options(args.config.as_deref())?;
    let expr = if args.stepwise {
        parse_stepwise(&args.formula, &opts)?
    } else {
        parse_with(&args.formula, &opts).with_context(|| format!("parse {:?}", args.formula))?
    };
    let expr = match args.notation {
        Some(notation) => expr
            .to_notation(notation.into(), args.origin)
            .context("convert references")?,
        None => expr,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&expr).context("serialize syntax tree")?;
        println!("{json}");
    } else {
        println!("={}", expr.to_formula());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(args: &CheckArgs) -> Result<ExitCode> {
    let opts = load_options(args.config.as_deref())?;
    if try_parse_with(&args.formula, &opts).is_some() {
        println!("valid");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("invalid");
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    match &cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
    }
}
