//! fzprompt - fuzzy filter for line-oriented input
//!
//! Command-line usage:
//!   ls | fzprompt [query]            - Fuzzy match, best first (`score<TAB>line`)
//!   ls | fzprompt --exact [query]    - Substring match
//!   ls | fzprompt "src 'main"        - Tokens are ANDed, `'` marks a literal token

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fzprompt::{
    CandidateSource, CaseMatching, ChoiceRecord, MatchMode, MatchResult, SearchConfig,
    SearchController,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Query, split on whitespace into tokens
    #[arg(default_value = "")]
    query: String,

    /// Match every token as a literal substring
    #[arg(short, long)]
    exact: bool,

    /// Case policy for query tokens
    #[arg(long, value_enum, value_name = "POLICY")]
    case: Option<CaseArg>,

    /// JSON file with search and scoring configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of lines to print
    #[arg(short, long)]
    limit: Option<usize>,

    /// Wrap matched characters in brackets
    #[arg(long)]
    highlight: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CaseArg {
    Insensitive,
    Sensitive,
    /// Sensitive only for tokens containing an uppercase character
    Smart,
}

impl From<CaseArg> for CaseMatching {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Insensitive => CaseMatching::Insensitive,
            CaseArg::Sensitive => CaseMatching::Sensitive,
            CaseArg::Smart => CaseMatching::Smart,
        }
    }
}

fn highlight(text: &str, positions: &[usize]) -> String {
    let mut out = String::with_capacity(text.len() + positions.len() * 2);
    let mut next = positions.iter().peekable();
    for (index, c) in text.chars().enumerate() {
        if next.peek() == Some(&&index) {
            next.next();
            out.push('[');
            out.push(c);
            out.push(']');
        } else {
            out.push(c);
        }
    }
    out
}

fn read_records(input: impl BufRead) -> Result<Vec<ChoiceRecord<String>>> {
    let mut records = Vec::new();
    for line in input.split(b'\n') {
        let mut bytes = line.context("Failed to read candidates from stdin")?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        let value = String::from_utf8_lossy(&bytes).into_owned();
        records.push(ChoiceRecord::Raw { bytes, value });
    }
    Ok(records)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SearchConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SearchConfig::default(),
    };
    if cli.exact {
        config.match_mode = MatchMode::Exact;
    }
    if let Some(case) = cli.case {
        config.case_matching = case.into();
    }

    let stdin = io::stdin();
    let records = read_records(stdin.lock())?;
    log::info!("Read {} candidates", records.len());

    let mut controller = SearchController::new(config);
    let state = controller.set_candidates(CandidateSource::Static(records));
    if let Some(err) = state.error() {
        anyhow::bail!("Failed to load candidates: {}", err);
    }
    controller.update_query(cli.query.as_str());

    let ranked = controller.current_ranked_list();
    let limit = cli.limit.unwrap_or(usize::MAX);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for result in ranked.results.iter().take(limit) {
        print_result(&mut out, &controller, result, &cli)?;
    }
    out.flush()?;
    Ok(())
}

fn print_result(
    out: &mut impl Write,
    controller: &SearchController<String>,
    result: &MatchResult,
    cli: &Cli,
) -> Result<()> {
    let Some(candidate) = controller.store().get(&result.candidate_id) else {
        return Ok(());
    };
    let text = if cli.highlight {
        highlight(&candidate.value, &result.positions)
    } else {
        candidate.value.clone()
    };
    writeln!(out, "{}\t{}", result.score, text)?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
