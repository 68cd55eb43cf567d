use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use qexpand_lib::{render, Analyzer, AnalyzerConfig, ExpandOptions, LexiconOracle};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qexpand", about = "Hunspell-based search query expansion")]
struct Cli {
    /// Phrase to expand. If omitted, reads one phrase per line from stdin.
    input: Option<String>,

    /// Affix file. Uses the bundled sample word list when omitted.
    #[arg(long, requires = "dic")]
    aff: Option<PathBuf>,

    /// Dictionary file matching --aff.
    #[arg(long, requires = "aff")]
    dic: Option<PathBuf>,

    /// Analyzer configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drop suggestions further than this edit distance (0 keeps all).
    #[arg(long)]
    max_distance: Option<usize>,

    /// Do not prefer suggestions that only differ in letter case.
    #[arg(long)]
    case_sensitive: bool,

    /// Print the stems and surface forms of each word instead of expanding.
    #[arg(long)]
    stem: bool,

    /// Print the query tree in prefix notation instead of JSON.
    #[arg(long)]
    tree: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct StemReport {
    word: String,
    correct: bool,
    stems: Vec<StemForms>,
}

#[derive(Serialize)]
struct StemForms {
    stem: String,
    prefix: String,
    forms: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let analyzer = load_analyzer(&cli)?;
    let mut options = analyzer.default_options().clone();
    if let Some(max) = cli.max_distance {
        options.max_edit_distance = max;
    }
    if cli.case_sensitive {
        options.case_insensitive = false;
    }

    match cli.input {
        Some(ref text) => process_line(text, &analyzer, &options, &cli)?,
        None => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("failed to read stdin")?;
                if !line.trim().is_empty() {
                    process_line(&line, &analyzer, &options, &cli)?;
                }
            }
        }
    }
    Ok(())
}

fn load_analyzer(cli: &Cli) -> Result<Analyzer<LexiconOracle>> {
    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    let analyzer = match (&cli.aff, &cli.dic) {
        (Some(aff), Some(dic)) => Analyzer::from_files(aff, dic, &config)
            .with_context(|| format!("loading {} and {}", aff.display(), dic.display()))?,
        _ if cli.config.is_some() => Analyzer::from_sources(
            qexpand_lib::sample::AFFIX,
            qexpand_lib::sample::DICTIONARY,
            &config,
        )
        .context("loading sample word list")?,
        _ => Analyzer::sample().context("loading sample word list")?,
    };
    tracing::debug!(stems = analyzer.dictionary().len(), "analyzer ready");
    Ok(analyzer)
}

fn process_line(
    line: &str,
    analyzer: &Analyzer<LexiconOracle>,
    options: &ExpandOptions,
    cli: &Cli,
) -> Result<()> {
    if cli.stem {
        let reports: Vec<StemReport> = line
            .split_whitespace()
            .map(|word| StemReport {
                word: word.to_string(),
                correct: analyzer.spell(word),
                stems: analyzer
                    .stem(word)
                    .into_iter()
                    .map(|s| StemForms {
                        forms: analyzer.morph(&s),
                        stem: s.stem,
                        prefix: s.prefix,
                    })
                    .collect(),
            })
            .collect();
        return print_json(&reports, cli.pretty);
    }

    let result = analyzer
        .expand(line, options)
        .with_context(|| format!("expanding `{line}`"))?;
    if cli.tree {
        println!("{}", render(&result.query));
        Ok(())
    } else {
        print_json(&result, cli.pretty)
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    println!("{}", json.context("JSON serialization failed")?);
    Ok(())
}
