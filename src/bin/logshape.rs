use anyhow::Context;
use clap::{Parser, ValueEnum};
use logshape::config::{FreqThresholdStrategy, PartialConfig, SortingStrategy};
use logshape::input::{self, CsvOptions, DEFAULT_COLUMN};
use logshape::preprocess::header_regex_for;
use logshape::report::{self, Summary};
use logshape::TemplateMiner;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "logshape", version, about = "Mine message templates from log lines")]
struct Cli {
    /// Input files (`-` for stdin). Files ending in .csv are read as CSV.
    #[arg(required = false)]
    input: Vec<String>,

    /// CSV column holding the log message
    #[arg(long = "column", default_value = DEFAULT_COLUMN)]
    column: String,
    /// CSV field delimiter (first byte is used)
    #[arg(long = "delimiter", default_value = ",")]
    delimiter: String,

    /// Header format: default | hdfs | syslog | java, or a custom regex
    #[arg(long = "header")]
    header: Option<String>,
    /// Minimum similarity (0..=1) for two lines to share a pattern
    #[arg(long = "similarity")]
    similarity: Option<f64>,
    /// Member ordering: none | length | lexical | dyntokens
    #[arg(long = "sort")]
    sort: Option<SortingStrategy>,
    /// Frequency threshold: min | median | percentile | all
    #[arg(long = "freq")]
    freq: Option<FreqThresholdStrategy>,
    /// Percentile used by `--freq percentile`
    #[arg(long = "percentile")]
    percentile: Option<f64>,
    /// Extra variable patterns, comma separated
    #[arg(long = "regex", value_delimiter = ',')]
    regex: Vec<String>,
    /// Groups smaller than this keep their first line as template
    #[arg(long = "min-group")]
    min_group: Option<usize>,
    /// Fall back to the raw content above this placeholder ratio
    #[arg(long = "max-placeholders")]
    max_placeholders: Option<f64>,
    /// Minimum non-placeholder tokens for `--templates` output
    #[arg(long = "min-tokens")]
    min_tokens: Option<usize>,
    /// Compare the alphabetical tokens themselves, not just their letter counts
    #[arg(long = "strict", default_value_t = false)]
    strict: bool,
    /// Run frequency analysis on groups below `--min-group` too
    #[arg(long = "small-groups", default_value_t = false)]
    small_groups: bool,
    /// JSON file with engine settings; flags take precedence
    #[arg(long = "config")]
    config: Option<String>,

    /// Process at most this many input lines (0 means all)
    #[arg(long = "max")]
    max: Option<usize>,
    /// Print the distinct valid templates only
    #[arg(long = "templates", default_value_t = false)]
    templates: bool,
    #[arg(long = "format", value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Member lines listed per pattern in JSON output
    #[arg(long = "examples", default_value_t = 0)]
    examples: usize,
    #[arg(long = "verbose", short = 'v', default_value_t = false)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl Cli {
    fn partial_config(&self) -> PartialConfig {
        let regexes: Vec<String> =
            self.regex.iter().map(|r| r.trim().to_string()).filter(|r| !r.is_empty()).collect();
        PartialConfig {
            min_similarity: self.similarity,
            sorting: self.sort,
            custom_regexes: (!regexes.is_empty()).then_some(regexes),
            header_regex: self.header.as_deref().map(|h| header_regex_for(h).to_string()),
            min_group_size: self.min_group,
            max_placeholder_ratio: self.max_placeholders,
            min_template_tokens: self.min_tokens,
            freq_threshold: self.freq,
            freq_percentile: self.percentile,
            strict_alphabetical_matching: self.strict.then_some(true),
            analyze_small_groups: self.small_groups.then_some(true),
        }
    }
}

/// Command-line defaults, weaker than both flags and the config file.
fn cli_defaults() -> PartialConfig {
    PartialConfig {
        min_group_size: Some(3),
        max_placeholder_ratio: Some(0.8),
        analyze_small_groups: Some(false),
        ..Default::default()
    }
}

/// Keeps the first `max` lines. Zero, like an absent limit, keeps everything.
fn apply_line_limit(lines: &mut Vec<String>, max: Option<usize>) {
    if let Some(max) = max.filter(|&m| m > 0) {
        lines.truncate(max);
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "logshape=debug" } else { "logshape=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => PartialConfig::from_json_file(path).with_context(|| format!("loading config {path}"))?,
        None => PartialConfig::default(),
    };
    let partial = cli.partial_config().or(file_config).or(cli_defaults());
    let mut miner = TemplateMiner::from_config(partial).context("configuring engine")?;

    let csv = CsvOptions {
        column: cli.column.clone(),
        delimiter: cli.delimiter.bytes().next().unwrap_or(b','),
    };
    let input_files = if cli.input.is_empty() { vec!["-".to_string()] } else { cli.input.clone() };
    let mut lines = Vec::new();
    for path in &input_files {
        lines.extend(input::read_path(path, &csv).with_context(|| format!("reading {path}"))?);
    }
    apply_line_limit(&mut lines, cli.max);

    let results = miner.parse(&lines);
    let stats = report::template_stats(&lines, &results);

    match cli.format {
        Format::Json if cli.templates => {
            println!("{}", serde_json::to_string_pretty(&miner.templates())?);
        }
        Format::Json => {
            let summary = Summary::build(&miner, stats, cli.examples);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Format::Text => {
            if cli.verbose {
                println!("Found {} unique templates", stats.len());
                println!("{}", "=".repeat(80));
            }
            if cli.templates {
                for template in miner.templates() {
                    println!("{template}");
                }
            } else {
                for stat in &stats {
                    println!("[{}] {}", stat.count, stat.template);
                }
            }
            if cli.verbose {
                println!("{}", "=".repeat(80));
                println!("Total logs processed: {}", lines.len());
                println!("Unique templates: {}", stats.len());
                println!("Pattern groups: {}", miner.patterns().len());
            }
        }
    }
    Ok(())
}
