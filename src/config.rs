use crate::preprocess::DEFAULT_HEADER_REGEX;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("min_similarity must be between 0 and 1, got {0}")]
    MinSimilarity(f64),
    #[error("min_group_size must be at least 1, got {0}")]
    MinGroupSize(usize),
    #[error("max_placeholder_ratio must be between 0 and 1, got {0}")]
    MaxPlaceholderRatio(f64),
    #[error("freq_percentile must be between 0 and 1, got {0}")]
    FreqPercentile(f64),
    #[error("invalid header regex: {0}")]
    HeaderRegex(#[source] regex::Error),
    #[error("invalid custom regex pattern {pattern}: {source}")]
    CustomRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown {kind} strategy: {value}")]
    UnknownStrategy { kind: &'static str, value: String },
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// How events inside a pattern are ordered before the representative is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortingStrategy {
    /// Keep insertion order; the first matched event represents the pattern.
    #[default]
    None,
    /// Fewest tokens first, ties by content.
    ByLength,
    /// Content order, ties by raw line.
    Lexical,
    /// Fewest non-alphabetical tokens first, ties by content.
    ByDynamicTokens,
}

impl FromStr for SortingStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "length" | "by-length" => Ok(Self::ByLength),
            "lexical" => Ok(Self::Lexical),
            "dyntokens" | "by-dynamic-tokens" => Ok(Self::ByDynamicTokens),
            _ => Err(ConfigError::UnknownStrategy { kind: "sorting", value: s.to_string() }),
        }
    }
}

impl fmt::Display for SortingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::ByLength => "length",
            Self::Lexical => "lexical",
            Self::ByDynamicTokens => "dyntokens",
        })
    }
}

/// How the static/dynamic frequency cut-off is derived from a pattern's token counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreqThresholdStrategy {
    /// Lowest observed count; keeps every token static.
    #[default]
    Min,
    Median,
    /// Count at `freq_percentile` over the sorted counts.
    Percentile,
    /// The group size: a token must appear in every event.
    All,
}

impl FromStr for FreqThresholdStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(Self::Min),
            "median" => Ok(Self::Median),
            "percentile" => Ok(Self::Percentile),
            "all" => Ok(Self::All),
            _ => Err(ConfigError::UnknownStrategy { kind: "frequency threshold", value: s.to_string() }),
        }
    }
}

impl fmt::Display for FreqThresholdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Min => "min",
            Self::Median => "median",
            Self::Percentile => "percentile",
            Self::All => "all",
        })
    }
}

/// Resolved, validated configuration for one engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub min_similarity: f64,
    pub sorting: SortingStrategy,
    pub custom_regexes: Vec<String>,
    pub header_regex: String,
    pub min_group_size: usize,
    pub max_placeholder_ratio: f64,
    pub min_template_tokens: usize,
    pub freq_threshold: FreqThresholdStrategy,
    pub freq_percentile: f64,
    pub strict_alphabetical_matching: bool,
    pub analyze_small_groups: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_similarity: 1.0,
            sorting: SortingStrategy::None,
            custom_regexes: Vec::new(),
            header_regex: DEFAULT_HEADER_REGEX.to_string(),
            min_group_size: 1,
            max_placeholder_ratio: 0.9,
            min_template_tokens: 1,
            freq_threshold: FreqThresholdStrategy::Min,
            freq_percentile: 0.5,
            strict_alphabetical_matching: false,
            analyze_small_groups: true,
        }
    }
}

impl Config {
    /// Range checks on the numeric parameters. Regex compilation is checked
    /// when the rules are built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(ConfigError::MinSimilarity(self.min_similarity));
        }
        if self.min_group_size < 1 {
            return Err(ConfigError::MinGroupSize(self.min_group_size));
        }
        if !(0.0..=1.0).contains(&self.max_placeholder_ratio) {
            return Err(ConfigError::MaxPlaceholderRatio(self.max_placeholder_ratio));
        }
        if !(0.0..=1.0).contains(&self.freq_percentile) {
            return Err(ConfigError::FreqPercentile(self.freq_percentile));
        }
        Ok(())
    }
}

/// Configuration with every field optional, as read from a file or flags.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub min_similarity: Option<f64>,
    pub sorting: Option<SortingStrategy>,
    pub custom_regexes: Option<Vec<String>>,
    pub header_regex: Option<String>,
    pub min_group_size: Option<usize>,
    pub max_placeholder_ratio: Option<f64>,
    pub min_template_tokens: Option<usize>,
    pub freq_threshold: Option<FreqThresholdStrategy>,
    pub freq_percentile: Option<f64>,
    pub strict_alphabetical_matching: Option<bool>,
    pub analyze_small_groups: Option<bool>,
}

impl PartialConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Field-wise merge; values set on `self` win over `fallback`.
    pub fn or(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            min_similarity: self.min_similarity.or(fallback.min_similarity),
            sorting: self.sorting.or(fallback.sorting),
            custom_regexes: self.custom_regexes.or(fallback.custom_regexes),
            header_regex: self.header_regex.or(fallback.header_regex),
            min_group_size: self.min_group_size.or(fallback.min_group_size),
            max_placeholder_ratio: self.max_placeholder_ratio.or(fallback.max_placeholder_ratio),
            min_template_tokens: self.min_template_tokens.or(fallback.min_template_tokens),
            freq_threshold: self.freq_threshold.or(fallback.freq_threshold),
            freq_percentile: self.freq_percentile.or(fallback.freq_percentile),
            strict_alphabetical_matching: self
                .strict_alphabetical_matching
                .or(fallback.strict_alphabetical_matching),
            analyze_small_groups: self.analyze_small_groups.or(fallback.analyze_small_groups),
        }
    }

    /// Fills unset fields from [`Config::default`] and validates the ranges.
    /// Zero in a numeric threshold, like an empty header regex, also means
    /// the default.
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let d = Config::default();
        let config = Config {
            min_similarity: self.min_similarity.filter(|&v| v != 0.0).unwrap_or(d.min_similarity),
            sorting: self.sorting.unwrap_or(d.sorting),
            custom_regexes: self.custom_regexes.unwrap_or(d.custom_regexes),
            header_regex: self.header_regex.filter(|h| !h.is_empty()).unwrap_or(d.header_regex),
            min_group_size: self.min_group_size.filter(|&v| v != 0).unwrap_or(d.min_group_size),
            max_placeholder_ratio: self
                .max_placeholder_ratio
                .filter(|&v| v != 0.0)
                .unwrap_or(d.max_placeholder_ratio),
            min_template_tokens: self.min_template_tokens.filter(|&v| v != 0).unwrap_or(d.min_template_tokens),
            freq_threshold: self.freq_threshold.unwrap_or(d.freq_threshold),
            freq_percentile: self.freq_percentile.filter(|&v| v != 0.0).unwrap_or(d.freq_percentile),
            strict_alphabetical_matching: self
                .strict_alphabetical_matching
                .unwrap_or(d.strict_alphabetical_matching),
            analyze_small_groups: self.analyze_small_groups.unwrap_or(d.analyze_small_groups),
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<Config> for PartialConfig {
    fn from(c: Config) -> Self {
        PartialConfig {
            min_similarity: Some(c.min_similarity),
            sorting: Some(c.sorting),
            custom_regexes: Some(c.custom_regexes),
            header_regex: Some(c.header_regex),
            min_group_size: Some(c.min_group_size),
            max_placeholder_ratio: Some(c.max_placeholder_ratio),
            min_template_tokens: Some(c.min_template_tokens),
            freq_threshold: Some(c.freq_threshold),
            freq_percentile: Some(c.freq_percentile),
            strict_alphabetical_matching: Some(c.strict_alphabetical_matching),
            analyze_small_groups: Some(c.analyze_small_groups),
        }
    }
}
