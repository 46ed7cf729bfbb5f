//! The template-mining engine.
//!
//! A [`TemplateMiner`] owns an arena of preprocessed events and the patterns
//! built over them. [`TemplateMiner::parse`] preprocesses a batch, assigns
//! each event to a pattern, derives one template per pattern and returns the
//! template of every distinct input line. Patterns and events accumulate
//! across calls; use a fresh instance for an independent run.

use crate::clustering::{self, Pattern};
use crate::config::{Config, ConfigError, PartialConfig};
use crate::event::{EventId, LogEvent};
use crate::frequency;
use crate::ordering;
use crate::preprocess::{Preprocessor, RegexPreprocessor};
use crate::template;
use lru::LruCache;
use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroUsize;
use tracing::{debug, warn};

/// Lines longer than this many characters are truncated before preprocessing.
pub const MAX_LINE_CHARS: usize = 10_000;

const PREPROCESS_CACHE_CAPACITY: usize = 8192;

/// Trims a raw input line and caps its length. Returns `None` for blank lines.
pub fn normalize_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.char_indices().nth(MAX_LINE_CHARS) {
        Some((cut, _)) => {
            warn!(chars = line.chars().count(), cap = MAX_LINE_CHARS, "truncating overlong line");
            Some(&line[..cut])
        }
        None => Some(line),
    }
}

pub struct TemplateMiner {
    config: Config,
    preprocessor: Box<dyn Preprocessor>,
    events: Vec<LogEvent>,
    patterns: Vec<Pattern>,
    cache: LruCache<String, LogEvent>,
}

impl Default for TemplateMiner {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateMiner {
    /// Engine with the default configuration and built-in rules.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            preprocessor: Box::new(RegexPreprocessor::default()),
            events: Vec::new(),
            patterns: Vec::new(),
            cache: LruCache::new(NonZeroUsize::new(PREPROCESS_CACHE_CAPACITY).unwrap()),
        }
    }

    pub fn from_config(partial: PartialConfig) -> Result<Self, ConfigError> {
        let mut miner = Self::new();
        miner.with_config(partial)?;
        Ok(miner)
    }

    /// Resolves, validates and applies a configuration. On error nothing
    /// changes and the previous configuration stays in effect.
    pub fn with_config(&mut self, partial: PartialConfig) -> Result<(), ConfigError> {
        let config = partial.resolve()?;
        let preprocessor = RegexPreprocessor::from_config(&config)?;
        debug!(?config, "configuration applied");
        self.config = config;
        self.preprocessor = Box::new(preprocessor);
        self.cache.clear();
        Ok(())
    }

    /// Replaces the header/substitution collaborator, keeping the configuration.
    pub fn with_preprocessor(mut self, preprocessor: Box<dyn Preprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self.cache.clear();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Header stripping, known-variable substitution and tokenization of one line.
    pub fn preprocess(&self, line: &str) -> LogEvent {
        let content = self.preprocessor.strip_header(line);
        let content = self.preprocessor.substitute_known_variables(&content);
        LogEvent::new(line, content)
    }

    fn preprocess_cached(&mut self, line: &str) -> LogEvent {
        if let Some(hit) = self.cache.get(line) {
            return hit.clone();
        }
        let event = self.preprocess(line);
        self.cache.put(line.to_string(), event.clone());
        event
    }

    /// Mines templates for a batch of lines and maps each distinct non-blank
    /// line (trimmed and length-capped) to its template. Never fails; an
    /// empty batch yields an empty map.
    #[tracing::instrument(level = "debug", skip_all, fields(lines = lines.len()))]
    pub fn parse<S: AsRef<str>>(&mut self, lines: &[S]) -> HashMap<String, String> {
        let start = self.events.len();
        for line in lines {
            if let Some(line) = normalize_line(line.as_ref()) {
                let event = self.preprocess_cached(line);
                self.events.push(event);
            }
        }
        let batch = start..self.events.len();

        clustering::assign(
            &mut self.patterns,
            &self.events,
            batch.clone(),
            self.config.min_similarity,
            self.config.strict_alphabetical_matching,
        );
        self.analyze_patterns();
        self.clean_numeric_literals();

        let results: HashMap<String, String> = self.events[batch]
            .iter()
            .map(|event| (event.raw.clone(), resolved_template(event)))
            .collect();
        debug!(events = results.len(), patterns = self.patterns.len(), "parse finished");
        results
    }

    /// Sort, frequency analysis and template synthesis for every pattern.
    fn analyze_patterns(&mut self) {
        let config = &self.config;
        for pattern in &mut self.patterns {
            ordering::sort_members(config.sorting, &mut pattern.events, &self.events);
            let Some(rep) = pattern.representative() else { continue };
            let representative = &self.events[rep];

            let small = pattern.len() < config.min_group_size;
            pattern.template = if small && !config.analyze_small_groups {
                representative.content.clone()
            } else {
                pattern.token_frequency = frequency::count_tokens(pattern.events.iter().map(|&id| &self.events[id]));
                let cut = frequency::threshold(
                    config.freq_threshold,
                    &pattern.token_frequency,
                    pattern.len(),
                    config.freq_percentile,
                );
                let candidate = template::synthesize(representative, &pattern.token_frequency, cut);
                if template::placeholder_ratio(&candidate) > config.max_placeholder_ratio {
                    debug!(pattern = pattern.id, %candidate, "placeholder ratio too high, keeping content");
                }
                template::guard(candidate, representative, config.max_placeholder_ratio)
            };
            propagate(&mut self.events, pattern);
        }
    }

    fn clean_numeric_literals(&mut self) {
        for pattern in &mut self.patterns {
            pattern.template = self.preprocessor.substitute_numeric_literals(&pattern.template);
            propagate(&mut self.events, pattern);
        }
    }

    /// Distinct valid templates in ascending order.
    pub fn templates(&self) -> Vec<String> {
        self.patterns
            .iter()
            .map(|p| p.template.trim())
            .filter(|t| template::is_valid(t, self.config.min_template_tokens))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// All patterns, unfiltered, in creation order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn event(&self, id: EventId) -> Option<&LogEvent> {
        self.events.get(id)
    }

    /// A pattern's events in their current order; the first is the representative.
    pub fn pattern_events<'a>(&'a self, pattern: &'a Pattern) -> impl Iterator<Item = &'a LogEvent> + 'a {
        pattern.events.iter().filter_map(move |&id| self.events.get(id))
    }
}

fn propagate(events: &mut [LogEvent], pattern: &Pattern) {
    for &id in &pattern.events {
        events[id].template.clone_from(&pattern.template);
    }
}

/// Template, else substituted content, else the raw line.
fn resolved_template(event: &LogEvent) -> String {
    [event.template.as_str(), event.content.as_str(), event.raw.as_str()]
        .into_iter()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}
