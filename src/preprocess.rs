use crate::config::{Config, ConfigError};
use crate::event::PLACEHOLDER;
use once_cell::sync::Lazy;
use regex::{Captures, NoExpand, Regex};

/// Optional ISO timestamp prefix terminated by `,` or `:`; the rest is content.
pub const DEFAULT_HEADER_REGEX: &str =
    r"^(?:\d{4}-\d{2}-\d{2}[T\s]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:[+-]\d{2}:\d{2}|Z)?[,:]\s*)?(.+)$";
/// `081109 203615 148 INFO dfs.DataNode$PacketResponder: <content>`
pub const HDFS_HEADER_REGEX: &str = r"(\d{6} \d{6}) (\d+) (\w+) ([^:]+): (.+)";
/// `Jan 15 10:30:15 host process[42]: <content>`
pub const SYSLOG_HEADER_REGEX: &str = r"^(\w{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2})\s+(\w+)\s+([^:]+):\s*(.+)$";
/// `2024-01-15 10:30:15.123 INFO [main] com.example.App - <content>`
pub const JAVA_APP_HEADER_REGEX: &str =
    r"^(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})\s+(\w+)\s+\[([^\]]+)\]\s+([^-]+)-\s*(.+)$";

/// Maps a preset name to its header regex; any other value is taken as a regex.
pub fn header_regex_for(name: &str) -> &str {
    match name {
        "" | "default" => DEFAULT_HEADER_REGEX,
        "hdfs" => HDFS_HEADER_REGEX,
        "syslog" => SYSLOG_HEADER_REGEX,
        "java" => JAVA_APP_HEADER_REGEX,
        custom => custom,
    }
}

// Applied in order before tokenization. Order matters: paths and addresses
// first, then the date/time family from most to least specific.
static KNOWN_VARIABLES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // paths
        r"(/[a-zA-Z0-9._/-]+){3,}",
        r"([a-zA-Z]:\\[\w\s\\./-]+){2,}",
        // IPv4 with optional port and leading slash (HDFS style), IPv6
        r"/?(?:\d{1,3}\.){3}\d{1,3}(?::\d{1,5})?",
        r"\b([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}\b",
        r"0x[0-9a-fA-F]{4,}",
        // MAC, UUID, hashes
        r"([0-9a-fA-F]{2}[:-]){5}[0-9a-fA-F]{2}",
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        r"\b[a-fA-F0-9]{32,64}\b",
        // date + time
        r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?([+-]\d{2}:\d{2}|Z)?",
        r"\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}(\.\d+)?",
        r"\d{1,2}/\d{1,2}/\d{4}\s+\d{2}:\d{2}:\d{2}(\.\d+)?",
        r"\d{1,2}[- ](Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[- ]\d{4}\s+\d{2}:\d{2}:\d{2}(\.\d+)?",
        r"(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2}\s+\d{4}\s+\d{2}:\d{2}:\d{2}(\.\d+)?",
        r"\d{1,2}\s+(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{4}\s+\d{2}:\d{2}:\d{2}(\.\d+)?",
        r"(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}",
        r"\d{4}/\d{2}/\d{2}\s+\d{2}:\d{2}:\d{2}(\.\d+)?",
        r"\d{2}\.\d{2}\.\d{4}\s+\d{2}:\d{2}:\d{2}(\.\d+)?",
        // date only
        r"\d{4}-\d{2}-\d{2}",
        r"\d{1,2}/\d{1,2}/\d{4}",
        r"\d{2}\.\d{2}\.\d{4}",
        // compact and epoch
        r"\b\d{8}T\d{6}\b",
        r"\b\d{14}\b",
        r"\b1[0-9]{9}\b",
        r"\b1[0-9]{12}\b",
        r"\b(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec|January|February|March|April|May|June|July|August|September|October|November|December)\b",
        r"\b(Mon|Tue|Wed|Thu|Fri|Sat|Sun|Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\b",
        r"\b\d{1,2}:\d{2}:\d{2}(\.\d{1,6})?\b",
        // URLs, e-mail
        r"https?://[^\s]+",
        r"ftp://[^\s]+",
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
        // (controller), (admin), ...
        r"\([a-zA-Z][a-zA-Z0-9_-]*\)",
        // long opaque ids
        r"\b[a-zA-Z0-9]{32,}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// Each numeric shape in five positions: between spaces, in parentheses,
// in brackets, at line end, at line start.
static NUMERIC_LITERALS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let shapes = [
        r"\d+",
        r"-?\d+(\.\d+)?",
        r"0[xX][0-9a-fA-F]+",
        r"-?\d+(\.\d+)?[eE][+-]?\d+",
        r"-?\d+(\.\d+)?[a-zA-Z]+",
        r"[a-zA-Z]+_-?\d+",
    ];
    shapes
        .iter()
        .flat_map(|shape| {
            [
                format!(r"\s{shape}\s"),
                format!(r"\({shape}\)"),
                format!(r"\[{shape}\]"),
                format!(r"\s{shape}$"),
                format!(r"^{shape}\s"),
            ]
        })
        .map(|p| Regex::new(&p).unwrap())
        .collect()
});

/// The three collaborators the engine needs around its core. Implementations
/// must be pure: the same input always yields the same output.
pub trait Preprocessor: Send + Sync {
    /// Removes a structured prefix (timestamp, level, component) from a raw line.
    fn strip_header(&self, raw: &str) -> String;
    /// Replaces well-known variable values with the placeholder.
    fn substitute_known_variables(&self, content: &str) -> String;
    /// Replaces numeric literals left in a synthesized template.
    fn substitute_numeric_literals(&self, template: &str) -> String;
}

/// Regex-table preprocessor: one header regex, the built-in rules and
/// caller-supplied rules appended after them.
#[derive(Debug, Clone)]
pub struct RegexPreprocessor {
    header: Regex,
    custom: Vec<Regex>,
}

impl RegexPreprocessor {
    pub fn new(header_regex: &str, custom_regexes: &[String]) -> Result<Self, ConfigError> {
        let header = Regex::new(header_regex).map_err(ConfigError::HeaderRegex)?;
        let custom = custom_regexes
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::CustomRegex { pattern: p.clone(), source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { header, custom })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.header_regex, &config.custom_regexes)
    }

    pub fn custom_rule_count(&self) -> usize {
        self.custom.len()
    }
}

impl Default for RegexPreprocessor {
    fn default() -> Self {
        Self { header: Regex::new(DEFAULT_HEADER_REGEX).unwrap(), custom: Vec::new() }
    }
}

impl Preprocessor for RegexPreprocessor {
    fn strip_header(&self, raw: &str) -> String {
        // content is the last non-empty group that is not the whole line
        self.header
            .captures(raw)
            .and_then(|caps| {
                (0..caps.len())
                    .rev()
                    .filter_map(|i| caps.get(i))
                    .map(|m| m.as_str())
                    .find(|g| !g.is_empty() && *g != raw)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| raw.to_string())
    }

    fn substitute_known_variables(&self, content: &str) -> String {
        KNOWN_VARIABLES
            .iter()
            .chain(self.custom.iter())
            .fold(content.to_string(), |s, re| re.replace_all(&s, NoExpand(PLACEHOLDER)).into_owned())
    }

    fn substitute_numeric_literals(&self, template: &str) -> String {
        clean_numeric_literals(template)
    }
}

/// Rewrites numeric-looking tokens of a template to the placeholder, keeping
/// the surrounding whitespace and brackets. Repeats the rule pass until
/// nothing changes, so the result is a fixpoint.
pub fn clean_numeric_literals(template: &str) -> String {
    let mut current = template.to_string();
    loop {
        let next = NUMERIC_LITERALS
            .iter()
            .fold(current.clone(), |s, re| re.replace_all(&s, replace_numeric).into_owned());
        if next == current {
            return current;
        }
        current = next;
    }
}

fn replace_numeric(caps: &Captures<'_>) -> String {
    let whole = &caps[0];
    let prefix = if whole.starts_with(char::is_whitespace) { " " } else { "" };
    let suffix = if whole.ends_with(char::is_whitespace) { " " } else { "" };
    let inner = whole.trim_matches(char::is_whitespace);
    if inner.starts_with('(') && inner.ends_with(')') {
        return format!("({PLACEHOLDER})");
    }
    if inner.starts_with('[') && inner.ends_with(']') {
        return format!("[{PLACEHOLDER}]");
    }
    format!("{prefix}{PLACEHOLDER}{suffix}")
}
