use once_cell::sync::Lazy;
use regex::Regex;

/// Token standing in for a value classified as dynamic.
pub const PLACEHOLDER: &str = "<*>";

/// Index of an event inside the engine's event arena.
pub type EventId = usize;

/// One preprocessed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Original (trimmed) line.
    pub raw: String,
    /// Line after header stripping and known-variable substitution.
    pub content: String,
    pub tokens: Vec<String>,
    /// Final template, empty until the pattern is analysed.
    pub template: String,
    letters: usize,
}

impl LogEvent {
    pub fn new(raw: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let tokens: Vec<String> = content.split_whitespace().map(str::to_string).collect();
        let letters = count_letters(&tokens);
        Self { raw: raw.into(), content, tokens, template: String::new(), letters }
    }

    /// Total number of letters across the alphabetical tokens.
    pub fn letter_count(&self) -> usize {
        self.letters
    }

    pub fn alphabetical_tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str).filter(|t| is_alphabetical(t))
    }

    /// Number of tokens that are not alphabetical (placeholders included).
    pub fn dynamic_token_count(&self) -> usize {
        self.tokens.iter().filter(|t| !is_alphabetical(t)).count()
    }
}

// General category L only; letter numbers and combining marks do not count.
static LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}+$").unwrap());

/// A token is alphabetical when it is non-empty, made only of letters, and
/// is not the placeholder.
pub fn is_alphabetical(token: &str) -> bool {
    token != PLACEHOLDER && LETTERS.is_match(token)
}

pub fn is_placeholder(token: &str) -> bool {
    token == PLACEHOLDER
}

fn count_letters(tokens: &[String]) -> usize {
    tokens
        .iter()
        .filter(|t| is_alphabetical(t))
        .map(|t| t.chars().count())
        .sum()
}
