//! Wildcard matcher shared by wildcard expansion (spec §4.C step 5) and
//! `switch`/`case` matching (§4.D).
//!
//! Patterns support the syntax fish's globbing recognizes:
//!
//! - `?`: any single character except `/`
//! - `*`: any run of characters, never crossing a `/`
//! - `**`: any run of characters, crossing `/` freely
//! - Bracket expressions (`[...]`), including ranges, complement (`[!...]`),
//!   and named character classes (`[:alpha:]`)
//!
//! A pattern with none of these constructs compiles to an exact-match
//! [`Pattern`], matching the one string equal to it.

pub mod ast;
mod char_iter;

pub use char_iter::{with_escape, without_escape, PatternChar};

use ast::Ast;
use regex::Regex;
use thiserror::Error as ThisError;

/// Whether matching treats letter case as significant.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

/// Options controlling how a [`Pattern`] is compiled and matched.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config {
    pub case_sensitivity: CaseSensitivity,
}

/// Error compiling a pattern.
#[derive(Clone, Debug, ThisError, Eq, PartialEq)]
pub enum Error {
    /// A bracket expression's range end could not be parsed as a single
    /// character (reserved for future locale-aware ranges; not reachable
    /// by the current ASCII-only bracket grammar).
    #[error("unterminated bracket expression")]
    UnterminatedBracket,
    /// The compiled regular expression was rejected by the `regex` engine.
    #[error("invalid pattern: {0}")]
    InvalidRegex(String),
}

/// A compiled globbing pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    has_wildcard: bool,
    regex: Regex,
}

impl Pattern {
    /// Compiles `pattern` (an iterator of [`PatternChar`], see
    /// [`with_escape`]/[`without_escape`]) with default [`Config`].
    pub fn parse<I>(pattern: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        Self::parse_with_config(pattern, &Config::default())
    }

    /// Compiles `pattern` with an explicit [`Config`].
    pub fn parse_with_config<I>(pattern: I, config: &Config) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        let chars: Vec<PatternChar> = pattern.into_iter().collect();
        let source: String = chars.iter().map(|pc| pc.char_value()).collect();
        let ast = Ast::new(chars)?;
        let has_wildcard = ast.has_wildcard();
        let regex_src = ast.to_regex(config);
        let regex = Regex::new(&regex_src).map_err(|e| Error::InvalidRegex(e.to_string()))?;
        Ok(Pattern { source, has_wildcard, regex })
    }

    /// The pattern's original, unescaped source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the pattern contains any wildcard construct. A pattern
    /// without one only ever matches its own literal text.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    /// True if `s` matches this pattern in its entirety.
    #[must_use]
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_without_wildcard() {
        let p = Pattern::parse(without_escape("foo.txt")).unwrap();
        assert!(!p.has_wildcard());
        assert!(p.is_match("foo.txt"));
        assert!(!p.is_match("foo.tx"));
    }

    #[test]
    fn single_star_globs_one_segment() {
        let p = Pattern::parse(without_escape("*.rs")).unwrap();
        assert!(p.has_wildcard());
        assert!(p.is_match("lib.rs"));
        assert!(!p.is_match("src/lib.rs"));
    }

    #[test]
    fn double_star_globs_across_segments() {
        let p = Pattern::parse(without_escape("**.rs")).unwrap();
        assert!(p.is_match("src/lib.rs"));
    }

    #[test]
    fn case_insensitive_config_matches_either_case() {
        let config = Config { case_sensitivity: CaseSensitivity::Insensitive };
        let p = Pattern::parse_with_config(without_escape("README*"), &config).unwrap();
        assert!(p.is_match("readme.md"));
    }

    #[test]
    fn as_str_returns_original_source() {
        let p = Pattern::parse(without_escape("a*b")).unwrap();
        assert_eq!(p.as_str(), "a*b");
    }
}
