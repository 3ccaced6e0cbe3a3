//! Turns an arbitrary string into source text that the shell's tokenizer
//! (`fish-syntax`) re-reads as the same string.
//!
//! This is the "escape helper" of the spec's Expander (§4.C): `escape`
//! chooses one of three rendering styles. The default, [`QuoteStyle::ShellSafe`],
//! picks single-quoting when the string contains no bytes the single-quote
//! grammar can't carry, and falls back to an unquoted backslash-escaped form
//! otherwise (our tokenizer's single-quoted strings recognize only `\\` and
//! `\'` as escapes, so a string with other control bytes cannot round-trip
//! through them).
//!
//! # Examples
//!
//! ```
//! # use fish_quote::{escape, QuoteStyle};
//! assert_eq!(escape("foo", QuoteStyle::ShellSafe), "foo");
//! assert_eq!(escape("", QuoteStyle::ShellSafe), "''");
//! assert_eq!(escape("$foo", QuoteStyle::ShellSafe), "'$foo'");
//! ```

use std::borrow::Cow::{self, Borrowed, Owned};
use std::fmt::Write as _;

/// Which rendering the caller wants out of [`escape`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteStyle {
    /// Re-parses (via `fish-syntax`) to exactly the original string.
    ShellSafe,
    /// Percent-encoded for embedding in a URL path segment.
    UrlSafe,
    /// Human-readable; control bytes are rendered as `^X`/`\xNN` rather than
    /// preserved literally. Not guaranteed to round-trip.
    Display,
}

/// Escapes `s` for the given [`QuoteStyle`]. Borrows when no escaping is
/// needed.
pub fn escape(s: &str, style: QuoteStyle) -> Cow<str> {
    match style {
        QuoteStyle::ShellSafe => escape_shell_safe(s),
        QuoteStyle::UrlSafe => escape_url_safe(s),
        QuoteStyle::Display => escape_display(s),
    }
}

fn escape_shell_safe(s: &str) -> Cow<str> {
    if !s.is_empty() && !needs_quoting(s) {
        return Borrowed(s);
    }
    if s.bytes().any(|b| b < 0x20 && b != b'\t') {
        return Owned(backslash_escape(s));
    }
    if !s.contains('\'') && !s.contains('\\') {
        return Owned(format!("'{s}'"));
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    Owned(out)
}

/// Renders `s` with every special byte as a tokenizer-recognized `\`
/// escape, suitable outside any quotes.
fn backslash_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if (c as u32) < 0x20 && c != '\t' {
            let _ = write!(out, "\\x{:02x}", c as u32);
        } else if needs_char_escape(c) {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

fn needs_quoting(s: &str) -> bool {
    if s.chars().any(needs_char_escape) {
        return true;
    }
    matches!(s.chars().next(), Some('#') | Some('~'))
}

fn needs_char_escape(c: char) -> bool {
    match c {
        ';' | '&' | '|' | '(' | ')' | '<' | '>' | '^' => true,
        ' ' | '\t' | '\n' => true,
        '$' | '\\' | '"' | '\'' | '*' | '?' | '{' | '}' | '~' | '#' => true,
        _ => c.is_whitespace(),
    }
}

const URL_UNRESERVED: &str = "-._~";

fn escape_url_safe(s: &str) -> Cow<str> {
    if s.bytes().all(|b| b.is_ascii_alphanumeric() || URL_UNRESERVED.as_bytes().contains(&b)) {
        return Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || URL_UNRESERVED.as_bytes().contains(&b) {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    Owned(out)
}

fn escape_display(s: &str) -> Cow<str> {
    if !s.chars().any(|c| (c as u32) < 0x20 && c != '\t') {
        return Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if (c as u32) < 0x20 && c != '\t' {
            let _ = write!(out, "^{}", (c as u8 + 0x40) as char);
        } else {
            out.push(c);
        }
    }
    Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_quoting_needed() {
        for s in ["a", "z", "_", "!%+,-./:@", "foo123"] {
            assert_eq!(escape(s, QuoteStyle::ShellSafe), Borrowed(s));
        }
    }

    #[test]
    fn empty_string_is_single_quoted() {
        assert_eq!(escape("", QuoteStyle::ShellSafe), Owned::<str>("''".to_owned()));
    }

    #[test]
    fn simple_special_chars_are_single_quoted() {
        for c in ";&|()<>^ \t$\\\"'*?{}~#".chars() {
            let input = c.to_string();
            assert_eq!(escape(&input, QuoteStyle::ShellSafe), Owned::<str>(format!("'{input}'")));
        }
    }

    #[test]
    fn embedded_single_quote_is_escaped_in_place() {
        assert_eq!(escape("it's", QuoteStyle::ShellSafe), Owned::<str>("'it\\'s'".to_owned()));
    }

    #[test]
    fn control_bytes_force_unquoted_backslash_escaping() {
        assert_eq!(escape("a\x01b", QuoteStyle::ShellSafe), Owned::<str>("a\\x01b".to_owned()));
    }

    #[test]
    fn url_safe_percent_encodes_reserved_bytes() {
        assert_eq!(escape("a b/c", QuoteStyle::UrlSafe), Owned::<str>("a%20b%2Fc".to_owned()));
        assert_eq!(escape("abc-._~", QuoteStyle::UrlSafe), Borrowed("abc-._~"));
    }

    #[test]
    fn display_renders_control_bytes_as_caret_notation() {
        assert_eq!(escape("a\x01b", QuoteStyle::Display), Owned::<str>("a^Ab".to_owned()));
        assert_eq!(escape("tab\there", QuoteStyle::Display), Borrowed("tab\there"));
    }
}
