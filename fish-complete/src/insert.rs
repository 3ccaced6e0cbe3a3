//! Completion insertion: turns a chosen [`Completion`] plus the current
//! command line and cursor position into a new command line and cursor
//! (spec §4.E "Completion insertion").

use crate::{Completion, CompletionFlags};
use fish_quote::{escape, QuoteStyle};

/// The span of the token under the cursor that a non-`ReplacesToken`
/// completion appends after, and a `ReplacesToken` completion replaces.
#[derive(Clone, Copy, Debug)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
    /// The quote character the token is written inside, if any.
    pub quote: Option<char>,
}

/// Computes the new command line and cursor position after inserting
/// `completion` into `line` at `token`.
pub fn insert_completion(line: &str, token: TokenSpan, completion: &Completion) -> (String, usize) {
    let (replace_start, replace_end) = if completion.flags.contains(CompletionFlags::REPLACES_TOKEN) {
        (token.start, token.end)
    } else {
        (token.end, token.end)
    };

    let mut inserted = if completion.flags.contains(CompletionFlags::DONT_ESCAPE) {
        completion.text.clone()
    } else {
        match token.quote {
            None => escape(&completion.text, QuoteStyle::ShellSafe).into_owned(),
            Some(_) => completion.text.replace('\\', "\\\\"),
        }
    };

    let needs_closing_quote = token.quote.is_some() && !line[replace_end..].starts_with(token.quote.unwrap());
    if needs_closing_quote {
        inserted.push(token.quote.unwrap());
    }

    if !completion.flags.contains(CompletionFlags::NO_SPACE) && replace_end == line.len() {
        inserted.push(' ');
    }

    let mut result = String::with_capacity(line.len() + inserted.len());
    result.push_str(&line[..replace_start]);
    result.push_str(&inserted);
    let cursor = result.len();
    result.push_str(&line[replace_end..]);
    (result, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(text: &str, flags: CompletionFlags) -> Completion {
        Completion::new(text, "", flags)
    }

    #[test]
    fn appends_at_end_of_token_with_trailing_space() {
        let token = TokenSpan { start: 0, end: 2, quote: None };
        let (line, cursor) = insert_completion("ls", token, &completion("-l", CompletionFlags::empty()));
        assert_eq!(line, "ls-l ");
        assert_eq!(cursor, 4);
    }

    #[test]
    fn no_space_flag_suppresses_trailing_space() {
        let token = TokenSpan { start: 0, end: 2, quote: None };
        let (line, _) = insert_completion("cd", token, &completion("foo/", CompletionFlags::empty()));
        assert_eq!(line, "cdfoo/");
    }

    #[test]
    fn replaces_token_replaces_full_span() {
        let token = TokenSpan { start: 3, end: 6, quote: None };
        let (line, _) = insert_completion("ls fo bar", token, &completion("foo", CompletionFlags::REPLACES_TOKEN));
        assert_eq!(line, "ls foo bar");
    }

    #[test]
    fn unquoted_insertion_escapes_special_characters() {
        let token = TokenSpan { start: 0, end: 0, quote: None };
        let (line, _) = insert_completion("", token, &completion("a b", CompletionFlags::empty()));
        assert_eq!(line, "'a b' ");
    }

    #[test]
    fn quoted_token_gets_closing_quote_appended() {
        let token = TokenSpan { start: 0, end: 4, quote: Some('\'') };
        let (line, _) = insert_completion("'foo", token, &completion("foo", CompletionFlags::empty()));
        assert_eq!(line, "'foo' ");
    }
}
