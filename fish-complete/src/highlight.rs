//! Per-character semantic coloring (spec §4.E "Highlighting colors"),
//! grounded on `original_source/highlight.cpp`'s `highlight_spec_t`: a
//! primary color in the low bits with modifier bits or'd on top.

use bitflags::bitflags;
use fish_syntax::{Token, TokenKind, Tokenizer, TokenizerFlags};

/// Primary semantic color of a character.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Color {
    Normal = 0,
    Error,
    Command,
    StatementTerminator,
    Param,
    Comment,
    Match,
    SearchMatch,
    Operator,
    Escape,
    Quote,
    Redirection,
    Autosuggestion,
}

bitflags! {
    /// Modifier bits or'd on top of a [`Color`].
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Modifier: u32 {
        /// The character is part of a filesystem path that exists.
        const VALID_PATH = 1 << 8;
        /// The character is one of a matched pair under the cursor
        /// (quotes, `()[]{}`), rendered with a background highlight.
        const MATCH_BACKGROUND = 1 << 9;
    }
}

/// A color value: primary color in the low byte, modifiers above it —
/// spec §3: "A color value is 32-bit with primary in the low bits and
/// modifiers or'ed in."
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColorValue(u32);

impl ColorValue {
    pub fn new(primary: Color, modifier: Modifier) -> Self {
        ColorValue(primary as u32 | modifier.bits())
    }

    pub fn primary(self) -> Color {
        match self.0 & 0xff {
            0 => Color::Normal,
            1 => Color::Error,
            2 => Color::Command,
            3 => Color::StatementTerminator,
            4 => Color::Param,
            5 => Color::Comment,
            6 => Color::Match,
            7 => Color::SearchMatch,
            8 => Color::Operator,
            9 => Color::Escape,
            10 => Color::Quote,
            11 => Color::Redirection,
            _ => Color::Autosuggestion,
        }
    }

    pub fn modifier(self) -> Modifier {
        Modifier::from_bits_truncate(self.0 & !0xff)
    }

    pub fn with_modifier(self, modifier: Modifier) -> Self {
        ColorValue(self.0 | modifier.bits())
    }
}

/// Checks whether `command` is runnable: one of the exempt builtin-ish
/// names, found by a path lookup, or found by an explicit command lookup.
/// Kept generic over the lookup so this crate stays free of a `fish-env`
/// dependency; `fish-cli` supplies the real lookup at the top level.
pub trait CommandValidity {
    fn is_valid_command(&self, name: &str) -> bool;
}

/// Colors every byte of `source` that the cursor-free highlighting pass
/// (spec §4.E) governs: tokenization-driven classification of commands,
/// operators, redirections, comments, and quoted/escaped argument text.
/// `cursor` selects the matched-pair/bracket highlighting; pass `None`
/// when no cursor position applies (e.g. non-interactive use).
pub fn highlight(source: &str, cursor: Option<usize>, commands: &dyn CommandValidity) -> Vec<ColorValue> {
    let mut colors = vec![ColorValue::new(Color::Normal, Modifier::empty()); source.len()];
    let mut tokenizer = Tokenizer::new(source, TokenizerFlags::ACCEPT_UNFINISHED | TokenizerFlags::SHOW_COMMENTS);
    let mut expect_command = true;
    while let Some(token) = tokenizer.next() {
        color_token(source, &token, expect_command, commands, &mut colors);
        expect_command = matches!(token.kind, TokenKind::Pipe | TokenKind::End | TokenKind::Background);
    }
    if let Some(cursor) = cursor {
        highlight_matched_pair(source, cursor, &mut colors);
    }
    colors
}

fn color_token(source: &str, token: &Token, expect_command: bool, commands: &dyn CommandValidity, colors: &mut [ColorValue]) {
    let range = token.source_start..token.source_end();
    let primary = match token.kind {
        TokenKind::Pipe | TokenKind::Background => Color::Operator,
        TokenKind::End => Color::StatementTerminator,
        TokenKind::RedirectOut
        | TokenKind::RedirectAppend
        | TokenKind::RedirectIn
        | TokenKind::RedirectFd
        | TokenKind::RedirectNoClobber => Color::Redirection,
        TokenKind::Comment => Color::Comment,
        TokenKind::Error => Color::Error,
        TokenKind::String if expect_command => {
            let text = token.text(source);
            if commands.is_valid_command(text) {
                Color::Command
            } else {
                Color::Error
            }
        }
        TokenKind::String => Color::Param,
    };
    let base = ColorValue::new(primary, Modifier::empty());
    for slot in &mut colors[range] {
        *slot = base;
    }
    if token.kind == TokenKind::String {
        color_quotes_and_escapes(source, token, colors);
    }
}

/// Within a `String` token, colors quote characters [`Color::Quote`] and
/// `\`-escapes [`Color::Escape`], overriding the token's base color for
/// just those bytes (`highlight.cpp`'s `color_argument_internal`).
fn color_quotes_and_escapes(source: &str, token: &Token, colors: &mut [ColorValue]) {
    let text = token.text(source);
    let mut offset = token.source_start;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => colors[offset] = ColorValue::new(Color::Quote, Modifier::empty()),
            '\\' => {
                colors[offset] = ColorValue::new(Color::Escape, Modifier::empty());
                if let Some(next) = chars.next() {
                    let next_start = offset + c.len_utf8();
                    colors[next_start] = ColorValue::new(Color::Escape, Modifier::empty());
                    offset += c.len_utf8() + next.len_utf8();
                    continue;
                }
            }
            _ => {}
        }
        offset += c.len_utf8();
    }
}

/// Finds the matching opposite bracket/quote for the character at
/// `cursor`, if any, and marks both with [`Modifier::MATCH_BACKGROUND`];
/// marks an unmatched quote at the cursor as [`Color::Error`].
fn highlight_matched_pair(source: &str, cursor: usize, colors: &mut [ColorValue]) {
    let Some(c) = source[cursor..].chars().next() else { return };
    let (open, close, forward) = match c {
        '(' => ('(', ')', true),
        ')' => ('(', ')', false),
        '[' => ('[', ']', true),
        ']' => ('[', ']', false),
        '{' => ('{', '}', true),
        '}' => ('{', '}', false),
        '\'' | '"' => {
            mark_quote_pair(source, cursor, c, colors);
            return;
        }
        _ => return,
    };
    if let Some(pos) = find_matching_bracket(source, cursor, open, close, forward) {
        colors[cursor] = colors[cursor].with_modifier(Modifier::MATCH_BACKGROUND);
        colors[pos] = colors[pos].with_modifier(Modifier::MATCH_BACKGROUND);
    } else {
        colors[cursor] = ColorValue::new(Color::Error, Modifier::empty());
    }
}

fn find_matching_bracket(source: &str, cursor: usize, open: char, close: char, forward: bool) -> Option<usize> {
    let mut depth = 0i32;
    if forward {
        for (i, c) in source.char_indices().skip(cursor) {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
    } else {
        for (i, c) in source.char_indices().take(cursor + 1).collect::<Vec<_>>().into_iter().rev() {
            if c == close {
                depth += 1;
            } else if c == open {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
    }
    None
}

fn mark_quote_pair(source: &str, cursor: usize, quote: char, colors: &mut [ColorValue]) {
    let rest = &source[cursor + quote.len_utf8()..];
    match rest.find(quote) {
        Some(offset) => {
            let pos = cursor + quote.len_utf8() + offset;
            colors[cursor] = colors[cursor].with_modifier(Modifier::MATCH_BACKGROUND);
            colors[pos] = colors[pos].with_modifier(Modifier::MATCH_BACKGROUND);
        }
        None => colors[cursor] = ColorValue::new(Color::Error, Modifier::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AllCommandsValid;
    impl CommandValidity for AllCommandsValid {
        fn is_valid_command(&self, _name: &str) -> bool {
            true
        }
    }
    struct NoCommandsValid;
    impl CommandValidity for NoCommandsValid {
        fn is_valid_command(&self, _name: &str) -> bool {
            false
        }
    }

    #[test]
    fn first_token_colored_as_command_when_valid() {
        let colors = highlight("ls -l", None, &AllCommandsValid);
        assert_eq!(colors[0].primary(), Color::Command);
    }

    #[test]
    fn unknown_command_is_error() {
        let colors = highlight("nosuchcmd", None, &NoCommandsValid);
        assert_eq!(colors[0].primary(), Color::Error);
    }

    #[test]
    fn argument_after_command_is_param() {
        let colors = highlight("ls -l", None, &AllCommandsValid);
        assert_eq!(colors[3].primary(), Color::Param);
    }

    #[test]
    fn pipe_is_operator_and_resets_command_expectation() {
        let colors = highlight("a | b", None, &AllCommandsValid);
        assert_eq!(colors[2].primary(), Color::Operator);
        assert_eq!(colors[4].primary(), Color::Command);
    }

    #[test]
    fn matched_parens_get_background_modifier() {
        let colors = highlight("echo (pwd)", Some(5), &AllCommandsValid);
        assert!(colors[5].modifier().contains(Modifier::MATCH_BACKGROUND));
        assert!(colors[9].modifier().contains(Modifier::MATCH_BACKGROUND));
    }
}
