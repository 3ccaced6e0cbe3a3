//! Lexical analysis: turns a source string into a stream of [`Token`]s.
//!
//! The tokenizer never decodes escape sequences or expands anything; it
//! only determines token boundaries and validates that quoting, command
//! substitution nesting, and escape *shapes* are well formed. Decoding
//! happens later, in the expander's unescape step.

use crate::token::{Token, TokenErrorKind, TokenKind};
use bitflags::bitflags;

bitflags! {
    /// Behavior switches for [`Tokenizer`], mirroring the reference
    /// tokenizer's `TOK_ACCEPT_UNFINISHED` / `TOK_SHOW_COMMENTS` flags.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct TokenizerFlags: u8 {
        /// Do not error on unterminated quotes/subshells; emit a partial
        /// token instead. Used for completion and highlighting, where the
        /// cursor sits in the middle of an incomplete construct.
        const ACCEPT_UNFINISHED = 1 << 0;
        /// Emit `Comment` tokens instead of silently discarding `#...` text.
        const SHOW_COMMENTS = 1 << 1;
        /// Treat `Error` tokens as `End` for resilience: keep tokenizing
        /// after a hard error rather than stopping the stream.
        const SQUASH_ERRORS = 1 << 2;
    }
}

fn is_blank(c: char) -> bool {
    c != '\n' && c.is_whitespace()
}

fn is_word_boundary(c: char) -> bool {
    matches!(c, ';' | '\n' | '|' | '&' | '<' | '>' | '^' | '#') || is_blank(c)
}

/// Lexical analyzer over a borrowed source string.
///
/// `next` is called repeatedly to drain the token stream; `None` means the
/// stream is exhausted (either genuine end of input, or a hard error with
/// `ACCEPT_UNFINISHED`/`SQUASH_ERRORS` both unset).
#[derive(Debug)]
pub struct Tokenizer<'s> {
    source: &'s str,
    position: usize,
    flags: TokenizerFlags,
    last_quote: Option<char>,
    last_error: Option<TokenErrorKind>,
    terminated: bool,
}

impl<'s> Tokenizer<'s> {
    pub fn new(source: &'s str, flags: TokenizerFlags) -> Self {
        Tokenizer { source, position: 0, flags, last_quote: None, last_error: None, terminated: false }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn last_quote(&self) -> Option<char> {
        self.last_quote
    }

    pub fn last_error(&self) -> Option<TokenErrorKind> {
        self.last_error
    }

    /// Returns the 1-based line number containing byte offset `offset`.
    pub fn line_number_of_offset(&self, offset: usize) -> usize {
        1 + self.source[..offset.min(self.source.len())].matches('\n').count()
    }

    fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.source[pos..].chars().next()
    }

    fn skip_blanks(&mut self) {
        while let Some(c) = self.peek() {
            if is_blank(c) {
                self.position += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Produces the next token, or `None` at end of stream.
    pub fn next(&mut self) -> Option<Token> {
        if self.terminated {
            return None;
        }
        loop {
            self.skip_blanks();
            let Some(c) = self.peek() else { return None };
            if c == '#' {
                let start = self.position;
                let mut end = start;
                while let Some(ch) = self.char_at(end) {
                    if ch == '\n' {
                        break;
                    }
                    end += ch.len_utf8();
                }
                self.position = end;
                if self.flags.contains(TokenizerFlags::SHOW_COMMENTS) {
                    return Some(Token {
                        kind: TokenKind::Comment,
                        source_start: start,
                        source_length: end - start,
                        quote_char: None,
                        fd: None,
                        error_kind: None,
                    });
                }
                continue;
            }
            break;
        }

        let c = self.peek().expect("checked above");

        if c == '\n' || c == ';' {
            let start = self.position;
            self.position += c.len_utf8();
            return Some(self.simple_token(TokenKind::End, start, None));
        }

        // Digit-prefixed fd, e.g. `2>file` or `2|cmd`.
        let start = self.position;
        let mut digit_end = start;
        while let Some(ch) = self.char_at(digit_end) {
            if ch.is_ascii_digit() {
                digit_end += 1;
            } else {
                break;
            }
        }
        if digit_end > start {
            if let Some(op) = self.char_at(digit_end) {
                if matches!(op, '|' | '<' | '>' | '^') {
                    let fd: i32 = self.source[start..digit_end].parse().unwrap_or(i32::MAX);
                    self.position = digit_end;
                    return self.lex_operator(start, Some(fd));
                }
            }
            // Not an operator prefix; fall through to ordinary word scan
            // starting at `start` (position unchanged).
        } else if matches!(c, '|' | '<' | '>' | '^' | '&') {
            return self.lex_operator(start, None);
        }

        self.lex_word(start)
    }

    fn simple_token(&self, kind: TokenKind, start: usize, error_kind: Option<TokenErrorKind>) -> Token {
        Token { kind, source_start: start, source_length: self.position - start, quote_char: None, fd: None, error_kind }
    }

    fn lex_operator(&mut self, start: usize, fd: Option<i32>) -> Option<Token> {
        let op_start = self.position;
        let c = self.peek().unwrap();
        self.position += c.len_utf8();
        let kind = match c {
            '|' => TokenKind::Pipe,
            '&' => TokenKind::Background,
            '<' => TokenKind::RedirectIn,
            '^' => {
                if self.peek() == Some('^') {
                    self.position += 1;
                    TokenKind::RedirectAppend
                } else {
                    TokenKind::RedirectOut
                }
            }
            '>' => match self.peek() {
                Some('>') => {
                    self.position += 1;
                    TokenKind::RedirectAppend
                }
                Some('|') => {
                    self.position += 1;
                    TokenKind::RedirectOut
                }
                Some('?') => {
                    self.position += 1;
                    TokenKind::RedirectNoClobber
                }
                Some('&') => {
                    self.position += 1;
                    TokenKind::RedirectFd
                }
                _ => TokenKind::RedirectOut,
            },
            _ => unreachable!("lex_operator called on non-operator char"),
        };
        let default_fd = fd.unwrap_or(match kind {
            TokenKind::RedirectIn => 0,
            TokenKind::RedirectOut | TokenKind::RedirectAppend | TokenKind::RedirectFd | TokenKind::RedirectNoClobber => {
                if c == '^' {
                    2
                } else {
                    1
                }
            }
            _ => return Some(Token {
                kind,
                source_start: start,
                source_length: self.position - start,
                quote_char: None,
                fd: None,
                error_kind: None,
            }),
        });
        let _ = op_start;
        Some(Token {
            kind,
            source_start: start,
            source_length: self.position - start,
            quote_char: None,
            fd: Some(default_fd),
            error_kind: None,
        })
    }

    fn lex_word(&mut self, start: usize) -> Option<Token> {
        let mut pos = start;
        let mut paren_depth: u32 = 0;
        let mut in_single = false;
        let mut in_double = false;
        let mut quote_char: Option<char> = None;
        let bytes = self.source;

        let mut error: Option<TokenErrorKind> = None;

        'scan: loop {
            let Some(c) = bytes[pos..].chars().next() else {
                if in_single || in_double {
                    error = Some(TokenErrorKind::UnterminatedQuote);
                } else if paren_depth > 0 {
                    error = Some(TokenErrorKind::UnterminatedSubshell);
                }
                break 'scan;
            };

            if in_single {
                if c == '\\' {
                    match bytes[pos + 1..].chars().next() {
                        Some(n) if n == '\\' || n == '\'' => pos += 1 + n.len_utf8(),
                        _ => pos += 1,
                    }
                } else if c == '\'' {
                    in_single = false;
                    pos += 1;
                } else {
                    pos += c.len_utf8();
                }
                continue;
            }

            if in_double {
                if c == '\\' {
                    match bytes[pos + 1..].chars().next() {
                        Some(n) => pos += 1 + n.len_utf8(),
                        None => {
                            error = Some(TokenErrorKind::UnterminatedEscape);
                            break 'scan;
                        }
                    }
                } else if c == '"' {
                    in_double = false;
                    pos += 1;
                } else {
                    pos += c.len_utf8();
                }
                continue;
            }

            if paren_depth > 0 {
                match c {
                    '\'' => in_single = true,
                    '"' => in_double = true,
                    '(' => paren_depth += 1,
                    ')' => paren_depth -= 1,
                    _ => {}
                }
                pos += c.len_utf8();
                continue;
            }

            // Top level: not inside quotes or a substitution.
            match c {
                '\'' => {
                    in_single = true;
                    quote_char.get_or_insert('\'');
                    pos += 1;
                }
                '"' => {
                    in_double = true;
                    quote_char.get_or_insert('"');
                    pos += 1;
                }
                '(' => {
                    paren_depth += 1;
                    pos += 1;
                }
                '\\' => {
                    let (end, outcome) = scan_escape_shape(bytes, pos);
                    match outcome {
                        Ok(()) => pos = end,
                        // Running out of input mid-escape is an "unfinished"
                        // condition like an open quote: honor ACCEPT_UNFINISHED.
                        Err(TokenErrorKind::UnterminatedEscape) => {
                            pos = end;
                            error = Some(TokenErrorKind::UnterminatedEscape);
                            break 'scan;
                        }
                        // An out-of-range escape *value* is a hard shape
                        // error regardless of ACCEPT_UNFINISHED: more input
                        // would not fix it.
                        Err(kind) => {
                            self.position = end;
                            self.last_quote = quote_char;
                            self.last_error = Some(kind);
                            if !self.flags.contains(TokenizerFlags::SQUASH_ERRORS) {
                                self.terminated = true;
                            }
                            return Some(Token {
                                kind: TokenKind::Error,
                                source_start: start,
                                source_length: end - start,
                                quote_char,
                                fd: None,
                                error_kind: Some(kind),
                            });
                        }
                    }
                }
                _ if is_word_boundary(c) => break 'scan,
                _ => pos += c.len_utf8(),
            }
        }

        self.position = pos;
        self.last_quote = quote_char;
        self.last_error = error;

        match error {
            None => Some(Token {
                kind: TokenKind::String,
                source_start: start,
                source_length: pos - start,
                quote_char,
                fd: None,
                error_kind: None,
            }),
            Some(kind) if self.flags.contains(TokenizerFlags::ACCEPT_UNFINISHED) => Some(Token {
                kind: TokenKind::String,
                source_start: start,
                source_length: pos - start,
                quote_char,
                fd: None,
                error_kind: Some(kind),
            }),
            Some(kind) => {
                if !self.flags.contains(TokenizerFlags::SQUASH_ERRORS) {
                    self.terminated = true;
                }
                Some(Token {
                    kind: TokenKind::Error,
                    source_start: start,
                    source_length: pos - start,
                    quote_char,
                    fd: None,
                    error_kind: Some(kind),
                })
            }
        }
    }
}

/// Validates the shape of an escape sequence starting at the backslash at
/// `pos`. Always returns the position just past the sequence (best effort
/// even on error, so the caller can still report a precise span); the
/// `Result` says whether the shape was valid. Does not decode the value.
fn scan_escape_shape(s: &str, pos: usize) -> (usize, Result<(), TokenErrorKind>) {
    debug_assert_eq!(s[pos..].chars().next(), Some('\\'));
    let Some(first) = s[pos + 1..].chars().next() else {
        return (s.len(), Err(TokenErrorKind::UnterminatedEscape));
    };

    let hex_run = |s: &str, max_digits: usize| -> (usize, u32) {
        let mut n = 0usize;
        let mut value: u32 = 0;
        for c in s.chars() {
            if n >= max_digits || !c.is_ascii_hexdigit() {
                break;
            }
            value = value * 16 + c.to_digit(16).unwrap();
            n += c.len_utf8();
        }
        (n, value)
    };
    let oct_run = |s: &str, max_digits: usize| -> (usize, u32) {
        let mut n = 0usize;
        let mut value: u32 = 0;
        for c in s.chars() {
            if n >= max_digits || !('0'..='7').contains(&c) {
                break;
            }
            value = value * 8 + c.to_digit(8).unwrap();
            n += 1;
        }
        (n, value)
    };

    match first {
        'x' | 'X' => {
            let (n, value) = hex_run(&s[pos + 2..], 2);
            let end = pos + 2 + n;
            if n == 0 {
                (end, Err(TokenErrorKind::UnterminatedEscape))
            } else if value > 0xFF {
                (end, Err(TokenErrorKind::InvalidEscapeValue))
            } else {
                (end, Ok(()))
            }
        }
        'u' => {
            let (n, value) = hex_run(&s[pos + 2..], 4);
            let end = pos + 2 + n;
            if n == 0 {
                (end, Err(TokenErrorKind::UnterminatedEscape))
            } else if value > 0xFFFF {
                (end, Err(TokenErrorKind::InvalidEscapeValue))
            } else {
                (end, Ok(()))
            }
        }
        'U' => {
            let (n, value) = hex_run(&s[pos + 2..], 8);
            let end = pos + 2 + n;
            if n == 0 {
                (end, Err(TokenErrorKind::UnterminatedEscape))
            } else if value > 0x0010_FFFF {
                (end, Err(TokenErrorKind::InvalidEscapeValue))
            } else {
                (end, Ok(()))
            }
        }
        '0' => {
            let (n, value) = oct_run(&s[pos + 2..], 3);
            let end = pos + 2 + n;
            if value > 0xFF {
                (end, Err(TokenErrorKind::InvalidEscapeValue))
            } else {
                (end, Ok(()))
            }
        }
        'c' => match s[pos + 2..].chars().next() {
            Some(ch) => (pos + 2 + ch.len_utf8(), Ok(())),
            None => (s.len(), Err(TokenErrorKind::UnterminatedEscape)),
        },
        other => (pos + 1 + other.len_utf8(), Ok(())),
    }
}
