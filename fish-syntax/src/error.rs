//! Syntax error taxonomy shared by the tokenizer and the parser.

use std::fmt;

/// Stable identifiers for the kinds of syntax error the tokenizer and
/// parser can report. Kept as a flat enum (rather than per-stage enums)
/// because the executor and the highlighter both need to switch on these
/// without caring which stage produced them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorCode {
    TokenizerUnterminatedQuote,
    TokenizerUnterminatedSubshell,
    TokenizerUnterminatedEscape,
    UnexpectedToken,
    UnbalancingEnd,
    UnbalancingElse,
    UnbalancingCase,
    DoublePipe,
    DoubleBackground,
    GenericSyntax,
}

impl ErrorCode {
    /// A short human-readable label, independent of the offending text.
    pub fn label(self) -> &'static str {
        use ErrorCode::*;
        match self {
            TokenizerUnterminatedQuote => "unterminated quote",
            TokenizerUnterminatedSubshell => "unterminated subshell",
            TokenizerUnterminatedEscape => "unterminated escape",
            UnexpectedToken => "unexpected token",
            UnbalancingEnd => "'end' without a block to close",
            UnbalancingElse => "'else' without a matching 'if'",
            UnbalancingCase => "'case' outside a 'switch' block",
            DoublePipe => "unexpected '|'",
            DoubleBackground => "unexpected '&'",
            GenericSyntax => "syntax error",
        }
    }
}

/// A single parse error with the byte span of the source it blames.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    pub code: ErrorCode,
    pub text: String,
    pub source_start: usize,
    pub source_length: usize,
}

impl ParseError {
    pub fn new(code: ErrorCode, text: impl Into<String>, source_start: usize, source_length: usize) -> Self {
        ParseError { code, text: text.into(), source_start, source_length }
    }

    pub fn source_end(&self) -> usize {
        self.source_start + self.source_length
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl std::error::Error for ParseError {}
