//! Compiles a pattern [`Ast`] into a `regex`-crate source string.

use super::{Ast, Atom, Bracket, BracketAtom, BracketItem};
use crate::{CaseSensitivity, Config};
use std::fmt::Write;

impl Ast {
    /// Renders this AST as an anchored `regex` source string matching the
    /// same strings the pattern would, given `config`.
    pub(crate) fn to_regex(&self, config: &Config) -> String {
        let mut out = String::new();
        if config.case_sensitivity == CaseSensitivity::Insensitive {
            out.push_str("(?i)");
        }
        out.push('^');
        for atom in &self.atoms {
            atom.write_regex(&mut out);
        }
        out.push('$');
        out
    }
}

impl Atom {
    fn write_regex(&self, out: &mut String) {
        match self {
            Atom::Char(c) => write_escaped_char(out, *c),
            Atom::AnyChar => out.push_str("[^/]"),
            Atom::AnyString => out.push_str("[^/]*"),
            Atom::AnyStringRecursive => out.push_str(".*"),
            Atom::Bracket(b) => b.write_regex(out),
        }
    }
}

impl Bracket {
    fn write_regex(&self, out: &mut String) {
        out.push('[');
        if self.complement {
            out.push('^');
        }
        for item in &self.items {
            match item {
                BracketItem::Atom(BracketAtom::Char(c)) => write_escaped_bracket_char(out, *c),
                BracketItem::Atom(BracketAtom::CharClass(name)) => {
                    let _ = write!(out, "[:{name}:]");
                }
                BracketItem::Range(range) => {
                    let (BracketAtom::Char(start), BracketAtom::Char(end)) =
                        (range.start(), range.end())
                    else {
                        continue;
                    };
                    write_escaped_bracket_char(out, *start);
                    out.push('-');
                    write_escaped_bracket_char(out, *end);
                }
            }
        }
        out.push(']');
    }
}

fn write_escaped_char(out: &mut String, c: char) {
    if regex_meta(c) {
        out.push('\\');
    }
    out.push(c);
}

fn write_escaped_bracket_char(out: &mut String, c: char) {
    if matches!(c, '^' | ']' | '\\' | '-' | '[') {
        out.push('\\');
    }
    out.push(c);
}

fn regex_meta(c: char) -> bool {
    matches!(
        c,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
    )
}
