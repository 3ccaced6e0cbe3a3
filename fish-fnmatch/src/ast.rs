//! Abstract syntax tree for globbing patterns used by wildcard expansion
//! (spec §4.C step 5) and `switch`/`case` matching (§4.D).

mod parse;
mod regex;

use crate::Error;
use crate::PatternChar;
use std::ops::RangeInclusive;

/// Bracket expression component.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketAtom {
    /// Literal character.
    Char(char),
    /// Named character class (`[:alpha:]`).
    CharClass(String),
}

impl From<char> for BracketAtom {
    fn from(c: char) -> Self {
        BracketAtom::Char(c)
    }
}

/// Bracket expression component: either a single atom or a range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketItem {
    Atom(BracketAtom),
    Range(RangeInclusive<BracketAtom>),
}

impl<T: Into<BracketAtom>> From<T> for BracketItem {
    fn from(value: T) -> Self {
        BracketItem::Atom(value.into())
    }
}
impl From<RangeInclusive<BracketAtom>> for BracketItem {
    fn from(range: RangeInclusive<BracketAtom>) -> Self {
        BracketItem::Range(range)
    }
}

/// Bracket expression (`[...]`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bracket {
    /// Whether the expression starts with `!` or `^`, inverting the match.
    pub complement: bool,
    pub items: Vec<BracketItem>,
}

/// Pattern component.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Atom {
    /// Literal character.
    Char(char),
    /// `?`: matches any single character except a path separator.
    AnyChar,
    /// `*`: matches any run of characters, but never crosses a `/`.
    AnyString,
    /// `**`: matches any run of characters, crossing `/` freely.
    AnyStringRecursive,
    /// Bracket expression.
    Bracket(Bracket),
}

/// Abstract syntax tree for a whole pattern.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ast {
    pub atoms: Vec<Atom>,
}

impl Ast {
    /// Parses a pattern into its AST.
    #[inline]
    pub fn new<I>(pattern: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        let mut atoms = Vec::new();
        let mut i = pattern.into_iter();
        while let Some((atom, j)) = Atom::parse(i)? {
            // Two consecutive `*` atoms collapse into one recursive wildcard,
            // matching fish's `**` rather than two independent single-segment
            // wildcards.
            if atom == Atom::AnyString && atoms.last() == Some(&Atom::AnyString) {
                *atoms.last_mut().unwrap() = Atom::AnyStringRecursive;
            } else {
                atoms.push(atom);
            }
            i = j;
        }
        Ok(Ast { atoms })
    }

    /// True if the pattern contains any wildcard construct (`?`, `*`, `**`,
    /// or a bracket expression). Spec §4.C step 5: a field with none of
    /// these is returned unchanged rather than passed through matching.
    pub fn has_wildcard(&self) -> bool {
        self.atoms.iter().any(|a| !matches!(a, Atom::Char(_)))
    }
}
