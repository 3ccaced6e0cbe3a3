use super::{Atom, Bracket, BracketAtom, BracketItem};
use crate::{Error, PatternChar};

/// Named POSIX character classes fish's bracket expressions accept.
const CLASS_NAMES: &[&str] = &[
    "alnum", "alpha", "ascii", "blank", "cntrl", "digit", "graph", "lower", "print", "punct",
    "space", "upper", "word", "xdigit",
];

impl Atom {
    /// Parses one atom off the front of `i`, returning the atom and the
    /// remaining iterator, or `None` at end of input.
    pub(super) fn parse<I>(mut i: I) -> Result<Option<(Atom, I)>, Error>
    where
        I: Iterator<Item = PatternChar> + Clone,
    {
        let Some(pc) = i.next() else {
            return Ok(None);
        };
        match pc {
            PatternChar::Literal(c) => Ok(Some((Atom::Char(c), i))),
            PatternChar::Normal('?') => Ok(Some((Atom::AnyChar, i))),
            PatternChar::Normal('*') => Ok(Some((Atom::AnyString, i))),
            PatternChar::Normal('[') => {
                let (bracket, j) = Bracket::parse(i.clone())?;
                match bracket {
                    Some(bracket) => Ok(Some((Atom::Bracket(bracket), j))),
                    // An unterminated `[` with no matching `]` is just a
                    // literal `[`, not a parse error: fish falls back to
                    // treating it as ordinary text.
                    None => Ok(Some((Atom::Char('['), i))),
                }
            }
            PatternChar::Normal(c) => Ok(Some((Atom::Char(c), i))),
        }
    }
}

impl Bracket {
    /// Parses a bracket expression assuming the opening `[` has already
    /// been consumed from `i`. Returns `None` (with `i` unused) if no
    /// closing `]` is found, signaling the caller to treat `[` literally.
    fn parse<I>(i: I) -> Result<(Option<Bracket>, I), Error>
    where
        I: Iterator<Item = PatternChar> + Clone,
    {
        let probe = i.clone();
        let mut complement = false;
        let mut rest = i;
        let mut peek_iter = rest.clone();
        if matches!(peek_iter.next(), Some(PatternChar::Normal('!' | '^'))) {
            rest = peek_iter;
            complement = true;
        }

        let mut items = Vec::new();
        let mut first = true;
        loop {
            let mut peek = rest.clone();
            match peek.next() {
                None => return Ok((None, probe)),
                Some(PatternChar::Normal(']')) if !first => {
                    rest = peek;
                    break;
                }
                Some(PatternChar::Normal('[')) => {
                    let mut class_probe = peek.clone();
                    if matches!(class_probe.next(), Some(PatternChar::Normal(':'))) {
                        if let Some((name, after)) = parse_class_name(class_probe) {
                            items.push(BracketItem::Atom(BracketAtom::CharClass(name)));
                            rest = after;
                            first = false;
                            continue;
                        }
                    }
                    let atom = next_bracket_atom(&mut rest)?;
                    items.push(range_or_atom(&mut rest, atom)?);
                    first = false;
                }
                Some(_) => {
                    let atom = next_bracket_atom(&mut rest)?;
                    items.push(range_or_atom(&mut rest, atom)?);
                    first = false;
                }
            }
        }
        Ok((Some(Bracket { complement, items }), rest))
    }
}

fn next_bracket_atom<I>(rest: &mut I) -> Result<BracketAtom, Error>
where
    I: Iterator<Item = PatternChar> + Clone,
{
    match rest.next() {
        Some(PatternChar::Normal(c)) | Some(PatternChar::Literal(c)) => Ok(BracketAtom::Char(c)),
        None => Err(Error::UnterminatedBracket),
    }
}

fn range_or_atom<I>(rest: &mut I, atom: BracketAtom) -> Result<BracketItem, Error>
where
    I: Iterator<Item = PatternChar> + Clone,
{
    let mut peek = rest.clone();
    if matches!(peek.next(), Some(PatternChar::Normal('-'))) {
        let mut after_dash = peek.clone();
        match after_dash.next() {
            Some(PatternChar::Normal(']')) | None => Ok(BracketItem::Atom(atom)),
            _ => {
                *rest = peek;
                let end = next_bracket_atom(rest)?;
                Ok(BracketItem::Range(atom..=end))
            }
        }
    } else {
        Ok(BracketItem::Atom(atom))
    }
}

/// Parses `name:]` off an iterator already positioned just after the
/// opening `[:`. Returns `None` if it isn't a recognized class name
/// followed by `:]`, leaving the caller to fall back to a literal `[`.
fn parse_class_name<I>(mut i: I) -> Option<(String, I)>
where
    I: Iterator<Item = PatternChar> + Clone,
{
    let mut name = String::new();
    loop {
        let mut peek = i.clone();
        match peek.next() {
            Some(PatternChar::Normal(':')) => {
                let mut after = peek.clone();
                return if matches!(after.next(), Some(PatternChar::Normal(']')))
                    && CLASS_NAMES.contains(&name.as_str())
                {
                    Some((name, after))
                } else {
                    None
                };
            }
            Some(PatternChar::Normal(c)) if c.is_ascii_alphabetic() => {
                name.push(c);
                i = peek;
            }
            _ => return None,
        }
    }
}
