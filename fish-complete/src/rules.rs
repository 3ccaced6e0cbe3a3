//! `CompletionRule`/`CompletionRuleSet`: the two-lock completion registry
//! described in spec §3 and §4.E, grounded on `original_source/complete.cpp`'s
//! `completion_lock`/`completion_entry_lock` pair (`completion_lock` must be
//! taken first whenever both are needed).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Whether an option takes no argument, an optional argument, or a
/// required argument (`complete.cpp`'s `option_type_t`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OldMode {
    NoArgs,
    OptionalArgument,
    RequiredArgument,
}

/// How an option's presence affects which other completions may apply
/// alongside it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResultMode {
    Shared,
    NoFiles,
    NoCommon,
    Exclusive,
}

/// One `complete` invocation's worth of option description.
#[derive(Clone, Debug)]
pub struct CompletionOption {
    pub short: Option<char>,
    pub long: Option<String>,
    pub old_mode: OldMode,
    pub result_mode: ResultMode,
    pub arg_pattern: Option<String>,
    pub description: String,
    /// Shell snippet; success gates whether this option is offered. Not
    /// evaluated by this crate directly (that needs `fish-semantics`'s
    /// executor) — callers supply the evaluated result.
    pub condition: Option<String>,
    pub flags: crate::CompletionFlags,
}

impl CompletionOption {
    /// True if `value` matches this option's `arg_pattern`, or if there is
    /// no pattern restriction at all.
    pub fn accepts_argument(&self, value: &str) -> bool {
        let Some(pattern) = &self.arg_pattern else {
            return true;
        };
        match fish_fnmatch::Pattern::parse(fish_fnmatch::without_escape(pattern)) {
            Ok(pattern) => pattern.is_match(value),
            Err(_) => false,
        }
    }
}

/// The completion rule for one command.
#[derive(Clone, Debug, Default)]
pub struct CompletionRule {
    pub command: String,
    /// True if `command` names a path rather than a bare command name.
    pub matches_path: bool,
    /// An authoritative rule suppresses the file-completion fallback even
    /// when no option matched.
    pub authoritative: bool,
    pub short_opt_str: String,
    pub options: Vec<CompletionOption>,
}

impl CompletionRule {
    fn new(command: String, matches_path: bool) -> Self {
        CompletionRule { command, matches_path, authoritative: false, short_opt_str: String::new(), options: Vec::new() }
    }

    fn push_option(&mut self, option: CompletionOption) {
        if let Some(c) = option.short {
            self.short_opt_str.push(c);
            if option.old_mode == OldMode::RequiredArgument {
                self.short_opt_str.push(':');
            }
        }
        self.options.push(option);
    }
}

/// Top-level set of commands for option lookup, guarding insertion/removal.
#[derive(Default)]
struct Entries {
    by_command: HashMap<String, usize>,
    rules: Vec<Mutex<CompletionRule>>,
}

/// Process-wide mapping from command name to [`CompletionRule`].
///
/// `set_lock` (guarding [`Entries::by_command`]/[`Entries::rules`]) is
/// always acquired before any individual rule's `Mutex` ("entry lock") is
/// locked; this crate never holds both beyond the span needed to clone or
/// insert a rule, and never evaluates a `condition` script while either is
/// held (spec §4.E, "Concurrency").
#[derive(Default)]
pub struct CompletionRuleSet {
    entries: Mutex<Entries>,
}

impl CompletionRuleSet {
    pub fn new() -> Self {
        CompletionRuleSet::default()
    }

    /// Adds `option` to `command`'s rule, creating it if necessary.
    pub fn add(&self, command: &str, matches_path: bool, option: CompletionOption) {
        let mut entries = self.lock_set();
        let index = self.entry_index(&mut entries, command, matches_path);
        let mut rule = entries.rules[index].lock().unwrap();
        rule.push_option(option);
    }

    /// Marks `command`'s rule authoritative (no rule options matched means
    /// no file-completion fallback).
    pub fn set_authoritative(&self, command: &str, matches_path: bool, authoritative: bool) {
        let mut entries = self.lock_set();
        let index = self.entry_index(&mut entries, command, matches_path);
        let mut rule = entries.rules[index].lock().unwrap();
        rule.authoritative = authoritative;
    }

    /// Removes every rule for `command`. Called by the autoloader when its
    /// backing file disappears.
    pub fn remove(&self, command: &str) {
        let mut entries = self.lock_set();
        if let Some(index) = entries.by_command.remove(command) {
            entries.rules[index].lock().unwrap().options.clear();
        }
    }

    /// Takes a deep-copy snapshot of `command`'s rule, releasing both
    /// locks before returning so the caller may freely evaluate
    /// `condition` scripts (which may re-enter completion).
    pub fn snapshot(&self, command: &str) -> Option<CompletionRule> {
        let entries = self.lock_set();
        let index = *entries.by_command.get(command)?;
        let rule = entries.rules[index].lock().unwrap();
        Some(rule.clone())
    }

    fn lock_set(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap()
    }

    fn entry_index(&self, entries: &mut Entries, command: &str, matches_path: bool) -> usize {
        if let Some(&index) = entries.by_command.get(command) {
            return index;
        }
        let index = entries.rules.len();
        entries.rules.push(Mutex::new(CompletionRule::new(command.to_owned(), matches_path)));
        entries.by_command.insert(command.to_owned(), index);
        index
    }
}
