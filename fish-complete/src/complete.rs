//! Completion generation (spec §4.E "Completion generation").
//!
//! Variable, user, and command completion each need a different
//! collaborator (the environment, the password database, `$PATH`); rather
//! than depend on `fish-env` directly (which would invert the crate-layout
//! table's dependency order), each is behind a small trait that `fish-cli`
//! implements against the real environment.

use crate::rules::CompletionRuleSet;
use crate::{Completion, CompletionFlags};
use std::time::Instant;

use crate::USER_COMPLETION_BUDGET;

/// Read-only view of the environment needed to generate completions.
pub trait CompletionEnvironment {
    /// Variable names and values, for `$`-prefix completion.
    fn variables(&self) -> Vec<(String, String)>;
    /// Passwd-entry user names, for `~`-prefix completion. Called
    /// incrementally; return `None` once exhausted.
    fn next_user(&mut self) -> Option<String>;
    /// Function names defined in the current session.
    fn functions(&self) -> Vec<String>;
    /// Builtin command names.
    fn builtins(&self) -> Vec<String>;
    /// `$PATH`, split into directories, in search order.
    fn path_dirs(&self) -> Vec<String>;
    /// Executable file names directly inside `dir`.
    fn executables_in(&self, dir: &str) -> Vec<String>;
}

/// Variable completion: `$`-prefixed token, prefix-matched against
/// variable names in scope.
pub fn complete_variable(env: &dyn CompletionEnvironment, prefix: &str, no_descriptions: bool) -> Vec<Completion> {
    env.variables()
        .into_iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, value)| {
            let description = if no_descriptions { String::new() } else { value };
            Completion::new(name, description, CompletionFlags::empty())
        })
        .collect()
}

/// User completion: `~`-prefixed token with no `/`, prefix-matched
/// against passwd entries under a wall-clock budget (spec §4.E).
pub fn complete_user(env: &mut dyn CompletionEnvironment, prefix: &str) -> Vec<Completion> {
    let deadline = Instant::now() + USER_COMPLETION_BUDGET;
    let mut out = Vec::new();
    while Instant::now() < deadline {
        match env.next_user() {
            Some(name) if name.starts_with(prefix) => {
                out.push(Completion::new(format!("~{name}"), "", CompletionFlags::empty()));
            }
            Some(_) => continue,
            None => break,
        }
    }
    out
}

/// Command completion: the cursor token is the first of a statement.
/// Sources: function names, builtins, and executables on `$PATH`.
pub fn complete_command(env: &dyn CompletionEnvironment, prefix: &str, exclude_private: bool) -> Vec<Completion> {
    let mut out = Vec::new();
    for name in env.functions() {
        if name.starts_with(prefix) && !(exclude_private && name.starts_with('_')) {
            out.push(Completion::new(name, "function", CompletionFlags::empty()));
        }
    }
    for name in env.builtins() {
        if name.starts_with(prefix) {
            out.push(Completion::new(name, "builtin", CompletionFlags::empty()));
        }
    }
    for dir in env.path_dirs() {
        for name in env.executables_in(&dir) {
            if name.starts_with(prefix) {
                out.push(Completion::new(name, "command", CompletionFlags::empty()));
            }
        }
    }
    out
}

/// Argument completion: the cursor token is not the first. Looks up
/// `command`'s rule and emits matching option strings; `evaluated`
/// supplies, per option index, whether its `condition` succeeded (the
/// caller evaluates conditions outside any lock, per spec §4.E).
pub fn complete_argument(rules: &CompletionRuleSet, command: &str, prefix: &str, evaluated: &dyn Fn(usize) -> bool) -> (Vec<Completion>, bool) {
    let Some(rule) = rules.snapshot(command) else {
        return (Vec::new(), false);
    };
    let mut out = Vec::new();
    for (index, option) in rule.options.iter().enumerate() {
        if option.condition.is_some() && !evaluated(index) {
            continue;
        }
        if let Some(long) = &option.long {
            let text = format!("--{long}");
            if text.starts_with(prefix) {
                out.push(Completion::new(text, option.description.clone(), option.flags));
            }
        }
        if let Some(short) = option.short {
            let text = format!("-{short}");
            if text.starts_with(prefix) {
                out.push(Completion::new(text, option.description.clone(), option.flags));
            }
        }
    }
    let allow_files = !rule.authoritative || rule.options.is_empty();
    (out, allow_files)
}
