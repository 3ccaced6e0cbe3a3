//! Completion and highlighting engine (spec component E).
//!
//! Given `(source, cursor)`, [`highlight`] produces a per-character color
//! span and the functions in [`complete`] produce ranked [`Completion`]s,
//! using a [`CompletionRuleSet`] populated directly or through the
//! [`Autoloader`].

pub mod autoload;
pub mod complete;
pub mod highlight;
pub mod insert;
pub mod rules;

pub use autoload::Autoloader;
pub use complete::{complete_argument, complete_command, complete_user, complete_variable, CompletionEnvironment};
pub use highlight::{highlight, Color, Modifier};
pub use insert::insert_completion;
pub use rules::{CompletionOption, CompletionRule, CompletionRuleSet, OldMode, ResultMode};

use bitflags::bitflags;
use std::time::Duration;

bitflags! {
    /// Flags on a single [`Completion`], resolved at construction.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct CompletionFlags: u8 {
        const NO_SPACE = 1 << 0;
        const NO_CASE_MATCH = 1 << 1;
        const REPLACES_TOKEN = 1 << 2;
        const DONT_ESCAPE = 1 << 3;
    }
}

/// A single proposed completion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Completion {
    pub text: String,
    pub description: String,
    pub flags: CompletionFlags,
}

impl Completion {
    /// Builds a completion, resolving `AutoSpace`: text ending in one of
    /// `/=@:` gets `NoSpace` set automatically (spec §3, `Completion`).
    pub fn new(text: impl Into<String>, description: impl Into<String>, mut flags: CompletionFlags) -> Self {
        let text = text.into();
        if text.ends_with(['/', '=', '@', ':']) {
            flags |= CompletionFlags::NO_SPACE;
        }
        Completion { text, description: description.into(), flags }
    }
}

/// Options narrowing what [`complete`] computes, mirroring the spec's
/// completion-generation flags (`ExecutablesOnly`, `NoDescriptions`, ...).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CompleteOptions {
    pub no_descriptions: bool,
}

/// Wall-clock budget for user-name (`~foo`) completion enumeration, per
/// spec §4.E ("a hard wall-clock budget (e.g. 200 ms)").
pub const USER_COMPLETION_BUDGET: Duration = Duration::from_millis(200);
