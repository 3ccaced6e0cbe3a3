//! Standalone completion pager (spec §6), grounded on
//! `original_source/fish_pager.cpp`. Terminal rendering itself is an
//! explicit spec Non-goal collaborator; this crate covers the parsing and
//! column-layout contract a real terminal front-end would drive.

pub mod layout;
pub mod parse;

pub use layout::{choose_layout, Layout};
pub use parse::{flatten, parse_completions, CompletionGroup};

/// `fish_pager.cpp`'s `PAGER_MAX_COLS`: the greedy column search starts
/// here and works down to 1.
pub const MAX_COLUMNS: usize = 6;
