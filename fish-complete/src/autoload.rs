//! Autoload registry: loads `<command>.fish` completion files from a
//! search path on demand and caches them by `(file_path, mtime)`, grounded
//! on `original_source/complete.cpp`'s `completion_autoload_t`.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;

use crate::CompletionRuleSet;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LoadState {
    /// Loaded from `path` at `mtime`.
    Loaded { mtime: Option<SystemTime> },
    /// No completion file exists for this command; avoid re-`stat`ing
    /// every time it's asked for again.
    NotFound,
}

/// Parses one `.fish` completion file's `complete` invocations into rule
/// additions. Kept separate from filesystem concerns so it can be unit
/// tested without touching disk.
pub trait CompletionFileParser {
    fn parse_file(&self, command: &str, contents: &str, rules: &CompletionRuleSet);
}

/// On-disk autoload registry for per-command completion files.
///
/// Spec §4.E: "the autoload registry caches `(file_path, mtime)` to avoid
/// re-parsing; it invokes `command_removed(command)` when a file
/// disappears so stale rules are evicted." Main-thread-only per §5;
/// callers from a background worker should queue the command name and
/// drain the queue on the main thread instead of calling [`Self::load`]
/// directly.
pub struct Autoloader<P> {
    search_path: Vec<PathBuf>,
    state: Mutex<HashMap<String, LoadState>>,
    parser: P,
}

impl<P: CompletionFileParser> Autoloader<P> {
    pub fn new(search_path: Vec<PathBuf>, parser: P) -> Self {
        Autoloader { search_path, state: Mutex::new(HashMap::new()), parser }
    }

    /// Ensures `command`'s completion file (if any) has been loaded into
    /// `rules`, reloading it if its mtime has advanced since the last
    /// load. Returns whether a (re)load happened.
    pub fn load(&self, command: &str, rules: &CompletionRuleSet) -> bool {
        let path = self.search_path.iter().map(|dir| dir.join(format!("{command}.fish"))).find(|p| p.is_file());
        let mut state = self.state.lock().unwrap();
        match path {
            None => {
                let was_loaded = matches!(state.get(command), Some(LoadState::Loaded { .. }));
                if was_loaded {
                    rules.remove(command);
                }
                state.insert(command.to_owned(), LoadState::NotFound);
                false
            }
            Some(path) => {
                let mtime = fs::metadata(&path).and_then(|m| m.modified()).ok();
                if state.get(command) == Some(&LoadState::Loaded { mtime }) {
                    return false;
                }
                let Ok(contents) = fs::read_to_string(&path) else {
                    return false;
                };
                rules.remove(command);
                self.parser.parse_file(command, &contents, rules);
                state.insert(command.to_owned(), LoadState::Loaded { mtime });
                true
            }
        }
    }

    /// True if `load` has already been attempted for `command` (loaded or
    /// confirmed absent), regardless of outcome.
    pub fn has_tried_loading(&self, command: &str) -> bool {
        self.state.lock().unwrap().contains_key(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{CompletionOption, OldMode, ResultMode};
    use crate::CompletionFlags;
    use std::io::Write;

    struct FixedOptionParser;

    impl CompletionFileParser for FixedOptionParser {
        fn parse_file(&self, command: &str, _contents: &str, rules: &CompletionRuleSet) {
            rules.add(command, false, CompletionOption {
                short: Some('x'),
                long: None,
                old_mode: OldMode::NoArgs,
                result_mode: ResultMode::Shared,
                arg_pattern: None,
                description: String::new(),
                condition: None,
                flags: CompletionFlags::empty(),
            });
        }
    }

    #[test]
    fn loads_file_from_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("foo.fish");
        writeln!(fs::File::create(&file_path).unwrap(), "complete -c foo -s x").unwrap();

        let autoloader = Autoloader::new(vec![dir.path().to_owned()], FixedOptionParser);
        let rules = CompletionRuleSet::new();
        assert!(autoloader.load("foo", &rules));
        assert_eq!(rules.snapshot("foo").unwrap().options.len(), 1);
        assert!(autoloader.has_tried_loading("foo"));
    }

    #[test]
    fn missing_file_marks_not_found_without_reloading() {
        let dir = tempfile::tempdir().unwrap();
        let autoloader = Autoloader::new(vec![dir.path().to_owned()], FixedOptionParser);
        let rules = CompletionRuleSet::new();
        assert!(!autoloader.load("bar", &rules));
        assert!(autoloader.has_tried_loading("bar"));
        assert!(rules.snapshot("bar").is_none());
    }

    #[test]
    fn unchanged_mtime_skips_reparse() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("foo.fish");
        fs::write(&file_path, "complete -c foo -s x").unwrap();

        let autoloader = Autoloader::new(vec![dir.path().to_owned()], FixedOptionParser);
        let rules = CompletionRuleSet::new();
        assert!(autoloader.load("foo", &rules));
        assert!(!autoloader.load("foo", &rules));
    }

    #[test]
    fn file_removed_evicts_stale_rule() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("foo.fish");
        fs::write(&file_path, "complete -c foo -s x").unwrap();

        let autoloader = Autoloader::new(vec![dir.path().to_owned()], FixedOptionParser);
        let rules = CompletionRuleSet::new();
        assert!(autoloader.load("foo", &rules));
        fs::remove_file(&file_path).unwrap();
        autoloader.load("foo", &rules);
        assert!(rules.snapshot("foo").is_none());
    }
}
