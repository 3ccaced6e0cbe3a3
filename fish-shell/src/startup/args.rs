// This file is part of yash, an extended POSIX shell.
// Copyright (C) 2023 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Command line argument parser for the shell

use std::iter::Peekable;
use thiserror::Error;
use fish_env::option::canonicalize;
use fish_env::option::parse_long;
use fish_env::option::parse_short;
use fish_env::option::FromStrError::{Ambiguous, NoSuchOption};
use fish_env::option::Option as ShellOption;
use fish_env::option::State;
#[cfg(doc)]
use fish_env::Env;

/// Input to the main read-eval loop
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Source {
    /// Read from standard input (the `-s` option)
    #[default]
    Stdin,
    /// Read from a file (no option)
    File { path: String },
    /// Read from a string (the `-c` option)
    String(String),
}

/// Option specifying an initialization file
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum InitFile {
    /// No initialization file
    None,
    /// Use the default initialization file
    #[default]
    Default,
    /// Use the specified initialization file
    File { path: String },
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
/// Configuration for starting the main read-eval loop
pub struct Run {
    /// Input source
    pub source: Source,
    /// Initialization file for a login shell
    pub profile: InitFile,
    /// Initialization file for an interactive shell
    pub rcfile: InitFile,
    /// Shell options
    pub options: Vec<(ShellOption, State)>,
    /// Value of [`Env::arg0`]
    pub arg0: String,
    /// Positional parameters
    pub positional_params: Vec<String>,
}

/// Parse result
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Parse {
    /// Runs the shell
    Run(Run),
    /// Prints help message and exit
    Help,
    /// Prints version information and exit
    Version,
}

impl From<Run> for Parse {
    fn from(run: Run) -> Self {
        Parse::Run(run)
    }
}

/// Error in command line parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Short option that is not defined in the option specs
    #[error("unknown option `{0}`")]
    UnknownShortOption(char),

    /// Long option that is not defined in the option specs
    #[error("unknown option `{0}`")]
    UnknownLongOption(String),

    /// Long option that matches the prefix of more than one option name.
    #[error("ambiguous option name `{0}`")]
    AmbiguousLongOption(String),

    /// Option missing an argument
    #[error("option `{0}` missing an argument")]
    MissingOptionArgument(String),

    /// Argument specified to an option that does not take an argument
    #[error("option `{0}` does not take an argument")]
    UnexpectedOptionArgument(String),

    /// The `-c` and `-s` options used together
    #[error("cannot specify both `-c` and `-s`")]
    ConflictingSources,

    /// Negated short option that is not a shell option
    #[error("cannot negate option `{0}`")]
    UnnegatableShortOption(char),

    /// Negated long option that is not a shell option
    #[error("cannot negate option `{0}`")]
    UnnegatableLongOption(String),

    /// The `-c` option without a command string
    #[error("missing command string for `-c`")]
    MissingCommandString,
}

/// Result of parsing short options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShortOption {
    /// One or more shell options
    Shell,
    /// The `-V` option
    Version,
}

/// Result of parsing a long option
#[derive(Clone, Debug, PartialEq, Eq)]
enum LongOption {
    Shell(ShellOption, State),
    Profile { path: String },
    NoProfile,
    Rcfile { path: String },
    NoRcfile,
    Help,
    Version,
}

/// Intermediate object for parsing a long option
#[derive(Clone, Debug, PartialEq, Eq)]
enum NonShellOptionConstructor {
    WithoutArgument(LongOption),
    WithArgument(fn(String) -> LongOption),
}

impl NonShellOptionConstructor {
    fn from_name(name: &str) -> Option<Self> {
        if "profile".starts_with(name) {
            Some(Self::WithArgument(|path| LongOption::Profile { path }))
        } else if "rcfile".starts_with(name) {
            Some(Self::WithArgument(|path| LongOption::Rcfile { path }))
        } else if "noprofile".starts_with(name) {
            Some(Self::WithoutArgument(LongOption::NoProfile))
        } else if "norcfile".starts_with(name) {
            Some(Self::WithoutArgument(LongOption::NoRcfile))
        } else if "help".starts_with(name) {
            Some(Self::WithoutArgument(LongOption::Help))
        } else if "version".starts_with(name) {
            Some(Self::WithoutArgument(LongOption::Version))
        } else {
            None
        }
    }
}

/// Parses command line arguments.
pub fn parse<I, S>(args: I) -> Result<Parse, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into).peekable();
    let mut result = Run::default();

    // Below, we use `args.next_if(|_| true)` instead of `args.next()` to avoid
    // consuming the `None` value that needs to be seen again.

    // Parse the command name
    if let Some(arg0) = args.next_if(|_| true) {
        parse_arg0(&arg0, &mut result.options);
        result.arg0 = arg0;
    }

    // Parse options
    loop {
        if let Some(option) = try_parse_short(&mut args, &mut result.options)? {
            match option {
                ShortOption::Shell => continue,
                ShortOption::Version => return Ok(Parse::Version),
            }
        }

        let Some(option) = try_parse_long(&mut args)? else { break; };
        match option {
            LongOption::Shell(option, state) => result.options.push((option, state)),
            LongOption::Profile { path } => {
                if result.profile != InitFile::None {
                    result.profile = InitFile::File { path }
                }
            }
            LongOption::NoProfile => result.profile = InitFile::None,
            LongOption::Rcfile { path } => {
                if result.rcfile != InitFile::None {
                    result.rcfile = InitFile::File { path }
                }
            }
            LongOption::NoRcfile => result.rcfile = InitFile::None,
            LongOption::Help => return Ok(Parse::Help),
            LongOption::Version => return Ok(Parse::Version),
        }
    }

    args.next_if(|arg| arg == "-" || arg == "--");

    // Parse operands
    if result.options.contains(&(ShellOption::CmdLine, State::On)) {
        if result.options.contains(&(ShellOption::Stdin, State::On)) {
            return Err(Error::ConflictingSources);
        }

        let command = args.next_if(|_| true).ok_or(Error::MissingCommandString)?;
        result.source = Source::String(command);
        if let Some(name) = args.next_if(|_| true) {
            result.arg0 = name;
        }
    } else if result.options.contains(&(ShellOption::Stdin, State::On)) {
        result.source = Source::Stdin;
    } else {
        // No -c or -s
        if let Some(operand) = args.next_if(|_| true) {
            result.arg0 = operand.clone();
            result.source = Source::File { path: operand };
        }
    }
    result.positional_params = args.collect();

    Ok(Parse::Run(result))
}

fn parse_arg0(arg0: &str, options: &mut Vec<(ShellOption, State)>) {
    if arg0.starts_with('-') {
        options.push((ShellOption::Login, State::On));
    }
    if arg0.rsplit('/').next().unwrap_or("") == "sh" {
        options.push((ShellOption::PosixlyCorrect, State::On));
    }
}

/// Parses the next argument as short options.
///
/// If the next argument is not a short option, returns `Ok(None)`.
/// If the next argument is a short option, consumes it and returns `Ok(Some(_))`.
/// The parsed options are added to `option_occurrences`.
/// If the `-V` option is included, returns `Ok(Some(ShortOption::Version))`.
fn try_parse_short<I: Iterator<Item = String>>(
    args: &mut Peekable<I>,
    option_occurrences: &mut Vec<(ShellOption, State)>,
) -> Result<Option<ShortOption>, Error> {
    let Some(mut arg) = args.next_if(|arg| is_short_option(arg)) else {
        return Ok(None);
    };

    let mut chars = arg.chars();
    let negate = match chars.next() {
        Some('-') => false,
        Some('+') => true,
        _ => unreachable!(),
    };

    while let Some(c) = chars.next() {
        if c == 'V' {
            return if negate {
                Err(Error::UnnegatableShortOption('V'))
            } else {
                Ok(Some(ShortOption::Version))
            };
        }
        if c == 'o' {
            let name = chars.as_str();
            let name = if !name.is_empty() {
                canonicalize(name)
            } else {
                let prev = arg;
                arg = args.next().ok_or(Error::MissingOptionArgument(prev))?;
                canonicalize(&arg)
            };
            match parse_long(&name) {
                Ok((option, state)) => {
                    option_occurrences.push((option, if negate { !state } else { state }));
                    break;
                }
                Err(NoSuchOption) => return Err(Error::UnknownLongOption(name.into_owned())),
                Err(Ambiguous) => return Err(Error::AmbiguousLongOption(name.into_owned())),
            }
        }

        let (option, state) = parse_short(c).ok_or(Error::UnknownShortOption(c))?;
        option_occurrences.push((option, if negate { !state } else { state }));
    }

    Ok(Some(ShortOption::Shell))
}

/// Tests if the given string is a short option.
fn is_short_option(arg: &str) -> bool {
    let mut chars = arg.chars();
    let negate = match chars.next() {
        Some('-') => false,
        Some('+') => true,
        _ => return false,
    };
    match chars.next() {
        Some('-') if !negate => false,
        Some('+') if negate => false,
        Some(_) => true,
        None => false,
    }
}

/// Tries to parse and consume the next argument in `args` as a long option.
fn try_parse_long<I: Iterator<Item = String>>(
    args: &mut Peekable<I>,
) -> Result<Option<LongOption>, Error> {
    let Some(arg) = args.next_if(|arg| is_long_option(arg)) else {
        return Ok(None);
    };

    let mut chars = arg.chars();
    let negate = match chars.next() {
        Some('-') => false,
        Some('+') => true,
        _ => unreachable!(),
    };

    // Skip the second `-` or `+`
    chars.next();

    let chars = chars.as_str();

    // Parse non-shell options
    let (name, value) = match chars.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (chars, None),
    };
    let non_shell_option = NonShellOptionConstructor::from_name(name);

    // Parse shell options
    let shell_option = parse_long(&canonicalize(chars));

    // Check if the result is unique and return the final result
    match (non_shell_option, shell_option) {
        (_, Err(Ambiguous)) | (Some(_), Ok(_)) => Err(Error::AmbiguousLongOption(arg)),

        (None, Err(NoSuchOption)) => Err(Error::UnknownLongOption(arg)),

        (Some(_), Err(NoSuchOption)) if negate => Err(Error::UnnegatableLongOption(arg)),

        (Some(NonShellOptionConstructor::WithoutArgument(option)), Err(NoSuchOption)) => {
            if value.is_none() {
                Ok(Some(option))
            } else {
                Err(Error::UnexpectedOptionArgument(arg))
            }
        }

        (Some(NonShellOptionConstructor::WithArgument(ctor)), Err(NoSuchOption)) => {
            let value = match value {
                Some(value) => value.to_owned(),
                None => match args.next() {
                    Some(next_arg) => next_arg,
                    None => return Err(Error::MissingOptionArgument(arg)),
                },
            };
            Ok(Some(ctor(value)))
        }

        (None, Ok((option, state))) if negate => Ok(Some(LongOption::Shell(option, !state))),
        (None, Ok((option, state))) => Ok(Some(LongOption::Shell(option, state))),
    }
}

/// Tests if the given string is a long option.
fn is_long_option(arg: &str) -> bool {
    if let Some(name) = arg.strip_prefix("--") {
        !name.is_empty()
    } else {
        arg.starts_with("++")
    }
}
