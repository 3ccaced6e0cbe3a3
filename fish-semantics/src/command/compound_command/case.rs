// This file is part of yash, an extended POSIX shell.
// Copyright (C) 2022 WATANABE Yuki
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

//! Execution of the case command

use crate::Handle;
use crate::command::Command;
use crate::expansion::attr_fnmatch::apply_escapes;
use crate::expansion::attr_fnmatch::to_pattern_chars;
use crate::expansion::expand_word;
use crate::expansion::expand_word_attr;
use crate::xtrace::XTrace;
use crate::xtrace::print;
use std::fmt::Write;
use std::ops::ControlFlow::Continue;
use fish_env::Env;
use fish_env::semantics::ExitStatus;
use fish_env::semantics::Result;
use fish_fnmatch::Config;
use fish_fnmatch::Pattern;
use fish_quote::quoted;
use fish_syntax::syntax::CaseItem;
use fish_syntax::syntax::Word;

async fn trace_subject(env: &mut Env, value: &str) {
    if let Some(mut xtrace) = XTrace::from_options(&env.options) {
        write!(xtrace.words(), "case {} in ", quoted(value)).unwrap();
        print(env, xtrace).await;
    }
}
// We don't trace expanded patterns since they need a quoting method different
// from fish_quote::quote.

fn config() -> Config {
    let mut config = Config::default();
    config.anchor_begin = true;
    config.anchor_end = true;
    config
}

/// Executes the case command.
pub async fn execute(env: &mut Env, subject: &Word, items: &[CaseItem]) -> Result {
    let subject = match expand_word(env, subject).await {
        Ok((expansion, _exit_status)) => expansion,
        Err(error) => return error.handle(env).await,
    };
    trace_subject(env, &subject.value).await;

    let mut falling_through = false;
    let mut exit_status_updated = false;
    for item in items {
        if !falling_through {
            match matches(env, &subject.value, &item.patterns).await {
                Ok(true) => (),
                Ok(false) => continue,
                Err(error) => return error.handle(env).await,
            }
        }

        item.body.execute(env).await?;
        exit_status_updated = !item.body.0.is_empty();

        use fish_syntax::syntax::CaseContinuation::*;
        falling_through = match item.continuation {
            Break => break,
            FallThrough => true,
            Continue => false,
        };
    }

    if !exit_status_updated {
        env.exit_status = ExitStatus::SUCCESS;
    }
    Continue(())
}

/// Returns whether the subject matches any of the patterns.
///
/// Each pattern is expanded and matched against the subject.
/// Returns the error if any expansion fails.
async fn matches(
    env: &mut Env,
    subject: &str,
    patterns: &[Word],
) -> crate::expansion::Result<bool> {
    for pattern in patterns {
        let mut pattern = expand_word_attr(env, pattern).await?.0.chars;

        // Unquoted backslashes should act as quoting, as required by POSIX XCU 2.13.1
        apply_escapes(&mut pattern);

        let Ok(pattern) = Pattern::parse_with_config(to_pattern_chars(&pattern), config()) else {
            // Treat the broken pattern as a valid pattern that does not match anything
            continue;
        };

        if pattern.is_match(subject) {
            return Ok(true);
        }
    }

    Ok(false)
}
