// This file is part of yash, an extended POSIX shell.
// Copyright (C) 2021 WATANABE Yuki
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

//! Alias built-in.

use std::future::ready;
use std::future::Future;
use std::ops::ControlFlow::Continue;
use std::pin::Pin;
use std::rc::Rc;
use fish_env::builtin::Result;
use fish_env::exec::ExitStatus;
use fish_env::expansion::Field;
use fish_syntax::alias::{AliasSet, HashEntry};

/// Part of the shell execution environment the alias built-in depends on.
pub trait Env {
    /// Accesses the alias set in the environment.
    fn alias_set(&mut self) -> &mut Rc<AliasSet>;
    // TODO stdout, stderr
}

impl Env for fish_env::Env {
    fn alias_set(&mut self) -> &mut Rc<AliasSet> {
        &mut self.aliases
    }
}

/// Implementation of the alias built-in.
pub fn builtin_main_sync<E: Env>(env: &mut E, args: Vec<Field>) -> Result {
    // TODO support options
    // TODO print alias definitions if there are no operands

    let mut args = args.into_iter();
    args.next(); // ignore the first argument, which is the command name

    if args.as_ref().is_empty() {
        for alias in env.alias_set().as_ref() {
            // TODO should print via IoEnv rather than directly to stdout
            println!("{}={}", &alias.0.name, &alias.0.replacement);
        }
        return (ExitStatus::SUCCESS, Continue(()));
    }

    for Field { value, origin } in args {
        if let Some(eq_index) = value.find('=') {
            let name = value[..eq_index].to_owned();
            // TODO reject invalid name
            let replacement = value[eq_index + 1..].to_owned();
            let entry = HashEntry::new(name, replacement, false, origin);
            Rc::make_mut(&mut env.alias_set()).insert(entry);
        } else {
            // TODO print alias definition
        }
    }

    (ExitStatus::SUCCESS, Continue(()))
}

/// Implementation of the alias built-in.
///
/// This function calls [`builtin_main_sync`] and wraps the result in a `Future`.
pub fn builtin_main(
    env: &mut fish_env::Env,
    args: Vec<Field>,
) -> Pin<Box<dyn Future<Output = Result>>> {
    Box::pin(ready(builtin_main_sync(env, args)))
}
