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

//! Simple command semantics for functions

use super::perform_assignments;
use crate::Handle;
use crate::Runtime;
use crate::redir::RedirGuard;
use crate::xtrace::XTrace;
use crate::xtrace::print;
use crate::xtrace::trace_fields;
use std::ops::ControlFlow::{Break, Continue};
use std::pin::Pin;
use std::rc::Rc;
use fish_env::Env;
use fish_env::function::Function;
use fish_env::semantics::Divert;
use fish_env::semantics::Field;
use fish_env::semantics::Result;
use fish_env::variable::Context;
use fish_env::variable::PositionalParams;
use fish_syntax::syntax::Assign;
use fish_syntax::syntax::Redir;

pub async fn execute_function<S: Runtime + 'static>(
    env: &mut Env<S>,
    function: Rc<Function<S>>,
    assigns: &[Assign],
    fields: Vec<Field>,
    redirs: &[Redir],
) -> Result {
    let env = &mut RedirGuard::new(env);
    let mut xtrace = XTrace::from_options(&env.options);
    if let Err(e) = env.perform_redirs(redirs, xtrace.as_mut()).await {
        return e.handle(env).await;
    };

    let mut env = env.push_context(Context::Volatile);
    perform_assignments(&mut env, assigns, true, xtrace.as_mut()).await?;

    trace_fields(xtrace.as_mut(), &fields);
    print(&mut env, xtrace).await;

    execute_function_body(&mut env, function, fields, None).await
}

type EnvPrepHook<S> = fn(&mut Env<S>) -> Pin<Box<dyn Future<Output = ()> + '_>>;

/// Executes the body of the function.
///
/// The given function is executed in the given environment. The fields are
/// passed as positional parameters to the function except for the first field
/// which is the name of the function.
///
/// `env_prep_hook` is called after the new variable context is pushed to the
/// environment. This is useful for assigning custom local variables before the
/// function body is executed.
pub async fn execute_function_body<S: Runtime>(
    env: &mut Env<S>,
    function: Rc<Function<S>>,
    fields: Vec<Field>,
    env_prep_hook: Option<EnvPrepHook<S>>,
) -> Result {
    let positional_params = PositionalParams::from_fields(fields);
    let mut env = env.push_context(Context::Regular { positional_params });
    if let Some(hook) = env_prep_hook {
        hook(&mut env).await;
    }

    // TODO Update control flow stack
    let result = function.body.execute(&mut env).await;
    if let Break(Divert::Return(exit_status)) = result {
        if let Some(exit_status) = exit_status {
            env.exit_status = exit_status;
        }
        Continue(())
    } else {
        result
    }
}
