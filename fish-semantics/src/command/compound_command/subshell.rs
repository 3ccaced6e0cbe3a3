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

//! Semantics of subshell compound commands

use crate::command::Command;
use crate::trap::run_exit_trap;
use std::ops::ControlFlow::Break;
use std::rc::Rc;
use fish_env::Env;
use fish_env::io::print_error;
use fish_env::job::add_job_if_suspended;
use fish_env::semantics::Divert;
use fish_env::semantics::ExitStatus;
use fish_env::semantics::Result;
use fish_env::subshell::JobControl;
use fish_env::subshell::Subshell;
use fish_env::system::System;
use fish_syntax::source::Location;
use fish_syntax::syntax::List;

/// Executes a subshell command
pub async fn execute<S: System + 'static>(
    env: &mut Env<S>,
    body: Rc<List>,
    location: &Location,
) -> Result {
    let body_2 = Rc::clone(&body);
    let subshell = Subshell::new(|sub_env, _job_control| Box::pin(subshell_main(sub_env, body_2)));
    let subshell = subshell.job_control(JobControl::Foreground);
    match subshell.start_and_wait(env).await {
        Ok((pid, result)) => {
            env.exit_status = add_job_if_suspended(env, pid, result, || body.to_string())?;
            env.apply_errexit()
        }
        Err(errno) => {
            print_error(
                env,
                "cannot start subshell".into(),
                errno.to_string().into(),
                location,
            )
            .await;
            Break(Divert::Interrupt(Some(ExitStatus::ERROR)))
        }
    }
}

/// Executes the content of the shell.
async fn subshell_main<S: System + 'static>(env: &mut Env<S>, body: Rc<List>) {
    let result = body.execute(env).await;
    env.apply_result(result);

    run_exit_trap(env).await;
}
