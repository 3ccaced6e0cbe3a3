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

//! Implementation for Item.

use super::Command;
use async_trait::async_trait;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;
use fish_env::io::print_error;
use fish_env::job::Job;
use fish_env::semantics::Divert;
use fish_env::semantics::ExitStatus;
use fish_env::semantics::Result;
use fish_env::subshell::Subshell;
use fish_env::Env;
use fish_syntax::source::Location;
use fish_syntax::syntax;
use fish_syntax::syntax::AndOrList;

/// Executes the item.
///
/// # Synchronous command
///
/// If the item's `async_flag` is `None`, this function executes the and-or list
/// in the item.
///
/// # Asynchronous command
///
/// If the item has an `async_flag` set, the and-or list is executed
/// asynchronously in a subshell, whose process ID is [set to the job
/// set](fish_env::job::JobSet::set_last_async_pid) in the environment.
///
/// Since this function finishes before the asynchronous execution finishes, the
/// exit status does not reflect the results of the and-or list; the exit status
/// is always 0.
///
/// TODO: If the `monitor` option is off, the standard input of the asynchronous
/// and-or list is implicitly redirected to `/dev/null`.
#[async_trait(?Send)]
impl Command for syntax::Item {
    async fn execute(&self, env: &mut Env) -> Result {
        match &self.async_flag {
            None => self.and_or.execute(env).await,
            Some(async_flag) => execute_async(env, &self.and_or, async_flag).await,
        }
    }
}

async fn execute_async(env: &mut Env, and_or: &Rc<AndOrList>, async_flag: &Location) -> Result {
    let and_or_2 = Rc::clone(and_or);
    let subshell = Subshell::new(|env| Box::pin(async move { and_or_2.execute(env).await }));
    let result = subshell.start(env).await;
    match result {
        Ok((pid, job_control)) => {
            debug_assert_eq!(job_control, None);
            let mut job = Job::new(pid);
            job.name = and_or.to_string();
            env.jobs.add(job);
            env.jobs.set_last_async_pid(pid);
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
        Err(errno) => {
            print_error(
                env,
                "cannot start a subshell to run an asynchronous command".into(),
                errno.desc().into(),
                async_flag,
            )
            .await;

            Break(Divert::Interrupt(Some(ExitStatus::NOEXEC)))
        }
    }
}
