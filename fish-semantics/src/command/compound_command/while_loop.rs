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

//! Execution of the while and until loop

use crate::command::Command;
use std::ops::ControlFlow::{Break, Continue};
use fish_env::semantics::Divert;
use fish_env::semantics::{ExitStatus, Result};
use fish_env::stack::Frame;
use fish_env::Env;
use fish_syntax::syntax::List;

/// Execution context for loops
struct Loop<'a> {
    env: &'a mut Env,
    condition_command: &'a List,
    expected_condition: bool,
    body: &'a List,
    exit_status: ExitStatus,
}

impl Loop<'_> {
    async fn iterate(&mut self) -> Result {
        while super::evaluate_condition(self.env, self.condition_command).await?
            == self.expected_condition
        {
            self.body.execute(self.env).await?;
            self.exit_status = self.env.exit_status;
        }
        Continue(())
    }

    async fn execute(&mut self) -> Result {
        loop {
            match self.iterate().await {
                Break(Divert::Break { count: 0 }) => {
                    self.exit_status = self.env.exit_status;
                    return Continue(());
                }
                Break(Divert::Break { count }) => return Break(Divert::Break { count: count - 1 }),
                Break(Divert::Continue { count: 0 }) => continue,
                Break(Divert::Continue { count }) => {
                    return Break(Divert::Continue { count: count - 1 })
                }
                other => return other,
            }
        }
    }
}

async fn execute_common(
    env: &mut Env,
    condition_command: &List,
    expected_condition: bool,
    body: &List,
) -> Result {
    let env = &mut env.push_frame(Frame::Loop);
    let mut l = Loop {
        env,
        condition_command,
        expected_condition,
        body,
        exit_status: ExitStatus::default(),
    };
    l.execute().await?;
    env.exit_status = l.exit_status;
    Continue(())
}

/// Executes the while loop.
pub async fn execute_while(env: &mut Env, condition: &List, body: &List) -> Result {
    execute_common(env, condition, true, body).await
}

/// Executes the until loop.
pub async fn execute_until(env: &mut Env, condition: &List, body: &List) -> Result {
    execute_common(env, condition, false, body).await
}
