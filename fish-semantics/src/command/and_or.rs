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

//! Implementation of the and-or list semantics.

use super::Command;
use std::ops::ControlFlow::Continue;
use fish_env::Env;
use fish_env::semantics::Result;
use fish_env::stack::Frame;
use fish_syntax::syntax::AndOr::{self, AndThen, OrElse};
use fish_syntax::syntax::AndOrList;
use fish_syntax::syntax::Pipeline;

/// Executes the and-or list.
///
/// The `&&` operator first executes the left-hand-side pipeline, and if and
/// only if the exit status is zero, executes the right-hand-side. The `||`
/// operator works similarly but runs the right-hand-side if and only if the
/// left-hand-side exit status is non-zero. The `&&` and `||` operators are
/// left-associative and have equal precedence.
///
/// The exit status of the and-or list will be that of the last executed
/// pipeline.
///
/// [`Frame::Condition`] is pushed to the environment's stack while the
/// execution of the pipelines except for the last.
impl Command for AndOrList {
    async fn execute(&self, env: &mut Env) -> Result {
        if self.rest.is_empty() {
            return self.first.execute(env).await;
        }

        // Execute `first`
        let mut env2 = env.push_frame(Frame::Condition);
        self.first.execute(&mut env2).await?;

        // Execute `rest` but last
        let mut i = self.rest.iter().peekable();
        let mut pipeline;
        loop {
            pipeline = i.next().unwrap();
            if i.peek().is_none() {
                break;
            }
            execute_conditional_pipeline(&mut env2, pipeline).await?;
        }
        drop(env2);

        // Execute last
        execute_conditional_pipeline(env, pipeline).await
    }
}

async fn execute_conditional_pipeline(
    env: &mut Env,
    (and_or, pipeline): &(AndOr, Pipeline),
) -> Result {
    let success = env.exit_status.is_successful();
    let run = match and_or {
        AndThen => success,
        OrElse => !success,
    };
    if run {
        pipeline.execute(env).await
    } else {
        Continue(())
    }
}
