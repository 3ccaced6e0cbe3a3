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
use async_trait::async_trait;
use std::ops::ControlFlow::Continue;
use fish_env::semantics::Result;
use fish_env::Env;
use fish_syntax::syntax::AndOrList;

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
#[async_trait(?Send)]
impl Command for AndOrList {
    async fn execute(&self, env: &mut Env) -> Result {
        use fish_syntax::syntax::AndOr::*;
        self.first.execute(env).await?;
        for (and_or, pipeline) in &self.rest {
            let success = env.exit_status.is_successful();
            let run = match and_or {
                AndThen => success,
                OrElse => !success,
            };
            if run {
                pipeline.execute(env).await?;
            }
        }
        Continue(())
    }
}
