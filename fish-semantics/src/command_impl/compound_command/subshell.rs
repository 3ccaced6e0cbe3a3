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

use crate::Command;
use std::ops::ControlFlow::Continue;
use fish_env::semantics::Result;
use fish_env::Env;
use fish_syntax::syntax::List;

/// Executes a subshell command
pub async fn execute(env: &mut Env, list: &List) -> Result {
    let list = list.clone(); // TODO Avoid cloning the entire list
    let result = env
        .run_in_subshell(|sub_env| Box::pin(async move { list.execute(sub_env).await }))
        .await;
    match result {
        Ok(exit_status) => {
            env.exit_status = exit_status;
            Continue(())
        }
        Err(_) => todo!(),
    }
}
