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

//! Implementation of the read-eval loop

use crate::Command;
use crate::Handle;
use std::ops::ControlFlow::Continue;
use fish_env::exec::ExitStatus;
use fish_env::exec::Result;
use fish_env::Env;
use fish_syntax::parser::lex::Lexer;
use fish_syntax::parser::Parser;

/// Reads and executes commands repeatedly.
///
/// This function uses `lexer` for reading and parsing input and `env` for
/// executing parsed commands. If [`Parser::command_line`] parses successfully,
/// the command is executed, and then the next command line is parsed. The loop
/// continues until the parser reaches the end of input or encounters a syntax
/// error, or the command execution results in a `Break(Divert::...)`.
///
/// If the input source code contains no commands, the exit status is set to
/// zero.
///
/// TODO: `Break(Divert::Interrupt(...))` does not end the loop in an
/// interactive shell
///
/// TODO: Handle traps while reading commands
pub async fn read_eval_loop(env: &mut Env, lexer: &mut Lexer<'_>) -> Result {
    let mut executed = false;

    loop {
        let mut parser = Parser::new(lexer, &env.aliases);
        match parser.command_line().await {
            Ok(None) => break,
            Ok(Some(command)) => command.execute(env).await?,
            Err(error) => error.handle(env).await?,
        };
        executed = true;
    }

    if !executed {
        env.exit_status = ExitStatus::SUCCESS;
    }

    Continue(())
}
