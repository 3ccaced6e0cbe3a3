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

//! Running signal traps

use crate::ReadEvalLoop;
use std::future::Future;
use std::ops::ControlFlow::Continue;
use std::pin::Pin;
use fish_env::semantics::Result;
use fish_env::stack::Frame;
use fish_env::trap::Action;
use fish_env::trap::Condition;
#[cfg(doc)]
use fish_env::trap::TrapSet;
use fish_env::Env;
use fish_syntax::parser::lex::Lexer;
use fish_syntax::source::Source;

fn in_trap(env: &Env) -> bool {
    env.stack
        .iter()
        .rev()
        .take_while(|frame| **frame != Frame::Subshell)
        .any(|frame| {
            matches!(*frame, Frame::Trap { condition, .. }
                if matches!(condition, Condition::Signal(_)))
        })
}

/// Runs trap commands for signals that have been caught.
///
/// This function resets the `pending` flag of caught signals by calling
/// [`TrapSet::take_caught_signal`]. See the [module doc](super) for more
/// details.
///
/// If we are already running a trap, this function does not run any traps to
/// prevent unintended behavior of trap actions. Most shell script writers do
/// not care for the reentrance of trap actions, so we should not assume they
/// are reentrant. As an exception, this function does run traps in a subshell
/// executed in a trap.
pub async fn run_traps_for_caught_signals(env: &mut Env) -> Result {
    env.poll_signals();

    if in_trap(env) {
        // Do not run a trap action while running another
        return Continue(());
    }

    while let Some((signal, state)) = env.traps.take_caught_signal() {
        let code = if let Action::Command(command) = &state.action {
            command.clone()
        } else {
            continue;
        };
        let condition = signal.to_string();
        let origin = state.origin.clone();
        let mut lexer = Lexer::from_memory(&code, Source::Trap { condition, origin });
        let previous_exit_status = env.exit_status;
        let mut env = env.push_frame(Frame::Trap {
            condition: Condition::Signal(signal),
            previous_exit_status,
        });
        // Boxing needed for recursion
        let future: Pin<Box<dyn Future<Output = Result>>> =
            Box::pin(ReadEvalLoop::new(&mut env, &mut lexer).run());
        future.await?;
        env.exit_status = previous_exit_status;
    }

    Continue(())
}
