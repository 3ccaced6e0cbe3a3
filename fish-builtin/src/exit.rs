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

//! Exit built-in
//!
//! The **`exit`** built-in causes the currently executing shell to exit.
//!
//! # Syntax
//!
//! ```sh
//! exit [exit_status]
//! ```
//!
//! # Semantics
//!
//! `exit exit_status` makes the shell exit from the currently executing
//! environment with the specified exit status.
//!
//! The shell executes the EXIT trap, if any, before exiting, except when the
//! built-in is invoked in the trap itself.
//!
//! # Options
//!
//! None. (TBD: non-portable extensions)
//!
//! # Operands
//!
//! The optional ***exit_status*** operand, if given, should be a non-negative
//! decimal integer and will be the exit status of the exiting shell process.
//!
//! # Exit status
//!
//! The *exit_status* operand specifies the exit status of the exiting shell.
//!
//! If the operand is not given, the shell exits with the current exit status
//! (`$?`). If the built-in is invoked in a trap, the exit status will be the
//! value of `$?` before entering the trap.
//!
//! # Errors
//!
//! If the *exit_status* operand is given but not a valid non-negative integer,
//! it is a syntax error. In that case, an error message is printed, and the
//! exit status will be 2 ([`ExitStatus::ERROR`]).
//!
//! This implementation treats an *exit_status* value greater than 2147483647 as
//! a syntax error.
//!
//! # Portability
//!
//! The behavior is undefined in POSIX if *exit_status* is greater than 255.
//! The current implementation passes such a value as is in the result, but this
//! behavior may change in the future.
//!
//! # Implementation notes
//!
//! This implementation of the built-in does not actually exit the shell, but
//! returns a [`Result`] having a [`Divert::Exit`]. The caller is responsible
//! for handling the divert value and exiting the process.
//!
//! - If an operand specifies an exit status, the divert value will contain the
//! specified exit status. The caller should use it as the exit status of the
//! process.
//! - If no operand is given, the divert value will contain no exit status. The
//! built-in's exit status is the current value of `$?`, and the caller should
//! use it as the exit status of the process. However, if the built-in is
//! invoked in a trap, the caller should use the value of `$?` before entering
//! trap.
//!
//! In case of an error, the result will have a [`Divert::Interrupt`] value
//! instead, in which case the shell will not exit if it is interactive.

use crate::common::syntax_error;
use std::num::ParseIntError;
use std::ops::ControlFlow::Break;
use fish_env::builtin::Result;
use fish_env::semantics::Divert;
use fish_env::semantics::ExitStatus;
use fish_env::semantics::Field;
use fish_env::Env;
use fish_syntax::source::Location;

// TODO Split into syntax and semantics submodules

async fn operand_parse_error(env: &mut Env, location: &Location, error: ParseIntError) -> Result {
    syntax_error(env, &error.to_string(), location).await
}

/// Entry point for executing the `exit` built-in
///
/// See the [module-level documentation](self) for details.
pub async fn main(env: &mut Env, args: Vec<Field>) -> Result {
    // TODO: POSIX does not require the exit built-in to support XBD Utility
    // Syntax Guidelines. That means the built-in does not have to recognize the
    // "--" separator. We should reject the separator in the POSIXly-correct
    // mode.

    if let Some(arg) = args.get(1) {
        return syntax_error(env, "too many operands", &arg.origin).await;
    }

    let exit_status = match args.first() {
        None => None,
        Some(arg) => match arg.value.parse() {
            Ok(exit_status) if exit_status >= 0 => Some(ExitStatus(exit_status)),
            Ok(_) => return syntax_error(env, "negative exit status", &arg.origin).await,
            Err(e) => return operand_parse_error(env, &arg.origin, e).await,
        },
    };
    Result::with_exit_status_and_divert(env.exit_status, Break(Divert::Exit(exit_status)))
}
