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

//! Main semantics of the pwd built-in

use super::Mode;
use thiserror::Error;
use fish_env::system::Errno;
use fish_env::{Env, System};

/// Error in running the pwd built-in
#[derive(Debug, Clone, Eq, Error, PartialEq)]
pub enum Error {
    /// Error obtaining the current working directory path
    #[error(transparent)]
    SystemError(Errno),
}

/// Logical result of the pwd built-in
///
/// If successful, the value is the working directory path to be printed,
/// including the trailing newline. If unsuccessful, the value is an error.
pub type Result = std::result::Result<String, Error>;

/// Computes the result of the pwd built-in.
///
/// If successful, the result is the working directory path to be printed,
/// including the trailing newline.
pub fn compute(env: &Env, mode: Mode) -> Result {
    match mode {
        Mode::Logical => {
            if let Some(pwd) = env.get_pwd_if_correct() {
                return Ok(format!("{}\n", pwd));
            }
        }
        Mode::Physical => (),
    }

    let mut cwd = env
        .system
        .getcwd()
        .map_err(Error::SystemError)?
        .into_os_string()
        .into_string()
        .map_err(|_| Error::SystemError(Errno::EILSEQ))?;
    cwd.push('\n');
    Ok(cwd)
}
