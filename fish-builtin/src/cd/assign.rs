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

//! Part of the cd built-in that updates `$PWD` and `$OLDPWD`

use super::Mode;
use crate::common::arrange_message_and_divert;
use fish_env::path::Path;
use fish_env::path::PathBuf;
use fish_env::variable::AssignError;
use fish_env::variable::Scope::Global;
use fish_env::variable::Value::Scalar;
use fish_env::variable::OLDPWD;
use fish_env::variable::PWD;
use fish_env::Env;
use fish_env::System;
use fish_syntax::source::pretty::Annotation;
use fish_syntax::source::pretty::AnnotationType;
use fish_syntax::source::pretty::Message;

/// Assigns the given value to `$OLDPWD`.
///
/// If `$OLDPWD` is read-only, this function prints an error message and does
/// nothing.
///
/// This function examines the stack to find the command location that invoked
/// the cd built-in.
pub async fn set_oldpwd(env: &mut Env, value: String) {
    set_variable(env, OLDPWD, value).await
}

/// Assigns the working directory path to `$PWD`.
///
/// This function assigns the given `path` to the `PWD` variable.
/// If `$PWD` is read-only, this function prints an error message and does
/// nothing.
///
/// This function examines the stack to find the command location that invoked
/// the cd built-in.
pub async fn set_pwd(env: &mut Env, path: PathBuf) {
    let value = path.into_unix_string().into_string().unwrap_or_default();
    set_variable(env, PWD, value).await
}

async fn set_variable(env: &mut Env, name: &str, value: String) {
    let current_builtin = env.stack.current_builtin();
    let current_location = current_builtin.map(|builtin| builtin.name.origin.clone());
    let var = &mut env.get_or_create_variable(name, Global);
    match var.assign(Scalar(value), current_location) {
        Ok(_) => {}
        Err(error) => return handle_assign_error(env, name, error).await,
    }
    var.export(true);
}

/// Prints a warning message for a read-only variable.
///
/// The message is only a warning because it does not affect the exit status.
async fn handle_assign_error(env: &mut Env, name: &str, error: AssignError) {
    let message = Message {
        r#type: AnnotationType::Warning,
        title: format!("cannot update read-only variable `{}`", name).into(),
        annotations: vec![Annotation::new(
            AnnotationType::Info,
            "the variable was made read-only here".into(),
            &error.read_only_location,
        )],
        footers: vec![],
    };
    let (message, _divert) = arrange_message_and_divert(env, message);
    env.system.print_error(&message).await;
}

/// Computes the new value of `$PWD`.
///
/// If `mode` is `Logical`, this function returns `path` without any
/// modification. If `mode` is `Physical`, this function uses [`System::getcwd`]
/// to obtain the working directory path.
pub fn new_pwd(env: &Env, mode: Mode, path: &Path) -> PathBuf {
    match mode {
        Mode::Logical => path.to_owned(),
        Mode::Physical => env.system.getcwd().unwrap_or_else(|_| PathBuf::new()),
    }
}
