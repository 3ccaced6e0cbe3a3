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

//! Defines the behavior of the unset built-in.

use crate::common::arrange_message_and_divert;
use thiserror::Error;
use fish_env::semantics::ExitStatus;
use fish_env::semantics::Field;
#[cfg(doc)]
use fish_env::system::SharedSystem;
use fish_env::variable::Scope::Global;
use fish_env::Env;
use fish_syntax::source::pretty::Annotation;
use fish_syntax::source::pretty::AnnotationType;
use fish_syntax::source::pretty::Message;
use fish_syntax::source::Location;

/// Error returned by [`unset_variables`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct UnsetVariablesError<'a> {
    /// The name of the read-only variable
    pub name: &'a Field,
    /// The location where the variable was made read-only
    pub read_only_location: Location,
}

impl std::fmt::Display for UnsetVariablesError<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let error = fish_env::variable::UnsetError {
            name: &self.name.value,
            read_only_location: &self.read_only_location,
        };
        error.fmt(f)
    }
}

/// Unsets shell variables.
///
/// This function tries to unset all the variables named by `names`. Any error
/// for a variable is reported in the returned vector and the function continues
/// to unset the remaining variables.
///
/// TODO Allow unsetting local variables only.
pub fn unset_variables<'a>(
    env: &mut Env,
    names: &'a [Field],
) -> Result<(), Vec<UnsetVariablesError<'a>>> {
    let mut errors = Vec::new();
    for name in names {
        match env.variables.unset(Global, &name.value) {
            Ok(_) => (),
            Err(error) => errors.push(UnsetVariablesError {
                name,
                read_only_location: error.read_only_location.clone(),
            }),
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Creates a message that describes the errors.
///
/// See [`arrange_message_and_divert`] for the second return value.
#[must_use]
pub fn unset_variables_error_message(
    env: &Env,
    errors: &[UnsetVariablesError],
) -> (String, fish_env::semantics::Result) {
    let annotations = errors
        .iter()
        .flat_map(|error| {
            [
                Annotation::new(
                    AnnotationType::Error,
                    error.to_string().into(),
                    &error.name.origin,
                ),
                Annotation::new(
                    AnnotationType::Info,
                    format!("variable `{}` was made read-only here", error.name).into(),
                    &error.read_only_location,
                ),
            ]
        })
        .collect();
    let message = Message {
        r#type: AnnotationType::Error,
        title: "cannot unset variable".into(),
        annotations,
    };
    arrange_message_and_divert(env, message)
}

/// Prints an error message to the standard error.
///
/// This function constructs a message with [`unset_variables_error_message`]
/// and prints it with [`SharedSystem::print_error`].
pub async fn report_variables_error(
    env: &mut Env,
    errors: &[UnsetVariablesError<'_>],
) -> crate::Result {
    let (message, divert) = unset_variables_error_message(env, errors);
    env.system.print_error(&message).await;
    crate::Result::with_exit_status_and_divert(ExitStatus::FAILURE, divert)
}

/// Error returned by [`unset_functions`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("cannot unset read-only function `{name}`")]
pub struct UnsetFunctionsError<'a> {
    /// The name of the function
    pub name: &'a Field,
    /// The location where the function was made read-only
    pub read_only_location: Location,
}

/// Unsets shell functions.
///
/// This function tries to unset all the functions named by `names`. Any error
/// for a function is reported in the returned vector and the function continues
/// to unset the remaining functions.
pub fn unset_functions<'a>(
    env: &mut Env,
    names: &'a [Field],
) -> Result<(), Vec<UnsetFunctionsError<'a>>> {
    let mut errors = Vec::new();
    for name in names {
        match env.functions.unset(&name.value) {
            Ok(_) => (),
            Err(error) => errors.push(UnsetFunctionsError {
                name,
                read_only_location: error.existing.read_only_location.clone().unwrap(),
            }),
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Creates a message that describes the errors.
///
/// See [`arrange_message_and_divert`] for the second return value.
#[must_use]
pub fn unset_functions_error_message(
    env: &mut Env,
    errors: &[UnsetFunctionsError<'_>],
) -> (String, fish_env::semantics::Result) {
    let annotations = errors
        .iter()
        .flat_map(|error| {
            [
                Annotation::new(
                    AnnotationType::Error,
                    error.to_string().into(),
                    &error.name.origin,
                ),
                Annotation::new(
                    AnnotationType::Info,
                    format!("function `{}` was made read-only here", error.name).into(),
                    &error.read_only_location,
                ),
            ]
        })
        .collect();
    let message = Message {
        r#type: AnnotationType::Error,
        title: "cannot unset function".into(),
        annotations,
    };
    arrange_message_and_divert(env, message)
}

/// Prints an error message to the standard error.
///
/// This function constructs a message with [`unset_functions_error_message`]
/// and prints it with [`SharedSystem::print_error`].
pub async fn report_functions_error(
    env: &mut Env,
    errors: &[UnsetFunctionsError<'_>],
) -> crate::Result {
    let (message, divert) = unset_functions_error_message(env, errors);
    env.system.print_error(&message).await;
    crate::Result::with_exit_status_and_divert(ExitStatus::FAILURE, divert)
}
