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

//! Core runtime behavior of the `unalias` built-in

use super::Command;
use std::borrow::Cow;
use thiserror::Error;
use fish_env::Env;
use fish_env::semantics::Field;
use fish_syntax::source::pretty::Annotation;
use fish_syntax::source::pretty::AnnotationType;
use fish_syntax::source::pretty::MessageBase;

/// Errors that can occur while executing the `unalias` built-in
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// The operand names a non-existent alias.
    #[error("no such alias `{0}`")]
    UndefinedAlias(Field),
}

impl MessageBase for Error {
    fn message_title(&self) -> Cow<str> {
        "cannot remove alias".into()
    }

    fn main_annotation(&self) -> Annotation<'_> {
        match self {
            Error::UndefinedAlias(alias) => Annotation::new(
                AnnotationType::Error,
                format!("no such alias `{alias}`").into(),
                &alias.origin,
            ),
        }
    }
}

impl Command {
    /// Executes the `unalias` built-in.
    ///
    /// Returns a list of errors that occurred while executing the built-in.
    #[must_use]
    pub fn execute(self, env: &mut Env) -> Vec<Error> {
        match self {
            Command::RemoveAll => {
                env.aliases.clear();
                vec![]
            }
            Command::Remove(operands) => operands
                .into_iter()
                .filter(|operand| !env.aliases.remove(operand.value.as_str()))
                .map(Error::UndefinedAlias)
                .collect(),
        }
    }
}
