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

//! Arithmetic expansion

use std::rc::Rc;

use super::super::attr::AttrChar;
use super::super::attr::Origin;
use super::super::phrase::Phrase;
use super::super::ErrorCause;
use super::Env;
use super::Error;
use crate::expansion::expand_text;
use fish_arith::eval;
use fish_syntax::source::Code;
use fish_syntax::source::Location;
use fish_syntax::source::Source;
use fish_syntax::syntax::Text;

pub async fn expand(text: &Text, location: &Location, env: &mut Env<'_>) -> Result<Phrase, Error> {
    let (expression, exit_status) = expand_text(env.inner, text).await?;
    if exit_status.is_some() {
        env.last_command_subst_exit_status = exit_status;
    }

    let result = eval(&expression);

    match result {
        Ok(value) => {
            let value = value.to_string();
            let chars = value
                .chars()
                .map(|c| AttrChar {
                    value: c,
                    origin: Origin::SoftExpansion,
                    is_quoted: false,
                    is_quoting: false,
                })
                .collect();
            Ok(Phrase::Field(chars))
        }
        Err(error) => Err(Error {
            cause: ErrorCause::ArithError(error.cause),
            location: Location {
                code: Rc::new(Code {
                    value: expression.into(),
                    start_line_number: 1.try_into().unwrap(),
                    source: Source::Arith {
                        original: location.clone(),
                    },
                }),
                range: error.location,
            },
        }),
    }
}
