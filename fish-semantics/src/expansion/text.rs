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

//! Initial expansion of text.

use super::AttrChar;
use super::Env;
use super::Expand;
use super::Expansion;
use super::Origin;
use super::Output;
use super::Result;
use async_trait::async_trait;
use fish_syntax::syntax::Text;
use fish_syntax::syntax::TextUnit;

#[async_trait(?Send)]
impl Expand for TextUnit {
    /// Expands the text unit.
    ///
    /// TODO Elaborate
    async fn expand<E: Env>(&self, _env: &mut E, output: &mut Output<'_>) -> Result {
        use TextUnit::*;
        match self {
            Literal(c) => output.push_char(AttrChar {
                value: *c,
                origin: Origin::Literal,
                is_quoted: false,
                is_quoting: false,
            }),
            Backslashed(c) => {
                output.push_char(AttrChar {
                    value: '\\',
                    origin: Origin::Literal,
                    is_quoted: false,
                    is_quoting: true,
                });
                output.push_char(AttrChar {
                    value: *c,
                    origin: Origin::Literal,
                    is_quoted: true,
                    is_quoting: false,
                });
            }
            // TODO Expand RawParam correctly
            // TODO Expand BracedParam correctly
            // TODO Expand CommandSubst correctly
            // TODO Expand Backquote correctly
            // TODO Expand Arith correctly
            _ => output.push_str(&self.to_string(), Origin::Literal, false, false),
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl Expand for Text {
    /// Expands the text.
    async fn expand<E: Env>(&self, env: &mut E, output: &mut Output<'_>) -> Result {
        self.0.expand(env, output).await
    }
}
