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

//! Parameter expansion

use super::super::phrase::Phrase;
use super::super::AttrChar;
use super::super::Error;
use super::super::ErrorCause;
use super::super::Origin;
use super::Env;
use super::Expand;
use fish_env::option::Option::Unset;
use fish_env::option::State::Off;
use fish_env::variable::Expansion;
use fish_env::variable::Value;
use fish_syntax::source::Location;
use fish_syntax::syntax::Modifier;
use fish_syntax::syntax::Param;

/// Reference to a parameter expansion
pub struct ParamRef<'a> {
    pub name: &'a str,
    pub modifier: &'a Modifier,
    pub location: &'a Location,
}

impl<'a> From<&'a Param> for ParamRef<'a> {
    fn from(param: &'a Param) -> Self {
        ParamRef {
            name: &param.name,
            modifier: &param.modifier,
            location: &param.location,
        }
    }
}

// TODO Consider exporting these modules
mod name;
mod resolve;
mod switch;
mod trim;

pub use switch::NonassignableError;
pub use switch::Vacancy;
pub use switch::VacantError;

impl Expand for ParamRef<'_> {
    /// Performs parameter expansion.
    async fn expand(&self, env: &mut Env<'_>) -> Result<Phrase, Error> {
        // TODO Expand and parse Index

        // Lookup //
        let name = self.name.try_into().ok();
        let resolve = match name {
            Some(name) => resolve::resolve(name, env.inner, self.location),
            None => Expansion::Unset,
        };

        // TODO Apply Index

        let mut value = resolve.into_owned();

        // Switch //
        if let Modifier::Switch(switch) = self.modifier {
            if let Some(result) = switch::apply(env, switch, name, &mut value, self.location).await
            {
                return result;
            }
        } else {
            // Check for nounset option error //
            if value.is_none() && env.inner.options.get(Unset) == Off {
                return Err(Error {
                    cause: ErrorCause::UnsetParameter,
                    location: self.location.clone(),
                });
            }
        }

        // TODO Reject POSIXly unspecified combinations of name and modifier

        // Other modifiers //
        match self.modifier {
            Modifier::None | Modifier::Switch(_) => (),

            Modifier::Length => {
                // TODO Reject ${#*} and ${#@} in POSIX mode
                match &mut value {
                    None => value = Some(Value::scalar("0")),
                    Some(Value::Scalar(v)) => to_length(v),
                    Some(Value::Array(vs)) => vs.iter_mut().for_each(to_length),
                }
            }

            Modifier::Trim(trim) => {
                if let Some(value) = &mut value {
                    trim::apply(env, trim, value).await?
                }
            }
        }

        let mut phrase = into_phrase(value);
        if !env.will_split && self.name == "*" {
            phrase = Phrase::Field(phrase.ifs_join(&env.inner.variables));
        }
        Ok(phrase)
    }
}

/// Modifies a string to its length.
fn to_length(v: &mut String) {
    *v = v.chars().count().to_string()
}

/// Converts a value into a phrase.
fn into_phrase(value: Option<Value>) -> Phrase {
    match value {
        None => Phrase::one_empty_field(),
        Some(Value::Scalar(value)) => Phrase::Field(to_field(&value)),
        Some(Value::Array(values)) => {
            Phrase::Full(values.into_iter().map(|value| to_field(&value)).collect())
        }
    }
}

/// Converts a string to a `Vec<AttrChar>`.
fn to_field(value: &str) -> Vec<AttrChar> {
    value
        .chars()
        .map(|c| AttrChar {
            value: c,
            origin: Origin::SoftExpansion,
            is_quoted: false,
            is_quoting: false,
        })
        .collect()
}
