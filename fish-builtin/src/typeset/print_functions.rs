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

use super::*;
use std::fmt::Write;
use fish_env::function::Function;
use fish_env::function::FunctionSet;

impl PrintFunctions {
    /// Executes the command.
    pub fn execute(
        self,
        functions: &FunctionSet,
        context: &PrintContext,
    ) -> Result<String, Vec<ExecuteError>> {
        let mut output = String::new();
        let mut errors = Vec::new();

        if self.functions.is_empty() {
            let mut functions = functions.iter().map(AsRef::as_ref).collect::<Vec<_>>();
            // TODO Honor the collation order in the locale.
            functions.sort_unstable_by_key(|function| &function.name);
            for function in functions {
                print_one(function, &self.attrs, context, &mut output);
            }
        } else {
            for name in self.functions {
                match functions.get(&name.value) {
                    Some(function) => print_one(function, &self.attrs, context, &mut output),
                    None => errors.push(ExecuteError::PrintUnsetFunction(name)),
                }
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(errors)
        }
    }
}

fn print_one(
    function: &Function,
    filter_attrs: &[(FunctionAttr, State)],
    context: &PrintContext,
    output: &mut String,
) {
    // Skip if the function does not match the filter.
    if filter_attrs
        .iter()
        .any(|&(attr, state)| attr.test(function) != state)
    {
        return;
    }

    // Print the function body.
    let name = fish_quote::quoted(&function.name);
    if name.needs_quoting() {
        output.push_str("function ");
    }
    // TODO multiline pretty printing
    writeln!(output, "{}() {}", name, function.body).unwrap();

    // Print a command to set the function attributes.
    let mut options_to_print = String::new();
    for option in context.options_allowed {
        if let Some(attr) = option.attr {
            if let Ok(attr) = FunctionAttr::try_from(attr) {
                if attr.test(function).into() {
                    options_to_print.push(option.short);
                }
            }
        }
    }
    if !options_to_print.is_empty() || context.builtin_is_significant {
        let separator = if function.name.starts_with('-') {
            "-- "
        } else {
            ""
        };

        writeln!(
            output,
            "{} -f{} {}{}",
            context.builtin_name, options_to_print, separator, name
        )
        .unwrap();
    }
}
