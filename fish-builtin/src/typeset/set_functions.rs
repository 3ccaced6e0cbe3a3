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
use std::rc::Rc;
use fish_env::function::FunctionSet;

impl SetFunctions {
    /// Executes the command.
    pub fn execute(self, functions: &mut FunctionSet) -> Result<String, Vec<ExecuteError>> {
        let mut errors = Vec::new();

        for name in self.functions {
            for &(attr, state) in &self.attrs {
                match (attr, state) {
                    (FunctionAttr::ReadOnly, State::On) => {
                        match functions.unset(&name.value) {
                            Ok(None) => {
                                errors.push(ExecuteError::ModifyUnsetFunction(name.clone()));
                            }

                            Err(_) => { /* The function is already read-only, do nothing. */ }

                            Ok(Some(mut function)) => {
                                Rc::make_mut(&mut function).read_only_location =
                                    Some(name.origin.clone());
                                functions
                                    .define(function)
                                    .unwrap_or_else(|e| unreachable!("{e:?}"));
                            }
                        }
                    }

                    (FunctionAttr::ReadOnly, State::Off) => match functions.get(&name.value) {
                        None => errors.push(ExecuteError::ModifyUnsetFunction(name.clone())),

                        Some(function) => {
                            if let Some(read_only_location) = function.read_only_location.clone() {
                                errors.push(ExecuteError::UndoReadOnlyFunction(
                                    UndoReadOnlyError {
                                        name: name.clone(),
                                        read_only_location,
                                    },
                                ));
                            }
                        }
                    },
                }
            }
        }

        if errors.is_empty() {
            Ok(String::new())
        } else {
            Err(errors)
        }
    }
}
