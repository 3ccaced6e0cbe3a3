// This file is part of yash, an extended POSIX shell.
// Copyright (C) 2024 WATANABE Yuki
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

//! Command search
//!
//! This module provides the search functionality of the `command` built-in.
//! It is based on the [`fish_semantics::command_search`] module, but it adds
//! the ability to select the category of the command to search for.

use super::Category;
use super::Search;
use std::ffi::CStr;
use std::rc::Rc;
use fish_env::Env;
use fish_env::builtin::Builtin;
use fish_env::function::Function;
use fish_env::system::System;
use fish_env::variable::Expansion;

/// Environment adapter for applying the search parameters
///
/// This type implements the [`fish_semantics::command_search::SearchEnv`] trait
/// by extracting results from the environment filtered by the search
/// parameters.
#[derive(Debug)]
pub struct SearchEnv<'a> {
    pub env: &'a mut Env,
    pub params: &'a Search,
}

impl fish_semantics::command_search::PathEnv for SearchEnv<'_> {
    /// Returns the path.
    ///
    /// If [`Search::standard_path`] is `true`, this function retrieves the
    /// standard path from the environment using [`System::confstr_path`].
    /// Otherwise, the value of the `$PATH` variable is returned.
    fn path(&self) -> Expansion<'_> {
        if self.params.standard_path {
            match self.env.system.confstr_path() {
                Ok(path) => match path.into_string() {
                    Ok(path) => path.into(),
                    Err(_) => Expansion::Unset,
                },
                Err(_) => Expansion::Unset,
            }
        } else {
            self.env.path()
        }
    }

    #[inline]
    fn is_executable_file(&self, path: &CStr) -> bool {
        self.env.is_executable_file(path)
    }
}

impl fish_semantics::command_search::SearchEnv for SearchEnv<'_> {
    fn builtin(&self, name: &str) -> Option<Builtin> {
        if self.params.categories.contains(Category::Builtin) {
            self.env.builtin(name)
        } else {
            None
        }
    }

    fn function(&self, name: &str) -> Option<&Rc<Function>> {
        if self.params.categories.contains(Category::Function) {
            self.env.function(name)
        } else {
            None
        }
    }
}
