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

//! Showing resource limits

use super::Error;
use super::ResourceExt as _;
use super::ShowLimitType;
use std::fmt::Write as _;
use fish_env::system::resource::rlim_t;
use fish_env::system::resource::LimitPair;
use fish_env::system::resource::Resource;
use fish_env::system::resource::RLIM_INFINITY;
use fish_env::system::Errno;

/// A wrapper for `rlim_t` that implements `Display`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct Limit {
    value: rlim_t,
    scale: rlim_t,
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.value == RLIM_INFINITY {
            "unlimited".fmt(f)
        } else {
            (self.value / self.scale).fmt(f)
        }
    }
}

/// Shows the current limits for all resources.
///
/// Returns a string that contains the current limits for all resources.
/// Each line shows the option, description, and limit for a resource.
pub fn show_all<F>(mut getrlimit: F, limit_type: ShowLimitType) -> String
where
    F: FnMut(Resource) -> Result<LimitPair, Errno>,
{
    let mut result = String::with_capacity(1024);
    for &resource in Resource::ALL {
        let Ok(limits) = getrlimit(resource) else {
            continue;
        };
        let option = resource.option();
        let desc = resource.description();
        let value = match limit_type {
            ShowLimitType::Soft => limits.soft,
            ShowLimitType::Hard => limits.hard,
        };
        let scale = resource.scale();
        let limit = Limit { value, scale };
        writeln!(result, "-{option}: {desc:<32} {limit}").unwrap();
    }
    result
}

/// Shows the current limits for the specified resource.
///
/// Returns a string that contains the current limit for the specified resource,
/// followed by a newline.
pub fn show_one<F>(
    getrlimit: F,
    resource: Resource,
    limit_type: ShowLimitType,
) -> Result<String, Error>
where
    F: FnOnce(Resource) -> Result<LimitPair, Errno>,
{
    match getrlimit(resource) {
        Ok(limits) => {
            let value = match limit_type {
                ShowLimitType::Soft => limits.soft,
                ShowLimitType::Hard => limits.hard,
            };
            let scale = resource.scale();
            let limit = Limit { value, scale };
            Ok(format!("{}\n", limit))
        }

        Err(Errno::EINVAL) => Err(Error::UnsupportedResource),
        Err(errno) => Err(Error::Unknown(errno)),
    }
}
