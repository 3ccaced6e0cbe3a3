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

// `FdReader` definition

use super::{Context, Input, Result};
use crate::io::Fd;
use crate::option::State;
use crate::system::{SharedSystem, System};
use std::cell::Cell;
use std::rc::Rc;
use std::slice::from_mut;

/// Input function that reads from a file descriptor.
///
/// An instance of `FdReader` contains a [`SharedSystem`] to interact with the
/// file descriptor.
///
/// Although `FdReader` implements `Clone`, it does not mean you can create and
/// keep a copy of a `FdReader` instance to replay the input later. Since both
/// the original and clone share the same `SharedSystem`, reading a line from
/// one instance will affect the next read from the other.
#[derive(Clone, Debug)]
#[must_use = "FdReader does nothing unless used by a parser"]
pub struct FdReader<S> {
    /// File descriptor to read from
    fd: Fd,
    /// System to interact with the FD
    system: SharedSystem<S>,
    /// Whether lines read are echoed to stderr
    echo: Option<Rc<Cell<State>>>,
}

impl<S> FdReader<S> {
    /// Creates a new `FdReader` instance.
    ///
    /// The `fd` argument is the file descriptor to read from. It should be
    /// readable, have the close-on-exec flag set, and remain open for the
    /// lifetime of the `FdReader` instance.
    pub fn new(fd: Fd, system: SharedSystem<S>) -> Self {
        let echo = None;
        FdReader { fd, system, echo }
    }

    /// Sets the "echo" flag.
    ///
    /// You can use this setter function to set a shared option state that
    /// controls whether the input function echoes lines it reads to the
    /// standard error. If `echo` is `None` or some shared cell containing
    /// `Off`, the function does not echo. If a cell has `On`, the function
    /// prints every line it reads to the standard error.
    ///
    /// This option implements the behavior of the `verbose` shell option. You
    /// can change the state of the shared cell through the lifetime of the
    /// input function to reflect the option dynamically changed, which will
    /// affect the next `next_line` call.
    ///
    /// # Deprecation
    ///
    /// This function is deprecated in favor of the [`Echo`] struct.
    ///
    /// [`Echo`]: super::Echo
    #[deprecated = "use Echo instead"]
    pub fn set_echo(&mut self, echo: Option<Rc<Cell<State>>>) {
        self.echo = echo;
    }
}

impl<S: System> Input for FdReader<S> {
    async fn next_line(&mut self, _context: &Context) -> Result {
        // TODO Read many bytes at once if seekable

        let mut bytes = Vec::new();
        loop {
            let mut byte = 0;
            match self.system.read_async(self.fd, from_mut(&mut byte)).await {
                // End of input
                Ok(0) => break,

                Ok(count) => {
                    assert_eq!(count, 1);
                    bytes.push(byte);
                    if byte == b'\n' {
                        break;
                    }
                }

                Err(errno) => return Err(errno.into()),
            }
        }

        // TODO Reject invalid UTF-8 sequence if strict POSIX mode is on
        let line = String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(&e.into_bytes()).into());

        if let Some(echo) = &self.echo {
            if echo.get() == State::On {
                let _ = self.system.write_all(Fd::STDERR, line.as_bytes()).await;
            }
        }

        Ok(line)
    }
}
