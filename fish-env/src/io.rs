//! File descriptors and redirections.

use std::fmt;

/// A file descriptor number.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub i32);

impl Fd {
    /// Standard input.
    pub const STDIN: Fd = Fd(0);
    /// Standard output.
    pub const STDOUT: Fd = Fd(1);
    /// Standard error.
    pub const STDERR: Fd = Fd(2);
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Fd {
    fn from(raw: i32) -> Self {
        Fd(raw)
    }
}

bitflags::bitflags! {
    /// Flags controlling how a redirection's target file is opened.
    ///
    /// Combinations match the open-flag sets named in `>`/`>>`/`>|`/`>?`/`<`.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct OpenFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const CREATE = 1 << 2;
        const TRUNCATE = 1 << 3;
        const APPEND = 1 << 4;
        const EXCLUSIVE = 1 << 5;
    }
}

impl OpenFlags {
    /// `>`: create, truncate, write-only.
    pub const OVERWRITE: Self = Self::CREATE.union(Self::TRUNCATE).union(Self::WRITE);
    /// `>>`: create, append, write-only.
    pub const APPEND_MODE: Self = Self::CREATE.union(Self::APPEND).union(Self::WRITE);
    /// `>|`: create, write-only, truncate, bypassing no-clobber.
    pub const CLOBBER: Self = Self::CREATE.union(Self::WRITE).union(Self::TRUNCATE);
    /// `>?`: create, exclusive, write-only (no-clobber).
    pub const NO_CLOBBER: Self = Self::CREATE.union(Self::WRITE).union(Self::EXCLUSIVE);
    /// `<`: read-only.
    pub const READ_ONLY: Self = Self::READ;
}

/// Which end of a pipe a [`RedirectionMode::Pipe`] redirection refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PipeEnd {
    Read,
    Write,
}

/// What a [`Redirection`] does to its target fd.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RedirectionMode {
    /// Open `target` (a filename) with the given flags and dup it onto `fd`.
    File(OpenFlags),
    /// Close `fd`.
    CloseFd,
    /// Dup `src_fd` onto `fd`.
    DupFd(Fd),
    /// Connect `fd` to one end of a pipe identified by `pipe_fd_pair`.
    Pipe(PipeEnd, (Fd, Fd)),
}

/// A single redirection: `{fd, mode, target}`.
///
/// `target` is the expanded filename for [`RedirectionMode::File`]; it is
/// unused (left empty) for the other modes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redirection {
    pub fd: Fd,
    pub mode: RedirectionMode,
    pub target: String,
}

impl Redirection {
    pub fn file(fd: Fd, flags: OpenFlags, target: impl Into<String>) -> Self {
        Redirection { fd, mode: RedirectionMode::File(flags), target: target.into() }
    }

    pub fn close(fd: Fd) -> Self {
        Redirection { fd, mode: RedirectionMode::CloseFd, target: String::new() }
    }

    pub fn dup(fd: Fd, src_fd: Fd) -> Self {
        Redirection { fd, mode: RedirectionMode::DupFd(src_fd), target: String::new() }
    }
}

/// An ordered list of redirections; later entries override earlier ones for
/// the same fd, per [`Redirection::fd`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IoChain(pub Vec<Redirection>);

impl IoChain {
    pub fn new() -> Self {
        IoChain(Vec::new())
    }

    pub fn push(&mut self, redirection: Redirection) {
        self.0.push(redirection);
    }

    /// Returns the redirection that wins for `fd`: the last one in the chain
    /// that targets it.
    pub fn effective(&self, fd: Fd) -> Option<&Redirection> {
        self.0.iter().rev().find(|r| r.fd == fd)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Redirection> {
        self.0.iter()
    }
}

impl FromIterator<Redirection> for IoChain {
    fn from_iter<I: IntoIterator<Item = Redirection>>(iter: I) -> Self {
        IoChain(iter.into_iter().collect())
    }
}
