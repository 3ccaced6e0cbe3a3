//! Jobs and the processes that make them up.

use crate::io::IoChain;
#[doc(no_inline)]
pub use nix::sys::wait::WaitStatus;
#[doc(no_inline)]
pub use nix::unistd::Pid;

/// What a [`Process`] runs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProcessKind {
    External,
    Builtin,
    Function,
    Block,
    Exec,
}

/// A single stage in a pipeline.
///
/// Processes in a [`Job`] form a singly linked list via [`Process::next`],
/// in pipeline order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Process {
    pub kind: ProcessKind,
    pub argv: Vec<String>,
    /// Resolved from `$PATH` or path lookup and cached at build time, not
    /// exec time.
    pub actual_path: Option<String>,
    pub io_chain: IoChain,
    pub pid: Option<Pid>,
    pub completed: bool,
    pub stopped: bool,
    pub exit_status: Option<i32>,
    pub next: Option<Box<Process>>,
}

impl Process {
    pub fn new(kind: ProcessKind, argv: Vec<String>) -> Self {
        Process {
            kind,
            argv,
            actual_path: None,
            io_chain: IoChain::new(),
            pid: None,
            completed: false,
            stopped: false,
            exit_status: None,
            next: None,
        }
    }

    /// Appends `process` to the end of this process's `next` chain.
    pub fn push(&mut self, process: Process) {
        match &mut self.next {
            Some(next) => next.push(process),
            None => self.next = Some(Box::new(process)),
        }
    }

    /// Iterates this process and every process chained after it, in
    /// pipeline order.
    pub fn iter(&self) -> ProcessIter<'_> {
        ProcessIter { current: Some(self) }
    }

    /// The last process in this chain: the one whose exit status the job
    /// reports (unless the job is [`JobFlags::NEGATED`]).
    pub fn last(&self) -> &Process {
        self.iter().last().expect("a process chain always has at least one element")
    }

    pub fn all_completed(&self) -> bool {
        self.iter().all(|p| p.completed)
    }
}

pub struct ProcessIter<'a> {
    current: Option<&'a Process>,
}

impl<'a> Iterator for ProcessIter<'a> {
    type Item = &'a Process;

    fn next(&mut self) -> Option<&'a Process> {
        let process = self.current?;
        self.current = process.next.as_deref();
        Some(process)
    }
}

bitflags::bitflags! {
    /// Per-job flags (spec §3's `Job` flags).
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct JobFlags: u32 {
        const FOREGROUND = 1 << 0;
        /// The job runs in its own process group.
        const CONTROLLED = 1 << 1;
        /// The job owns the controlling terminal while it runs.
        const TERMINAL = 1 << 2;
        /// The job's reported status is logically inverted (`not`).
        const NEGATED = 1 << 3;
        const SKIP = 1 << 4;
        const SKIP_NOTIFICATION = 1 << 5;
        const WILDCARD_ERROR = 1 << 6;
        const ELSE_IF_CONTINUATION = 1 << 7;
    }
}

/// A pipeline: an ordered, linked list of [`Process`]es plus job-wide state.
///
/// Invariants: a job has at least one process (`first`). `pgid` is `None`
/// until the first process is forked, and fixed for the job's lifetime
/// thereafter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    pub job_id: u32,
    pub command_source: String,
    pub first: Process,
    pub pgid: Option<Pid>,
    pub io_chain: IoChain,
    pub flags: JobFlags,
    pub tmodes: Option<nix::sys::termios::Termios>,
}

impl Job {
    pub fn new(job_id: u32, command_source: impl Into<String>, first: Process) -> Self {
        Job {
            job_id,
            command_source: command_source.into(),
            first,
            pgid: None,
            io_chain: IoChain::new(),
            flags: JobFlags::empty(),
            tmodes: None,
        }
    }

    pub fn processes(&self) -> ProcessIter<'_> {
        self.first.iter()
    }

    pub fn is_completed(&self) -> bool {
        self.first.all_completed()
    }

    /// The status the job reports: the last process's exit status, inverted
    /// if [`JobFlags::NEGATED`] is set.
    pub fn reported_status(&self) -> Option<i32> {
        let status = self.first.last().exit_status?;
        Some(if self.flags.contains(JobFlags::NEGATED) {
            i32::from(status == 0)
        } else {
            status
        })
    }
}

/// Collection of jobs, tracking job IDs and the most recent background pid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JobSet {
    jobs: Vec<Job>,
    next_job_id: u32,
    last_async_pid: Option<Pid>,
}

impl Default for JobSet {
    fn default() -> Self {
        JobSet::new()
    }
}

impl JobSet {
    pub fn new() -> Self {
        JobSet { jobs: Vec::new(), next_job_id: 1, last_async_pid: None }
    }

    /// Assigns the next job ID and inserts `job` (its `job_id` is
    /// overwritten).
    pub fn insert(&mut self, mut job: Job) -> u32 {
        let id = self.next_job_id;
        self.next_job_id += 1;
        job.job_id = id;
        self.jobs.push(job);
        id
    }

    pub fn get(&self, job_id: u32) -> Option<&Job> {
        self.jobs.iter().find(|j| j.job_id == job_id)
    }

    pub fn get_mut(&mut self, job_id: u32) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.job_id == job_id)
    }

    /// Removes every job that has completed, per [`Job::is_completed`].
    pub fn remove_completed(&mut self) {
        self.jobs.retain(|j| !j.is_completed());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Job> {
        self.jobs.iter()
    }

    pub fn last_async_pid(&self) -> Option<Pid> {
        self.last_async_pid
    }

    pub fn set_last_async_pid(&mut self, pid: Pid) {
        self.last_async_pid = Some(pid);
    }
}
