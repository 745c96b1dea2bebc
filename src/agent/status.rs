use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    NotStarted,
    Starting,
    Started,
    Stopping,
    Stopped,
    Failed,
}

/// Shared view of an agent's lifecycle, readable from any thread.
#[derive(Clone, Debug)]
pub struct State {
    status: Arc<AtomicU8>,
}

impl State {
    pub fn new() -> Self {
        Self {
            status: Arc::new(AtomicU8::new(Status::NotStarted as u8)),
        }
    }

    pub fn get(&self) -> Status {
        Status::from(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, status: Status) {
        self.status.store(status as u8, Ordering::Release);
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u8> for Status {
    fn from(n: u8) -> Self {
        match n {
            0 => Status::NotStarted,
            1 => Status::Starting,
            2 => Status::Started,
            3 => Status::Stopping,
            4 => Status::Stopped,
            _ => Status::Failed,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Status::NotStarted => "not started",
            Status::Starting   => "starting",
            Status::Started    => "started",
            Status::Stopping   => "stopping",
            Status::Stopped    => "stopped",
            Status::Failed     => "failed",
        };
        f.write_str(name)
    }
}
