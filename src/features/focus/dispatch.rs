//! Marshaling notifications onto a designated execution context.
//!
//! The drive loop runs on a runtime worker thread. A shell that owns a
//! UI thread installs a `ChannelDispatcher` so every callback runs there:
//! immediately when dispatched from the owning thread, queued otherwise.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, ThreadId};

use tracing::debug;

/// A unit of notification work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Delivers notification jobs to an execution context.
pub trait Dispatcher: Send + Sync {
    /// Run `job` on the designated context.
    fn dispatch(&self, job: Job);
}

/// Runs every job immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// Marshals jobs onto the thread that created it.
#[derive(Debug)]
pub struct ChannelDispatcher {
    owner: ThreadId,
    tx: Sender<Job>,
}

/// Receiving side of a `ChannelDispatcher`, drained by the owning thread.
pub struct DispatchQueue {
    rx: Receiver<Job>,
}

impl ChannelDispatcher {
    /// Create a dispatcher owned by the current thread, with its queue.
    #[must_use]
    pub fn for_current_thread() -> (Self, DispatchQueue) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                owner: thread::current().id(),
                tx,
            },
            DispatchQueue { rx },
        )
    }

    /// Whether the caller is on the owning thread.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(&self, job: Job) {
        if self.is_owner() {
            job();
        } else if self.tx.send(job).is_err() {
            debug!("dispatch queue closed; dropping notification");
        }
    }
}

impl DispatchQueue {
    /// Run every queued job. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}

impl std::fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchQueue").finish_non_exhaustive()
    }
}
