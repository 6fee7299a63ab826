//! Background path searches.
//!
//! A [`PathWorker`] owns one thread that pulls [`Pathfinding`] agents from a
//! FIFO channel and runs their searches one after another, reusing a single
//! [`SearchSpace`]. Submitting moves the agent into the queue; it comes back
//! with its path in a [`Completed`] through the [`JobHandle`].
//!
//! ```text
//!  caller ── submit(agent) ──▶ [ job queue ] ──▶ worker thread
//!     ▲                                            │ find path
//!     └──────── JobHandle ◀── Completed ◀──────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread::{self, JoinHandle};

use log::{debug, info, trace};

use crate::config::WorkerConfig;
use crate::error::PathError;
use crate::pathfinding::{Pathfinding, SearchFlag};
use crate::search::SearchSpace;

/// A finished background search.
#[derive(Debug)]
pub struct Completed {
    /// The agent, with its path and targets updated.
    pub agent: Pathfinding,
    /// Outcome of the search.
    pub outcome: Result<(), PathError>,
}

struct Job {
    agent: Pathfinding,
    reply: Sender<Completed>,
}

enum JobSender {
    Unbounded(Sender<Job>),
    Bounded(SyncSender<Job>),
}

impl JobSender {
    fn send(&self, job: Job) -> Result<(), Job> {
        match self {
            Self::Unbounded(tx) => tx.send(job).map_err(|e| e.0),
            Self::Bounded(tx) => tx.send(job).map_err(|e| e.0),
        }
    }
}

/// Handle to one submitted search.
#[derive(Debug)]
pub struct JobHandle {
    searching: SearchFlag,
    reply: Receiver<Completed>,
}

impl JobHandle {
    /// Whether the search is still queued or running. Once this turns
    /// `false` the result is available from [`Self::try_finish`].
    pub fn is_searching(&self) -> bool {
        self.searching.is_set()
    }

    /// Take the result if the search has finished.
    pub fn try_finish(&self) -> Option<Completed> {
        self.reply.try_recv().ok()
    }

    /// Block until the search has finished.
    pub fn wait(self) -> Result<Completed, PathError> {
        self.reply.recv().map_err(|_| PathError::WorkerStopped)
    }
}

/// Single-threaded background executor for path searches.
pub struct PathWorker {
    name: String,
    sender: Option<JobSender>,
    handle: Option<JoinHandle<()>>,
    pending: Arc<AtomicUsize>,
}

impl PathWorker {
    /// Spawn the worker thread.
    pub fn start(config: WorkerConfig) -> Result<Self, PathError> {
        let (sender, rx) = match config.capacity {
            Some(capacity) => {
                let (tx, rx) = mpsc::sync_channel(capacity);
                (JobSender::Bounded(tx), rx)
            }
            None => {
                let (tx, rx) = mpsc::channel();
                (JobSender::Unbounded(tx), rx)
            }
        };
        let pending = Arc::new(AtomicUsize::new(0));
        let worker_pending = Arc::clone(&pending);
        let handle = thread::Builder::new()
            .name(config.name.clone())
            .spawn(move || run(rx, worker_pending))
            .map_err(|e| PathError::WorkerSpawn(e.to_string()))?;

        info!(
            "[PathWorker] {} started (capacity {:?})",
            config.name, config.capacity
        );
        Ok(Self {
            name: config.name,
            sender: Some(sender),
            handle: Some(handle),
            pending,
        })
    }

    /// Queue a search for `agent`.
    ///
    /// The agent's searching flag is raised immediately and lowered once the
    /// result has been posted. Blocks while a bounded queue is full.
    pub fn submit(&self, agent: Pathfinding) -> Result<JobHandle, PathError> {
        let Some(sender) = &self.sender else {
            return Err(PathError::WorkerStopped);
        };
        let searching = agent.search_flag();
        let (reply, rx) = mpsc::channel();

        searching.set(true);
        self.pending.fetch_add(1, Ordering::AcqRel);
        if sender.send(Job { agent, reply }).is_err() {
            searching.set(false);
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(PathError::WorkerStopped);
        }
        Ok(JobHandle {
            searching,
            reply: rx,
        })
    }

    /// Number of submitted searches that have not finished yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Whether the worker thread is running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Close the queue, finish every job already queued, and join the
    /// thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender lets the worker drain the queue and exit.
        self.sender = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("[PathWorker] {} panicked", self.name);
            }
            info!("[PathWorker] {} stopped", self.name);
        }
    }
}

impl Drop for PathWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(rx: Receiver<Job>, pending: Arc<AtomicUsize>) {
    let mut space = SearchSpace::default();
    while let Ok(Job { mut agent, reply }) = rx.recv() {
        let searching = agent.search_flag();
        let outcome = agent.search_all(&mut space);
        match &outcome {
            Ok(()) => trace!("[PathWorker] job done: {} steps", agent.path().len()),
            Err(e) => debug!("[PathWorker] job failed: {e}"),
        }
        if reply.send(Completed { agent, outcome }).is_err() {
            debug!("[PathWorker] result dropped, handle is gone");
        }
        searching.set(false);
        pending.fetch_sub(1, Ordering::AcqRel);
    }
}
