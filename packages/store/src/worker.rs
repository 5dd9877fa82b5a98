//! The background persistence worker and completion tickets.
//!
//! A [`PersistenceWorker`] owns one thread that runs queued jobs in
//! submission order. Every store in the process shares
//! [`PersistenceWorker::global`] unless it was built with its own worker.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};

use dotconf_core::Error;

use crate::sync::lock;

/// A unit of work run on the worker thread.
pub(crate) trait PersistJob: Send + Sync {
    fn run(&self);

    /// Used in log lines.
    fn describe(&self) -> String;
}

#[derive(Default)]
struct WorkerState {
    queue: VecDeque<Arc<dyn PersistJob>>,
    started: bool,
    shutdown: bool,
}

struct WorkerInner {
    state: Mutex<WorkerState>,
    cv: Condvar,
}

/// A single background thread that writes stores to disk.
///
/// The thread is spawned on the first submitted job. If spawning fails, or
/// after [`shutdown`](Self::shutdown), jobs run inline on the submitting
/// thread instead of being dropped.
pub struct PersistenceWorker {
    name: String,
    inner: Arc<WorkerInner>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

static GLOBAL: OnceLock<Arc<PersistenceWorker>> = OnceLock::new();

impl PersistenceWorker {
    /// Create a worker whose thread will carry `name`.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            inner: Arc::new(WorkerInner {
                state: Mutex::new(WorkerState::default()),
                cv: Condvar::new(),
            }),
            thread: Mutex::new(None),
        })
    }

    /// The process-wide worker shared by default-built stores.
    pub fn global() -> Arc<Self> {
        GLOBAL
            .get_or_init(|| PersistenceWorker::new("dotconf-persist"))
            .clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of jobs waiting to run.
    pub fn queued(&self) -> usize {
        lock(&self.inner.state).queue.len()
    }

    pub fn is_shut_down(&self) -> bool {
        lock(&self.inner.state).shutdown
    }

    pub(crate) fn submit(&self, job: Arc<dyn PersistJob>) {
        let mut state = lock(&self.inner.state);

        if state.shutdown {
            drop(state);
            log::warn!(
                "{} is shut down, saving {} on the calling thread",
                self.name,
                job.describe()
            );
            run_job(job.as_ref());
            return;
        }

        if !state.started {
            match self.spawn() {
                Ok(handle) => {
                    *lock(&self.thread) = Some(handle);
                    state.started = true;
                }
                Err(e) => {
                    drop(state);
                    log::error!(
                        "failed to start {}: {}, saving {} on the calling thread",
                        self.name,
                        e,
                        job.describe()
                    );
                    run_job(job.as_ref());
                    return;
                }
            }
        }

        state.queue.push_back(job);
        self.inner.cv.notify_one();
    }

    /// Run every queued job, then stop the thread.
    ///
    /// Jobs submitted afterwards run inline.
    pub fn shutdown(&self) {
        {
            let mut state = lock(&self.inner.state);
            state.shutdown = true;
            self.inner.cv.notify_all();
        }

        let Some(handle) = lock(&self.thread).take() else {
            return;
        };

        if handle.thread().id() == thread::current().id() {
            return;
        }

        if handle.join().is_err() {
            log::error!("{} exited with a panic", self.name);
        }
    }

    fn spawn(&self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new().name(self.name.clone()).spawn({
            let inner = self.inner.clone();
            move || run_worker(inner)
        })
    }
}

impl fmt::Debug for PersistenceWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceWorker")
            .field("name", &self.name)
            .field("queued", &self.queued())
            .finish()
    }
}

fn run_worker(inner: Arc<WorkerInner>) {
    loop {
        let job = {
            let mut state = lock(&inner.state);
            loop {
                if let Some(job) = state.queue.pop_front() {
                    break job;
                }
                if state.shutdown {
                    return;
                }
                state = inner.cv.wait(state).unwrap_or_else(PoisonError::into_inner);
            }
        };

        run_job(job.as_ref());
    }
}

fn run_job(job: &dyn PersistJob) {
    if panic::catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
        log::error!("persist job for {} panicked", job.describe());
    }
}

type Outcome = Result<(), Arc<Error>>;

/// Completion state shared between a queued write and its waiters.
#[derive(Default)]
pub(crate) struct Ticket {
    outcome: Mutex<Option<Outcome>>,
    cv: Condvar,
}

impl Ticket {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn complete(&self, result: Result<(), Error>) {
        let mut outcome = lock(&self.outcome);
        *outcome = Some(result.map_err(Arc::new));
        self.cv.notify_all();
    }

    fn is_done(&self) -> bool {
        lock(&self.outcome).is_some()
    }

    fn wait(&self) -> Outcome {
        let mut outcome = lock(&self.outcome);
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            outcome = self.cv.wait(outcome).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// A handle on a scheduled write.
///
/// Several handles may share one write when requests were coalesced.
#[derive(Clone)]
pub struct PersistHandle {
    file: PathBuf,
    ticket: Arc<Ticket>,
}

impl PersistHandle {
    pub(crate) fn new(file: PathBuf, ticket: Arc<Ticket>) -> Self {
        Self { file, ticket }
    }

    /// Block until the write has finished.
    ///
    /// A failed write is reported as [`Error::Persist`].
    pub fn wait(&self) -> Result<(), Error> {
        self.ticket.wait().map_err(|source| Error::Persist {
            path: self.file.clone(),
            source,
        })
    }

    pub fn is_done(&self) -> bool {
        self.ticket.is_done()
    }

    pub fn file(&self) -> &std::path::Path {
        &self.file
    }
}

impl fmt::Debug for PersistHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistHandle")
            .field("file", &self.file)
            .field("done", &self.is_done())
            .finish()
    }
}
