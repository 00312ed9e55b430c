//! Dedicated database thread.
//!
//! Every database access goes through one worker that owns the
//! [`Connection`]. Jobs are numbered as they are submitted; the
//! [`JobTracker`] records how far the worker got so that
//! [`Database::interrupt_current_query`] can wait until every job issued
//! before it has actually stopped.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use rusqlite::InterruptHandle;
use tracing::{debug, error, info};

use crate::connection::Connection;
use crate::error::{ErrorInfo, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbState {
    Uninitialized,
    Open,
    Closed,
}

impl DbState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DbState::Uninitialized,
            1 => DbState::Open,
            _ => DbState::Closed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            DbState::Uninitialized => 0,
            DbState::Open => 1,
            DbState::Closed => 2,
        }
    }
}

type Job = Box<dyn FnOnce(&mut Connection, &JobContext) + Send>;

struct Envelope {
    seq: u64,
    interruptible: bool,
    job: Job,
}

#[derive(Default)]
struct Progress {
    issued: u64,
    completed: u64,
    /// `(seq, interruptible)` of the job on the worker right now
    running: Option<(u64, bool)>,
}

#[derive(Default)]
struct JobTracker {
    progress: Mutex<Progress>,
    finished: Condvar,
    /// Jobs with a sequence number up to this one are cancelled
    cancel_through: AtomicU64,
}

/// Handed to each job so long-running work can notice cancellation.
pub struct JobContext {
    seq: u64,
    tracker: Arc<JobTracker>,
}

impl JobContext {
    pub fn is_cancelled(&self) -> bool {
        self.tracker.cancel_through.load(Ordering::Acquire) >= self.seq
    }
}

enum Source {
    File(PathBuf),
    Memory,
}

/// Handle to the database worker. Cheap to share behind an `Arc`.
pub struct Database {
    sender: Mutex<Option<kanal::Sender<Envelope>>>,
    tracker: Arc<JobTracker>,
    state: Arc<AtomicU8>,
    interrupt: InterruptHandle,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Database {
    /// Spawns the worker, opens the user store at `path` and migrates it.
    /// Returns once the store is open, or with the startup error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::start(Source::File(path.into()))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::start(Source::Memory)
    }

    fn start(source: Source) -> Result<Self, StorageError> {
        let (sender, receiver) = kanal::unbounded::<Envelope>();
        let (ready_tx, ready_rx) = kanal::bounded::<Result<InterruptHandle, StorageError>>(1);
        let tracker = Arc::new(JobTracker::default());
        let state = Arc::new(AtomicU8::new(DbState::Uninitialized.as_u8()));

        let thread = {
            let tracker = tracker.clone();
            let state = state.clone();
            std::thread::Builder::new()
                .name("tango-db".into())
                .spawn(move || {
                    let opened = match source {
                        Source::File(path) => Connection::open_user_store(path),
                        Source::Memory => Connection::open_in_memory(),
                    };
                    let conn = match opened {
                        Ok(conn) => {
                            state.store(DbState::Open.as_u8(), Ordering::Release);
                            let _ = ready_tx.send(Ok(conn.interrupt_handle()));
                            conn
                        }
                        Err(e) => {
                            state.store(DbState::Closed.as_u8(), Ordering::Release);
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                    run_worker(conn, receiver, tracker, state);
                })?
        };

        let interrupt = ready_rx.recv().map_err(|_| StorageError::Closed)??;
        info!("Database worker started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            tracker,
            state,
            interrupt,
            thread: Mutex::new(Some(thread)),
        })
    }

    pub fn state(&self) -> DbState {
        DbState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn submit(
        &self,
        interruptible: bool,
        job: impl FnOnce(&mut Connection, &JobContext) + Send + 'static,
    ) -> Result<(), StorageError> {
        let sender = self.sender.lock();
        let sender = sender.as_ref().ok_or(StorageError::Closed)?;
        // Numbering and sending under one lock keeps queue order == seq order.
        let mut progress = self.tracker.progress.lock();
        let seq = progress.issued + 1;
        sender
            .send(Envelope {
                seq,
                interruptible,
                job: Box::new(job),
            })
            .map_err(|_| StorageError::Closed)?;
        progress.issued = seq;
        Ok(())
    }

    /// Queues a job that [`Self::interrupt_current_query`] may cut short.
    /// Fire-and-forget: results travel back through whatever channel the
    /// job captured.
    pub fn submit_query(
        &self,
        job: impl FnOnce(&mut Connection, &JobContext) + Send + 'static,
    ) -> Result<(), StorageError> {
        self.submit(true, job)
    }

    /// Runs `f` on the worker and blocks until it returns.
    pub fn call<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> T + Send + 'static,
    {
        let (tx, rx) = kanal::bounded::<T>(1);
        self.submit(false, move |conn, _| {
            let _ = tx.send(f(conn));
        })?;
        rx.recv().map_err(|_| StorageError::Closed)
    }

    /// Like [`Self::call`] but awaits the result instead of blocking.
    pub async fn call_async<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> T + Send + 'static,
    {
        let (tx, rx) = kanal::bounded::<T>(1);
        self.submit(false, move |conn, _| {
            let _ = tx.send(f(conn));
        })?;
        rx.to_async().recv().await.map_err(|_| StorageError::Closed)
    }

    pub fn attach(
        &self,
        path: impl Into<PathBuf>,
        alias: &str,
        expected_version: u32,
    ) -> Result<(), StorageError> {
        let path = path.into();
        let alias = alias.to_string();
        Ok(self.call(move |conn| conn.attach(path, &alias, expected_version))??)
    }

    pub fn detach(&self, alias: &str) -> Result<bool, StorageError> {
        let alias = alias.to_string();
        self.call(move |conn| conn.detach(&alias))
    }

    pub fn last_error(&self) -> Result<Option<ErrorInfo>, StorageError> {
        self.call(|conn| conn.last_error().cloned())
    }

    /// Stops every job submitted so far and returns once the worker has
    /// finished with them. Queued jobs that have not started are skipped by
    /// their own cancellation check; a running query is interrupted inside
    /// SQLite. Must not be called from a job.
    pub fn interrupt_current_query(&self) {
        let mut progress = self.tracker.progress.lock();
        let target = progress.issued;
        self.tracker
            .cancel_through
            .fetch_max(target, Ordering::AcqRel);

        if let Some((seq, true)) = progress.running {
            debug!(seq, "Interrupting running query");
            self.interrupt.interrupt();
        }

        while progress.completed < target {
            self.tracker.finished.wait(&mut progress);
        }
    }

    /// Lets queued jobs drain, then stops the worker. Further calls fail
    /// with [`StorageError::Closed`].
    pub fn close(&self) {
        if self.sender.lock().take().is_none() {
            return;
        }
        if let Some(thread) = self.thread.lock().take() {
            if thread.join().is_err() {
                error!("Database worker panicked");
            }
        }
        self.state.store(DbState::Closed.as_u8(), Ordering::Release);
        info!("Database closed");
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker(
    mut conn: Connection,
    receiver: kanal::Receiver<Envelope>,
    tracker: Arc<JobTracker>,
    state: Arc<AtomicU8>,
) {
    // Releases anyone waiting on progress even if a job panics.
    let _guard = WorkerGuard {
        tracker: tracker.clone(),
        state,
    };

    while let Ok(Envelope {
        seq,
        interruptible,
        job,
    }) = receiver.recv()
    {
        tracker.progress.lock().running = Some((seq, interruptible));

        let ctx = JobContext {
            seq,
            tracker: tracker.clone(),
        };
        job(&mut conn, &ctx);

        let mut progress = tracker.progress.lock();
        progress.running = None;
        progress.completed = seq;
        tracker.finished.notify_all();
    }
    debug!("Database worker exiting");
}

struct WorkerGuard {
    tracker: Arc<JobTracker>,
    state: Arc<AtomicU8>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.state.store(DbState::Closed.as_u8(), Ordering::Release);
        let mut progress = self.tracker.progress.lock();
        progress.running = None;
        progress.completed = progress.issued;
        self.tracker.finished.notify_all();
    }
}
