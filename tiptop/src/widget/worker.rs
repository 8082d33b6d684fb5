//! Background job runner
//!
//! Runs a blocking job on its own thread, one request at a time. The
//! event loop asks for a fresh result with [`Worker::request`] and collects it
//! with [`Worker::wait`], which gives up after a fixed budget so a slow job
//! never holds up other widgets. A result that misses the budget is picked up
//! on a later tick. A job that panics yields no result for that request; the
//! thread stays up for the next one.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use tracing::warn;

pub struct Worker<T> {
    name: String,
    requests: Option<Sender<()>>,
    // None marks a job that panicked
    results: Receiver<Option<T>>,
    pending: bool,
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Worker<T> {
    pub fn spawn<F>(name: &str, mut job: F) -> io::Result<Worker<T>>
    where
        F: FnMut() -> T + Send + 'static,
    {
        let (request_tx, request_rx) = channel::bounded::<()>(1);
        let (result_tx, result_rx) = channel::bounded::<Option<T>>(1);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                for () in request_rx.iter() {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| job())).ok();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Worker {
            name: name.to_string(),
            requests: Some(request_tx),
            results: result_rx,
            pending: false,
            handle: Some(handle),
        })
    }

    /// Whether a request is out and its result not yet collected.
    pub fn pending(&self) -> bool {
        self.pending
    }

    /// Starts a job unless one is already running.
    pub fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        let sent = match &self.requests {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        };
        self.pending = sent;
        sent
    }

    /// Result of the outstanding job, waiting at most `budget` for it.
    pub fn wait(&mut self, budget: Duration) -> Option<T> {
        if !self.pending {
            return None;
        }
        match self.results.recv_timeout(budget) {
            Ok(Some(result)) => {
                self.pending = false;
                Some(result)
            }
            Ok(None) => {
                warn!("{}: job panicked, will retry on the next request", self.name);
                self.pending = false;
                None
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("{}: worker thread exited", self.name);
                self.pending = false;
                None
            }
        }
    }
}

impl<T> Drop for Worker<T> {
    fn drop(&mut self) {
        // Closing the request channel ends the thread once its job returns.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
