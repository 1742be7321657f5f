//! Fixed-size pool of worker tasks draining one FIFO queue.
//!
//! The receive loop submits one task per datagram and never waits for it.
//! Workers take tasks in submission order, but completion order across
//! workers is unspecified.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type Task = BoxFuture<'static, ()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("worker pool is closed")]
    Closed,
}

pub struct WorkerPool {
    queue: mpsc::UnboundedSender<Task>,
    shutdown: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl WorkerPool {
    /// Spawn `worker_count` workers on the current tokio runtime.
    /// A count of zero is raised to one.
    #[must_use]
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (queue, receiver) = mpsc::unbounded_channel::<Task>();
        let receiver = Arc::new(Mutex::new(receiver));
        let shutdown = CancellationToken::new();

        let workers = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&receiver),
                    shutdown.clone(),
                ))
            })
            .collect();

        debug!(worker_count, "Worker pool started");

        Self {
            queue,
            shutdown,
            workers: Mutex::new(workers),
            worker_count,
        }
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Enqueue a unit of work and return immediately.
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }
        self.queue
            .send(task.boxed())
            .map_err(|_| PoolError::Closed)
    }

    /// Enqueue a unit of work and get a handle to its eventual result.
    /// The receiver errors if the task is discarded at shutdown.
    pub fn submit_with_result<F, T>(&self, task: F) -> Result<oneshot::Receiver<T>, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.submit(async move {
            let _ = tx.send(task.await);
        })?;
        Ok(rx)
    }

    /// Stop accepting work, let in-flight tasks finish, and join every
    /// worker. Queued tasks that have not started are dropped. Idempotent.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let workers = std::mem::take(&mut *self.workers.lock().await);
        if workers.is_empty() {
            return;
        }

        for handle in workers {
            if let Err(err) = handle.await {
                warn!(error = %err, "Worker task ended abnormally");
            }
        }
        debug!(worker_count = self.worker_count, "Worker pool stopped");
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Task>>>,
    shutdown: CancellationToken,
) {
    loop {
        let task = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                task = receiver.recv() => match task {
                    Some(task) => task,
                    None => break,
                },
            }
        };

        task.await;
    }
    debug!(worker_id, "Worker exiting");
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
