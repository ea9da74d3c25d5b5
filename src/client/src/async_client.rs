use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use packtrack_common::{Event, IngestError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::Client;
use crate::config::AsyncConfig;

/// Upper bound on any single worker-driven batch send, retries included.
const WORKER_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffered, batching front-end over a [`Client`].
///
/// Events are enqueued into a bounded queue and shipped by a background
/// worker in batches, triggered by batch size or by the flush interval,
/// whichever comes first. The worker task is owned by this client: it is
/// spawned at construction and joined by [`AsyncClient::close`].
///
/// Delivery policy is at-most-one-attempt-chain per batch: a batch whose
/// send fails after retry exhaustion is dropped, observable only through the
/// failure hook. Nothing is persisted; events still buffered when the
/// process dies are lost.
///
/// The queue's receiver is shared behind a mutex so that a caller-driven
/// [`AsyncClient::flush`] and the worker serialize their draining: each event
/// is removed by exactly one of them. Flush only ever takes events the
/// worker has not yet claimed; the worker leaves events in the queue until
/// it has a full batch or a timer or shutdown trigger fires.
pub struct AsyncClient {
    shared: Arc<Shared>,
    worker: StdMutex<Option<JoinHandle<()>>>,
}

struct Shared {
    base: Client,
    cfg: AsyncConfig,
    tx: mpsc::Sender<Event>,
    rx: Mutex<mpsc::Receiver<Event>>,
    /// Signalled by enqueue so the worker can check for a full batch.
    notify: Notify,
    shutdown: CancellationToken,
    /// Guards the open -> closed transition against concurrent enqueues.
    closed: StdMutex<bool>,
    /// First error from the final drain, reported by close.
    final_error: StdMutex<Option<IngestError>>,
}

impl AsyncClient {
    /// Spawns the background worker; must be called within a tokio runtime.
    pub fn new(base: Client, cfg: AsyncConfig) -> Result<Self, IngestError> {
        cfg.validate()?;
        let (tx, rx) = mpsc::channel(cfg.queue_capacity);
        let shared = Arc::new(Shared {
            base,
            cfg,
            tx,
            rx: Mutex::new(rx),
            notify: Notify::new(),
            shutdown: CancellationToken::new(),
            closed: StdMutex::new(false),
            final_error: StdMutex::new(None),
        });
        let worker = tokio::spawn(run_worker(Arc::clone(&shared)));
        Ok(Self {
            shared,
            worker: StdMutex::new(Some(worker)),
        })
    }

    /// Non-blocking insert. Fails immediately with [`IngestError::Closed`]
    /// after close, or [`IngestError::QueueFull`] at capacity; never waits
    /// for a send.
    pub fn enqueue(&self, event: Event) -> Result<(), IngestError> {
        let closed = self
            .shared
            .closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return Err(IngestError::Closed);
        }
        match self.shared.tx.try_send(event) {
            Ok(()) => {
                // The guard is still held, so this cannot race the final drain.
                self.shared.notify.notify_one();
                let depth = self.shared.cfg.queue_capacity - self.shared.tx.capacity();
                self.shared.base.hooks().queue_depth(depth);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(IngestError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(IngestError::Closed),
        }
    }

    /// Drains up to one batch worth of currently queued events and sends
    /// them, blocking until the send's outcome is known or the deadline
    /// elapses. An empty queue is a successful no-op. On deadline expiry the
    /// in-flight attempt chain is dropped and [`IngestError::Timeout`] is
    /// returned.
    pub async fn flush(&self, deadline: Duration) -> Result<(), IngestError> {
        match tokio::time::timeout(deadline, self.shared.flush_once()).await {
            Ok(result) => result,
            Err(_) => Err(IngestError::Timeout),
        }
    }

    /// Transitions to closed, rejects further enqueues, has the worker drain
    /// and send everything still buffered, and waits for it to terminate.
    /// Idempotent: closing an already-closed client is a no-op success.
    /// Always returns within the deadline even if the final send fails.
    pub async fn close(&self, deadline: Duration) -> Result<(), IngestError> {
        {
            let mut closed = self
                .shared
                .closed
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *closed {
                return Ok(());
            }
            *closed = true;
        }
        self.shared.shutdown.cancel();

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            match tokio::time::timeout(deadline, worker).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!(error = %join_err, "async worker terminated abnormally");
                }
                Err(_) => {
                    // The worker keeps draining in the background; the caller
                    // is not held past its deadline.
                    warn!("timed out waiting for final drain");
                    return Err(IngestError::Timeout);
                }
            }
        }

        let final_error = self
            .shared
            .final_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match final_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for AsyncClient {
    fn drop(&mut self) {
        // Dropping without close still lets the worker drain and exit.
        self.shared.shutdown.cancel();
    }
}

impl Shared {
    async fn flush_once(&self) -> Result<(), IngestError> {
        let batch = self.drain(self.cfg.batch_size).await;
        if batch.is_empty() {
            return Ok(());
        }
        debug!(count = batch.len(), "flush draining queued events");
        self.base.ingest_batch(&batch).await.map(|_| ())
    }

    /// Removes up to `limit` queued events without blocking. The receiver
    /// lock makes each removal atomic with respect to the other consumer.
    async fn drain(&self, limit: usize) -> Vec<Event> {
        let mut rx = self.rx.lock().await;
        let mut batch = Vec::with_capacity(limit.min(64));
        while batch.len() < limit {
            match rx.try_recv() {
                Ok(event) => batch.push(event),
                Err(_) => break,
            }
        }
        batch
    }

    async fn queued_len(&self) -> usize {
        self.rx.lock().await.len()
    }

    async fn send_from_worker(&self, batch: Vec<Event>) -> Result<(), IngestError> {
        let count = batch.len();
        match tokio::time::timeout(WORKER_SEND_TIMEOUT, self.base.ingest_batch(&batch)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => {
                // Hooks already fired inside the retrying sender.
                warn!(count, error = %err, "background batch send failed; batch dropped");
                Err(err)
            }
            Err(_) => {
                warn!(count, "background batch send timed out; batch dropped");
                self.base.hooks().ingest_failure(count);
                Err(IngestError::Timeout)
            }
        }
    }

    /// Ships everything still queued, in order, in batch-size chunks.
    async fn final_drain(&self) {
        loop {
            let batch = self.drain(self.cfg.batch_size).await;
            if batch.is_empty() {
                return;
            }
            if let Err(err) = self.send_from_worker(batch).await {
                let mut final_error = self
                    .final_error
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if final_error.is_none() {
                    *final_error = Some(err);
                }
            }
        }
    }
}

/// Background worker loop. Runs until the shutdown token fires, then
/// performs one final drain and exits. Single-threaded ownership of the
/// timer removes any need for locking beyond the queue boundary.
async fn run_worker(shared: Arc<Shared>) {
    let batch_size = shared.cfg.batch_size;
    let mut ticker = new_ticker(shared.cfg.flush_interval);

    loop {
        tokio::select! {
            _ = shared.shutdown.cancelled() => {
                shared.final_drain().await;
                debug!("async worker terminated");
                return;
            }
            _ = shared.notify.notified() => {
                // Size trigger: only claim events once a full batch is queued,
                // leaving partial batches for flush or the timer.
                while shared.queued_len().await >= batch_size {
                    let batch = shared.drain(batch_size).await;
                    if batch.is_empty() {
                        break;
                    }
                    let _ = shared.send_from_worker(batch).await;
                    // A size-triggered send restarts the interval clock so a
                    // stale timer does not fire right behind it.
                    reset_ticker(&mut ticker, shared.cfg.flush_interval);
                }
            }
            _ = tick(&mut ticker) => {
                let batch = shared.drain(batch_size).await;
                if !batch.is_empty() {
                    let _ = shared.send_from_worker(batch).await;
                }
                reset_ticker(&mut ticker, shared.cfg.flush_interval);
            }
        }
    }
}

/// A zero interval disables timer-triggered flushing entirely.
fn new_ticker(flush_interval: Duration) -> Option<Interval> {
    if flush_interval.is_zero() {
        return None;
    }
    let mut ticker = interval_at(Instant::now() + flush_interval, flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(ticker)
}

fn reset_ticker(ticker: &mut Option<Interval>, flush_interval: Duration) {
    if let Some(ticker) = ticker.as_mut() {
        ticker.reset_at(Instant::now() + flush_interval);
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker.as_mut() {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
