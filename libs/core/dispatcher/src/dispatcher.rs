//! Dispatcher: bounded job queue, worker pool and correlated results
//!
//! `submit` registers a pending slot under a fresh correlation id, enqueues
//! the job without blocking, and waits on the slot with a timeout. Workers
//! pull jobs from the shared queue, run the processor, and complete the slot
//! for that id. The slot is removed on every exit path of `submit`, so a
//! result arriving after its caller gave up finds no slot and is dropped.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::DispatcherConfig;
use crate::error::DispatchError;
use crate::job::{Job, JobProcessor};
use crate::metrics::DispatcherMetrics;
use crate::registry::PendingRegistry;

struct WorkItem<J> {
    correlation_id: Uuid,
    job: J,
    enqueued_at: Instant,
}

/// Bounded job dispatcher with a fixed pool of worker tasks
///
/// Must be started from within a Tokio runtime.
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = Arc::new(Dispatcher::start(
///     IngestProcessor::new(table, client),
///     DispatcherConfig::from_env()?,
/// ));
///
/// let reply = dispatcher.submit(IngestJob::insert("hello")).await?;
///
/// // On shutdown
/// dispatcher.shutdown().await;
/// ```
pub struct Dispatcher<J: Job, P: JobProcessor<J>> {
    config: DispatcherConfig,
    sender: mpsc::Sender<WorkItem<J>>,
    registry: Arc<PendingRegistry<P::Output>>,
    shutdown_tx: watch::Sender<bool>,
    workers: Mutex<JoinSet<()>>,
    metrics: DispatcherMetrics,
}

impl<J: Job, P: JobProcessor<J>> Dispatcher<J, P> {
    /// Spawn the worker pool and return a dispatcher ready for `submit`
    pub fn start(processor: P, config: DispatcherConfig) -> Self {
        let processor = Arc::new(processor);
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let registry = Arc::new(PendingRegistry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let metrics = DispatcherMetrics::new(&config.name, processor.name());

        let mut workers = JoinSet::new();
        for id in 0..config.workers.max(1) {
            let worker = Worker {
                id,
                receiver: Arc::clone(&receiver),
                processor: Arc::clone(&processor),
                registry: Arc::clone(&registry),
                metrics: metrics.clone(),
                shutdown: shutdown_rx.clone(),
            };
            workers.spawn(worker.run());
        }

        info!(
            dispatcher = %config.name,
            processor = processor.name(),
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            timeout_ms = config.submit_timeout.as_millis() as u64,
            "Dispatcher started"
        );

        Self {
            config,
            sender,
            registry,
            shutdown_tx,
            workers: Mutex::new(workers),
            metrics,
        }
    }

    /// Submit a job and wait for its result
    ///
    /// Fails fast with [`DispatchError::QueueFull`] when the queue is at
    /// capacity, and with [`DispatchError::Timeout`] when no result arrives
    /// within the configured timeout.
    pub async fn submit(&self, job: J) -> Result<P::Output, DispatchError> {
        if self.is_closed() {
            self.metrics.job_rejected(DispatchError::Closed.label());
            return Err(DispatchError::Closed);
        }

        let kind = job.kind();
        let correlation_id = Uuid::new_v4();

        // Registered before enqueue so a fast worker always finds the slot.
        // Dropping the guard removes the slot on every return path.
        let (rx, _guard) = self.registry.register(correlation_id)?;

        let item = WorkItem {
            correlation_id,
            job,
            enqueued_at: Instant::now(),
        };
        if let Err(e) = self.sender.try_send(item) {
            let err = match e {
                TrySendError::Full(_) => DispatchError::QueueFull,
                TrySendError::Closed(_) => DispatchError::Closed,
            };
            debug!(
                dispatcher = %self.config.name,
                kind,
                reason = err.label(),
                "Job rejected"
            );
            self.metrics.job_rejected(err.label());
            return Err(err);
        }

        self.metrics.job_submitted(kind);
        self.metrics.queue_depth(self.queue_depth());
        self.metrics.pending(self.registry.len());

        match tokio::time::timeout(self.config.submit_timeout, rx).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(_)) if self.is_closed() => Err(DispatchError::Closed),
            Ok(Err(_)) => Err(DispatchError::WorkerLost),
            Err(_) => {
                warn!(
                    dispatcher = %self.config.name,
                    correlation_id = %correlation_id,
                    kind,
                    timeout_ms = self.config.submit_timeout.as_millis() as u64,
                    "Timed out waiting for result"
                );
                self.metrics.job_timed_out(kind);
                Err(DispatchError::Timeout(self.config.submit_timeout))
            }
        }
    }

    /// Stop accepting jobs, let workers finish their current job, and fail
    /// every caller still waiting with [`DispatchError::Closed`]
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        info!(dispatcher = %self.config.name, "Dispatcher shutting down");

        let mut workers = self.workers.lock().await;
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                error!(dispatcher = %self.config.name, error = %e, "Worker task failed");
            }
        }

        let dropped = self.registry.clear();
        info!(
            dispatcher = %self.config.name,
            dropped_pending = dropped,
            "Dispatcher stopped"
        );
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Jobs queued but not yet picked up by a worker
    pub fn queue_depth(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    /// Callers currently waiting for a result
    pub fn in_flight(&self) -> usize {
        self.registry.len()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }
}

impl<J: Job, P: JobProcessor<J>> Drop for Dispatcher<J, P> {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

struct Worker<J: Job, P: JobProcessor<J>> {
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<WorkItem<J>>>>,
    processor: Arc<P>,
    registry: Arc<PendingRegistry<P::Output>>,
    metrics: DispatcherMetrics,
    shutdown: watch::Receiver<bool>,
}

impl<J: Job, P: JobProcessor<J>> Worker<J, P> {
    async fn run(mut self) {
        debug!(worker = self.id, "Worker started");

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let next = tokio::select! {
                _ = self.shutdown.changed() => break,
                item = Self::next(&self.receiver) => item,
            };

            match next {
                Some(item) => self.handle(item).await,
                None => break,
            }
        }

        debug!(worker = self.id, "Worker stopped");
    }

    async fn next(receiver: &Mutex<mpsc::Receiver<WorkItem<J>>>) -> Option<WorkItem<J>> {
        receiver.lock().await.recv().await
    }

    async fn handle(&self, item: WorkItem<J>) {
        let WorkItem {
            correlation_id,
            job,
            enqueued_at,
        } = item;
        let kind = job.kind();
        self.metrics.queue_wait(enqueued_at.elapsed());

        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.processor.process(correlation_id, job))
            .catch_unwind()
            .await;

        match outcome {
            Ok(output) => {
                self.metrics.job_processed(kind, started.elapsed());
                if !self.registry.complete(correlation_id, output) {
                    debug!(
                        worker = self.id,
                        correlation_id = %correlation_id,
                        kind,
                        "Discarding result for caller that stopped waiting"
                    );
                    self.metrics.late_result(kind);
                }
            }
            Err(_) => {
                error!(
                    worker = self.id,
                    correlation_id = %correlation_id,
                    kind,
                    "Processor panicked"
                );
                self.metrics.job_panicked(kind);
                self.registry.abandon(correlation_id);
            }
        }

        self.metrics.pending(self.registry.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::sync::{Notify, Semaphore};

    struct Echo {
        index: usize,
        delay_ms: u64,
    }

    impl Job for Echo {
        fn kind(&self) -> &'static str {
            "echo"
        }
    }

    struct EchoProcessor;

    #[async_trait]
    impl JobProcessor<Echo> for EchoProcessor {
        type Output = (Uuid, usize);

        async fn process(&self, correlation_id: Uuid, job: Echo) -> (Uuid, usize) {
            tokio::time::sleep(Duration::from_millis(job.delay_ms)).await;
            (correlation_id, job.index)
        }

        fn name(&self) -> &'static str {
            "echo_processor"
        }
    }

    struct GateJob;

    impl Job for GateJob {
        fn kind(&self) -> &'static str {
            "gate"
        }
    }

    /// Blocks each job until a permit is released
    struct Gate {
        started: Arc<Notify>,
        release: Arc<Semaphore>,
    }

    #[async_trait]
    impl JobProcessor<GateJob> for Gate {
        type Output = ();

        async fn process(&self, _correlation_id: Uuid, _job: GateJob) {
            self.started.notify_one();
            let _permit = self.release.acquire().await.ok();
        }

        fn name(&self) -> &'static str {
            "gate"
        }
    }

    struct Flaky(bool);

    impl Job for Flaky {
        fn kind(&self) -> &'static str {
            "flaky"
        }
    }

    struct FlakyProcessor;

    #[async_trait]
    impl JobProcessor<Flaky> for FlakyProcessor {
        type Output = &'static str;

        async fn process(&self, _correlation_id: Uuid, job: Flaky) -> &'static str {
            if job.0 {
                panic!("processor blew up");
            }
            "ok"
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn gated(workers: usize, capacity: usize) -> (Arc<Dispatcher<GateJob, Gate>>, Arc<Notify>, Arc<Semaphore>) {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Semaphore::new(0));
        let dispatcher = Dispatcher::start(
            Gate {
                started: Arc::clone(&started),
                release: Arc::clone(&release),
            },
            DispatcherConfig::new("test")
                .with_workers(workers)
                .with_queue_capacity(capacity),
        );
        (Arc::new(dispatcher), started, release)
    }

    async fn wait_for_queue_depth<J: Job, P: JobProcessor<J>>(d: &Dispatcher<J, P>, depth: usize) {
        while d.queue_depth() < depth {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_receive_their_own_results() {
        let dispatcher = Arc::new(Dispatcher::start(
            EchoProcessor,
            DispatcherConfig::new("test")
                .with_workers(4)
                .with_queue_capacity(256),
        ));

        let mut callers = JoinSet::new();
        for index in 0..200 {
            let dispatcher = Arc::clone(&dispatcher);
            callers.spawn(async move {
                let job = Echo {
                    index,
                    delay_ms: (index % 7) as u64,
                };
                let (correlation_id, echoed) = dispatcher.submit(job).await.unwrap();
                (index, echoed, correlation_id)
            });
        }

        let mut seen = HashSet::new();
        while let Some(result) = callers.join_next().await {
            let (index, echoed, correlation_id) = result.unwrap();
            assert_eq!(index, echoed, "caller received another caller's result");
            assert!(seen.insert(correlation_id), "correlation id reused");
        }

        assert_eq!(seen.len(), 200);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_timeout_leaves_no_pending_slot() {
        let timeout = Duration::from_millis(20);
        let dispatcher = Dispatcher::start(
            EchoProcessor,
            DispatcherConfig::new("test")
                .with_workers(1)
                .with_submit_timeout(timeout),
        );

        let err = dispatcher
            .submit(Echo {
                index: 1,
                delay_ms: 200,
            })
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Timeout(timeout));
        assert_eq!(dispatcher.in_flight(), 0);

        // The late result is dropped and the worker keeps serving
        tokio::time::sleep(Duration::from_millis(250)).await;
        let (_, index) = dispatcher
            .submit(Echo {
                index: 2,
                delay_ms: 0,
            })
            .await
            .unwrap();
        assert_eq!(index, 2);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_full_queue_rejects_immediately() {
        let (dispatcher, started, release) = gated(1, 1);

        let first = tokio::spawn({
            let dispatcher = Arc::clone(&dispatcher);
            async move { dispatcher.submit(GateJob).await }
        });
        started.notified().await;

        let second = tokio::spawn({
            let dispatcher = Arc::clone(&dispatcher);
            async move { dispatcher.submit(GateJob).await }
        });
        wait_for_queue_depth(&dispatcher, 1).await;

        let err = dispatcher.submit(GateJob).await.unwrap_err();
        assert_eq!(err, DispatchError::QueueFull);
        assert_eq!(dispatcher.in_flight(), 2);

        release.add_permits(2);
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_panicking_processor_reports_worker_lost() {
        let dispatcher = Dispatcher::start(FlakyProcessor, DispatcherConfig::new("test").with_workers(1));

        let err = dispatcher.submit(Flaky(true)).await.unwrap_err();
        assert_eq!(err, DispatchError::WorkerLost);

        assert_eq!(dispatcher.submit(Flaky(false)).await.unwrap(), "ok");
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_closed() {
        let dispatcher = Dispatcher::start(EchoProcessor, DispatcherConfig::new("test").with_workers(2));
        dispatcher.shutdown().await;

        assert!(dispatcher.is_closed());
        let err = dispatcher
            .submit(Echo {
                index: 0,
                delay_ms: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Closed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_finishes_current_job_and_closes_queued() {
        let (dispatcher, started, release) = gated(1, 4);

        let running = tokio::spawn({
            let dispatcher = Arc::clone(&dispatcher);
            async move { dispatcher.submit(GateJob).await }
        });
        started.notified().await;

        let queued = tokio::spawn({
            let dispatcher = Arc::clone(&dispatcher);
            async move { dispatcher.submit(GateJob).await }
        });
        wait_for_queue_depth(&dispatcher, 1).await;

        let stopping = tokio::spawn({
            let dispatcher = Arc::clone(&dispatcher);
            async move { dispatcher.shutdown().await }
        });
        while !dispatcher.is_closed() {
            tokio::task::yield_now().await;
        }

        release.add_permits(1);
        stopping.await.unwrap();

        assert_eq!(running.await.unwrap(), Ok(()));
        assert_eq!(queued.await.unwrap(), Err(DispatchError::Closed));
        assert_eq!(dispatcher.in_flight(), 0);
    }
}
