use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::WorkerError;
use crate::pipeline::Pipeline;
use crate::worker::job::{JobResult, PipelineJob};

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<PipelineJob>>>;

/// Fixed set of tokio tasks pulling jobs from a shared queue.
///
/// Concurrency is bounded by the worker count; the queue itself is not, so
/// queueing a job never waits on other items' pipelines.
/// No cancellation, no retry and no crash recovery: a job runs once, to the
/// end, and an item whose worker dies mid-run stays in `processing`.
/// Shutting down stops intake; queued jobs are still drained by `wait`.
pub struct WorkerPool {
    job_sender: Mutex<Option<mpsc::UnboundedSender<PipelineJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown: AtomicBool,
}

impl WorkerPool {
    /// Starts `worker_count` workers. Must be called inside a tokio runtime.
    pub fn new(pipeline: Arc<Pipeline>, worker_count: usize) -> Self {
        Self::start(pipeline, worker_count, None)
    }

    /// Like `new`, but also reports every finished job on the returned channel.
    pub fn with_results(
        pipeline: Arc<Pipeline>,
        worker_count: usize,
    ) -> (Self, mpsc::UnboundedReceiver<JobResult>) {
        let (result_sender, result_receiver) = mpsc::unbounded_channel();
        let pool = Self::start(pipeline, worker_count, Some(result_sender));
        (pool, result_receiver)
    }

    fn start(
        pipeline: Arc<Pipeline>,
        worker_count: usize,
        result_sender: Option<mpsc::UnboundedSender<JobResult>>,
    ) -> Self {
        let worker_count = worker_count.max(1);
        let (job_sender, job_receiver) = mpsc::unbounded_channel::<PipelineJob>();
        let job_receiver: SharedReceiver = Arc::new(tokio::sync::Mutex::new(job_receiver));

        let workers = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&job_receiver),
                    Arc::clone(&pipeline),
                    result_sender.clone(),
                ))
            })
            .collect();

        info!("Started {} workers", worker_count);

        Self {
            job_sender: Mutex::new(Some(job_sender)),
            workers: Mutex::new(workers),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Queues a job and returns at once. Fails once the pool is shut down.
    pub fn submit(&self, job: PipelineJob) -> Result<(), WorkerError> {
        if self.is_shutdown() {
            return Err(WorkerError::ChannelClosed);
        }

        let sender = self
            .job_sender
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or(WorkerError::ChannelClosed)?;

        sender.send(job).map_err(|_| WorkerError::ChannelClosed)
    }

    /// Stops accepting jobs. Already queued jobs still run.
    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
        // Dropping the last sender lets workers exit once the queue is empty.
        if let Ok(mut guard) = self.job_sender.lock() {
            guard.take();
        }
    }

    /// Shuts down and waits for every worker to drain the queue and exit.
    pub async fn wait(&self) {
        self.shutdown();

        let workers = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        for (i, worker) in workers.into_iter().enumerate() {
            if let Err(e) = worker.await {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

async fn run_worker(
    worker_id: usize,
    job_receiver: SharedReceiver,
    pipeline: Arc<Pipeline>,
    result_sender: Option<mpsc::UnboundedSender<JobResult>>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        let job = {
            let mut receiver = job_receiver.lock().await;
            receiver.recv().await
        };

        let Some(job) = job else {
            debug!("Worker {} job channel closed", worker_id);
            break;
        };

        debug!("Worker {} processing content {}", worker_id, job.content_id);
        let result = pipeline.run(job).await;

        if let Some(sender) = &result_sender {
            // The receiver may be gone; results are informational.
            let _ = sender.send(result);
        }
    }

    debug!("Worker {} stopped", worker_id);
}
