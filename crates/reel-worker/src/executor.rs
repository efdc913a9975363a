//! The worker supervision loop.
//!
//! One logical loop per process, one job at a time; horizontal scale is
//! extra worker processes sharing the queue. Each job body runs in its
//! own task so a panic is contained, recorded as a job failure, and the
//! loop keeps going.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use reel_catalog::JobsRepo;
use reel_queue::JobQueue;

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::processor::Processor;
use crate::util::truncate_chars;

/// Backoff after a queue error before re-entering the loop.
const QUEUE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Consumes job ids from the queue and runs them through the processor.
pub struct Executor {
    config: WorkerConfig,
    queue: JobQueue,
    processor: Arc<Processor>,
    jobs: JobsRepo,
}

impl Executor {
    pub fn new(
        config: WorkerConfig,
        queue: JobQueue,
        processor: Processor,
        jobs: JobsRepo,
    ) -> Self {
        Self {
            config,
            queue,
            processor: Arc::new(processor),
            jobs,
        }
    }

    /// Run until the shutdown signal flips. The in-flight job is allowed
    /// to finish and record its terminal status.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> WorkerResult<()> {
        info!(
            pop_timeout_secs = self.config.pop_timeout.as_secs(),
            "Worker loop started"
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutdown signal received, stopping worker loop");
                        break;
                    }
                }
                popped = self.queue.pop(self.config.pop_timeout) => {
                    match popped {
                        Ok(Some(job_id)) => self.execute(job_id).await,
                        Ok(None) => {} // pop timed out, re-enter the loop
                        Err(e) => {
                            warn!(error = %e, "Queue pop failed, backing off");
                            tokio::time::sleep(QUEUE_ERROR_BACKOFF).await;
                        }
                    }
                }
            }
        }

        info!("Worker loop stopped");
        Ok(())
    }

    /// Run one job to completion. Errors were already recorded by the
    /// processor; a panic in the job body is recorded here.
    async fn execute(&self, job_id: String) {
        info!(job_id = %job_id, "Executing job");

        let processor = Arc::clone(&self.processor);
        let id = job_id.clone();
        let handle = tokio::spawn(async move { processor.process(&id).await });

        match handle.await {
            Ok(_) => {} // success or an already-recorded failure
            Err(join_err) if join_err.is_panic() => {
                let message = panic_message(join_err);
                error!(job_id = %job_id, panic = %message, "Job body panicked");
                let message = truncate_chars(&message, 2000);
                if let Err(e) = self.jobs.mark_failed(&job_id, &message).await {
                    error!(job_id = %job_id, error = %e, "Failed to record panic failure");
                }
            }
            Err(_) => {} // task cancelled during shutdown
        }
    }
}

fn panic_message(err: tokio::task::JoinError) -> String {
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "job body panicked".to_string()
    }
}
