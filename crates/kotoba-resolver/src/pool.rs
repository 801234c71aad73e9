use std::future::Future;
use std::sync::Arc;

use kotoba_core::ResolveError;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Bounded pool of async workers fed through a kanal job channel.
///
/// Outputs are returned by job index, so the order in which jobs finish has
/// no effect on the result. After cancellation the jobs that never ran are
/// left as `None`.
pub struct WorkerPool {
    concurrency: usize,
    queue_capacity: usize,
    cancel: CancellationToken,
}

impl WorkerPool {
    pub fn new(concurrency: usize, queue_capacity: usize, cancel: CancellationToken) -> Self {
        Self {
            concurrency: concurrency.max(1),
            queue_capacity: queue_capacity.max(1),
            cancel,
        }
    }

    pub async fn run<J, O, F, Fut>(&self, jobs: Vec<J>, work: F) -> Result<Vec<Option<O>>, ResolveError>
    where
        J: Send + 'static,
        O: Send + 'static,
        F: Fn(J) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
    {
        let total = jobs.len();
        let mut outputs: Vec<Option<O>> = (0..total).map(|_| None).collect();
        if total == 0 {
            return Ok(outputs);
        }

        let (job_tx, job_rx) = kanal::bounded_async::<(usize, J)>(self.queue_capacity);
        let work = Arc::new(work);
        let mut workers = JoinSet::new();

        for worker_id in 0..self.concurrency.min(total) {
            let rx = job_rx.clone();
            let work = Arc::clone(&work);
            let cancel = self.cancel.clone();

            workers.spawn(async move {
                let mut done = Vec::new();
                loop {
                    let (index, job) = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        received = rx.recv() => match received {
                            Ok(item) => item,
                            Err(_) => break,
                        },
                    };
                    done.push((index, (*work)(job).await));
                }
                tracing::trace!(worker_id, jobs = done.len(), "Worker finished");
                done
            });
        }
        drop(job_rx);

        for item in jobs.into_iter().enumerate() {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                sent = job_tx.send(item) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
        // Closing the channel lets idle workers exit once the queue drains
        drop(job_tx);

        while let Some(joined) = workers.join_next().await {
            let done = joined.map_err(|e| ResolveError::WorkerPanicked(e.to_string()))?;
            for (index, output) in done {
                outputs[index] = Some(output);
            }
        }

        Ok(outputs)
    }
}
