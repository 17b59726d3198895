//! Bounded job queue with a fixed worker pool

use crate::bus::EventBus;
use crate::errors::QueueError;
use crate::event::{JobEvent, JobEventKind};
use crate::job::Job;
use config::GenerationConfig;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use uuid::Uuid;

struct QueuedJob {
    id: Uuid,
    job: Box<dyn Job>,
}

/// Queue of background jobs drained by `workers` tasks.
///
/// Dropping the last sender (on [`JobQueue::shutdown`]) lets workers finish
/// what is already queued and then exit.
pub struct JobQueue {
    sender: Mutex<Option<mpsc::Sender<QueuedJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    events: Arc<EventBus>,
    capacity: usize,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("capacity", &self.capacity)
            .field("is_closed", &self.is_closed())
            .finish()
    }
}

impl JobQueue {
    /// Spawn the worker pool. Must be called within a tokio runtime.
    pub fn start(config: &GenerationConfig, events: Arc<EventBus>) -> Self {
        let capacity = config.queue_capacity.max(1);
        let (sender, receiver) = mpsc::channel::<QueuedJob>(capacity);
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let job_timeout = config.job_timeout();

        let workers = (0..config.workers.max(1))
            .map(|worker| {
                let receiver = receiver.clone();
                let events = events.clone();
                tokio::spawn(async move {
                    loop {
                        let next = receiver.lock().await.recv().await;
                        match next {
                            Some(queued) => run_job(worker, queued, job_timeout, &events).await,
                            None => break,
                        }
                    }
                    tracing::debug!(worker, "job worker stopped");
                })
            })
            .collect();

        tracing::info!(capacity, workers = config.workers, "job queue started");

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            events,
            capacity,
        }
    }

    /// Enqueue a job without waiting. Returns its id.
    pub fn submit<J: Job>(&self, job: J) -> Result<Uuid, QueueError> {
        let id = Uuid::new_v4();
        let name = job.name().to_string();

        let guard = self.sender.lock().unwrap_or_else(|p| p.into_inner());
        let sender = guard.as_ref().ok_or(QueueError::Closed)?;
        let permit = sender.try_reserve().map_err(|e| match e {
            TrySendError::Full(()) => QueueError::Full {
                capacity: self.capacity,
            },
            TrySendError::Closed(()) => QueueError::Closed,
        })?;

        // Announce before handing over so `Queued` always precedes `Started`
        tracing::debug!(job_id = %id, job = %name, "job queued");
        self.events
            .emit(&JobEvent::new(id, name, JobEventKind::Queued));
        permit.send(QueuedJob {
            id,
            job: Box::new(job),
        });
        Ok(id)
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .map(|guard| guard.is_none())
            .unwrap_or(true)
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Stop accepting jobs, let workers drain the queue, and wait for them
    pub async fn shutdown(&self) {
        drop(
            self.sender
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .take(),
        );

        let workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(|p| p.into_inner()));
        for result in futures::future::join_all(workers).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "job worker panicked");
            }
        }
        tracing::info!("job queue shut down");
    }
}

async fn run_job(worker: usize, queued: QueuedJob, job_timeout: Duration, events: &EventBus) {
    let QueuedJob { id, job } = queued;
    let name = job.name().to_string();

    tracing::debug!(worker, job_id = %id, job = %name, "job started");
    events.emit(&JobEvent::new(id, name.as_str(), JobEventKind::Started));

    // A panicking job is reported like a failure and the worker keeps running
    let run = AssertUnwindSafe(job.run()).catch_unwind();
    let event = match tokio::time::timeout(job_timeout, run).await {
        Ok(Ok(Ok(()))) => {
            tracing::info!(job_id = %id, job = %name, "job succeeded");
            JobEvent::new(id, name, JobEventKind::Succeeded)
        }
        Ok(Ok(Err(e))) => {
            tracing::error!(job_id = %id, job = %name, error = %e, "job failed");
            JobEvent::new(id, name, JobEventKind::Failed).with_detail(e.to_string())
        }
        Ok(Err(payload)) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(job_id = %id, job = %name, panic = %message, "job panicked");
            JobEvent::new(id, name, JobEventKind::Failed).with_detail(format!("panicked: {}", message))
        }
        Err(_) => {
            tracing::warn!(job_id = %id, job = %name, timeout_ms = job_timeout.as_millis() as u64, "job timed out");
            JobEvent::new(id, name, JobEventKind::TimedOut)
                .with_detail(format!("exceeded {:?}", job_timeout))
        }
    };
    events.emit(&event);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::{mpsc::UnboundedReceiver, Semaphore};

    struct Sleepy {
        name: &'static str,
        sleep: Duration,
        fail: bool,
    }

    #[async_trait]
    impl Job for Sleepy {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(self: Box<Self>) -> anyhow::Result<()> {
            tokio::time::sleep(self.sleep).await;
            if self.fail {
                anyhow::bail!("generator refused");
            }
            Ok(())
        }
    }

    struct Gate {
        release: Arc<Semaphore>,
    }

    #[async_trait]
    impl Job for Gate {
        fn name(&self) -> &str {
            "gate"
        }

        async fn run(self: Box<Self>) -> anyhow::Result<()> {
            self.release.acquire().await?.forget();
            Ok(())
        }
    }

    struct Explodes;

    #[async_trait]
    impl Job for Explodes {
        fn name(&self) -> &str {
            "explodes"
        }

        async fn run(self: Box<Self>) -> anyhow::Result<()> {
            panic!("generator crashed");
        }
    }

    fn config(capacity: usize, workers: usize, timeout_seconds: u64) -> GenerationConfig {
        GenerationConfig {
            queue_capacity: capacity,
            workers,
            job_timeout_seconds: timeout_seconds,
        }
    }

    fn recording_bus() -> (Arc<EventBus>, UnboundedReceiver<JobEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let bus = Arc::new(EventBus::new());
        bus.add_callback(move |event| {
            let _ = tx.send(event.clone());
        });
        (bus, rx)
    }

    async fn next_terminal(rx: &mut UnboundedReceiver<JobEvent>) -> JobEvent {
        loop {
            let event = rx.recv().await.unwrap();
            if event.kind.is_terminal() {
                return event;
            }
        }
    }

    #[tokio::test]
    async fn test_job_lifecycle_events() {
        let (bus, mut rx) = recording_bus();
        let queue = JobQueue::start(&config(4, 1, 5), bus);

        let id = queue
            .submit(Sleepy {
                name: "ok",
                sleep: Duration::from_millis(1),
                fail: false,
            })
            .unwrap();

        let kinds: Vec<_> = [rx.recv().await.unwrap(), rx.recv().await.unwrap(), rx.recv().await.unwrap()]
            .iter()
            .map(|e| {
                assert_eq!(e.job_id, id);
                e.kind
            })
            .collect();
        assert_eq!(
            kinds,
            vec![JobEventKind::Queued, JobEventKind::Started, JobEventKind::Succeeded]
        );

        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_raised() {
        let (bus, mut rx) = recording_bus();
        let queue = JobQueue::start(&config(4, 2, 5), bus);

        queue
            .submit(Sleepy {
                name: "broken",
                sleep: Duration::ZERO,
                fail: true,
            })
            .unwrap();

        let event = next_terminal(&mut rx).await;
        assert_eq!(event.kind, JobEventKind::Failed);
        assert_eq!(event.job_name, "broken");
        assert_eq!(event.detail.as_deref(), Some("generator refused"));

        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_panicking_job_fails_and_worker_survives() {
        let (bus, mut rx) = recording_bus();
        let queue = JobQueue::start(&config(4, 1, 5), bus);

        queue.submit(Explodes).unwrap();
        let event = next_terminal(&mut rx).await;
        assert_eq!(event.kind, JobEventKind::Failed);
        assert_eq!(event.detail.as_deref(), Some("panicked: generator crashed"));

        // the single worker is still there to run the next job
        queue
            .submit(Sleepy {
                name: "after",
                sleep: Duration::ZERO,
                fail: false,
            })
            .unwrap();
        let event = next_terminal(&mut rx).await;
        assert_eq!(event.kind, JobEventKind::Succeeded);
        assert_eq!(event.job_name, "after");

        queue.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_job_times_out() {
        let (bus, mut rx) = recording_bus();
        let queue = JobQueue::start(&config(4, 1, 1), bus);

        queue
            .submit(Sleepy {
                name: "slow",
                sleep: Duration::from_secs(60),
                fail: false,
            })
            .unwrap();

        let event = next_terminal(&mut rx).await;
        assert_eq!(event.kind, JobEventKind::TimedOut);

        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_full_queue_rejects_immediately() {
        let (bus, mut rx) = recording_bus();
        let queue = JobQueue::start(&config(1, 1, 30), bus);
        let release = Arc::new(Semaphore::new(0));

        queue.submit(Gate { release: release.clone() }).unwrap();
        // Wait until the only worker holds the gate job
        loop {
            if rx.recv().await.unwrap().kind == JobEventKind::Started {
                break;
            }
        }

        queue.submit(Gate { release: release.clone() }).unwrap();
        let err = queue
            .submit(Gate { release: release.clone() })
            .unwrap_err();
        assert_eq!(err, QueueError::Full { capacity: 1 });

        release.add_permits(2);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_closed() {
        let queue = JobQueue::start(&config(2, 1, 5), Arc::new(EventBus::new()));
        queue.shutdown().await;

        assert!(queue.is_closed());
        let err = queue
            .submit(Sleepy {
                name: "late",
                sleep: Duration::ZERO,
                fail: false,
            })
            .unwrap_err();
        assert_eq!(err, QueueError::Closed);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_jobs() {
        let (bus, mut rx) = recording_bus();
        let queue = JobQueue::start(&config(8, 1, 5), bus);

        for _ in 0..3 {
            queue
                .submit(Sleepy {
                    name: "batch",
                    sleep: Duration::from_millis(1),
                    fail: false,
                })
                .unwrap();
        }
        queue.shutdown().await;

        let mut succeeded = 0;
        while let Ok(event) = rx.try_recv() {
            if event.kind == JobEventKind::Succeeded {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 3);
    }
}
