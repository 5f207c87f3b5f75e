//! Worker that processes queued publish jobs.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use siteship_core::ResourceId;
use siteship_db::StatusRepo;

use crate::queue::{PublishJob, PublishQueue};
use crate::sync::SyncAction;

/// A worker that claims publish jobs and drives each one to a terminal
/// status. The status write happens even when the work fails; a job never
/// finishes without the tracker hearing about it.
pub struct PublishWorker {
    id: String,
    queue: Arc<dyn PublishQueue>,
    statuses: Arc<dyn StatusRepo>,
    action: Arc<dyn SyncAction>,
}

impl PublishWorker {
    pub fn new(
        id: impl Into<String>,
        queue: Arc<dyn PublishQueue>,
        statuses: Arc<dyn StatusRepo>,
        action: Arc<dyn SyncAction>,
    ) -> Self {
        Self {
            id: id.into(),
            queue,
            statuses,
            action,
        }
    }

    /// Run the worker loop.
    pub async fn run(&self) {
        info!(worker_id = %self.id, "Starting publish worker");

        loop {
            match self.queue.claim(&self.id).await {
                Ok(Some(job)) => self.process(job).await,
                Ok(None) => {
                    // No jobs available, wait before polling again
                    sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to claim job");
                    sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// Process one claimed job.
    pub async fn process(&self, job: PublishJob) {
        info!(
            worker_id = %self.id,
            job_id = %job.id,
            subscription_id = %job.subscription_id,
            subdomain = %job.subdomain,
            "Claimed publish job"
        );
        let status_id = ResourceId::from_uuid(job.status_id);

        match self.action.run(&job).await {
            Ok(()) => {
                if let Err(e) = self.statuses.mark_completed(status_id).await {
                    error!(job_id = %job.id, error = %e, "Failed to record completion");
                }
                if let Err(e) = self.queue.complete(job.id).await {
                    warn!(job_id = %job.id, error = %e, "Failed to mark job complete");
                }
                info!(job_id = %job.id, subdomain = %job.subdomain, "Publish completed");
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Publish failed");
                if let Err(mark_err) = self.statuses.mark_failed(status_id, &e.to_string()).await {
                    error!(job_id = %job.id, error = %mark_err, "Failed to record failure");
                }
                if let Err(queue_err) = self.queue.fail(job.id, &e.to_string()).await {
                    warn!(job_id = %job.id, error = %queue_err, "Failed to mark job failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use siteship_core::{Error, Result};
    use siteship_db::MemoryStatusRepo;

    use crate::queue::MemoryPublishQueue;

    struct OkAction;

    #[async_trait]
    impl SyncAction for OkAction {
        async fn run(&self, _job: &PublishJob) -> Result<()> {
            Ok(())
        }
    }

    struct FailAction;

    #[async_trait]
    impl SyncAction for FailAction {
        async fn run(&self, _job: &PublishJob) -> Result<()> {
            Err(Error::Upstream("deploy exploded".to_string()))
        }
    }

    async fn scheduled_job(
        queue: &MemoryPublishQueue,
        statuses: &MemoryStatusRepo,
    ) -> (PublishJob, ResourceId) {
        let subscription_id = ResourceId::new();
        let status = statuses.create(subscription_id, "a1b2c3d").await.unwrap();
        let status_id = ResourceId::from_uuid(status.id);
        queue
            .enqueue(subscription_id, status_id, "a1b2c3d")
            .await
            .unwrap();
        let job = queue.claim("w-test").await.unwrap().unwrap();
        (job, status_id)
    }

    #[tokio::test]
    async fn test_success_reaches_completed() {
        let queue = MemoryPublishQueue::new();
        let statuses = MemoryStatusRepo::new();
        let worker = PublishWorker::new(
            "w-test",
            Arc::new(queue.clone()),
            Arc::new(statuses.clone()),
            Arc::new(OkAction),
        );

        let (job, status_id) = scheduled_job(&queue, &statuses).await;
        worker.process(job.clone()).await;

        assert_eq!(statuses.get(status_id).await.unwrap().status, "completed");
        assert_eq!(queue.get(job.id).await.unwrap().status, "completed");
    }

    #[tokio::test]
    async fn test_failure_reaches_failed_with_error() {
        let queue = MemoryPublishQueue::new();
        let statuses = MemoryStatusRepo::new();
        let worker = PublishWorker::new(
            "w-test",
            Arc::new(queue.clone()),
            Arc::new(statuses.clone()),
            Arc::new(FailAction),
        );

        let (job, status_id) = scheduled_job(&queue, &statuses).await;
        worker.process(job.clone()).await;

        let status = statuses.get(status_id).await.unwrap();
        assert_eq!(status.status, "failed");
        assert!(status.error.unwrap().contains("deploy exploded"));
        assert_eq!(queue.get(job.id).await.unwrap().status, "failed");
    }
}
