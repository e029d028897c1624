//! Background job scheduler.
//!
//! Registers the recurring pipeline run. Overlapping fires are harmless: the
//! coordinator drops a trigger while a run is in progress.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use trendscout_trends::{RunOutcome, SnapshotCoordinator};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid or the
/// scheduler cannot be initialised or started.
pub async fn build_scheduler(
    coordinator: Arc<SnapshotCoordinator>,
    schedule: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_pipeline_job(&scheduler, coordinator, schedule).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_pipeline_job(
    scheduler: &JobScheduler,
    coordinator: Arc<SnapshotCoordinator>,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let coordinator = Arc::clone(&coordinator);

        Box::pin(async move {
            tracing::info!("scheduler: starting pipeline run");
            match coordinator.trigger_run().await {
                RunOutcome::Published { run_id, listings } => {
                    tracing::info!(run_id, listings, "scheduler: pipeline run complete");
                }
                RunOutcome::Skipped => {
                    tracing::info!("scheduler: previous run still in progress; skipped");
                }
                RunOutcome::Failed { error } => {
                    tracing::warn!(error = %error, "scheduler: pipeline run failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule, "scheduler: pipeline job registered");
    Ok(())
}
