//! Recurring scans on a cron schedule.

use std::sync::Arc;

use sentinel_core::AppConfig;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tokio_util::sync::CancellationToken;

use crate::scan::run_scan_once;

/// Builds and starts a scheduler that runs one scan per `config.watch_cron`
/// tick. Each tick is an independent run: cursors, monitor file and baselines
/// are reloaded. A tick that fires while the previous scan is still running
/// is skipped.
///
/// `running` is held for the whole of each scan and `cancel` is passed to it
/// as the shutdown signal.
///
/// The returned [`JobScheduler`] must be kept alive; dropping it stops the
/// jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid or the
/// scheduler cannot start.
pub(crate) async fn build_scheduler(
    config: Arc<AppConfig>,
    running: Arc<Mutex<()>>,
    cancel: CancellationToken,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    let cron = config.watch_cron.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        Box::pin(scheduled_scan(
            Arc::clone(&config),
            Arc::clone(&running),
            cancel.clone(),
        ))
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(cron = %cron, "scheduler started");
    Ok(scheduler)
}

/// One scheduler tick.
async fn scheduled_scan(
    config: Arc<AppConfig>,
    running: Arc<Mutex<()>>,
    cancel: CancellationToken,
) {
    let Ok(_guard) = running.try_lock() else {
        tracing::warn!("scheduler: previous scan still running; skipping tick");
        return;
    };
    if cancel.is_cancelled() {
        return;
    }
    if let Err(e) = run_scan_once(&config, false, cancel.cancelled()).await {
        tracing::error!(error = %e, "scheduler: scan failed");
    }
}

/// Stop ticking, signal the in-flight scan and wait for it to save cursors.
async fn stop_watch(
    mut scheduler: JobScheduler,
    running: &Mutex<()>,
    cancel: &CancellationToken,
) -> Result<(), JobSchedulerError> {
    cancel.cancel();
    scheduler.shutdown().await?;
    let _idle = running.lock().await;
    tracing::info!("scheduler stopped");
    Ok(())
}

/// Run scans on schedule until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the scheduler cannot be built or shut down.
pub(crate) async fn run_watch(config: AppConfig) -> anyhow::Result<()> {
    let running = Arc::new(Mutex::new(()));
    let cancel = CancellationToken::new();
    let scheduler =
        build_scheduler(Arc::new(config), Arc::clone(&running), cancel.clone()).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("received shutdown signal, finishing current scan");
    stop_watch(scheduler, &running, &cancel).await?;
    Ok(())
}
