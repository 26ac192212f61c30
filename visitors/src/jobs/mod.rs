//! Scheduled report jobs.
//!
//! Two cron jobs run outside the request path: a daily CSV export at 11:00
//! and a monthly summary at 23:59 on the last day of the month. Jobs get an
//! explicit [`JobContext`] rather than reaching for any process-wide state,
//! and their failures are logged, never propagated; the scheduler stays up.

pub mod export;

use crate::config::Config;
use crate::store::SessionStore;
use chrono::{Datelike, Days, Local, NaiveDate};
use coworkd_common::Mailer;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::error;

/// Everything a job run needs, handed over explicitly.
#[derive(Clone)]
pub struct JobContext {
    /// Session storage, over the job's own pool clone.
    pub store: SessionStore,
    /// Configured mailer; `None` when mail credentials are missing, which
    /// every job treats as a hard stop for that run.
    pub mailer: Option<Arc<dyn Mailer>>,
    /// Service configuration.
    pub config: Arc<Config>,
}

/// True on the last calendar day of the month.
#[must_use]
pub fn is_last_day_of_month(day: NaiveDate) -> bool {
    day.checked_add_days(Days::new(1))
        .is_none_or(|next| next.month() != day.month())
}

/// Register and start both report jobs.
///
/// The returned scheduler must be kept alive for the jobs to keep firing.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if a job cannot be registered or the
/// scheduler fails to start.
pub async fn start(ctx: JobContext) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let daily_ctx = ctx.clone();
    scheduler
        .add(Job::new_async("0 0 11 * * *", move |_id, _scheduler| {
            let ctx = daily_ctx.clone();
            Box::pin(async move {
                let today = Local::now().date_naive();
                if let Err(e) = export::export_daily(&ctx, today).await {
                    error!(error = %e, "Daily export failed");
                }
            })
        })?)
        .await?;

    // Cron cannot express "last day of month", so this fires nightly and
    // the guard lets only the last day through.
    let monthly_ctx = ctx;
    scheduler
        .add(Job::new_async("0 59 23 * * *", move |_id, _scheduler| {
            let ctx = monthly_ctx.clone();
            Box::pin(async move {
                let today = Local::now().date_naive();
                if !is_last_day_of_month(today) {
                    return;
                }
                if let Err(e) = export::export_monthly(&ctx, today).await {
                    error!(error = %e, "Monthly summary failed");
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_day_of_month() {
        assert!(is_last_day_of_month(d(2024, 1, 31)));
        assert!(is_last_day_of_month(d(2024, 2, 29)));
        assert!(is_last_day_of_month(d(2023, 2, 28)));
        assert!(is_last_day_of_month(d(2024, 4, 30)));
        assert!(!is_last_day_of_month(d(2024, 1, 30)));
        assert!(!is_last_day_of_month(d(2024, 2, 28)));
        assert!(!is_last_day_of_month(d(2024, 4, 1)));
    }
}
