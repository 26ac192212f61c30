//! Daily CSV export and monthly summary.
//!
//! The daily job is deliberately crash-tolerant: a CSV that could not be
//! emailed stays on disk, named by its date, and every later run re-attempts
//! delivery of whatever it finds before producing today's file.

use super::JobContext;
use crate::error::SessionError;
use crate::models::SessionLog;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use coworkd_common::{MailError, Mailer};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Failures inside a report job. Logged by the scheduler, never propagated
/// to a caller.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem trouble around the export directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Mail delivery failure.
    #[error(transparent)]
    Mail(#[from] MailError),

    /// Storage failure.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// The fixed export schema. Eleven columns, one per session field.
const CSV_HEADER: [&str; 11] = [
    "ID", "Email", "Name", "Position", "Terms", "Time In", "Time Out", "Login", "Logout",
    "Resources", "Feedback",
];

/// Export today's sessions as CSV and email them.
///
/// Missing mail credentials stop the run before it touches anything. Send
/// failures keep the file on disk; the next run retries it.
///
/// # Errors
///
/// Returns [`ExportError`] on storage or filesystem failure; a failed send
/// alone is not an error.
pub async fn export_daily(ctx: &JobContext, today: NaiveDate) -> Result<(), ExportError> {
    let Some(mailer) = ctx.mailer.as_deref() else {
        warn!("EMAIL_SENDER/EMAIL_PASSWORD not configured, skipping daily export");
        return Ok(());
    };

    retry_unsent(ctx, mailer, today).await;

    let sessions = ctx.store.for_day(today).await?;
    if sessions.is_empty() {
        info!(date = %today, "No session logs for today, nothing to export");
        return Ok(());
    }

    std::fs::create_dir_all(&ctx.config.export_dir)?;
    let date_str = today.format("%Y-%m-%d").to_string();
    let path = ctx.config.export_dir.join(format!("{date_str}.csv"));
    write_csv(&path, &sessions)?;

    let visitors = ctx
        .store
        .distinct_visits(today.year(), today.month(), Some(today.day()))
        .await?;
    let body = format!(
        "Attached is today's attendance CSV for the co-working space.\n\n\
         Date: {date_str}\n\
         Unique visitors today: {visitors}"
    );

    if let Err(e) = send_csv_file(mailer, &ctx.config.report_recipient, &path, &date_str, &body).await
    {
        warn!(error = %e, file = %path.display(), "Daily CSV delivery failed, keeping file for retry");
    }
    Ok(())
}

/// Email the month's distinct-visitor counts, grouped by day.
///
/// # Errors
///
/// Returns [`ExportError`] on storage failure; a failed send is logged only.
pub async fn export_monthly(ctx: &JobContext, today: NaiveDate) -> Result<(), ExportError> {
    let Some(mailer) = ctx.mailer.as_deref() else {
        warn!("EMAIL_SENDER/EMAIL_PASSWORD not configured, skipping monthly summary");
        return Ok(());
    };

    let rows = ctx.store.visits_by_day(today.year(), today.month()).await?;
    let total: i64 = rows.iter().map(|r| r.visitors).sum();
    let month_name = today.format("%B").to_string();
    let year = today.year();

    let mut report = format!(
        "Monthly Visitor Report - {month_name} {year}\nTotal unique visitors: {total}\n\n"
    );
    for row in &rows {
        let label = NaiveDate::parse_from_str(&row.day, "%Y-%m-%d")
            .map(|d| d.format("%B %d").to_string())
            .unwrap_or_else(|_| row.day.clone());
        report.push_str(&format!("{label}: {} visitor(s)\n", row.visitors));
    }

    let subject = format!("Monthly Visitor Report - {month_name} {year}");
    if let Err(e) = mailer
        .send_text(&ctx.config.report_recipient, &subject, &report)
        .await
    {
        warn!(error = %e, "Monthly summary delivery failed");
    } else {
        info!(month = %month_name, total, "Monthly summary emailed");
    }
    Ok(())
}

/// Re-attempt delivery of leftover dated CSV files, excluding today's.
///
/// Each file fails or succeeds on its own; failures stay for the next run.
async fn retry_unsent(ctx: &JobContext, mailer: &dyn Mailer, today: NaiveDate) {
    let today_name = format!("{}.csv", today.format("%Y-%m-%d"));
    let Ok(entries) = std::fs::read_dir(&ctx.config.export_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name == today_name {
            continue;
        }
        let Some(stem) = name.strip_suffix(".csv") else {
            continue;
        };
        // Only files this job wrote itself: named by date.
        if NaiveDate::parse_from_str(stem, "%Y-%m-%d").is_err() {
            continue;
        }

        if let Err(e) = send_csv_file(
            mailer,
            &ctx.config.report_recipient,
            &path,
            stem,
            "Attached is the attendance CSV.",
        )
        .await
        {
            warn!(error = %e, file = %path.display(), "Retry delivery failed, keeping file");
        }
    }
}

/// Email one CSV file and delete it once the send succeeds.
async fn send_csv_file(
    mailer: &dyn Mailer,
    recipient: &str,
    path: &Path,
    date_str: &str,
    body: &str,
) -> Result<(), ExportError> {
    let content = std::fs::read(path)?;
    let subject = format!("Attendance ({date_str}) Co-working Space");
    let filename = format!("{date_str}.csv");

    mailer
        .send_with_attachment(recipient, &subject, body, &filename, content)
        .await?;

    std::fs::remove_file(path)?;
    info!(file = %path.display(), "Attendance CSV emailed and local copy removed");
    Ok(())
}

/// Write the fixed-schema CSV for one day of sessions.
fn write_csv(path: &Path, sessions: &[SessionLog]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for s in sessions {
        writer.write_record([
            s.id.to_string(),
            s.email.clone(),
            s.name.clone(),
            s.position.clone().unwrap_or_default(),
            s.terms.to_string(),
            s.timein.map(timestamp).unwrap_or_default(),
            s.timeout.map(timestamp).unwrap_or_default(),
            s.login.map(|b| b.to_string()).unwrap_or_default(),
            s.logout.map(|b| b.to_string()).unwrap_or_default(),
            s.resources.clone().unwrap_or_default(),
            s.feedback.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn timestamp(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn session(id: i64, email: &str) -> SessionLog {
        SessionLog {
            id,
            email: email.to_string(),
            name: "Visitor".to_string(),
            position: Some("Researcher".to_string()),
            terms: true,
            timein: NaiveDate::from_ymd_opt(2024, 1, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0),
            timeout: None,
            login: Some(true),
            logout: None,
            resources: None,
            feedback: None,
        }
    }

    #[test]
    fn test_csv_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-10.csv");
        write_csv(&path, &[session(1, "a@x.com"), session(2, "b@x.com")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID,Email,Name,Position,Terms,Time In,Time Out,Login,Logout,Resources,Feedback"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,a@x.com,Visitor,Researcher,true,2024-01-10 09:00:00,,true,,,"
        );
        assert_eq!(lines.count(), 1);
    }
}
