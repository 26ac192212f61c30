//! The reservation ledger: booking rules and conflict detection.
//!
//! Bookings live on an hour grid between 8:00 and 17:00. A candidate
//! conflicts with an existing reservation on the same venue and date when
//! their `[start, end)` windows overlap; the check and the insert share one
//! transaction so a concurrent request cannot slip between them.

use crate::error::{ReservationError, Result};
use crate::models::{CreateReservationRequest, ReservationWithOwner, TimeOfDay, User};
use crate::store::{NewReservation, ReservationStore};
use tracing::{info, warn};

/// Earliest bookable hour.
const OPEN_HOUR: u8 = 8;
/// Latest hour a booking may end on.
const CLOSE_HOUR: u8 = 17;
/// Largest allowed headcount.
const MAX_PARTICIPANTS: i64 = 20;

/// True when the candidate window overlaps an existing one.
///
/// Three-way test over half-open intervals: the candidate's start falls
/// inside `[start, end)`, its end falls inside `(start, end]`, or it fully
/// contains the existing window. Boundary-adjacent windows do not overlap.
fn overlaps(new: (TimeOfDay, TimeOfDay), existing: (TimeOfDay, TimeOfDay)) -> bool {
    let (new_start, new_end) = new;
    let (start, end) = existing;

    (new_start >= start && new_start < end)
        || (new_end > start && new_end <= end)
        || (new_start <= start && new_end >= end)
}

/// Validate the booking window at hour granularity.
///
/// Only the hour components count, so 8:30-9:00 is inside the window even
/// though 8:30 is after opening.
fn validate_window(start: TimeOfDay, end: TimeOfDay) -> Result<()> {
    if start.hour < OPEN_HOUR || end.hour > CLOSE_HOUR || start.hour >= end.hour {
        return Err(ReservationError::InvalidTimeRange);
    }
    Ok(())
}

/// Free one-hour slots on the booking grid, given the windows already taken.
///
/// Walks the 8:00-17:00 grid hour by hour and keeps the slots that overlap
/// nothing.
#[must_use]
pub fn free_hour_slots(taken: &[(TimeOfDay, TimeOfDay)]) -> Vec<(TimeOfDay, TimeOfDay)> {
    (OPEN_HOUR..CLOSE_HOUR)
        .map(|hour| {
            (
                TimeOfDay { hour, minute: 0 },
                TimeOfDay {
                    hour: hour + 1,
                    minute: 0,
                },
            )
        })
        .filter(|slot| !taken.iter().any(|&window| overlaps(*slot, window)))
        .collect()
}

/// Create a booking.
///
/// Validates the window and headcount, then checks for conflicts against
/// every reservation already on the `(venue, date)` slice before inserting,
/// all inside one transaction.
///
/// # Errors
///
/// [`ReservationError::InvalidTimeRange`], [`ReservationError::CapacityExceeded`]
/// or [`ReservationError::TimeConflict`] when a rule fails;
/// [`ReservationError::Database`] on storage failure.
pub async fn create(
    store: &ReservationStore,
    user: &User,
    req: &CreateReservationRequest,
) -> Result<ReservationWithOwner> {
    let start: TimeOfDay = req
        .start_time
        .parse()
        .map_err(|_| ReservationError::InvalidTimeRange)?;
    let end: TimeOfDay = req
        .end_time
        .parse()
        .map_err(|_| ReservationError::InvalidTimeRange)?;

    validate_window(start, end)?;

    if req.max_participants > MAX_PARTICIPANTS {
        return Err(ReservationError::CapacityExceeded);
    }

    let mut tx = store.begin().await?;

    let existing = ReservationStore::for_venue_date(&mut tx, &req.venue, &req.date).await?;
    for reservation in &existing {
        let theirs_start: TimeOfDay = reservation
            .start_time
            .parse()
            .map_err(|_| ReservationError::Database("unparseable stored time".to_string()))?;
        let theirs_end: TimeOfDay = reservation
            .end_time
            .parse()
            .map_err(|_| ReservationError::Database("unparseable stored time".to_string()))?;
        if overlaps((start, end), (theirs_start, theirs_end)) {
            return Err(ReservationError::TimeConflict);
        }
    }

    let id = ReservationStore::insert(
        &mut tx,
        NewReservation {
            user_id: user.id,
            venue_id: &req.venue,
            purpose: &req.purpose,
            date: &req.date,
            start_time: &req.start_time,
            end_time: &req.end_time,
            name: &req.name,
            organization: &req.organization,
            max_participants: req.max_participants,
        },
    )
    .await?;

    tx.commit().await?;

    // Best-effort notification. A failure here must never unwind the
    // committed booking.
    info!(
        email = %user.email,
        venue = %req.venue,
        date = %req.date,
        start = %req.start_time,
        end = %req.end_time,
        "Reservation confirmation notification queued"
    );

    store
        .find(id)
        .await?
        .ok_or_else(|| ReservationError::Database("inserted reservation vanished".to_string()))
}

/// List reservations visible to a user: everything for admins, their own
/// otherwise.
///
/// # Errors
///
/// Returns [`ReservationError::Database`] on storage failure.
pub async fn list(store: &ReservationStore, user: &User) -> Result<Vec<ReservationWithOwner>> {
    if user.is_admin {
        store.list_all().await
    } else {
        store.list_for_user(user.id).await
    }
}

/// Fetch one reservation, if the user may see it.
///
/// # Errors
///
/// [`ReservationError::ReservationNotFound`] when the id is unknown;
/// [`ReservationError::Forbidden`] when the requester is neither the owner
/// nor an admin.
pub async fn get(
    store: &ReservationStore,
    user: &User,
    id: i64,
) -> Result<ReservationWithOwner> {
    let row = store
        .find(id)
        .await?
        .ok_or(ReservationError::ReservationNotFound)?;
    if row.reservation.user_id != user.id && !user.is_admin {
        return Err(ReservationError::Forbidden(
            "Unauthorized to view this reservation",
        ));
    }
    Ok(row)
}

/// Delete a reservation as its owner or an admin.
///
/// # Errors
///
/// [`ReservationError::ReservationNotFound`] when the id is unknown;
/// [`ReservationError::Forbidden`] when the requester may not delete it.
pub async fn delete(store: &ReservationStore, user: &User, id: i64) -> Result<()> {
    let row = store
        .find(id)
        .await?
        .ok_or(ReservationError::ReservationNotFound)?;
    if row.reservation.user_id != user.id && !user.is_admin {
        return Err(ReservationError::Forbidden(
            "Unauthorized to delete this reservation",
        ));
    }
    store.delete(id).await?;
    Ok(())
}

/// Overwrite a reservation's attendance list, admin only.
///
/// An unknown id is a silent success: the patch is treated as idempotent,
/// which is what the legacy clients rely on.
///
/// # Errors
///
/// [`ReservationError::Forbidden`] when the requester is not an admin;
/// [`ReservationError::Database`] on storage failure.
pub async fn set_attendance(
    store: &ReservationStore,
    user: &User,
    id: i64,
    attendance: &[String],
) -> Result<()> {
    if !user.is_admin {
        return Err(ReservationError::Forbidden("Admin access required"));
    }
    let touched = store.set_attendance(id, attendance).await?;
    if touched == 0 {
        warn!(reservation_id = id, "Attendance update for unknown reservation");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn window(a: &str, b: &str) -> (TimeOfDay, TimeOfDay) {
        (t(a), t(b))
    }

    #[test]
    fn test_overlap_start_inside() {
        assert!(overlaps(window("09:30", "10:30"), window("09:00", "10:00")));
    }

    #[test]
    fn test_overlap_end_inside() {
        assert!(overlaps(window("08:30", "09:30"), window("09:00", "10:00")));
    }

    #[test]
    fn test_overlap_contains() {
        assert!(overlaps(window("08:00", "11:00"), window("09:00", "10:00")));
    }

    #[test]
    fn test_overlap_identical() {
        assert!(overlaps(window("09:00", "10:00"), window("09:00", "10:00")));
    }

    #[test]
    fn test_no_overlap_adjacent_after() {
        // Half-open windows: a booking may start exactly when another ends.
        assert!(!overlaps(window("10:00", "11:00"), window("09:00", "10:00")));
    }

    #[test]
    fn test_no_overlap_adjacent_before() {
        assert!(!overlaps(window("08:00", "09:00"), window("09:00", "10:00")));
    }

    #[test]
    fn test_no_overlap_disjoint() {
        assert!(!overlaps(window("14:00", "15:00"), window("09:00", "10:00")));
    }

    #[test]
    fn test_window_bounds() {
        assert!(validate_window(t("08:00"), t("17:00")).is_ok());
        assert!(validate_window(t("07:00"), t("09:00")).is_err());
        assert!(validate_window(t("16:00"), t("18:00")).is_err());
        assert!(validate_window(t("10:00"), t("10:00")).is_err());
        assert!(validate_window(t("11:00"), t("10:00")).is_err());
    }

    #[test]
    fn test_free_slots_empty_day() {
        let slots = free_hour_slots(&[]);
        assert_eq!(slots.len(), 9);
        assert_eq!(slots[0].0.to_string(), "08:00");
        assert_eq!(slots[8].1.to_string(), "17:00");
    }

    #[test]
    fn test_free_slots_skip_taken_hours() {
        let slots = free_hour_slots(&[window("09:00", "11:00")]);
        let starts: Vec<String> = slots.iter().map(|s| s.0.to_string()).collect();
        assert!(!starts.contains(&"09:00".to_string()));
        assert!(!starts.contains(&"10:00".to_string()));
        assert!(starts.contains(&"08:00".to_string()));
        assert!(starts.contains(&"11:00".to_string()));
        assert_eq!(slots.len(), 7);
    }

    #[test]
    fn test_free_slots_partial_hour_blocks_slot() {
        // A 09:30 start still blocks the 09:00-10:00 slot.
        let slots = free_hour_slots(&[window("09:30", "10:30")]);
        let starts: Vec<String> = slots.iter().map(|s| s.0.to_string()).collect();
        assert!(!starts.contains(&"09:00".to_string()));
        assert!(!starts.contains(&"10:00".to_string()));
    }

    #[test]
    fn test_window_is_hour_granular() {
        // 8:30-9:00 passes: only the hour components are checked.
        assert!(validate_window(t("08:30"), t("09:00")).is_ok());
        // 16:59-17:59 passes for the same reason, end hour is 17.
        assert!(validate_window(t("16:59"), t("17:59")).is_ok());
    }
}
