//! Venue catalog and availability.

use crate::auth::AuthClaims;
use crate::error::ReservationError;
use crate::ledger;
use crate::models::{ReservationResponse, TimeOfDay, Venue};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Local;
use coworkd_common::WebResult;
use serde::{Deserialize, Serialize};

/// `GET /venues` - the full catalog.
pub async fn list(State(state): State<AppState>) -> WebResult<Json<Vec<Venue>>> {
    Ok(Json(state.venues.list().await?))
}

/// `GET /venues/{id}` - one venue.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<Venue>> {
    let venue = state
        .venues
        .find(&id)
        .await?
        .ok_or(ReservationError::VenueNotFound)?;
    Ok(Json(venue))
}

/// Query string for the availability view.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Calendar date, `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
}

/// A free one-hour slot.
#[derive(Debug, Serialize)]
pub struct FreeSlot {
    /// Slot start, `HH:MM`.
    pub start: String,
    /// Slot end, `HH:MM`.
    pub end: String,
}

/// Availability response: the day's bookings plus the hour slots still open.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    /// The venue.
    pub venue: Venue,
    /// The day in question.
    pub date: String,
    /// Confirmed bookings, ordered by start time.
    pub reservations: Vec<ReservationResponse>,
    /// Hour slots with no booking.
    pub free_slots: Vec<FreeSlot>,
}

/// `GET /venues/{id}/availability` - day schedule and free slots.
pub async fn availability(
    State(state): State<AppState>,
    _claims: AuthClaims,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> WebResult<Json<AvailabilityResponse>> {
    let venue = state
        .venues
        .find(&id)
        .await?
        .ok_or(ReservationError::VenueNotFound)?;

    let date = query
        .date
        .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());

    let rows = state.reservations.confirmed_for_venue_date(&id, &date).await?;

    // Unparseable stored times simply don't block a slot; they can only come
    // from rows written before the ledger's validation existed.
    let taken: Vec<(TimeOfDay, TimeOfDay)> = rows
        .iter()
        .filter_map(|row| {
            let start = row.reservation.start_time.parse().ok()?;
            let end = row.reservation.end_time.parse().ok()?;
            Some((start, end))
        })
        .collect();

    let free_slots = ledger::free_hour_slots(&taken)
        .into_iter()
        .map(|(start, end)| FreeSlot {
            start: start.to_string(),
            end: end.to_string(),
        })
        .collect();

    Ok(Json(AvailabilityResponse {
        venue,
        date,
        reservations: rows.into_iter().map(ReservationResponse::from).collect(),
        free_slots,
    }))
}
