//! Distinct-visit counting.

use crate::error::SessionError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use coworkd_common::WebResult;
use serde::Deserialize;
use serde_json::{Value, json};

/// `GET /visits` query string.
#[derive(Debug, Deserialize)]
pub struct VisitsQuery {
    /// Year, required.
    pub year: Option<i32>,
    /// Month, required.
    pub month: Option<u32>,
    /// Day, optional narrowing.
    pub day: Option<u32>,
}

/// `GET /visits?year&month[&day]` - distinct `(email, day)` pairs in the
/// period. Repeated login cycles by one visitor on one day count once.
pub async fn count_visits(
    State(state): State<AppState>,
    Query(query): Query<VisitsQuery>,
) -> WebResult<Json<Value>> {
    let (Some(year), Some(month)) = (query.year, query.month) else {
        return Err(SessionError::MissingYearMonth.into());
    };

    let total = state
        .sessions
        .distinct_visits(year, month, query.day)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "year": year,
        "month": month,
        "day": query.day,
        "total_unique_visits": total,
    })))
}
