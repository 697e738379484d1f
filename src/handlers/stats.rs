use actix_web::{HttpResponse, Result, web};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::AppState;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
pub struct HoursQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Defaults to the current month.
pub async fn get_monthly_hours(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<HoursQuery>,
) -> Result<HttpResponse> {
    let today = Utc::now().date_naive();
    let month = query.month.unwrap_or_else(|| today.month());
    let year = query.year.unwrap_or_else(|| today.year());

    let hours = state
        .schedule_service
        .monthly_hours(&path, &claims.identity(), month, year)
        .await?;
    Ok(ApiResponse::ok(hours))
}
