use actix_web::{HttpResponse, Result, web};

use crate::AppState;
use crate::database::models::RenameInput;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// Pushes a changed display name into every workspace the caller belongs
/// to. Per-workspace failures are reported in the counts, not as errors.
pub async fn update_name(
    claims: Claims,
    state: web::Data<AppState>,
    input: web::Json<RenameInput>,
) -> Result<HttpResponse> {
    let report = state
        .workspace_service
        .propagate_employee_rename(&claims.identity(), &input.name)
        .await?;
    Ok(ApiResponse::ok(report))
}
