use actix_web::{HttpResponse, Result, web};

use crate::AppState;
use crate::database::models::{ApplyPresetInput, PresetInput};
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn get_presets(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let presets = state
        .preset_service
        .list(&path, &claims.identity())
        .await?;
    Ok(ApiResponse::ok(presets))
}

pub async fn save_preset(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<PresetInput>,
) -> Result<HttpResponse> {
    let preset = state
        .preset_service
        .save(&path, &claims.identity(), &input)
        .await?;
    Ok(ApiResponse::created(preset))
}

pub async fn delete_preset(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (workspace_id, preset_id) = path.into_inner();
    let preset = state
        .preset_service
        .delete(&workspace_id, &claims.identity(), &preset_id)
        .await?;
    Ok(ApiResponse::ok(preset))
}

/// Replaces every shift of the target month. The body must carry
/// `"confirm": true`.
pub async fn apply_preset(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    input: web::Json<ApplyPresetInput>,
) -> Result<HttpResponse> {
    let (workspace_id, preset_id) = path.into_inner();
    let result = state
        .preset_service
        .apply(&workspace_id, &claims.identity(), &preset_id, &input)
        .await?;
    Ok(ApiResponse::ok(result))
}
