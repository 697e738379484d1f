use actix_web::{HttpResponse, Result, web};

use crate::AppState;
use crate::database::models::{
    ClearScheduleInput, NoteInput, ScheduleQuery, ShiftAssignmentInput, ShiftEntryInput,
    ShiftTypeInput,
};
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::time_utils::generate_time_options;

pub async fn get_schedule(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ScheduleQuery>,
) -> Result<HttpResponse> {
    let entries = state
        .schedule_service
        .list(&path, &claims.identity(), &query)
        .await?;
    Ok(ApiResponse::ok(entries))
}

/// A clash with an existing entry answers 409 with that entry in `data`;
/// resend with `replaceExisting` to overwrite it.
pub async fn add_shift(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<ShiftEntryInput>,
) -> Result<HttpResponse> {
    let entry = state
        .schedule_service
        .add(&path, &claims.identity(), &input)
        .await?;
    Ok(ApiResponse::created(entry))
}

pub async fn update_shift(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    input: web::Json<ShiftAssignmentInput>,
) -> Result<HttpResponse> {
    let (workspace_id, entry_id) = path.into_inner();
    let entry = state
        .schedule_service
        .edit(&workspace_id, &claims.identity(), &entry_id, &input)
        .await?;
    Ok(ApiResponse::ok(entry))
}

pub async fn delete_shift(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (workspace_id, entry_id) = path.into_inner();
    let entry = state
        .schedule_service
        .delete(&workspace_id, &claims.identity(), &entry_id)
        .await?;
    Ok(ApiResponse::ok(entry))
}

pub async fn clear_schedule(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: Option<web::Json<ClearScheduleInput>>,
) -> Result<HttpResponse> {
    let input = input.map(web::Json::into_inner).unwrap_or_default();
    let result = state
        .schedule_service
        .clear(&path, &claims.identity(), &input)
        .await?;
    Ok(ApiResponse::ok(result))
}

pub async fn add_note(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    input: web::Json<NoteInput>,
) -> Result<HttpResponse> {
    let (workspace_id, entry_id) = path.into_inner();
    let note = state
        .schedule_service
        .add_note(&workspace_id, &claims.identity(), &entry_id, &input)
        .await?;
    Ok(ApiResponse::created(note))
}

pub async fn delete_note(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse> {
    let (workspace_id, entry_id, note_id) = path.into_inner();
    let note = state
        .schedule_service
        .delete_note(&workspace_id, &claims.identity(), &entry_id, &note_id)
        .await?;
    Ok(ApiResponse::ok(note))
}

pub async fn create_shift_type(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<ShiftTypeInput>,
) -> Result<HttpResponse> {
    let shift_type = state
        .schedule_service
        .create_shift_type(&path, &claims.identity(), &input)
        .await?;
    Ok(ApiResponse::created(shift_type))
}

pub async fn update_shift_type(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    input: web::Json<ShiftTypeInput>,
) -> Result<HttpResponse> {
    let (workspace_id, shift_type_id) = path.into_inner();
    let shift_type = state
        .schedule_service
        .update_shift_type(&workspace_id, &claims.identity(), &shift_type_id, &input)
        .await?;
    Ok(ApiResponse::ok(shift_type))
}

pub async fn delete_shift_type(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (workspace_id, shift_type_id) = path.into_inner();
    let shift_type = state
        .schedule_service
        .delete_shift_type(&workspace_id, &claims.identity(), &shift_type_id)
        .await?;
    Ok(ApiResponse::ok(shift_type))
}

pub async fn time_options() -> Result<HttpResponse> {
    Ok(ApiResponse::ok(generate_time_options()))
}
