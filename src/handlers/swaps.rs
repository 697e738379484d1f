use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{SwapQuery, SwapRequestInput};
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn create_swap_request(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<SwapRequestInput>,
) -> Result<HttpResponse> {
    let swap = state
        .swap_service
        .create(&path, &claims.identity(), &input)
        .await?;
    Ok(ApiResponse::created(swap))
}

/// `?status=` filters by state; `?open=true` lists pending open swaps the
/// caller could pick up.
pub async fn get_swap_requests(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<SwapQuery>,
) -> Result<HttpResponse> {
    let swaps = state
        .swap_service
        .list(&path, &claims.identity(), &query)
        .await?;
    Ok(ApiResponse::ok(swaps))
}

pub async fn get_swap_request(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let swap = state
        .swap_service
        .get(path.into_inner(), &claims.identity())
        .await?;
    Ok(ApiResponse::ok(swap))
}

pub async fn accept_swap_request(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let swap = state
        .swap_service
        .accept(path.into_inner(), &claims.identity())
        .await?;
    Ok(ApiResponse::ok(swap))
}

pub async fn decline_swap_request(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let swap = state
        .swap_service
        .decline(path.into_inner(), &claims.identity())
        .await?;
    Ok(ApiResponse::ok(swap))
}

pub async fn cancel_swap_request(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let swap = state
        .swap_service
        .cancel(path.into_inner(), &claims.identity())
        .await?;
    Ok(ApiResponse::ok(swap))
}
