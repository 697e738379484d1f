use actix_web::{HttpResponse, Result, web};

use crate::AppState;
use crate::database::models::{AssignRoleInput, Employee, RoleInput, WorkspaceInput};
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn create_workspace(
    claims: Claims,
    state: web::Data<AppState>,
    input: web::Json<WorkspaceInput>,
) -> Result<HttpResponse> {
    let view = state
        .workspace_service
        .create(&claims.identity(), &input)
        .await?;
    Ok(ApiResponse::created(view))
}

pub async fn get_workspace(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let view = state
        .workspace_service
        .get(&path, &claims.identity())
        .await?;
    Ok(ApiResponse::ok(view))
}

pub async fn add_employee(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<Employee>,
) -> Result<HttpResponse> {
    let employee = state
        .workspace_service
        .add_employee(&path, &claims.identity(), input.into_inner())
        .await?;
    Ok(ApiResponse::created(employee))
}

pub async fn assign_role(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    input: web::Json<AssignRoleInput>,
) -> Result<HttpResponse> {
    let (workspace_id, user_id) = path.into_inner();
    let employee = state
        .workspace_service
        .assign_role(&workspace_id, &claims.identity(), &user_id, &input)
        .await?;
    Ok(ApiResponse::ok(employee))
}

pub async fn create_role(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<RoleInput>,
) -> Result<HttpResponse> {
    let role = state
        .workspace_service
        .create_role(&path, &claims.identity(), &input)
        .await?;
    Ok(ApiResponse::created(role))
}

pub async fn update_role(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    input: web::Json<RoleInput>,
) -> Result<HttpResponse> {
    let (workspace_id, role_id) = path.into_inner();
    let role = state
        .workspace_service
        .update_role(&workspace_id, &claims.identity(), &role_id, &input)
        .await?;
    Ok(ApiResponse::ok(role))
}

pub async fn delete_role(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (workspace_id, role_id) = path.into_inner();
    let role = state
        .workspace_service
        .delete_role(&workspace_id, &claims.identity(), &role_id)
        .await?;
    Ok(ApiResponse::ok(role))
}

pub async fn move_role_up(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (workspace_id, role_id) = path.into_inner();
    let roles = state
        .workspace_service
        .move_role(&workspace_id, &claims.identity(), &role_id, true)
        .await?;
    Ok(ApiResponse::ok(roles))
}

pub async fn move_role_down(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (workspace_id, role_id) = path.into_inner();
    let roles = state
        .workspace_service
        .move_role(&workspace_id, &claims.identity(), &role_id, false)
        .await?;
    Ok(ApiResponse::ok(roles))
}
