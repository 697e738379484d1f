use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::database::events::WorkspaceEvents;
use crate::database::models::Workspace;
use crate::database::store::{WorkspaceSnapshot, WorkspaceStore, WorkspaceStream};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    version: i64,
    document: Json<Workspace>,
}

impl From<WorkspaceRow> for WorkspaceSnapshot {
    fn from(row: WorkspaceRow) -> Self {
        Self {
            workspace: row.document.0,
            version: row.version,
        }
    }
}

/// Workspaces stored one JSONB document per row, guarded by a version
/// column that every write must present.
#[derive(Clone)]
pub struct WorkspaceRepository {
    pool: PgPool,
    events: WorkspaceEvents,
}

impl WorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            events: WorkspaceEvents::new(),
        }
    }
}

#[async_trait]
impl WorkspaceStore for WorkspaceRepository {
    async fn insert(&self, workspace: &Workspace) -> Result<WorkspaceSnapshot, AppError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
                INSERT INTO
                    workspaces (id, owner_id, version, document, created_at, updated_at)
                VALUES
                    ($1, $2, 1, $3, $4, $4)
                ON CONFLICT (id) DO NOTHING
                RETURNING
                    version,
                    document
            "#,
        )
        .bind(&workspace.id)
        .bind(&workspace.owner_id)
        .bind(Json(workspace))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Workspace {} already exists", workspace.id)))?;

        self.events.publish(workspace);
        Ok(row.into())
    }

    async fn fetch(&self, workspace_id: &str) -> Result<Option<WorkspaceSnapshot>, AppError> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
                SELECT
                    version,
                    document
                FROM
                    workspaces
                WHERE
                    id = $1
            "#,
        )
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn save(&self, workspace: &Workspace, expected_version: i64) -> Result<i64, AppError> {
        let version = sqlx::query_scalar::<_, i64>(
            r#"
                UPDATE
                    workspaces
                SET
                    document = $1,
                    version = version + 1,
                    updated_at = $2
                WHERE
                    id = $3
                    AND version = $4
                RETURNING
                    version
            "#,
        )
        .bind(Json(workspace))
        .bind(Utc::now())
        .bind(&workspace.id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match version {
            Some(version) => {
                self.events.publish(workspace);
                Ok(version)
            }
            None => {
                log::warn!(
                    "Rejected stale write to workspace {} (expected v{})",
                    workspace.id,
                    expected_version
                );
                Err(AppError::stale_workspace(&workspace.id))
            }
        }
    }

    async fn list_for_member(&self, user_id: &str) -> Result<Vec<WorkspaceSnapshot>, AppError> {
        let rows = sqlx::query_as::<_, WorkspaceRow>(
            r#"
                SELECT
                    version,
                    document
                FROM
                    workspaces
                WHERE
                    owner_id = $1
                    OR document -> 'employees' @> jsonb_build_array(jsonb_build_object('userId', $1::text))
                ORDER BY
                    created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn subscribe(&self, workspace_id: &str) -> Result<WorkspaceStream, AppError> {
        Ok(self.events.subscribe(workspace_id))
    }
}
