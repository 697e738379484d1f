use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::database::models::{SwapRequest, SwapStatus};
use crate::database::store::SwapRequestStore;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct SwapRequestRow {
    document: Json<SwapRequest>,
}

#[derive(Clone)]
pub struct SwapRequestRepository {
    pool: PgPool,
}

impl SwapRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SwapRequestStore for SwapRequestRepository {
    async fn insert(&self, swap: &SwapRequest) -> Result<(), AppError> {
        sqlx::query(
            r#"
                INSERT INTO
                    swap_requests (
                        id,
                        workspace_id,
                        requester_id,
                        target_employee_id,
                        status,
                        document,
                        created_at,
                        updated_at
                    )
                VALUES
                    ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(swap.id)
        .bind(&swap.workspace_id)
        .bind(&swap.requester_id)
        .bind(&swap.target_employee_id)
        .bind(swap.status)
        .bind(Json(swap))
        .bind(swap.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SwapRequest>, AppError> {
        let row = sqlx::query_as::<_, SwapRequestRow>(
            r#"
                SELECT
                    document
                FROM
                    swap_requests
                WHERE
                    id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.document.0))
    }

    async fn list_for_workspace(
        &self,
        workspace_id: &str,
        status: Option<SwapStatus>,
    ) -> Result<Vec<SwapRequest>, AppError> {
        let rows = sqlx::query_as::<_, SwapRequestRow>(
            r#"
                SELECT
                    document
                FROM
                    swap_requests
                WHERE
                    workspace_id = $1
                    AND ($2::varchar IS NULL OR status = $2)
                ORDER BY
                    created_at DESC
            "#,
        )
        .bind(workspace_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.document.0).collect())
    }

    async fn complete(&self, swap: &SwapRequest) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
                UPDATE
                    swap_requests
                SET
                    status = $1,
                    document = $2,
                    updated_at = $3
                WHERE
                    id = $4
                    AND status = 'pending'
            "#,
        )
        .bind(swap.status)
        .bind(Json(swap))
        .bind(Utc::now())
        .bind(swap.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn revert_to_pending(&self, id: Uuid, from: SwapStatus) -> Result<(), AppError> {
        sqlx::query(
            r#"
                UPDATE
                    swap_requests
                SET
                    status = 'pending',
                    document = document || jsonb_build_object(
                        'status', 'pending',
                        'acceptedAt', NULL,
                        'acceptedBy', NULL,
                        'declinedAt', NULL,
                        'declinedBy', NULL,
                        'cancelledAt', NULL
                    ),
                    updated_at = $1
                WHERE
                    id = $2
                    AND status = $3
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
