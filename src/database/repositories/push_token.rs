use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::store::PushTokenStore;
use crate::error::AppError;

#[derive(Clone)]
pub struct PushTokenRepository {
    pool: PgPool,
}

impl PushTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushTokenStore for PushTokenRepository {
    async fn tokens_for_user(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        let tokens = sqlx::query_scalar::<_, String>(
            r#"
                SELECT
                    token
                FROM
                    push_tokens
                WHERE
                    user_id = $1
                ORDER BY
                    created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }
}
