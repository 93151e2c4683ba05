use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::RecordStore;
use crate::config::DatabaseConfig;
use crate::models::Answer;
use crate::types::PipelineResult;

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(url)
            .await?;

        // Test connection
        sqlx::query("SELECT 1").fetch_one(&pool).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn save(&self, answer: &Answer) -> PipelineResult<()> {
        sqlx::query(
            r#"
            INSERT INTO answers (job_id, username, question, answer, llm_model, cache_hit, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(answer.job_id)
        .bind(&answer.user)
        .bind(&answer.question)
        .bind(&answer.answer)
        .bind(&answer.llm_model)
        .bind(answer.cache_hit)
        .bind(answer.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> PipelineResult<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT job_id, username, question, answer, llm_model, cache_hit, completed_at
            FROM answers
            ORDER BY completed_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }
}
