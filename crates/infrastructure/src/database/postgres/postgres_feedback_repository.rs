use async_trait::async_trait;
use chrono::{DateTime, Utc};
use client_manager_core::{
    Feedback, FeedbackRepository, FeedbackStats, FeedbackType, ManagerError, ManagerResult, PageRequest,
    FEEDBACK_BATCH_SIZE,
};
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, instrument};

use crate::{
    error_handling::{RepositoryErrorHelpers, RepositoryOperation},
    feedback_context,
};

const SELECT_COLUMNS: &str = "id, type, conversation_id, user_id, content, metadata, created_at, updated_at";

pub struct PostgresFeedbackRepository {
    pool: PgPool,
}

impl PostgresFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_feedback(row: &PgRow) -> ManagerResult<Feedback> {
        let feedback_type: String = row.try_get("type")?;
        Ok(Feedback {
            id: row.try_get("id")?,
            feedback_type: feedback_type.parse().map_err(ManagerError::Serialization)?,
            conversation_id: row.try_get("conversation_id")?,
            user_id: row.try_get("user_id")?,
            content: row.try_get("content")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl FeedbackRepository for PostgresFeedbackRepository {
    #[instrument(skip(self, feedback), fields(feedback_type = %feedback.feedback_type))]
    async fn create(&self, feedback: &Feedback) -> ManagerResult<Feedback> {
        let context = feedback_context!(RepositoryOperation::Create, feedback_type = feedback.feedback_type.as_str())
            .with_conversation(&feedback.conversation_id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO feedbacks (type, conversation_id, user_id, content, metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(feedback.feedback_type.as_str())
        .bind(&feedback.conversation_id)
        .bind(&feedback.user_id)
        .bind(&feedback.content)
        .bind(&feedback.metadata)
        .bind(feedback.created_at)
        .bind(feedback.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        let created = Self::row_to_feedback(&row)?;
        debug!("创建反馈成功: ID {}", created.id);
        Ok(created)
    }

    #[instrument(skip(self, feedbacks), fields(count = feedbacks.len()))]
    async fn create_batch(&self, feedbacks: &[Feedback]) -> ManagerResult<usize> {
        let context = feedback_context!(RepositoryOperation::BatchCreate).with_batch_size(feedbacks.len());
        if feedbacks.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        for chunk in feedbacks.chunks(FEEDBACK_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO feedbacks (type, conversation_id, user_id, content, metadata, created_at, updated_at) ",
            );
            builder.push_values(chunk, |mut b, feedback| {
                b.push_bind(feedback.feedback_type.as_str())
                    .push_bind(&feedback.conversation_id)
                    .push_bind(&feedback.user_id)
                    .push_bind(&feedback.content)
                    .push_bind(&feedback.metadata)
                    .push_bind(feedback.created_at)
                    .push_bind(feedback.updated_at);
            });

            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        RepositoryErrorHelpers::log_operation_success(&context, None);
        Ok(feedbacks.len())
    }

    #[instrument(skip(self))]
    async fn list_by_conversation(&self, conversation_id: &str) -> ManagerResult<Vec<Feedback>> {
        let context = feedback_context!(RepositoryOperation::Query, conversation = conversation_id);

        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM feedbacks WHERE conversation_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        rows.iter().map(Self::row_to_feedback).collect()
    }

    #[instrument(skip(self))]
    async fn list_by_type(&self, feedback_type: FeedbackType, page: PageRequest) -> ManagerResult<Vec<Feedback>> {
        let context = feedback_context!(RepositoryOperation::Query, feedback_type = feedback_type.as_str());

        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM feedbacks WHERE type = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(feedback_type.as_str())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        rows.iter().map(Self::row_to_feedback).collect()
    }

    #[instrument(skip(self))]
    async fn count_by_type(&self, feedback_type: FeedbackType) -> ManagerResult<i64> {
        let context = feedback_context!(RepositoryOperation::Query, feedback_type = feedback_type.as_str());

        let row = sqlx::query("SELECT COUNT(*) AS count FROM feedbacks WHERE type = $1")
            .bind(feedback_type.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        Ok(row.try_get("count")?)
    }

    #[instrument(skip(self))]
    async fn stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ManagerResult<FeedbackStats> {
        let context = feedback_context!(RepositoryOperation::Query);

        let rows = sqlx::query(
            "SELECT type, COUNT(*) AS count FROM feedbacks WHERE created_at BETWEEN $1 AND $2 GROUP BY type",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        let mut stats = FeedbackStats::default();
        for row in rows {
            let feedback_type: String = row.try_get("type")?;
            let count: i64 = row.try_get("count")?;
            stats.total_count += count;
            stats.type_counts.insert(feedback_type, count);
        }

        debug!("反馈统计: 共 {} 条", stats.total_count);
        Ok(stats)
    }
}
