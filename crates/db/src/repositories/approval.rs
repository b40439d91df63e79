use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row};

use quotedesk_core::domain::approval::{ApprovalId, ApprovalRequest, ApprovalStatus};
use quotedesk_core::domain::quote::QuoteId;

use super::{ApprovalRepository, RepositoryError};
use crate::DbPool;

pub struct SqlApprovalRepository {
    pool: DbPool,
}

impl SqlApprovalRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_approval(row: &sqlx::sqlite::SqliteRow) -> Result<ApprovalRequest, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quote_id: String =
        row.try_get("quote_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let requested_by: Option<String> =
        row.try_get("requested_by").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let requested_at_str: String =
        row.try_get("requested_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let approved_by: Option<String> =
        row.try_get("approved_by").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let approved_at_str: Option<String> =
        row.try_get("approved_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let telegram_chat_id: Option<i64> =
        row.try_get("telegram_chat_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let telegram_message_id: Option<i64> =
        row.try_get("telegram_message_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let requested_at = DateTime::parse_from_rfc3339(&requested_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    let approved_at = approved_at_str
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(ApprovalRequest {
        id: ApprovalId(id),
        quote_id: QuoteId(quote_id),
        status: ApprovalStatus::parse(&status_str),
        requested_by,
        requested_at,
        approved_by,
        approved_at,
        telegram_chat_id,
        telegram_message_id,
    })
}

#[async_trait::async_trait]
impl ApprovalRepository for SqlApprovalRepository {
    async fn latest_for_quote(
        &self,
        quote_id: &QuoteId,
    ) -> Result<Option<ApprovalRequest>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, quote_id, status, requested_by, requested_at, approved_by,
                    approved_at, telegram_chat_id, telegram_message_id
             FROM quote_approvals
             WHERE quote_id = ?
             ORDER BY requested_at DESC
             LIMIT 1",
        )
        .bind(&quote_id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_approval(r)?)),
            None => Ok(None),
        }
    }

    async fn latest_for_quotes(
        &self,
        quote_ids: &[QuoteId],
    ) -> Result<Vec<ApprovalRequest>, RepositoryError> {
        if quote_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::new(
            "SELECT id, quote_id, status, requested_by, requested_at, approved_by,
                    approved_at, telegram_chat_id, telegram_message_id
             FROM quote_approvals WHERE quote_id IN (",
        );
        let mut separated = builder.separated(", ");
        for quote_id in quote_ids {
            separated.push_bind(&quote_id.0);
        }
        separated.push_unseparated(") ORDER BY requested_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await?;

        // Rows arrive newest-first; the first row seen per quote wins.
        let mut latest: Vec<ApprovalRequest> = Vec::new();
        for row in &rows {
            let approval = row_to_approval(row)?;
            if latest.iter().all(|seen| seen.quote_id != approval.quote_id) {
                latest.push(approval);
            }
        }

        Ok(latest)
    }

    async fn save(&self, approval: ApprovalRequest) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO quote_approvals (id, quote_id, status, requested_by, requested_at,
                                          approved_by, approved_at, telegram_chat_id,
                                          telegram_message_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 status = excluded.status,
                 approved_by = excluded.approved_by,
                 approved_at = excluded.approved_at,
                 telegram_chat_id = excluded.telegram_chat_id,
                 telegram_message_id = excluded.telegram_message_id",
        )
        .bind(&approval.id.0)
        .bind(&approval.quote_id.0)
        .bind(approval.status.as_str())
        .bind(&approval.requested_by)
        .bind(approval.requested_at.to_rfc3339())
        .bind(&approval.approved_by)
        .bind(approval.approved_at.map(|dt| dt.to_rfc3339()))
        .bind(approval.telegram_chat_id)
        .bind(approval.telegram_message_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_telegram_refs(
        &self,
        id: &ApprovalId,
        chat_id: Option<i64>,
        message_id: Option<i64>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE quote_approvals
             SET telegram_chat_id = COALESCE(?, telegram_chat_id),
                 telegram_message_id = COALESCE(?, telegram_message_id)
             WHERE id = ?",
        )
        .bind(chat_id)
        .bind(message_id)
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &ApprovalId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM quote_approvals WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
