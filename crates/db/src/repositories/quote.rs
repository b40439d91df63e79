use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::Row;

use quotedesk_core::domain::customer::CustomerId;
use quotedesk_core::domain::quote::{Quote, QuoteId, QuoteItem};

use super::{QuoteRepository, RepositoryError};
use crate::DbPool;

pub struct SqlQuoteRepository {
    pool: DbPool,
}

impl SqlQuoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_quote(row: &sqlx::sqlite::SqliteRow) -> Result<Quote, RepositoryError> {
    let items_json: String = row.try_get("items")?;
    let items: Vec<QuoteItem> = serde_json::from_str(&items_json)
        .map_err(|e| RepositoryError::Decode(format!("quote items: {e}")))?;

    let total: f64 = row.try_get("total")?;
    let customer_id: Option<String> = row.try_get("customer_id")?;
    let created_at_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(Quote {
        id: QuoteId(row.try_get("id")?),
        customer_id: customer_id.map(CustomerId),
        company_name: row.try_get("company_name")?,
        system_name: row.try_get("system_name")?,
        items,
        total: Decimal::from_f64(total).unwrap_or_default(),
        note: row.try_get("note")?,
        created_at,
    })
}

#[async_trait::async_trait]
impl QuoteRepository for SqlQuoteRepository {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, customer_id, company_name, system_name, items, total, note, created_at
             FROM quotes WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_quote(r)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, quote: Quote) -> Result<(), RepositoryError> {
        let items_json = serde_json::to_string(&quote.items)
            .map_err(|e| RepositoryError::Decode(format!("quote items: {e}")))?;

        sqlx::query(
            "INSERT INTO quotes (id, customer_id, company_name, system_name, items, total,
                                 note, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&quote.id.0)
        .bind(quote.customer_id.as_ref().map(|id| id.0.clone()))
        .bind(&quote.company_name)
        .bind(&quote.system_name)
        .bind(items_json)
        .bind(quote.total.to_f64().unwrap_or(0.0))
        .bind(&quote.note)
        .bind(quote.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Quote>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, company_name, system_name, items, total, note, created_at
             FROM quotes ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_quote).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use quotedesk_core::domain::quote::{Quote, QuoteId, QuoteItem};

    use super::SqlQuoteRepository;
    use crate::repositories::QuoteRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlQuoteRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlQuoteRepository::new(pool)
    }

    fn sample(id: &str, age_mins: i64) -> Quote {
        Quote {
            id: QuoteId(id.to_string()),
            customer_id: None,
            company_name: "Riverside Hotel".to_string(),
            system_name: "CCTV renovation".to_string(),
            items: vec![
                QuoteItem {
                    description: "Dome camera".to_string(),
                    qty: Decimal::from(4),
                    price: Decimal::from(2500),
                },
                QuoteItem {
                    description: "Install labour".to_string(),
                    qty: Decimal::from(1),
                    price: Decimal::from(3000),
                },
            ],
            total: Decimal::from(12500),
            note: Some("Net 15".to_string()),
            created_at: Utc::now() - Duration::minutes(age_mins),
        }
    }

    #[tokio::test]
    async fn items_survive_the_json_round_trip() {
        let repo = setup().await;
        repo.insert(sample("q-1", 0)).await.expect("insert");

        let found =
            repo.find_by_id(&QuoteId("q-1".to_string())).await.expect("find").expect("exists");
        assert_eq!(found.items.len(), 2);
        assert_eq!(found.items[0].description, "Dome camera");
        assert_eq!(found.items[0].qty, Decimal::from(4));
        assert_eq!(found.total, Decimal::from(12500));
    }

    #[tokio::test]
    async fn list_recent_orders_and_limits() {
        let repo = setup().await;
        repo.insert(sample("q-oldest", 30)).await.expect("insert");
        repo.insert(sample("q-middle", 20)).await.expect("insert");
        repo.insert(sample("q-newest", 10)).await.expect("insert");

        let quotes = repo.list_recent(2).await.expect("list");
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].id.0, "q-newest");
        assert_eq!(quotes[1].id.0, "q-middle");
    }
}
