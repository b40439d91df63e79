use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::Row;

use quotedesk_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn price_column(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let value: f64 = row.try_get(column)?;
    Ok(Decimal::from_f64(value).unwrap_or_default())
}

fn price_value(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let created_at_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(Product {
        id: ProductId(row.try_get("id")?),
        name: row.try_get("name")?,
        sku: row.try_get("sku")?,
        unit: row.try_get("unit")?,
        dealer_price: price_column(row, "dealer_price")?,
        project_price: price_column(row, "project_price")?,
        user_price: price_column(row, "user_price")?,
        description: row.try_get("description")?,
        created_at,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, sku, unit, dealer_price, project_price, user_price,
                    description, created_at
             FROM products ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_product).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, sku, unit, dealer_price, project_price, user_price,
                    description, created_at
             FROM products WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, product: Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO products (id, name, sku, unit, dealer_price, project_price,
                                   user_price, description, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.unit)
        .bind(price_value(product.dealer_price))
        .bind(price_value(product.project_price))
        .bind(price_value(product.user_price))
        .bind(&product.description)
        .bind(product.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products
             SET name = ?, sku = ?, unit = ?, dealer_price = ?, project_price = ?,
                 user_price = ?, description = ?
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.unit)
        .bind(price_value(product.dealer_price))
        .bind(price_value(product.project_price))
        .bind(price_value(product.user_price))
        .bind(&product.description)
        .bind(&product.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(&product.id).await
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM products WHERE id = ?").bind(&id.0).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use quotedesk_core::domain::product::{Product, ProductId};

    use super::SqlProductRepository;
    use crate::repositories::ProductRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlProductRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlProductRepository::new(pool)
    }

    fn sample(id: &str) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: "Access controller".to_string(),
            sku: "AC-4000".to_string(),
            unit: "set".to_string(),
            dealer_price: Decimal::new(1850000, 2),
            project_price: Decimal::new(2050000, 2),
            user_price: Decimal::new(2290000, 2),
            description: "4-door controller with PoE".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_update_delete_round_trip() {
        let repo = setup().await;
        repo.insert(sample("p-1")).await.expect("insert");

        let mut edited = sample("p-1");
        edited.user_price = Decimal::new(1990000, 2);
        let stored = repo.update(edited).await.expect("update").expect("row should exist");
        assert_eq!(stored.user_price, Decimal::new(1990000, 2));

        assert!(repo.delete(&ProductId("p-1".to_string())).await.expect("delete"));
        assert!(repo.find_by_id(&ProductId("p-1".to_string())).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn update_of_unknown_id_returns_none() {
        let repo = setup().await;
        let missing = repo.update(sample("p-missing")).await.expect("update");
        assert!(missing.is_none());
    }
}
