use chrono::{DateTime, Utc};
use sqlx::Row;

use quotedesk_core::domain::customer::{Customer, CustomerId};

use super::{CustomerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let created_at_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(Customer {
        id: CustomerId(row.try_get("id")?),
        company_name: row.try_get("company_name")?,
        tax_id: row.try_get("tax_id")?,
        contact_name: row.try_get("contact_name")?,
        contact_phone: row.try_get("contact_phone")?,
        address: row.try_get("address")?,
        approx_purchase_date: row.try_get("approx_purchase_date")?,
        created_at,
    })
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, company_name, tax_id, contact_name, contact_phone, address,
                    approx_purchase_date, created_at
             FROM customers ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_customer).collect()
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, company_name, tax_id, contact_name, contact_phone, address,
                    approx_purchase_date, created_at
             FROM customers WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_customer(r)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, customer: Customer) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO customers (id, company_name, tax_id, contact_name, contact_phone,
                                    address, approx_purchase_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.id.0)
        .bind(&customer.company_name)
        .bind(&customer.tax_id)
        .bind(&customer.contact_name)
        .bind(&customer.contact_phone)
        .bind(&customer.address)
        .bind(&customer.approx_purchase_date)
        .bind(customer.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use quotedesk_core::domain::customer::{Customer, CustomerId};

    use super::SqlCustomerRepository;
    use crate::repositories::CustomerRepository;
    use crate::{connect_with_settings, migrations};

    fn sample(id: &str, company: &str, age_mins: i64) -> Customer {
        Customer {
            id: CustomerId(id.to_string()),
            company_name: company.to_string(),
            tax_id: "0105543102214".to_string(),
            contact_name: "Khun Ploy".to_string(),
            contact_phone: "0812345678".to_string(),
            address: "88/12 Rama IX Rd, Bangkok".to_string(),
            approx_purchase_date: "Q3/2026".to_string(),
            created_at: Utc::now() - Duration::minutes(age_mins),
        }
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlCustomerRepository::new(pool);

        repo.insert(sample("c-old", "Older Co", 60)).await.expect("insert old");
        repo.insert(sample("c-new", "Newer Co", 1)).await.expect("insert new");

        let customers = repo.list().await.expect("list");
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].id.0, "c-new");
        assert_eq!(customers[1].id.0, "c-old");
    }
}
