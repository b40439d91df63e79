use chrono::{DateTime, Utc};
use sqlx::Row;

use quotedesk_core::domain::pin::{PinId, PinProfile, Role};

use super::{PinRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPinRepository {
    pool: DbPool,
}

impl SqlPinRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<PinProfile, RepositoryError> {
    let role_str: String = row.try_get("role")?;
    let created_at_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(PinProfile {
        id: PinId(row.try_get("id")?),
        pin: row.try_get("pin")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        role: Role::parse(&role_str),
        signature_image: row.try_get("signature_image")?,
        created_at,
    })
}

#[async_trait::async_trait]
impl PinRepository for SqlPinRepository {
    async fn list(&self) -> Result<Vec<PinProfile>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, pin, first_name, last_name, role, signature_image, created_at
             FROM pins ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_profile).collect()
    }

    async fn find_by_id(&self, id: &PinId) -> Result<Option<PinProfile>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, pin, first_name, last_name, role, signature_image, created_at
             FROM pins WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_profile(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_pin(&self, pin: &str) -> Result<Option<PinProfile>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, pin, first_name, last_name, role, signature_image, created_at
             FROM pins WHERE pin = ? LIMIT 1",
        )
        .bind(pin)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_profile(r)?)),
            None => Ok(None),
        }
    }

    async fn pin_taken(
        &self,
        pin: &str,
        excluding: Option<&PinId>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = if let Some(excluding) = excluding {
            sqlx::query_scalar("SELECT COUNT(*) FROM pins WHERE pin = ? AND id != ?")
                .bind(pin)
                .bind(&excluding.0)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM pins WHERE pin = ?")
                .bind(pin)
                .fetch_one(&self.pool)
                .await?
        };

        Ok(count > 0)
    }

    async fn insert(&self, profile: PinProfile) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO pins (id, pin, first_name, last_name, role, signature_image, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&profile.id.0)
        .bind(&profile.pin)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.role.as_str())
        .bind(&profile.signature_image)
        .bind(profile.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, profile: PinProfile) -> Result<Option<PinProfile>, RepositoryError> {
        let result = sqlx::query(
            "UPDATE pins
             SET pin = ?, first_name = ?, last_name = ?, role = ?, signature_image = ?
             WHERE id = ?",
        )
        .bind(&profile.pin)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.role.as_str())
        .bind(&profile.signature_image)
        .bind(&profile.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(profile))
    }

    async fn delete(&self, id: &PinId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM pins WHERE id = ?").bind(&id.0).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use quotedesk_core::domain::pin::{PinId, PinProfile, Role};

    use super::SqlPinRepository;
    use crate::repositories::PinRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlPinRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlPinRepository::new(pool)
    }

    fn profile(id: &str, pin: &str, role: Role) -> PinProfile {
        PinProfile {
            id: PinId(id.to_string()),
            pin: pin.to_string(),
            first_name: "Somsri".to_string(),
            last_name: "Wong".to_string(),
            role,
            signature_image: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn find_by_pin_round_trips_role() {
        let repo = setup().await;
        repo.insert(profile("pin-1", "482913", Role::Admin)).await.expect("insert");

        let found = repo.find_by_pin("482913").await.expect("find").expect("should exist");
        assert_eq!(found.role, Role::Admin);
        assert_eq!(found.display_name(), "Somsri Wong");
    }

    #[tokio::test]
    async fn pin_taken_ignores_the_row_being_edited() {
        let repo = setup().await;
        repo.insert(profile("pin-1", "482913", Role::User)).await.expect("insert");

        assert!(repo.pin_taken("482913", None).await.expect("taken"));
        assert!(!repo
            .pin_taken("482913", Some(&PinId("pin-1".to_string())))
            .await
            .expect("taken excluding self"));
        assert!(!repo.pin_taken("111222", None).await.expect("free pin"));
    }

    #[tokio::test]
    async fn update_of_unknown_profile_returns_none() {
        let repo = setup().await;
        let result = repo.update(profile("pin-missing", "999999", Role::User)).await.expect("ok");
        assert!(result.is_none());
    }
}
