use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record as read from the directory. The credential hash is never
/// selected here; nothing downstream of this type can leak it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub diet_plan_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// User-directory boundary: profile reads and the reverse lookup used by
/// cache propagation.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>>;
    /// All users whose stored diet-plan reference equals `plan_id`.
    async fn find_by_diet_plan(&self, plan_id: Uuid) -> anyhow::Result<Vec<UserRecord>>;
}

pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, username, diet_plan_id, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_diet_plan(&self, plan_id: Uuid) -> anyhow::Result<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, username, diet_plan_id, created_at
            FROM users
            WHERE diet_plan_id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }
}
