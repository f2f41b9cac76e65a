use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::model::{DayPlan, DietPlan, NutritionProfile, PlanVariant};

/// Document-store boundary for diet plans. Every mutating write rewrites
/// the whole document; there is no version column, so concurrent writers
/// to one id are last-write-wins.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn create(&self, plan: &DietPlan) -> anyhow::Result<()>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<DietPlan>>;
    async fn list(&self) -> anyhow::Result<Vec<DietPlan>>;
    /// Plans whose canonical sequence contains an entry for `day`.
    async fn find_by_day(&self, day: Date) -> anyhow::Result<Vec<DietPlan>>;
    /// Returns false when the row no longer exists.
    async fn update(&self, plan: &DietPlan) -> anyhow::Result<bool>;
    /// Returns the deleted document, if any.
    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<DietPlan>>;
}

#[derive(Debug, FromRow)]
struct DietPlanRow {
    id: Uuid,
    nutritions_per_day: Json<NutritionProfile>,
    active_model: Option<String>,
    plan: Json<Vec<DayPlan>>,
    variants: Json<Vec<PlanVariant>>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<DietPlanRow> for DietPlan {
    fn from(row: DietPlanRow) -> Self {
        DietPlan {
            id: row.id,
            nutritions_per_day: row.nutritions_per_day.0,
            active_model: row.active_model.and_then(|s| s.parse().ok()),
            plan: row.plan.0,
            variants: row.variants.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PLAN_COLUMNS: &str =
    "id, nutritions_per_day, active_model, plan, variants, created_at, updated_at";

pub struct PgPlanStore {
    db: PgPool,
}

impl PgPlanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn create(&self, plan: &DietPlan) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO diet_plans (id, nutritions_per_day, active_model, plan, variants, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(plan.id)
        .bind(Json(&plan.nutritions_per_day))
        .bind(plan.active_model.map(|m| m.as_str()))
        .bind(Json(&plan.plan))
        .bind(Json(&plan.variants))
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<DietPlan>> {
        let row = sqlx::query_as::<_, DietPlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM diet_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(DietPlan::from))
    }

    async fn list(&self) -> anyhow::Result<Vec<DietPlan>> {
        let rows = sqlx::query_as::<_, DietPlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM diet_plans ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(DietPlan::from).collect())
    }

    async fn find_by_day(&self, day: Date) -> anyhow::Result<Vec<DietPlan>> {
        let rows = sqlx::query_as::<_, DietPlanRow>(&format!(
            r#"
            SELECT {PLAN_COLUMNS} FROM diet_plans
            WHERE EXISTS (
                SELECT 1 FROM jsonb_array_elements(plan) AS d
                WHERE d->>'date' = $1
            )
            ORDER BY created_at DESC
            "#
        ))
        .bind(day.to_string())
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(DietPlan::from).collect())
    }

    async fn update(&self, plan: &DietPlan) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE diet_plans
            SET nutritions_per_day = $2, active_model = $3, plan = $4, variants = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(plan.id)
        .bind(Json(&plan.nutritions_per_day))
        .bind(plan.active_model.map(|m| m.as_str()))
        .bind(Json(&plan.plan))
        .bind(Json(&plan.variants))
        .bind(plan.updated_at)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<DietPlan>> {
        let row = sqlx::query_as::<_, DietPlanRow>(&format!(
            "DELETE FROM diet_plans WHERE id = $1 RETURNING {PLAN_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(DietPlan::from))
    }
}
