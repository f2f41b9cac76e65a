use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::plans::model::NutritionProfile;

/// Catalog reference data. Plans never embed foods, only reference them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub descriptions: String,
    pub nutrition: Json<NutritionProfile>,
}

/// Read-mostly food catalog boundary. Lookups carry no transactional
/// coupling to plan writes.
#[async_trait]
pub trait FoodCatalog: Send + Sync {
    /// Batch nutrition lookup; ids with no catalog entry are simply absent
    /// from the result map.
    async fn find_nutrition(
        &self,
        ids: &[Uuid],
    ) -> anyhow::Result<HashMap<Uuid, NutritionProfile>>;

    async fn list(&self) -> anyhow::Result<Vec<Food>>;
}

pub struct PgFoodCatalog {
    db: PgPool,
}

impl PgFoodCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FoodCatalog for PgFoodCatalog {
    async fn find_nutrition(
        &self,
        ids: &[Uuid],
    ) -> anyhow::Result<HashMap<Uuid, NutritionProfile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let foods = sqlx::query_as::<_, Food>(
            r#"
            SELECT id, name, descriptions, nutrition
            FROM foods
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;
        Ok(foods.into_iter().map(|f| (f.id, f.nutrition.0)).collect())
    }

    async fn list(&self) -> anyhow::Result<Vec<Food>> {
        let foods = sqlx::query_as::<_, Food>(
            r#"
            SELECT id, name, descriptions, nutrition
            FROM foods
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(foods)
    }
}
