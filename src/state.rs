use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::foods::{FoodCatalog, PgFoodCatalog};
use crate::generation::{GeminiGenerator, PlanGenerator};
use crate::plans::repo::{PgPlanStore, PlanStore};
use crate::users::cache::UserCache;
use crate::users::repo::{PgUserDirectory, UserDirectory};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn PlanStore>,
    pub catalog: Arc<dyn FoodCatalog>,
    pub users: Arc<dyn UserDirectory>,
    pub generator: Arc<dyn PlanGenerator>,
    pub cache: Arc<UserCache>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let generator = Arc::new(GeminiGenerator::new(&config.generation)) as Arc<dyn PlanGenerator>;
        let cache = Arc::new(UserCache::new(Duration::from_secs(config.cache.ttl_secs)));

        Ok(Self {
            config,
            store: Arc::new(PgPlanStore::new(db.clone())),
            catalog: Arc::new(PgFoodCatalog::new(db.clone())),
            users: Arc::new(PgUserDirectory::new(db)),
            generator,
            cache,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn PlanStore>,
        catalog: Arc<dyn FoodCatalog>,
        users: Arc<dyn UserDirectory>,
        generator: Arc<dyn PlanGenerator>,
        cache: Arc<UserCache>,
    ) -> Self {
        Self {
            config,
            store,
            catalog,
            users,
            generator,
            cache,
        }
    }
}
