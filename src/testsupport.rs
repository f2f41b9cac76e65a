//! In-memory fakes for the storage, catalog, directory, and generation
//! boundaries, so service tests run without a database or network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::types::Json;
use time::Date;
use uuid::Uuid;

use crate::config::{AppConfig, CacheConfig, GenerationConfig, JwtConfig};
use crate::foods::{Food, FoodCatalog};
use crate::generation::{GenerationRequest, PlanGenerator};
use crate::plans::model::{DayPlan, DietPlan, NutritionProfile};
use crate::plans::repo::PlanStore;
use crate::state::AppState;
use crate::users::cache::UserCache;
use crate::users::repo::{UserDirectory, UserRecord};

pub fn profile(calories: f64, protein: f64) -> NutritionProfile {
    NutritionProfile {
        calories,
        protein,
        ..Default::default()
    }
}

#[derive(Default)]
pub struct MemoryPlanStore {
    plans: Mutex<HashMap<Uuid, DietPlan>>,
}

impl MemoryPlanStore {
    pub fn get(&self, id: Uuid) -> Option<DietPlan> {
        self.plans.lock().expect("plan store lock").get(&id).cloned()
    }

    pub fn put(&self, plan: DietPlan) {
        self.plans.lock().expect("plan store lock").insert(plan.id, plan);
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn create(&self, plan: &DietPlan) -> anyhow::Result<()> {
        self.put(plan.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<DietPlan>> {
        Ok(self.get(id))
    }

    async fn list(&self) -> anyhow::Result<Vec<DietPlan>> {
        Ok(self.plans.lock().expect("plan store lock").values().cloned().collect())
    }

    async fn find_by_day(&self, day: Date) -> anyhow::Result<Vec<DietPlan>> {
        Ok(self
            .plans
            .lock()
            .expect("plan store lock")
            .values()
            .filter(|p| p.plan.iter().any(|d| d.date == day))
            .cloned()
            .collect())
    }

    async fn update(&self, plan: &DietPlan) -> anyhow::Result<bool> {
        let mut plans = self.plans.lock().expect("plan store lock");
        if !plans.contains_key(&plan.id) {
            return Ok(false);
        }
        plans.insert(plan.id, plan.clone());
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<DietPlan>> {
        Ok(self.plans.lock().expect("plan store lock").remove(&id))
    }
}

#[derive(Default)]
pub struct MemoryFoodCatalog {
    foods: Mutex<HashMap<Uuid, Food>>,
}

impl MemoryFoodCatalog {
    pub fn add(&self, nutrition: NutritionProfile) -> Uuid {
        let id = Uuid::new_v4();
        self.foods.lock().expect("catalog lock").insert(
            id,
            Food {
                id,
                name: format!("food-{id}"),
                descriptions: String::new(),
                nutrition: Json(nutrition),
            },
        );
        id
    }
}

#[async_trait]
impl FoodCatalog for MemoryFoodCatalog {
    async fn find_nutrition(
        &self,
        ids: &[Uuid],
    ) -> anyhow::Result<HashMap<Uuid, NutritionProfile>> {
        let foods = self.foods.lock().expect("catalog lock");
        Ok(ids
            .iter()
            .filter_map(|id| foods.get(id).map(|f| (*id, f.nutrition.0.clone())))
            .collect())
    }

    async fn list(&self) -> anyhow::Result<Vec<Food>> {
        Ok(self.foods.lock().expect("catalog lock").values().cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserDirectory {
    pub fn add(&self, user: UserRecord) {
        self.users.lock().expect("directory lock").insert(user.id, user);
    }

    pub fn remove(&self, id: Uuid) {
        self.users.lock().expect("directory lock").remove(&id);
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.users.lock().expect("directory lock").get(&id).cloned())
    }

    async fn find_by_diet_plan(&self, plan_id: Uuid) -> anyhow::Result<Vec<UserRecord>> {
        Ok(self
            .users
            .lock()
            .expect("directory lock")
            .values()
            .filter(|u| u.diet_plan_id == Some(plan_id))
            .cloned()
            .collect())
    }
}

/// Generator stub: replays a configured day-plan sequence, or fails once
/// when armed with `fail_next`.
#[derive(Default)]
pub struct StubGenerator {
    response: Mutex<Vec<DayPlan>>,
    fail: AtomicBool,
}

impl StubGenerator {
    pub fn respond_with(&self, days: Vec<DayPlan>) {
        *self.response.lock().expect("stub lock") = days;
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlanGenerator for StubGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<Vec<DayPlan>> {
        if self.fail.swap(false, Ordering::SeqCst) {
            anyhow::bail!("generator unavailable");
        }
        Ok(self.response.lock().expect("stub lock").clone())
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test".into(),
            audience: "test".into(),
            ttl_minutes: 60,
        },
        cache: CacheConfig {
            ttl_secs: 3600,
            sweep_secs: 600,
        },
        generation: GenerationConfig {
            base_url: "http://unused".into(),
            api_key: String::new(),
            max_plan_days: 30,
        },
    }
}

pub struct TestEnv {
    pub state: AppState,
    pub actor: Uuid,
    pub store: Arc<MemoryPlanStore>,
    pub catalog: Arc<MemoryFoodCatalog>,
    pub users: Arc<MemoryUserDirectory>,
    pub generator: Arc<StubGenerator>,
}

impl TestEnv {
    pub fn new() -> Self {
        let store = Arc::new(MemoryPlanStore::default());
        let catalog = Arc::new(MemoryFoodCatalog::default());
        let users = Arc::new(MemoryUserDirectory::default());
        let generator = Arc::new(StubGenerator::default());
        let cache = Arc::new(UserCache::new(Duration::from_secs(3600)));

        let state = AppState::from_parts(
            Arc::new(test_config()),
            store.clone(),
            catalog.clone(),
            users.clone(),
            generator.clone(),
            cache,
        );

        Self {
            state,
            actor: Uuid::new_v4(),
            store,
            catalog,
            users,
            generator,
        }
    }

    pub fn add_food(&self, nutrition: NutritionProfile) -> Uuid {
        self.catalog.add(nutrition)
    }

    pub fn add_user(&self, user: UserRecord) {
        self.users.add(user);
    }

    pub fn remove_user(&self, id: Uuid) {
        self.users.remove(id);
    }

    pub fn find_plan(&self, id: Uuid) -> Option<DietPlan> {
        self.store.get(id)
    }

    pub fn stored_plan(&self, id: Uuid) -> DietPlan {
        self.store.get(id).expect("plan in store")
    }

    pub fn put_plan(&self, plan: DietPlan) {
        self.store.put(plan);
    }
}
