mod repo;

pub use repo::{Food, FoodCatalog, PgFoodCatalog};
