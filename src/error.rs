use thiserror::Error;
use uuid::Uuid;

/// Error taxonomy surfaced by the service layer. Handlers map these onto
/// HTTP status codes; cache-sync failures are logged inside the
/// synchronizer and never reach this type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("diet plan {0} not found")]
    PlanNotFound(Uuid),

    #[error("user {0} not found")]
    UserNotFound(Uuid),

    /// Aggregate miss for a batch of meal-status updates, one
    /// `date:food_id` entry per tuple that matched nothing.
    #[error("meals not found: {}", .0.join(", "))]
    MealsNotFound(Vec<String>),

    #[error("{0}")]
    Validation(String),

    /// A collaborator (plan generator, food catalog) failed. Retryable
    /// from the caller's point of view; nothing is retried internally.
    #[error("dependency failure: {0}")]
    Dependency(#[source] anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
