use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use time::Date;
use tracing::debug;
use uuid::Uuid;

use crate::config::GenerationConfig;
use crate::foods::Food;
use crate::plans::model::{DayPlan, GenerationModel, Meal, MealStatus, NutritionProfile};

/// Input shape for the generation collaborator: the daily target, the
/// catalog to pick from, and how many days to produce.
#[derive(Debug)]
pub struct GenerationRequest {
    pub model: GenerationModel,
    pub nutritions_per_day: NutritionProfile,
    pub foods: Vec<Food>,
    pub days: u16,
}

/// External plan-generation collaborator. Opaque, latency-variable and
/// fallible; callers decide whether to re-invoke on failure, nothing is
/// retried here.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<DayPlan>>;
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

/// Day entry as emitted by the model: a date plus food references. Status
/// and completion figures are ours to assign.
#[derive(Debug, Deserialize)]
struct GeneratedDay {
    date: Date,
    meals: Vec<GeneratedMeal>,
}

#[derive(Debug, Deserialize)]
struct GeneratedMeal {
    food_id: Uuid,
}

/// Gemini-backed generator.
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn upstream_model(model: GenerationModel) -> &'static str {
        match model {
            GenerationModel::Gemma => "gemma-3-27b-it",
            GenerationModel::Flash => "gemini-2.0-flash-001",
        }
    }

    fn build_prompt(request: &GenerationRequest) -> String {
        let catalog: Vec<serde_json::Value> = request
            .foods
            .iter()
            .map(|f| {
                serde_json::json!({
                    "food_id": f.id,
                    "name": f.name,
                    "nutrition": &f.nutrition.0,
                })
            })
            .collect();
        format!(
            "You are a meal planner. Using only foods from this catalog:\n{}\n\
             Build a {}-day plan matching this daily nutrition target:\n{}\n\
             Answer with a JSON array only, one object per day:\n\
             [{{\"date\": \"YYYY-MM-DD\", \"meals\": [{{\"food_id\": \"...\"}}]}}]",
            serde_json::to_string(&catalog).unwrap_or_default(),
            request.days,
            serde_json::to_string(&request.nutritions_per_day).unwrap_or_default(),
        )
    }

    fn parse_day_plans(text: &str) -> anyhow::Result<Vec<DayPlan>> {
        let trimmed = text
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
        let days: Vec<GeneratedDay> =
            serde_json::from_str(trimmed).context("generation output is not a day-plan array")?;
        Ok(days
            .into_iter()
            .map(|day| DayPlan {
                date: day.date,
                meals: day
                    .meals
                    .into_iter()
                    .map(|m| Meal {
                        food_id: m.food_id,
                        status: MealStatus::NotCompleted,
                    })
                    .collect(),
                percentage_of_completions: 0.0,
            })
            .collect())
    }
}

#[async_trait]
impl PlanGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<DayPlan>> {
        let model = Self::upstream_model(request.model);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": Self::build_prompt(request) }] }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("generation request failed")?
            .error_for_status()
            .context("generation endpoint returned non-success")?
            .json::<GenerateContentResponse>()
            .await
            .context("generation response is not valid JSON")?;

        let text = response
            .candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect::<String>())
            .context("generation response has no candidates")?;

        let days = Self::parse_day_plans(&text)?;
        debug!(model, days = days.len(), "generated day plans");
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_day_plan_array() {
        let food = Uuid::new_v4();
        let text = format!(
            "```json\n[{{\"date\": \"2025-03-01\", \"meals\": [{{\"food_id\": \"{food}\"}}]}}]\n```"
        );
        let days = GeminiGenerator::parse_day_plans(&text).expect("parse");
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].meals[0].food_id, food);
        assert_eq!(days[0].meals[0].status, MealStatus::NotCompleted);
        assert_eq!(days[0].percentage_of_completions, 0.0);
    }

    #[test]
    fn rejects_non_array_output() {
        let err = GeminiGenerator::parse_day_plans("sorry, I cannot do that").unwrap_err();
        assert!(err.to_string().contains("day-plan array"));
    }
}
