//! Typed async clients for the Waza persistence API and the third-party
//! nutrient lookup API, behind the `WazaApiClient` and `NutrientLookup` traits.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;
pub mod query;
pub mod retry;

pub use query::CompositeQuery;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn from_status(status: u16, body: String) -> Self {
        ClientError::Upstream { status, body }
    }

    /// Transient failures worth retrying: connect/timeout errors and 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_timeout() || e.is_connect(),
            ClientError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Categorical grouping of logged food.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[serde(other)]
    Other,
}

/// One logged food entry. Immutable once fetched.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FoodItem {
    pub quantity: f64,
    pub unit: String,
    pub food_item_identifier: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Meal {
    pub meal_type: MealType,
    pub meal_food_items: Vec<FoodItem>,
}

/// A day's meals keyed by meal type. Keys are unique; order carries no meaning.
pub type MealsByType = HashMap<MealType, Meal>;

/// Per-food nutrient facts as returned by the nutrient API.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NutrientFact {
    #[serde(rename = "nf_calories")]
    pub calories: f64,
    #[serde(rename = "nf_protein")]
    pub protein_g: f64,
    #[serde(rename = "nf_total_carbohydrate")]
    pub carbs_g: f64,
    #[serde(rename = "nf_total_fat")]
    pub fat_g: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WarriorProfile {
    pub warrior_id: String,
    pub caloric_goal: f64,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TrainerProfile {
    pub trainer_id: String,
    pub name: String,
    pub hourly_rate: f64,
    pub bio: String,
    pub location: String,
    pub experience_years: u32,
    pub specializations: Vec<String>,
}

/// Declared account role. `Waza Master` is the legacy spelling of the
/// trainer role and is accepted on input.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum UserType {
    #[serde(rename = "Waza Warrior")]
    WazaWarrior,
    #[serde(rename = "Waza Trainer", alias = "Waza Master")]
    WazaTrainer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::WazaWarrior => "Waza Warrior",
            UserType::WazaTrainer => "Waza Trainer",
        }
    }
}

/// A stored account as the persistence API returns it. The password hash is
/// never part of this shape.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UserAccount {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub user_id: Option<String>,
    pub username: String,
    pub email: String,
    pub user_type: UserType,
    pub profile_pic: Option<String>,
    pub date_joined: String,
    pub last_login: String,
}

/// Payload for account creation. `password_hash` is the already-derived
/// hash; plaintext passwords never reach this crate.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub profile_pic: Option<String>,
    pub date_joined: String,
    pub last_login: String,
}

/// A single logged exercise within a workout session.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Exercise {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub exercise_id: Option<String>,
    pub title: String,
    pub muscle_group: String,
    pub weight: f64,
    pub sets: u32,
    pub reps: u32,
    pub session_id: String,
}

fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string().into()),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Client for the Waza persistence API (meals, profiles, accounts,
/// exercises, trainer listings). The backing store is an external
/// collaborator; this trait only mirrors its CRUD surface.
#[async_trait]
pub trait WazaApiClient: Send + Sync + 'static {
    /// Saved meals for one calendar day, grouped by meal type. A day with
    /// nothing logged resolves to an empty mapping, not an error.
    async fn fetch_saved_meals(
        &self,
        warrior_id: &str,
        date: chrono::NaiveDate,
    ) -> Result<MealsByType, ClientError>;

    /// Warrior profile keyed by session user id. Absent profile (first
    /// login) surfaces as `ClientError::NotFound`.
    async fn get_warrior_profile(&self, user_id: &str) -> Result<WarriorProfile, ClientError>;

    /// Trainer profile keyed by session user id. Same `NotFound` contract
    /// as `get_warrior_profile`.
    async fn get_trainer_profile(&self, user_id: &str) -> Result<TrainerProfile, ClientError>;

    async fn list_trainers(&self) -> Result<Vec<TrainerProfile>, ClientError>;

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, ClientError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, ClientError>;

    async fn create_user(&self, user: NewUser) -> Result<UserAccount, ClientError>;

    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, ClientError>;
}

/// Client for the external nutrient lookup API.
#[async_trait]
pub trait NutrientLookup: Send + Sync + 'static {
    /// Resolve one composite query into per-food nutrient facts. One call
    /// covers the whole day's items; implementations must fail rather than
    /// return a truncated list.
    async fn fetch_nutrients(
        &self,
        query: &CompositeQuery,
    ) -> Result<Vec<NutrientFact>, ClientError>;
}
