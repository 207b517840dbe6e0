//! HTTP client implementations for the Waza persistence API and the
//! nutrient lookup API.
//!
//! This module provides reqwest-based implementations of the
//! [`WazaApiClient`](crate::WazaApiClient) and
//! [`NutrientLookup`](crate::NutrientLookup) traits.

use crate::retry::RetryPolicy;
use crate::{
    ClientError, CompositeQuery, Exercise, MealsByType, NewUser, NutrientFact, NutrientLookup,
    TrainerProfile, UserAccount, WarriorProfile, WazaApiClient,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Caloric goal applied when a warrior profile has none recorded.
const DEFAULT_CALORIC_GOAL: f64 = 1500.0;

/// Client for the Waza persistence API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestWazaClient {
    base_url: String,
    api_token: SecretString,
    client: reqwest::Client,
}

impl ReqwestWazaClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Waza API (e.g., "http://localhost:3000")
    /// * `api_token` - The bearer token for authentication
    pub fn new(base_url: &str, api_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
        }
    }

    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self::new(&cfg.api_base_url, cfg.api_token.clone())
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(self.api_token.expose_secret())
    }

    /// Build an authenticated POST request.
    fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(self.api_token.expose_secret())
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let resp = request.send().await?;
        self.handle_response(resp).await
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(error_from_response(resp).await);
        }
        decode_json(resp).await
    }
}

/// Extract error information from a failed response.
async fn error_from_response(resp: reqwest::Response) -> ClientError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let body_snippet: String = body.chars().take(256).collect();

    match status {
        404 => ClientError::NotFound(body_snippet),
        400 | 422 => ClientError::InvalidInput(body_snippet),
        _ => ClientError::from_status(status, body_snippet),
    }
}

/// Decode a success response body, keeping a snippet of the payload in the
/// error when the JSON doesn't match the expected shape.
async fn decode_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let text = resp.text().await?;
    serde_json::from_str::<T>(&text).map_err(|e| {
        let body_snippet: String = text.chars().take(512).collect();
        ClientError::Decode(format!("{} - body: {}", e, body_snippet))
    })
}

#[derive(serde::Deserialize)]
struct PayloadUser {
    name: Option<String>,
}

#[derive(serde::Deserialize)]
struct WarriorPayload {
    warrior_id: Option<String>,
    caloric_goal: Option<f64>,
    users: Option<PayloadUser>,
}

#[derive(serde::Deserialize)]
struct SpecializationPayload {
    specialization_name: String,
}

#[derive(serde::Deserialize)]
struct TrainerSpecializationPayload {
    specializations: SpecializationPayload,
}

#[derive(serde::Deserialize)]
struct TrainerPayload {
    trainer_id: Option<String>,
    hourly_rate: Option<f64>,
    bio: Option<String>,
    location: Option<String>,
    experience: Option<u32>,
    users: Option<PayloadUser>,
    #[serde(default)]
    trainer_specializations: Vec<TrainerSpecializationPayload>,
}

impl TrainerPayload {
    fn into_profile(self) -> Result<TrainerProfile, ClientError> {
        let trainer_id = self
            .trainer_id
            .ok_or_else(|| ClientError::Decode("missing trainer_id in trainer payload".into()))?;
        Ok(TrainerProfile {
            trainer_id,
            name: self.users.and_then(|u| u.name).unwrap_or_default(),
            hourly_rate: self.hourly_rate.unwrap_or_default(),
            bio: self.bio.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            experience_years: self.experience.unwrap_or_default(),
            specializations: self
                .trainer_specializations
                .into_iter()
                .map(|ts| ts.specializations.specialization_name)
                .collect(),
        })
    }
}

#[async_trait]
impl WazaApiClient for ReqwestWazaClient {
    async fn fetch_saved_meals(
        &self,
        warrior_id: &str,
        date: chrono::NaiveDate,
    ) -> Result<MealsByType, ClientError> {
        if warrior_id.trim().is_empty() {
            return Err(ClientError::InvalidInput("warrior_id must not be empty".into()));
        }
        let url = format!("{}/api/waza_warrior/food_log", self.base_url);
        let qp = [
            ("warrior_id", warrior_id.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        metrics::counter!("waza_meal_fetch_total").increment(1);
        let resp = self.get_request(&url).query(&qp).send().await?;
        // A day with nothing logged comes back as 404 from the store; that
        // is a valid empty state, not a failure.
        if resp.status().as_u16() == 404 {
            return Ok(MealsByType::new());
        }
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        decode_json(resp).await
    }

    async fn get_warrior_profile(&self, user_id: &str) -> Result<WarriorProfile, ClientError> {
        let url = format!("{}/api/waza_warrior", self.base_url);
        let payload: WarriorPayload = self
            .execute_json(self.get_request(&url).query(&[("user_id", user_id)]))
            .await?;
        let warrior_id = payload
            .warrior_id
            .ok_or_else(|| ClientError::Decode("missing warrior_id in profile payload".into()))?;
        Ok(WarriorProfile {
            warrior_id,
            caloric_goal: payload.caloric_goal.unwrap_or(DEFAULT_CALORIC_GOAL),
            name: payload.users.and_then(|u| u.name).unwrap_or_default(),
        })
    }

    async fn get_trainer_profile(&self, user_id: &str) -> Result<TrainerProfile, ClientError> {
        let url = format!("{}/api/waza_trainer", self.base_url);
        let payload: TrainerPayload = self
            .execute_json(self.get_request(&url).query(&[("user_id", user_id)]))
            .await?;
        payload.into_profile()
    }

    async fn list_trainers(&self) -> Result<Vec<TrainerProfile>, ClientError> {
        let url = format!("{}/api/waza_trainer/trainers", self.base_url);
        let payloads: Vec<TrainerPayload> = self.execute_json(self.get_request(&url)).await?;
        payloads.into_iter().map(|p| p.into_profile()).collect()
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, ClientError> {
        self.find_user(&[("username", username)]).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, ClientError> {
        self.find_user(&[("email", email)]).await
    }

    async fn create_user(&self, user: NewUser) -> Result<UserAccount, ClientError> {
        let url = format!("{}/api/user", self.base_url);
        self.execute_json(self.post_request(&url).json(&user)).await
    }

    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, ClientError> {
        let url = format!("{}/api/waza_warrior/exercise", self.base_url);
        self.execute_json(self.post_request(&url).json(&exercise))
            .await
    }
}

impl ReqwestWazaClient {
    async fn find_user(&self, qp: &[(&str, &str)]) -> Result<Option<UserAccount>, ClientError> {
        let url = format!("{}/api/user", self.base_url);
        let resp = self.get_request(&url).query(qp).send().await?;
        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(Some(decode_json(resp).await?))
    }
}

#[derive(serde::Deserialize)]
struct NutrientsEnvelope {
    foods: Vec<NutrientFact>,
}

/// Client for the external nutrient API using reqwest.
///
/// Credentials travel in the `x-app-id` / `x-app-key` headers; the query is
/// posted as a natural-language string. Transient failures are retried per
/// the configured [`RetryPolicy`].
pub struct ReqwestNutrientClient {
    base_url: String,
    app_id: String,
    app_key: SecretString,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ReqwestNutrientClient {
    pub fn new(base_url: &str, app_id: impl Into<String>, app_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            app_key,
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self::new(
            &cfg.nutrition_base_url,
            cfg.nutrition_app_id.clone(),
            cfg.nutrition_app_key.clone(),
        )
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request_nutrients(&self, query: &str) -> Result<Vec<NutrientFact>, ClientError> {
        let url = format!("{}/v2/natural/nutrients", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("x-app-id", &self.app_id)
            .header("x-app-key", self.app_key.expose_secret())
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let envelope: NutrientsEnvelope = decode_json(resp).await?;
        Ok(envelope.foods)
    }
}

#[async_trait]
impl NutrientLookup for ReqwestNutrientClient {
    async fn fetch_nutrients(
        &self,
        query: &CompositeQuery,
    ) -> Result<Vec<NutrientFact>, ClientError> {
        metrics::counter!("nutrient_lookup_requests_total").increment(1);
        let result = self
            .retry
            .retry_async_if(|| self.request_nutrients(query.as_str()), ClientError::is_retryable)
            .await;
        if let Err(e) = &result {
            metrics::counter!("nutrient_lookup_failures_total").increment(1);
            tracing::warn!(error = %e, "nutrient lookup failed");
        }
        result
    }
}
