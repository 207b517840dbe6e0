use crate::ClientError;
use secrecy::SecretString;

/// Connection settings for both external collaborators: the Waza
/// persistence API and the nutrient lookup API.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: SecretString,
    pub nutrition_base_url: String,
    pub nutrition_app_id: String,
    pub nutrition_app_key: SecretString,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ClientError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_token =
            get("WAZA_API_TOKEN").ok_or_else(|| ClientError::Config("WAZA_API_TOKEN missing".into()))?;
        let app_id = get("NUTRITION_APP_ID")
            .ok_or_else(|| ClientError::Config("NUTRITION_APP_ID missing".into()))?;
        let app_key = get("NUTRITION_APP_KEY")
            .ok_or_else(|| ClientError::Config("NUTRITION_APP_KEY missing".into()))?;
        let api_base_url =
            get("WAZA_API_BASE_URL").unwrap_or_else(|| "http://localhost:3000".into());
        let nutrition_base_url = get("NUTRITION_BASE_URL")
            .unwrap_or_else(|| "https://trackapi.nutritionix.com".into());
        Ok(Self {
            api_base_url,
            api_token: SecretString::new(api_token.into()),
            nutrition_base_url,
            nutrition_app_id: app_id,
            nutrition_app_key: SecretString::new(app_key.into()),
        })
    }
}
