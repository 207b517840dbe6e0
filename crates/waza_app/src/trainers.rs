//! Trainer marketplace listing.

use crate::AppResult;
use serde::Serialize;
use std::sync::Arc;
use waza_client::{TrainerProfile, WazaApiClient};

/// Render-ready marketplace card.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainerCard {
    pub trainer_id: String,
    pub name: String,
    pub location: String,
    pub specialization_summary: String,
    pub experience_summary: String,
    pub rate_summary: String,
    pub bio: String,
}

impl From<TrainerProfile> for TrainerCard {
    fn from(profile: TrainerProfile) -> Self {
        TrainerCard {
            trainer_id: profile.trainer_id,
            name: profile.name,
            location: profile.location,
            specialization_summary: profile.specializations.join(", "),
            experience_summary: format!("{} years experience", profile.experience_years),
            rate_summary: format!("${}/hr", profile.hourly_rate),
            bio: profile.bio,
        }
    }
}

pub struct TrainerMarketplace {
    client: Arc<dyn WazaApiClient>,
}

impl TrainerMarketplace {
    pub fn new(client: Arc<dyn WazaApiClient>) -> Self {
        Self { client }
    }

    pub async fn list_trainer_cards(&self) -> AppResult<Vec<TrainerCard>> {
        let trainers = self.client.list_trainers().await?;
        Ok(trainers.into_iter().map(TrainerCard::from).collect())
    }
}
