//! Mock collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;
use waza_client::{
    ClientError, CompositeQuery, Exercise, FoodItem, Meal, MealType, MealsByType, NewUser,
    NutrientFact, NutrientLookup, TrainerProfile, UserAccount, UserType, WarriorProfile,
    WazaApiClient,
};

pub fn day(s: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
}

pub fn warrior() -> WarriorProfile {
    WarriorProfile {
        warrior_id: "w1".into(),
        caloric_goal: 2000.0,
        name: "Waleed".into(),
    }
}

pub fn meal_of(food: &str) -> MealsByType {
    let mut meals = MealsByType::new();
    meals.insert(
        MealType::Breakfast,
        Meal {
            meal_type: MealType::Breakfast,
            meal_food_items: vec![FoodItem {
                quantity: 2.0,
                unit: "medium".into(),
                food_item_identifier: food.into(),
            }],
        },
    );
    meals
}

pub fn banana_fact() -> NutrientFact {
    NutrientFact {
        calories: 200.0,
        protein_g: 2.0,
        carbs_g: 30.0,
        fat_g: 1.0,
    }
}

/// Meal store mock keyed by date, so different days can hold different
/// meals. Unknown dates resolve to an empty day.
#[derive(Default)]
pub struct MealStoreMock {
    pub by_date: HashMap<chrono::NaiveDate, MealsByType>,
    pub fail: bool,
}

#[async_trait]
impl WazaApiClient for MealStoreMock {
    async fn fetch_saved_meals(
        &self,
        _warrior_id: &str,
        date: chrono::NaiveDate,
    ) -> Result<MealsByType, ClientError> {
        if self.fail {
            return Err(ClientError::Upstream {
                status: 500,
                body: "meal store down".into(),
            });
        }
        Ok(self.by_date.get(&date).cloned().unwrap_or_default())
    }

    async fn get_warrior_profile(&self, _user_id: &str) -> Result<WarriorProfile, ClientError> {
        Ok(warrior())
    }

    async fn get_trainer_profile(&self, user_id: &str) -> Result<TrainerProfile, ClientError> {
        Err(ClientError::NotFound(format!("no trainer for {user_id}")))
    }

    async fn list_trainers(&self) -> Result<Vec<TrainerProfile>, ClientError> {
        Ok(vec![TrainerProfile {
            trainer_id: "t1".into(),
            name: "Sana".into(),
            hourly_rate: 55.0,
            bio: "ex-powerlifter".into(),
            location: "Lahore".into(),
            experience_years: 7,
            specializations: vec!["Strength".into(), "Mobility".into()],
        }])
    }

    async fn find_user_by_username(
        &self,
        _username: &str,
    ) -> Result<Option<UserAccount>, ClientError> {
        Ok(None)
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<UserAccount>, ClientError> {
        Ok(None)
    }

    async fn create_user(&self, user: NewUser) -> Result<UserAccount, ClientError> {
        Ok(UserAccount {
            user_id: Some(user.user_id),
            username: user.username,
            email: user.email,
            user_type: UserType::WazaWarrior,
            profile_pic: user.profile_pic,
            date_joined: user.date_joined,
            last_login: user.last_login,
        })
    }

    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, ClientError> {
        Ok(Exercise {
            exercise_id: Some("e1".into()),
            ..exercise
        })
    }
}

/// One scripted nutrient answer, optionally held back until the test
/// releases its gate.
pub struct ScriptedResponse {
    pub gate: Option<tokio::sync::oneshot::Receiver<()>>,
    pub facts: Vec<NutrientFact>,
}

/// Nutrient mock scripted by query substring, with a call counter. Queries
/// matching no script return an error so mis-routed requests fail loudly.
#[derive(Default)]
pub struct ScriptedNutrientLookup {
    pub scripts: Mutex<HashMap<String, ScriptedResponse>>,
    pub calls: AtomicU32,
    pub fail: bool,
}

impl ScriptedNutrientLookup {
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn script(
        &self,
        needle: &str,
        gate: Option<tokio::sync::oneshot::Receiver<()>>,
        facts: Vec<NutrientFact>,
    ) {
        self.scripts
            .lock()
            .await
            .insert(needle.to_string(), ScriptedResponse { gate, facts });
    }
}

#[async_trait]
impl NutrientLookup for ScriptedNutrientLookup {
    async fn fetch_nutrients(
        &self,
        query: &CompositeQuery,
    ) -> Result<Vec<NutrientFact>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClientError::Upstream {
                status: 503,
                body: "nutrient api down".into(),
            });
        }
        let matched = {
            let mut scripts = self.scripts.lock().await;
            let key = scripts
                .keys()
                .find(|needle| query.as_str().contains(needle.as_str()))
                .cloned();
            key.and_then(|k| scripts.remove(&k))
        };
        let Some(response) = matched else {
            return Err(ClientError::InvalidInput(format!(
                "unscripted nutrient query: {query}"
            )));
        };
        if let Some(gate) = response.gate {
            let _ = gate.await;
        }
        Ok(response.facts)
    }
}
