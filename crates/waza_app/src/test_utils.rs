//! Shared test utilities: configurable mock implementations of the
//! `waza_client` traits used across unit tests.
#![cfg(test)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use waza_client::{
    ClientError, CompositeQuery, Exercise, FoodItem, Meal, MealType, MealsByType, NewUser,
    NutrientFact, NutrientLookup, TrainerProfile, UserAccount, UserType, WarriorProfile,
    WazaApiClient,
};

pub fn warrior() -> WarriorProfile {
    WarriorProfile {
        warrior_id: "w1".into(),
        caloric_goal: 2000.0,
        name: "Waleed".into(),
    }
}

pub fn trainer() -> TrainerProfile {
    TrainerProfile {
        trainer_id: "t1".into(),
        name: "Sana".into(),
        hourly_rate: 55.0,
        bio: "ex-powerlifter".into(),
        location: "Lahore".into(),
        experience_years: 7,
        specializations: vec!["Strength".into()],
    }
}

pub fn banana_breakfast() -> MealsByType {
    let mut meals = MealsByType::new();
    meals.insert(
        MealType::Breakfast,
        Meal {
            meal_type: MealType::Breakfast,
            meal_food_items: vec![FoodItem {
                quantity: 2.0,
                unit: "medium".into(),
                food_item_identifier: "banana".into(),
            }],
        },
    );
    meals
}

fn account(username: &str, email: &str) -> UserAccount {
    UserAccount {
        user_id: Some("u-existing".into()),
        username: username.into(),
        email: email.into(),
        user_type: UserType::WazaWarrior,
        profile_pic: None,
        date_joined: "2026-01-01T00:00:00Z".into(),
        last_login: "2026-01-01T00:00:00Z".into(),
    }
}

/// Mock persistence API. Defaults answer the happy path; the flags flip
/// individual operations into their failure or absent modes.
#[derive(Default)]
pub struct MockWazaClient {
    pub meals: Option<MealsByType>,
    pub fail_meals: bool,
    pub warrior_profile_missing: bool,
    pub fail_profiles: bool,
    pub existing_username: Option<String>,
    pub existing_email: Option<String>,
    pub duplicate_user_id: bool,
}

#[async_trait]
impl WazaApiClient for MockWazaClient {
    async fn fetch_saved_meals(
        &self,
        _warrior_id: &str,
        _date: chrono::NaiveDate,
    ) -> Result<MealsByType, ClientError> {
        if self.fail_meals {
            return Err(ClientError::Upstream {
                status: 500,
                body: "meal store down".into(),
            });
        }
        Ok(self.meals.clone().unwrap_or_else(banana_breakfast))
    }

    async fn get_warrior_profile(&self, user_id: &str) -> Result<WarriorProfile, ClientError> {
        if self.fail_profiles {
            return Err(ClientError::Upstream {
                status: 502,
                body: "store unreachable".into(),
            });
        }
        if self.warrior_profile_missing {
            return Err(ClientError::NotFound(format!("no warrior for {user_id}")));
        }
        Ok(warrior())
    }

    async fn get_trainer_profile(&self, user_id: &str) -> Result<TrainerProfile, ClientError> {
        if self.fail_profiles {
            return Err(ClientError::Upstream {
                status: 502,
                body: "store unreachable".into(),
            });
        }
        if self.warrior_profile_missing {
            return Err(ClientError::NotFound(format!("no trainer for {user_id}")));
        }
        Ok(trainer())
    }

    async fn list_trainers(&self) -> Result<Vec<TrainerProfile>, ClientError> {
        Ok(vec![trainer()])
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, ClientError> {
        Ok(self
            .existing_username
            .as_deref()
            .filter(|u| *u == username)
            .map(|u| account(u, "taken@example.com")))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, ClientError> {
        Ok(self
            .existing_email
            .as_deref()
            .filter(|e| *e == email)
            .map(|e| account("taken", e)))
    }

    async fn create_user(&self, user: NewUser) -> Result<UserAccount, ClientError> {
        if self.duplicate_user_id {
            return Err(ClientError::Upstream {
                status: 409,
                body: "duplicate user_id".into(),
            });
        }
        Ok(UserAccount {
            user_id: Some(user.user_id),
            username: user.username,
            email: user.email,
            user_type: user.user_type,
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

/// Mock nutrient API: one fixed banana fact per call, with a call counter
/// so tests can assert the short-circuit path never reaches the API.
#[derive(Default)]
pub struct MockNutrientLookup {
    pub fail: bool,
    pub calls: AtomicU32,
}

impl MockNutrientLookup {
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NutrientLookup for MockNutrientLookup {
    async fn fetch_nutrients(
        &self,
        _query: &CompositeQuery,
    ) -> Result<Vec<NutrientFact>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClientError::Upstream {
                status: 503,
                body: "nutrient api down".into(),
            });
        }
        Ok(vec![NutrientFact {
            calories: 200.0,
            protein_g: 2.0,
            carbs_g: 30.0,
            fat_g: 1.0,
        }])
    }
}
