//! The derived-state core: macro totals for one warrior and one calendar
//! day, recomputed whole from the meal store and the nutrient API.

use crate::AppResult;
use serde::Serialize;
use std::sync::Arc;
use waza_client::{CompositeQuery, NutrientFact, NutrientLookup, WazaApiClient};

pub const PROTEIN_KCAL_PER_G: f64 = 4.0;
pub const CARBS_KCAL_PER_G: f64 = 4.0;
pub const FAT_KCAL_PER_G: f64 = 9.0;

/// A day's macro totals. Protein, carbs and fat are stored as energy
/// (kcal), not grams. Totals are always recomputed from scratch for a
/// `(warrior_id, date)` pair and replaced, never patched in place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein_kcal: f64,
    pub carbs_kcal: f64,
    pub fats_kcal: f64,
}

impl MacroTotals {
    pub const ZERO: MacroTotals = MacroTotals {
        calories: 0.0,
        protein_kcal: 0.0,
        carbs_kcal: 0.0,
        fats_kcal: 0.0,
    };

    fn accumulate(mut self, food: &NutrientFact) -> Self {
        self.calories += food.calories;
        self.protein_kcal += food.protein_g * PROTEIN_KCAL_PER_G;
        self.carbs_kcal += food.carbs_g * CARBS_KCAL_PER_G;
        self.fats_kcal += food.fat_g * FAT_KCAL_PER_G;
        self
    }

    /// Commutative, associative fold over the response; the result does not
    /// depend on the order the nutrient API returns foods in.
    pub fn from_facts(facts: &[NutrientFact]) -> Self {
        facts.iter().fold(Self::ZERO, Self::accumulate)
    }
}

/// Composes the meal store and the nutrient API into day totals.
#[derive(Clone)]
pub struct MacroAggregator {
    meals: Arc<dyn WazaApiClient>,
    nutrients: Arc<dyn NutrientLookup>,
}

impl MacroAggregator {
    pub fn new(meals: Arc<dyn WazaApiClient>, nutrients: Arc<dyn NutrientLookup>) -> Self {
        Self { meals, nutrients }
    }

    /// Compute totals for one `(warrior_id, date)` pair.
    ///
    /// The pipeline is strictly sequential: the nutrient query is derived
    /// from the meal fetch, and the whole day's items go out as one batched
    /// request. A day with no food items short-circuits to zero totals
    /// without touching the nutrient API. Any fetch failure propagates so
    /// callers can tell "nothing logged" apart from "computation failed".
    pub async fn compute_macro_totals(
        &self,
        warrior_id: &str,
        date: chrono::NaiveDate,
    ) -> AppResult<MacroTotals> {
        let meals = self.meals.fetch_saved_meals(warrior_id, date).await?;

        let Some(query) = CompositeQuery::from_meals(&meals) else {
            return Ok(MacroTotals::ZERO);
        };

        tracing::debug!(%warrior_id, %date, query = %query, "resolving day nutrients");
        let facts = self.nutrients.fetch_nutrients(&query).await?;
        Ok(MacroTotals::from_facts(&facts))
    }
}
