//! Composite nutrient-query construction.
//!
//! The nutrient API accepts one natural-language query per request. A whole
//! day's food items are batched into a single semicolon-joined string so the
//! external call count stays at one per recomputation regardless of how many
//! meals were logged.

use crate::{FoodItem, MealsByType};
use std::fmt;

/// A non-empty batched nutrient query, e.g. `"2 medium banana;1 cup rice"`.
///
/// Non-emptiness is guaranteed by construction: both constructors return
/// `None` when there are no food items, so an empty or malformed request can
/// never reach the nutrient API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeQuery(String);

impl CompositeQuery {
    /// Flatten all meals' food items into one query, preserving per-item
    /// quantity, unit and identifier. Order across meal types is whatever
    /// the mapping yields; the downstream reduction is commutative.
    pub fn from_meals(meals: &MealsByType) -> Option<Self> {
        Self::from_items(meals.values().flat_map(|m| m.meal_food_items.iter()))
    }

    pub fn from_items<'a, I>(items: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a FoodItem>,
    {
        let fragments: Vec<String> = items
            .into_iter()
            .map(|item| {
                format!(
                    "{} {} {}",
                    item.quantity, item.unit, item.food_item_identifier
                )
            })
            .collect();
        if fragments.is_empty() {
            return None;
        }
        Some(CompositeQuery(fragments.join(";")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
