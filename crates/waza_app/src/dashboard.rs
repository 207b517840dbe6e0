//! Dashboard view-state.
//!
//! Holds the single totals slot and recomputes it whenever the date or the
//! warrior changes. Every recomputation is tagged with a generation number;
//! a completion may only write the slot while its tag still matches, so a
//! slow stale request can never overwrite a newer result
//! (last-request-wins).

use crate::aggregator::{MacroAggregator, MacroTotals};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use waza_client::WarriorProfile;

/// Calories-burned readout. Workout-derived burn is not wired into the
/// dashboard; the figure is fixed at zero.
pub const CALORIES_BURNED_KCAL: f64 = 0.0;

/// The one writable slot of dashboard state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TotalsSlot {
    Idle,
    Loading,
    Ready(MacroTotals),
    /// Aggregation failed; the string is the failure reason for the retry
    /// affordance. Never conflated with a legitimate zero `Ready`.
    Unavailable(String),
}

/// Render-ready view of the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub warrior_id: String,
    pub name: String,
    pub caloric_goal: f64,
    /// Calendar day the totals describe, ISO `YYYY-MM-DD`.
    pub date: String,
    pub totals: TotalsSlot,
    pub calories_burned_kcal: f64,
}

struct DashboardState {
    warrior: WarriorProfile,
    date: chrono::NaiveDate,
    generation: u64,
    totals: TotalsSlot,
}

/// Owns the totals slot and serializes writes to it.
#[derive(Clone)]
pub struct Dashboard {
    aggregator: MacroAggregator,
    state: Arc<Mutex<DashboardState>>,
}

impl Dashboard {
    pub fn new(
        aggregator: MacroAggregator,
        warrior: WarriorProfile,
        date: chrono::NaiveDate,
    ) -> Self {
        Self {
            aggregator,
            state: Arc::new(Mutex::new(DashboardState {
                warrior,
                date,
                generation: 0,
                totals: TotalsSlot::Idle,
            })),
        }
    }

    /// Switch the dashboard to another day and recompute.
    pub async fn set_date(&self, date: chrono::NaiveDate) -> JoinHandle<()> {
        self.restart(move |s| s.date = date).await
    }

    /// Switch to another warrior (identity change) and recompute.
    pub async fn set_warrior(&self, warrior: WarriorProfile) -> JoinHandle<()> {
        self.restart(move |s| s.warrior = warrior).await
    }

    /// Recompute for the current key; the retry affordance after an
    /// `Unavailable` slot.
    pub async fn refresh(&self) -> JoinHandle<()> {
        self.restart(|_| {}).await
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let s = self.state.lock().await;
        DashboardSnapshot {
            warrior_id: s.warrior.warrior_id.clone(),
            name: s.warrior.name.clone(),
            caloric_goal: s.warrior.caloric_goal,
            date: s.date.format("%Y-%m-%d").to_string(),
            totals: s.totals.clone(),
            calories_burned_kcal: CALORIES_BURNED_KCAL,
        }
    }

    /// Apply a state change, invalidate any in-flight computation by
    /// bumping the generation, and spawn the recomputation for the new key.
    /// The returned handle resolves when the computation has either written
    /// the slot or been discarded as stale.
    async fn restart<F>(&self, apply: F) -> JoinHandle<()>
    where
        F: FnOnce(&mut DashboardState),
    {
        let (generation, warrior_id, date) = {
            let mut s = self.state.lock().await;
            apply(&mut s);
            s.generation += 1;
            s.totals = TotalsSlot::Loading;
            (s.generation, s.warrior.warrior_id.clone(), s.date)
        };

        metrics::counter!("dashboard_recompute_total").increment(1);
        let aggregator = self.aggregator.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let result = aggregator.compute_macro_totals(&warrior_id, date).await;

            let mut s = state.lock().await;
            if s.generation != generation {
                tracing::debug!(generation, "discarding stale macro computation");
                return;
            }
            s.totals = match result {
                Ok(totals) => TotalsSlot::Ready(totals),
                Err(e) => {
                    tracing::warn!(%warrior_id, %date, error = %e, "macro aggregation failed");
                    TotalsSlot::Unavailable(e.to_string())
                }
            };
        })
    }
}
