//! Application layer for the Waza fitness service: profile resolution,
//! the dashboard macro pipeline, account provisioning, workout logging and
//! the trainer marketplace, over the clients from `waza_client`.

pub mod aggregator;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod profile;
pub mod session;
pub mod trainers;
pub mod users;
pub mod workouts;

mod test_utils;

pub use error::{AppError, AppResult};
