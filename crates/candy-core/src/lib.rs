//! Candy Tracker Core
//!
//! Layered the same way the UI consumes it:
//! - models / error / config: data shapes, failures, settings
//! - api / cache: the collection endpoint client
//! - state / controller / bulk: optimistic updates and reconciliation
//! - notify: the auto-expiring toast

pub mod api;
pub mod bulk;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod notify;
pub mod state;

#[cfg(test)]
mod testing;

pub use api::{HttpStore, RemoteStore};
pub use bulk::BulkReport;
pub use cache::ResponseCache;
pub use config::Config;
pub use controller::{HouseController, ToggleOutcome};
pub use error::{ApiError, ApiResult, ConfigError, ErrorKind, ValidationError};
pub use models::{House, NewHouse, ALLERGEN_OPTIONS, NO_ALLERGEN_INFO};
pub use notify::{Notifier, Timer, Toast, ToastLevel};
pub use state::{HouseSnapshot, LoadState};
