//! Controller Wiring
//!
//! Builds the house controller for the browser: reqwest store, gloo timer,
//! settings baked in at compile time.

use std::rc::Rc;
use std::time::Duration;

use candy_core::config::{self, Config};
use candy_core::{ConfigError, HouseController, HttpStore, Notifier, ResponseCache, Timer};
use gloo_timers::callback::Timeout;

/// Toast expiry backed by `setTimeout`; dropping the handle clears it
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    type Handle = Timeout;

    fn schedule(&self, after: Duration, callback: Box<dyn FnOnce()>) -> Timeout {
        let millis = u32::try_from(after.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, callback)
    }
}

pub type AppController = HouseController<HttpStore, BrowserTimer>;

/// Settings from the build environment (`CANDY_API_BASE_URL`, ...)
pub fn load_config() -> Result<Config, ConfigError> {
    Config::from_lookup(|key| {
        let value = match key {
            config::API_BASE_URL_KEY => option_env!("CANDY_API_BASE_URL"),
            config::REQUEST_TIMEOUT_KEY => option_env!("CANDY_REQUEST_TIMEOUT_MS"),
            config::NOTIFICATION_TTL_KEY => option_env!("CANDY_TOAST_MS"),
            config::CACHE_RESPONSES_KEY => option_env!("CANDY_CACHE_RESPONSES"),
            _ => None,
        };
        value.map(str::to_string)
    })
}

pub fn build_controller(config: &Config) -> AppController {
    let mut store = HttpStore::new(config);
    if config.cache_responses {
        store = store.with_cache(Rc::new(ResponseCache::new()));
    }
    let notifier = Notifier::new(BrowserTimer, config.notification_ttl);
    log::info!("[APP] Using collection endpoint {}", config.api_base_url);
    HouseController::new(store, notifier)
}
