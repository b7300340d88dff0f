//! Application Context
//!
//! Shared handle to the house controller, provided via Leptos Context API.

use leptos::prelude::*;
use leptos::task::spawn_local;
use candy_core::NewHouse;

use crate::services::AppController;

/// App-wide operations provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// The controller is single-threaded, so it lives in local storage
    controller: StoredValue<AppController, LocalStorage>,
}

impl AppContext {
    pub fn new(controller: AppController) -> Self {
        Self {
            controller: StoredValue::new_local(controller),
        }
    }

    pub fn controller(&self) -> AppController {
        self.controller.get_value()
    }

    /// Reload houses from the server
    pub fn reload(&self) {
        let controller = self.controller();
        spawn_local(async move {
            if let Err(e) = controller.reload().await {
                log::warn!("[APP] Reload failed: {}", e);
            }
        });
    }

    /// Manual refresh; skips any cached list response
    pub fn refresh(&self) {
        let controller = self.controller();
        controller.store().invalidate_cache();
        spawn_local(async move {
            if let Err(e) = controller.reload().await {
                log::warn!("[APP] Reload failed: {}", e);
            }
        });
    }

    /// Fill or empty one house
    pub fn toggle_candy(&self, id: u32, in_stock: bool) {
        let controller = self.controller();
        spawn_local(async move {
            if let Err(e) = controller.toggle_candy(id, in_stock).await {
                log::error!("[APP] Candy update for house {} failed: {}", id, e);
            }
        });
    }

    /// Fill or empty every house
    pub fn bulk_set(&self, in_stock: bool) {
        let controller = self.controller();
        spawn_local(async move {
            match controller.bulk_set(in_stock).await {
                Ok(report) if !report.is_complete() => {
                    log::warn!("[APP] Bulk update: {} of {} failed", report.failed.len(), report.attempted.len());
                }
                Ok(_) => {}
                Err(e) => log::error!("[APP] Reload after bulk update failed: {}", e),
            }
        });
    }

    /// Create a house; `on_done` gets whether it was created
    pub fn add_house(&self, house: NewHouse, on_done: impl FnOnce(bool) + 'static) {
        let controller = self.controller();
        spawn_local(async move {
            let result = controller.add_house(house).await;
            if let Err(e) = &result {
                log::error!("[APP] Failed to add house: {}", e);
            }
            on_done(result.is_ok());
        });
    }

    pub fn dismiss_toast(&self) {
        self.controller.with_value(|controller| controller.notifier().dismiss());
    }
}

/// Get the app context
pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
