//! Global Application State Store
//!
//! Reactive mirror of the controller's state. The controller stays the only
//! writer of the collection; these fields are refreshed from its snapshots.

use leptos::prelude::*;
use reactive_stores::Store;
use candy_core::{House, HouseSnapshot, LoadState, Toast};

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Houses in server order
    pub houses: Vec<House>,
    /// Ids with a candy update in flight
    pub pending: Vec<u32>,
    pub load: LoadState,
    /// Visible toast, if any
    pub toast: Option<Toast>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Copy a controller snapshot into the store
pub fn store_apply_snapshot(store: &AppStore, snapshot: &HouseSnapshot) {
    *store.houses().write() = snapshot.houses.clone();
    *store.pending().write() = snapshot.pending.clone();
    *store.load().write() = snapshot.load.clone();
}

pub fn store_set_toast(store: &AppStore, toast: Option<&Toast>) {
    *store.toast().write() = toast.cloned();
}

/// Whether a house has a candy update in flight
pub fn store_is_pending(store: &AppStore, id: u32) -> bool {
    store.pending().with(|pending| pending.contains(&id))
}
