//! Bulk Controls Component
//!
//! Fill all, empty all and refresh buttons.

use leptos::prelude::*;
use candy_core::LoadState;

use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn BulkControls() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let busy = move || store.load().get() == LoadState::Loading;

    view! {
        <div class="bulk-controls">
            <button class="bulk-btn fill" disabled=busy on:click=move |_| ctx.bulk_set(true)>
                "Fill All"
            </button>
            <button class="bulk-btn empty" disabled=busy on:click=move |_| ctx.bulk_set(false)>
                "Empty All"
            </button>
            <button class="bulk-btn refresh" disabled=busy on:click=move |_| ctx.refresh()>
                "Refresh"
            </button>
        </div>
    }
}
