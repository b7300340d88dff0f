//! Toast Component
//!
//! Shows the current notification; click to dismiss early.

use leptos::prelude::*;
use candy_core::ToastLevel;

use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ToastView() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    move || {
        store.toast().get().map(|toast| {
            let class = match toast.level {
                ToastLevel::Info => "toast info",
                ToastLevel::Success => "toast success",
                ToastLevel::Error => "toast error",
            };
            view! {
                <div class="toast-container" role="status" aria-live="polite">
                    <div class=class on:click=move |_| ctx.dismiss_toast()>
                        {toast.message}
                    </div>
                </div>
            }
        })
    }
}
