//! Candy Tracker Frontend App
//!
//! Main application component: add form, bulk controls, house table, toast.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::components::{BulkControls, HouseTable, NewHouseForm, ToastView};
use crate::context::AppContext;
use crate::services;
use crate::store::{store_apply_snapshot, store_set_toast, AppState};

#[component]
pub fn App() -> impl IntoView {
    match services::load_config() {
        Ok(config) => {
            let controller = services::build_controller(&config);
            let store = Store::new(AppState::default());

            // Controller pushes every change into the reactive store
            controller.subscribe(move |snapshot| store_apply_snapshot(&store, snapshot));
            controller.notifier().subscribe(move |toast| store_set_toast(&store, toast));

            let ctx = AppContext::new(controller);
            provide_context(store);
            provide_context(ctx);

            // Initial load
            ctx.reload();

            view! {
                <div class="app-layout">
                    <header class="app-header">
                        <h1>"🎃 Halloween Candy Tracker"</h1>
                    </header>

                    <main class="main-content">
                        <NewHouseForm />
                        <BulkControls />
                        <HouseTable />
                    </main>

                    <ToastView />
                </div>
            }
            .into_any()
        }
        Err(e) => {
            log::error!("[APP] Invalid configuration: {}", e);
            view! {
                <div class="app-layout">
                    <p class="status error">"Configuration error: " {e.to_string()}</p>
                </div>
            }
            .into_any()
        }
    }
}
