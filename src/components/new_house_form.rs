//! New House Form Component
//!
//! Form for adding a house with an allergen selector.

use leptos::prelude::*;
use candy_core::{NewHouse, ALLERGEN_OPTIONS, NO_ALLERGEN_INFO};

use crate::context::use_app_context;

/// Form for creating new houses
#[component]
pub fn NewHouseForm() -> impl IntoView {
    let ctx = use_app_context();

    let (name, set_name) = signal(String::new());
    let (address, set_address) = signal(String::new());
    let (allergen, set_allergen) = signal(NO_ALLERGEN_INFO.to_string());
    let (submitting, set_submitting) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);

    let add_house = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get() {
            return;
        }
        let house = match NewHouse::new(&name.get(), &address.get(), &allergen.get()) {
            Ok(house) => house,
            Err(e) => {
                set_error.set(Some(e.to_string()));
                return;
            }
        };
        set_error.set(None);
        set_submitting.set(true);

        ctx.add_house(house, move |created| {
            if created {
                set_name.set(String::new());
                set_address.set(String::new());
                set_allergen.set(NO_ALLERGEN_INFO.to_string());
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form class="new-house-form" on:submit=add_house>
            <h2>"Add a new house"</h2>
            <div class="new-house-row">
                <label>
                    "House name"
                    <input
                        type="text"
                        placeholder="e.g. The Smiths"
                        prop:value=move || name.get()
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                        disabled=move || submitting.get()
                    />
                </label>
                <label>
                    "Address"
                    <input
                        type="text"
                        placeholder="e.g. 1 Elm Street"
                        prop:value=move || address.get()
                        on:input=move |ev| set_address.set(event_target_value(&ev))
                        disabled=move || submitting.get()
                    />
                </label>
                <label>
                    "Allergen free"
                    <select
                        prop:value=move || allergen.get()
                        on:change=move |ev| set_allergen.set(event_target_value(&ev))
                        disabled=move || submitting.get()
                    >
                        {ALLERGEN_OPTIONS.iter().map(|option| view! {
                            <option value={*option}>{*option}</option>
                        }).collect_view()}
                    </select>
                </label>
                <button type="submit" disabled=move || submitting.get()>
                    {move || if submitting.get() { "..." } else { "Add" }}
                </button>
            </div>
            {move || error.get().map(|message| view! { <p class="form-error">{message}</p> })}
        </form>
    }
}
