//! House Table Component
//!
//! Lists houses with their candy status and a fill/empty button per row.

use leptos::prelude::*;
use candy_core::{House, LoadState};

use crate::context::use_app_context;
use crate::store::{store_is_pending, use_app_store, AppStateStoreFields};

/// One house row
#[component]
fn HouseRow(house: House) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let id = house.id;
    let in_stock = house.candy_in_stock;
    let allergen = house.allergen_label().to_string();
    let is_pending = move || store_is_pending(&store, id);

    view! {
        <tr>
            <td>{id}</td>
            <td>{house.name}</td>
            <td>{house.address}</td>
            <td class={if in_stock { "candy in-stock" } else { "candy out" }}>
                {if in_stock { "✓ Yes" } else { "✗ No" }}
            </td>
            <td>{allergen}</td>
            <td>
                <button
                    class="candy-btn"
                    disabled=is_pending
                    on:click=move |_| ctx.toggle_candy(id, !in_stock)
                >
                    {move || if is_pending() { "..." } else if in_stock { "Empty" } else { "Fill" }}
                </button>
            </td>
        </tr>
    }
}

/// House list with loading, error and empty states
#[component]
pub fn HouseTable() -> impl IntoView {
    let store = use_app_store();

    move || {
        let is_empty = store.houses().with(|houses| houses.is_empty());
        match store.load().get() {
            LoadState::Failed(message) => view! {
                <p class="status error">"Error: " {message}</p>
            }
            .into_any(),
            LoadState::Idle | LoadState::Loading if is_empty => view! {
                <p class="status">"Loading..."</p>
            }
            .into_any(),
            _ if is_empty => view! { <p class="status">"No data"</p> }.into_any(),
            _ => view! {
                <div class="house-table">
                    <h2>"Houses / Candy List"</h2>
                    <table>
                        <thead>
                            <tr>
                                <th>"ID"</th>
                                <th>"Name"</th>
                                <th>"Address"</th>
                                <th>"Candy"</th>
                                <th>"Allergen Free"</th>
                                <th>"Actions"</th>
                            </tr>
                        </thead>
                        <tbody>
                            // Keyed on the stock flag too so a flipped row re-renders
                            <For
                                each=move || store.houses().get()
                                key=|house| (house.id, house.candy_in_stock)
                                children=move |house| view! { <HouseRow house=house /> }
                            />
                        </tbody>
                    </table>
                </div>
            }
            .into_any(),
        }
    }
}
