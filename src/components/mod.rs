//! UI Components
//!
//! Leptos components over the app store and context.

mod bulk_controls;
mod house_table;
mod new_house_form;
mod toast;

pub use bulk_controls::BulkControls;
pub use house_table::HouseTable;
pub use new_house_form::NewHouseForm;
pub use toast::ToastView;
