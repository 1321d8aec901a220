//! Plain-text renderings of the loader and edit session snapshots.
//!
//! Views are pure: they format a snapshot and never call the service.

mod edit_form_view;
mod list_view;

pub use edit_form_view::EditFormView;
pub use list_view::ListView;
