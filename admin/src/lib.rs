//! User administration client for DummyJSON-compatible user services.
//!
//! A paged user list with last-request-wins loading, an edit session that
//! fetches full details before editing, validates form input, saves through
//! `PUT /users/{id}`, and merges the saved record back into the page.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;
