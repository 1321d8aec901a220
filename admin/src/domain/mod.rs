//! Domain primitives and the stateful admin workflow.
//!
//! Purpose: hold the user record model, the edit form and its validation
//! rules, and the two stateful components the views drive: the paged list
//! loader and the single edit session. Nothing here knows about HTTP or the
//! terminal; the service is reached through [`ports::UserDirectory`].
//!
//! Public surface:
//! - `UserRecord`, `UserId`, `Gender` — the user entity as the service
//!   serialises it.
//! - `UserForm`, `UserUpdate`, `validate` — editable values and the rules
//!   that turn them into an update payload.
//! - `PagedListLoader`, `RecordDetailFetcher`, `EditSession` — the workflow.
//! - `AdminError`, `FieldErrors`, `UserField` — failure reporting.

pub mod edit_session;
pub mod error;
pub mod page_loader;
pub mod ports;
pub mod record_fetcher;
pub mod request_token;
pub mod user;
pub mod validation;

pub use self::edit_session::{EditPhase, EditSession, EditSnapshot, OpenOutcome, SubmitOutcome};
pub use self::error::{AdminError, FieldErrors, UserField};
pub use self::page_loader::{LoadOutcome, LoaderSnapshot, PageState, PagedListLoader};
pub use self::record_fetcher::RecordDetailFetcher;
pub use self::request_token::{RequestToken, RequestTokens};
pub use self::user::{Gender, UnknownGender, UserId, UserRecord, wire_date};
pub use self::validation::{UserForm, UserUpdate, validate};
