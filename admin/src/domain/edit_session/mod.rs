//! Edit session: the lifecycle of editing exactly one user.
//!
//! ```text
//! Idle --open--> DetailLoading --detail ok--> Editing --submit--> Submitting
//!   ^                 |                         ^  |                 |
//!   +---detail err----+                         |  +--invalid form   |
//!   +-------------------save ok-----------------|--------------------+
//!                                               +-----save failed----+
//! ```
//!
//! Only one session is live per handle. Opening another record, or closing,
//! supersedes whatever the previous session still has in flight: late detail
//! responses are dropped, and a late save still updates its row in the list
//! (the returned record is the service's truth for that id) but no longer
//! touches the form.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{AdminError, FieldErrors};
use super::page_loader::PagedListLoader;
use super::ports::UserDirectory;
use super::record_fetcher::RecordDetailFetcher;
use super::request_token::{RequestToken, RequestTokens};
use super::user::{UserId, UserRecord};
use super::validation::{UserForm, validate};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPhase {
    /// No record selected; the form is blank.
    Idle,
    /// Waiting for the selected record's details; the form is blank.
    DetailLoading,
    /// The form holds the fetched record and accepts edits.
    Editing,
    /// A validated update is on its way to the service.
    Submitting,
}

/// Read-only copy of the session handed to the form view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSnapshot {
    pub phase: EditPhase,
    pub target: Option<UserId>,
    pub form: UserForm,
    pub field_errors: FieldErrors,
    /// Detail or save failure shown as a banner until the next attempt.
    pub last_error: Option<AdminError>,
}

/// Result of [`EditSession::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Details arrived; the form is populated.
    Editing,
    /// Another open or a close happened first; the response was dropped.
    Superseded,
    /// The detail fetch failed; the session is back to idle.
    Failed(AdminError),
}

/// Result of [`EditSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service stored the update; the row was merged and the editor closed.
    Saved(UserRecord),
    /// The form failed validation; nothing was sent.
    Invalid(FieldErrors),
    /// The save failed; the form is kept for another attempt.
    Failed(AdminError),
    /// The session was closed or replaced while saving.
    Superseded,
    /// Submitting is only possible while editing.
    NotEditing(EditPhase),
}

#[derive(Debug)]
struct SessionState {
    phase: EditPhase,
    target: Option<UserId>,
    form: UserForm,
    field_errors: FieldErrors,
    last_error: Option<AdminError>,
    session: Option<RequestToken>,
    tokens: RequestTokens,
}

impl SessionState {
    fn idle() -> Self {
        Self {
            phase: EditPhase::Idle,
            target: None,
            form: UserForm::blank(),
            field_errors: FieldErrors::new(),
            last_error: None,
            session: None,
            tokens: RequestTokens::new(),
        }
    }

    fn begin(&mut self, id: UserId) -> RequestToken {
        let token = self.tokens.issue();
        self.phase = EditPhase::DetailLoading;
        self.target = Some(id);
        self.form = UserForm::blank();
        self.field_errors = FieldErrors::new();
        self.last_error = None;
        self.session = Some(token);
        token
    }

    fn reset(&mut self) {
        self.tokens.invalidate();
        self.phase = EditPhase::Idle;
        self.target = None;
        self.form = UserForm::blank();
        self.field_errors = FieldErrors::new();
        self.session = None;
    }

    fn owns(&self, token: RequestToken) -> bool {
        self.session == Some(token) && self.tokens.is_current(token)
    }
}

/// Cloneable handle driving the single edit modal.
#[derive(Clone)]
pub struct EditSession {
    fetcher: RecordDetailFetcher,
    directory: Arc<dyn UserDirectory>,
    loader: PagedListLoader,
    refetch_after_save: bool,
    state: Arc<Mutex<SessionState>>,
}

impl EditSession {
    /// Session that saves through `directory` and merges into `loader`.
    pub fn new(directory: Arc<dyn UserDirectory>, loader: PagedListLoader) -> Self {
        Self {
            fetcher: RecordDetailFetcher::new(Arc::clone(&directory)),
            directory,
            loader,
            refetch_after_save: false,
            state: Arc::new(Mutex::new(SessionState::idle())),
        }
    }

    /// Also refetch the current page after each successful save.
    #[must_use]
    pub fn with_refetch_after_save(mut self, enabled: bool) -> Self {
        self.refetch_after_save = enabled;
        self
    }

    /// Open the editor for a list row.
    ///
    /// Only the row's id is used; form values come from the detail fetch.
    pub async fn open(&self, row: &UserRecord) -> OpenOutcome {
        self.open_id(row.id).await
    }

    /// Open the editor for `id`, superseding any session in progress.
    pub async fn open_id(&self, id: UserId) -> OpenOutcome {
        let token = self.lock().begin(id);
        info!(user_id = %id, "opening edit session");

        let result = self.fetcher.fetch_by_id(id).await;

        let mut state = self.lock();
        if !state.owns(token) {
            debug!(user_id = %id, "discarding superseded user detail");
            return OpenOutcome::Superseded;
        }
        match result {
            Ok(record) => {
                state.form = UserForm::from(&record);
                state.phase = EditPhase::Editing;
                OpenOutcome::Editing
            }
            Err(error) => {
                warn!(user_id = %id, error = %error, "user detail fetch failed");
                state.reset();
                state.last_error = Some(error.clone());
                OpenOutcome::Failed(error)
            }
        }
    }

    /// Change form values while editing.
    ///
    /// Returns `false`, leaving the form untouched, in any other phase.
    pub fn edit_form(&self, edit: impl FnOnce(&mut UserForm)) -> bool {
        let mut state = self.lock();
        if state.phase != EditPhase::Editing {
            return false;
        }
        edit(&mut state.form);
        true
    }

    /// Validate the form and, when valid, save it.
    pub async fn submit(&self) -> SubmitOutcome {
        let (token, id, update) = {
            let mut state = self.lock();
            let (EditPhase::Editing, Some(token), Some(id)) =
                (state.phase, state.session, state.target)
            else {
                return SubmitOutcome::NotEditing(state.phase);
            };
            match validate(&state.form) {
                Err(errors) => {
                    debug!(user_id = %id, errors = %errors, "edit form rejected");
                    state.field_errors = errors.clone();
                    return SubmitOutcome::Invalid(errors);
                }
                Ok(update) => {
                    state.field_errors = FieldErrors::new();
                    state.last_error = None;
                    state.phase = EditPhase::Submitting;
                    (token, id, update)
                }
            }
        };

        info!(user_id = %id, "saving user update");
        let result = self.directory.update_user(id, &update).await;

        match result {
            Ok(record) => {
                if !self.loader.merge_record(record.clone()) {
                    debug!(user_id = %record.id, "saved user is not on the current page");
                }
                let owned = {
                    let mut state = self.lock();
                    let owned = state.owns(token);
                    if owned {
                        state.reset();
                    }
                    owned
                };
                if !owned {
                    debug!(user_id = %id, "save completed after the session was replaced");
                    return SubmitOutcome::Superseded;
                }
                if self.refetch_after_save {
                    self.loader.refetch().await;
                }
                SubmitOutcome::Saved(record)
            }
            Err(source) => {
                let error = AdminError::from(source);
                warn!(user_id = %id, error = %error, "user update failed");
                let mut state = self.lock();
                if !state.owns(token) {
                    return SubmitOutcome::Superseded;
                }
                state.phase = EditPhase::Editing;
                state.last_error = Some(error.clone());
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Close the editor, dropping the effects of anything still in flight.
    pub fn close(&self) {
        let mut state = self.lock();
        if let Some(id) = state.target {
            debug!(user_id = %id, phase = ?state.phase, "closing edit session");
        }
        state.reset();
        state.last_error = None;
    }

    pub fn phase(&self) -> EditPhase {
        self.lock().phase
    }

    pub fn snapshot(&self) -> EditSnapshot {
        let state = self.lock();
        EditSnapshot {
            phase: state.phase,
            target: state.target,
            form: state.form.clone(),
            field_errors: state.field_errors.clone(),
            last_error: state.last_error.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("state", &*self.lock())
            .field("refetch_after_save", &self.refetch_after_save)
            .finish_non_exhaustive()
    }
}
