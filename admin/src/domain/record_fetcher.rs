//! On-demand detail fetch for a single user.

use std::sync::Arc;

use tracing::debug;

use super::error::AdminError;
use super::ports::UserDirectory;
use super::user::{UserId, UserRecord};

/// Fetches full user records by id.
///
/// Every call reaches the service: list rows may be stale or partial
/// relative to the detail endpoint, so nothing is cached here and failures
/// are returned to the caller without retrying.
#[derive(Clone)]
pub struct RecordDetailFetcher {
    directory: Arc<dyn UserDirectory>,
}

impl RecordDetailFetcher {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Fetch the full record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] when the user vanished,
    /// [`AdminError::MalformedResponse`] when the body does not decode, and
    /// [`AdminError::NetworkFailure`] for every other failed call.
    pub async fn fetch_by_id(&self, id: UserId) -> Result<UserRecord, AdminError> {
        debug!(user_id = %id, "fetching user detail");
        let record = self.directory.fetch_user(id).await?;
        if record.id != id {
            return Err(AdminError::MalformedResponse {
                message: format!("requested user {id} but received user {}", record.id),
            });
        }
        Ok(record)
    }
}

impl std::fmt::Debug for RecordDetailFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDetailFetcher").finish_non_exhaustive()
    }
}
