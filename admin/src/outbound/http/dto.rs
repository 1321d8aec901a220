//! DTOs for decoding user service list responses.
//!
//! Single-user endpoints decode straight into `UserRecord`; only the list
//! envelope needs a transport shape before mapping into the domain page.

use pagination::{PageRequest, Paginated};
use serde::Deserialize;
use tracing::debug;

use crate::domain::UserRecord;
use crate::domain::ports::UserDirectoryError;

#[derive(Debug, Deserialize)]
pub(super) struct UsersResponseDto {
    pub(super) users: Vec<UserRecord>,
    pub(super) total: u64,
    #[serde(default)]
    pub(super) skip: Option<u64>,
    #[serde(default)]
    pub(super) limit: Option<u64>,
}

impl UsersResponseDto {
    /// Map the envelope onto the page that was requested.
    ///
    /// The service echoes `skip` and `limit`; a different `skip` means the
    /// records belong to another page and must not be shown under this one.
    pub(super) fn into_page(
        self,
        request: PageRequest,
    ) -> Result<Paginated<UserRecord>, UserDirectoryError> {
        if let Some(skip) = self.skip
            && skip != request.skip()
        {
            return Err(UserDirectoryError::decode(format!(
                "requested skip {} but the service answered skip {skip}",
                request.skip()
            )));
        }
        if let Some(limit) = self.limit
            && limit != u64::from(request.limit())
        {
            debug!(
                requested = request.limit(),
                answered = limit,
                "user service adjusted the page limit"
            );
        }
        Ok(Paginated::new(self.users, self.total, request))
    }
}
