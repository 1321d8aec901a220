//! Driven port for the remote user service.
//!
//! The domain owns the request and response contract so the loader, the
//! detail fetcher, and the edit session stay adapter-agnostic. Production
//! wires the reqwest adapter; tests use the in-memory fixture or mocks.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use thiserror::Error;

use crate::domain::{Gender, UserId, UserRecord, UserUpdate};

/// Errors surfaced while calling the user service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserDirectoryError {
    /// Network transport failed before a response arrived.
    #[error("user service transport failed: {message}")]
    Transport { message: String },
    /// The call exceeded the configured timeout.
    #[error("user service timeout: {message}")]
    Timeout { message: String },
    /// The service answered with a non-success status.
    #[error("user service answered status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("user {id} not found")]
    NotFound { id: UserId },
    /// The response body could not be decoded.
    #[error("user service response decode failed: {message}")]
    Decode { message: String },
    /// The adapter refused to build the request.
    #[error("user service request invalid: {message}")]
    InvalidRequest { message: String },
}

impl UserDirectoryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub const fn not_found(id: UserId) -> Self {
        Self::NotFound { id }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Port for listing, reading, and updating users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch one page of users together with the collection total.
    async fn list_users(
        &self,
        request: PageRequest,
    ) -> Result<Paginated<UserRecord>, UserDirectoryError>;

    /// Fetch the full record for `id`, bypassing any intermediate cache.
    async fn fetch_user(&self, id: UserId) -> Result<UserRecord, UserDirectoryError>;

    /// Apply `update` to `id` and return the record as stored by the service.
    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<UserRecord, UserDirectoryError>;
}

/// In-memory user directory used by tests and examples.
///
/// # Examples
///
/// ```
/// use pagination::PageRequest;
/// use user_admin::domain::ports::{FixtureUserDirectory, UserDirectory};
///
/// # let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
/// # runtime.block_on(async {
/// let directory = FixtureUserDirectory::sample(12);
/// let page = directory
///     .list_users(PageRequest::new(2, 10).expect("valid page"))
///     .await
///     .expect("fixture list");
/// assert_eq!(page.items().len(), 2);
/// assert_eq!(page.total(), 12);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct FixtureUserDirectory {
    records: Mutex<Vec<UserRecord>>,
}

impl FixtureUserDirectory {
    /// Serve the given records in order.
    pub fn new(records: Vec<UserRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Serve `count` deterministic users with ids `1..=count`.
    pub fn sample(count: u64) -> Self {
        Self::new((1..=count).map(sample_user).collect())
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<UserRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Deterministic user with id `id`, used to seed fixtures.
pub fn sample_user(id: u64) -> UserRecord {
    let first_name = format!("User{id}");
    UserRecord {
        id: UserId::new(id),
        username: format!("{}_{id}", first_name.to_lowercase()),
        first_name,
        last_name: format!("Sample{id}"),
        maiden_name: String::new(),
        age: 20 + u32::try_from(id % 50).unwrap_or(0),
        gender: if id % 2 == 0 {
            Gender::Female
        } else {
            Gender::Male
        },
        password: format!("password{id}"),
        birth_date: chrono::NaiveDate::from_ymd_opt(1990, 1, 1),
    }
}

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn list_users(
        &self,
        request: PageRequest,
    ) -> Result<Paginated<UserRecord>, UserDirectoryError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let skip = usize::try_from(request.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = records.iter().skip(skip).take(limit).cloned().collect();
        Ok(Paginated::new(items, records.len() as u64, request))
    }

    async fn fetch_user(&self, id: UserId) -> Result<UserRecord, UserDirectoryError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| UserDirectoryError::not_found(id))
    }

    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<UserRecord, UserDirectoryError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| UserDirectoryError::not_found(id))?;
        update.apply_to(record);
        Ok(record.clone())
    }
}
