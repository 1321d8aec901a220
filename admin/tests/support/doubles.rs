//! Gated, recording user directory double.
//!
//! Wraps the in-memory fixture so tests can hold any single call open until
//! they release it, which lets a test decide the order in which concurrent
//! responses resolve.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};
use tokio::sync::Notify;
use user_admin::domain::ports::{FixtureUserDirectory, UserDirectory, UserDirectoryError};
use user_admin::domain::{UserId, UserRecord, UserUpdate};

/// One call made against the double.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    List { page: u32 },
    Detail(UserId),
    Update(UserId),
}

pub struct GatedUserDirectory {
    inner: FixtureUserDirectory,
    calls: Mutex<Vec<Call>>,
    gates: Mutex<HashMap<Call, Arc<Notify>>>,
    failures: Mutex<HashMap<Call, UserDirectoryError>>,
}

impl GatedUserDirectory {
    pub fn sample(count: u64) -> Arc<Self> {
        Arc::new(Self {
            inner: FixtureUserDirectory::sample(count),
            calls: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
        })
    }

    /// Hold `call` open until the returned handle is notified.
    ///
    /// `Notify` stores the permit, so releasing before the call arrives is fine.
    pub fn gate(&self, call: Call) -> Arc<Notify> {
        Arc::clone(
            self.gates
                .lock()
                .expect("gates lock")
                .entry(call)
                .or_insert_with(|| Arc::new(Notify::new())),
        )
    }

    /// Answer `call` with `error` instead of the fixture response.
    pub fn fail(&self, call: Call, error: UserDirectoryError) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(call, error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn records(&self) -> Vec<UserRecord> {
        self.inner.records()
    }

    async fn enter(&self, call: Call) -> Result<(), UserDirectoryError> {
        self.calls.lock().expect("calls lock").push(call);
        let gate = self.gates.lock().expect("gates lock").get(&call).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.failures.lock().expect("failures lock").get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserDirectory for GatedUserDirectory {
    async fn list_users(
        &self,
        request: PageRequest,
    ) -> Result<Paginated<UserRecord>, UserDirectoryError> {
        self.enter(Call::List {
            page: request.page(),
        })
        .await?;
        self.inner.list_users(request).await
    }

    async fn fetch_user(&self, id: UserId) -> Result<UserRecord, UserDirectoryError> {
        self.enter(Call::Detail(id)).await?;
        self.inner.fetch_user(id).await
    }

    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<UserRecord, UserDirectoryError> {
        self.enter(Call::Update(id)).await?;
        self.inner.update_user(id, update).await
    }
}
