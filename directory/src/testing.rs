//! In-process [`DirectoryRemote`] for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::record::{CreatePayload, VolunteerRecord};
use crate::remote::{DirectoryRemote, HealthStatus, RemoteError};

/// Scriptable remote. Online stubs serve their record list and accept
/// mutations; offline stubs fail every call with a `Status` error.
#[derive(Debug, Default)]
pub struct StubRemote {
    records: Mutex<Vec<VolunteerRecord>>,
    offline: bool,
    fail_mutations: AtomicBool,
    gate: Option<Arc<Notify>>,
    next_id: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl StubRemote {
    pub fn online(records: Vec<VolunteerRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }

    /// Online stub whose `list` waits for one `notify_one` on `gate`.
    pub fn gated(records: Vec<VolunteerRecord>, gate: Arc<Notify>) -> Self {
        Self {
            records: Mutex::new(records),
            gate: Some(gate),
            ..Default::default()
        }
    }

    /// Make create and delete fail while list keeps working.
    pub fn fail_mutations(&self) {
        self.fail_mutations.store(true, Ordering::Release);
    }

    /// Calls received so far, e.g. `["list", "create Ravi", "delete r1"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_call(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn unavailable() -> RemoteError {
        RemoteError::Status {
            status: 503,
            body: "stub remote offline".to_string(),
        }
    }

    fn mutations_fail(&self) -> bool {
        self.offline || self.fail_mutations.load(Ordering::Acquire)
    }
}

#[async_trait]
impl DirectoryRemote for StubRemote {
    async fn list(&self) -> Result<Vec<VolunteerRecord>, RemoteError> {
        self.record_call("list".to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.offline {
            return Err(Self::unavailable());
        }
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn create(&self, payload: &CreatePayload) -> Result<VolunteerRecord, RemoteError> {
        self.record_call(format!("create {}", payload.name));
        if self.mutations_fail() {
            return Err(Self::unavailable());
        }
        let n = self.next_id.fetch_add(1, Ordering::AcqRel) + 1;
        let mut record =
            VolunteerRecord::local_from_payload(payload, 2000 + n as i64, chrono::Utc::now());
        record.id = format!("srv_{n}");
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(0, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.record_call(format!("delete {id}"));
        if self.mutations_fail() {
            return Err(Self::unavailable());
        }
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|r| r.id != id);
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, RemoteError> {
        self.record_call("health".to_string());
        if self.offline {
            return Err(Self::unavailable());
        }
        Ok(HealthStatus {
            status: "OK".to_string(),
            database: Some("connected".to_string()),
            timestamp: None,
        })
    }
}
