//! Directory: decides which source is authoritative and keeps the
//! in-memory list and the local cache in step.
//!
//! ## Load
//! Strict three-tier fallback, each tier tried at most once:
//! 1. remote list (cache refreshed on success)
//! 2. non-empty local cache
//! 3. deterministic seed set (persisted to the cache)
//!
//! ## Mutations
//! - create: remote first; on success the server record is prepended and
//!   persisted. On failure nothing changes unless the caller supplies a
//!   client-side record through [`Directory::record_created`].
//! - delete: remote first, then the record is removed locally whatever the
//!   remote said. A remote failure is logged and reported in the outcome,
//!   never raised.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::errors::{DirectoryError, Result};
use crate::projector::{self, Query};
use crate::record::{CreatePayload, VolunteerRecord};
use crate::remote::{DirectoryRemote, HealthStatus, RemoteError};
use crate::seed;
use crate::store::RecordStore;

/// Sequence number handed out when the list is empty.
const FIRST_SEQUENCE_NUMBER: i64 = 1001;

/// Which tier a load was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    FromRemote { count: usize },
    FromCache { count: usize },
    Seeded { count: usize },
}

impl LoadOutcome {
    pub fn count(&self) -> usize {
        match self {
            Self::FromRemote { count } | Self::FromCache { count } | Self::Seeded { count } => {
                *count
            }
        }
    }

    pub fn source_label(&self) -> &'static str {
        match self {
            Self::FromRemote { .. } => "remote directory",
            Self::FromCache { .. } => "local cache",
            Self::Seeded { .. } => "sample data",
        }
    }
}

#[derive(Debug)]
pub enum CreateOutcome {
    /// Server accepted the payload; the record carries server fields.
    Remote(VolunteerRecord),
    /// Server call failed and local state is untouched.
    RemoteFailed(RemoteError),
    /// Server call failed; a client-side record was recorded instead.
    LocalFallback {
        record: VolunteerRecord,
        error: RemoteError,
    },
}

impl CreateOutcome {
    /// The record now at the head of the list, if any.
    pub fn record(&self) -> Option<&VolunteerRecord> {
        match self {
            Self::Remote(record) | Self::LocalFallback { record, .. } => Some(record),
            Self::RemoteFailed(_) => None,
        }
    }

    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(_) => None,
            Self::RemoteFailed(error) | Self::LocalFallback { error, .. } => Some(error),
        }
    }
}

#[derive(Debug)]
pub struct DeleteOutcome {
    /// Records removed from the local list (0 when the id was unknown).
    pub removed: usize,
    /// Set when the remote delete failed; local removal happened anyway.
    pub remote_error: Option<RemoteError>,
}

impl DeleteOutcome {
    pub fn remote_confirmed(&self) -> bool {
        self.remote_error.is_none()
    }
}

/// Owned state container: the authoritative list and the detail selection.
#[derive(Debug, Default)]
struct DirectoryState {
    records: Vec<VolunteerRecord>,
    selected: Option<String>,
}

/// Clears the loading flag on every exit path.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Directory {
    state: Mutex<DirectoryState>,
    loading: AtomicBool,
    remote: Arc<dyn DirectoryRemote>,
    store: Arc<dyn RecordStore>,
}

impl Directory {
    pub fn new(remote: Arc<dyn DirectoryRemote>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            state: Mutex::new(DirectoryState::default()),
            loading: AtomicBool::new(false),
            remote,
            store,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn begin_load(&self) -> Result<LoadingGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DirectoryError::LoadInProgress)?;
        Ok(LoadingGuard(&self.loading))
    }

    /// Populate the list from remote, cache or seed data.
    pub async fn load(&self) -> Result<LoadOutcome> {
        let _guard = self.begin_load()?;

        match self.remote.list().await {
            Ok(records) => {
                let count = records.len();
                let mut state = self.state.lock().await;
                self.store.write(&records);
                state.records = records;
                tracing::info!(count, "Loaded volunteers from remote directory");
                return Ok(LoadOutcome::FromRemote { count });
            }
            Err(e) => {
                tracing::warn!(
                    category = e.category(),
                    "Remote list failed, checking local cache: {e}"
                );
            }
        }

        let cached = self.store.read();
        let mut state = self.state.lock().await;
        if !cached.is_empty() {
            let count = cached.len();
            state.records = cached;
            tracing::info!(count, "Loaded volunteers from local cache");
            return Ok(LoadOutcome::FromCache { count });
        }

        let seeded = seed::seed_records(Utc::now());
        let count = seeded.len();
        self.store.write(&seeded);
        state.records = seeded;
        tracing::info!(count, "Local cache empty, generated sample volunteers");
        Ok(LoadOutcome::Seeded { count })
    }

    /// Create through the remote service only.
    ///
    /// On [`CreateOutcome::RemoteFailed`] local state is unchanged; pass a
    /// client-side record to [`Directory::record_created`] to keep it.
    pub async fn create(&self, payload: &CreatePayload) -> Result<CreateOutcome> {
        payload.validate()?;

        match self.remote.create(payload).await {
            Ok(record) => {
                let record = self.record_created(record).await?;
                Ok(CreateOutcome::Remote(record))
            }
            Err(e) => {
                tracing::warn!(category = e.category(), "Remote create failed: {e}");
                Ok(CreateOutcome::RemoteFailed(e))
            }
        }
    }

    /// Create remotely, or record a client-only copy of `payload` when the
    /// remote call fails.
    pub async fn create_with_fallback(
        &self,
        payload: &CreatePayload,
        now: DateTime<Utc>,
    ) -> Result<CreateOutcome> {
        match self.create(payload).await? {
            CreateOutcome::RemoteFailed(error) => {
                let sequence_number = self.next_sequence_number().await;
                let local = VolunteerRecord::local_from_payload(payload, sequence_number, now);
                let record = self.record_created(local).await?;
                Ok(CreateOutcome::LocalFallback { record, error })
            }
            outcome => Ok(outcome),
        }
    }

    /// Prepend `record`, persist the list and select the record.
    pub async fn record_created(&self, record: VolunteerRecord) -> Result<VolunteerRecord> {
        let record = record
            .normalized()
            .ok_or_else(|| DirectoryError::invalid_record("record has no id"))?;

        let mut state = self.state.lock().await;
        state.records.insert(0, record.clone());
        self.store.write(&state.records);
        state.selected = Some(record.id.clone());
        Ok(record)
    }

    /// Delete remotely, then locally regardless of the remote result.
    pub async fn delete(&self, id: &str) -> DeleteOutcome {
        let remote_error = match self.remote.delete(id).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    id,
                    category = e.category(),
                    "Remote delete failed, removing locally: {e}"
                );
                Some(e)
            }
        };

        let mut state = self.state.lock().await;
        let before = state.records.len();
        state.records.retain(|r| r.id != id);
        let removed = before - state.records.len();
        self.store.write(&state.records);
        if state.selected.as_deref() == Some(id) {
            state.selected = None;
        }

        DeleteOutcome {
            removed,
            remote_error,
        }
    }

    pub async fn health(&self) -> std::result::Result<HealthStatus, RemoteError> {
        self.remote.health().await
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// Snapshot of the full list.
    pub async fn records(&self) -> Vec<VolunteerRecord> {
        self.state.lock().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.records.is_empty()
    }

    pub async fn find(&self, id: &str) -> Option<VolunteerRecord> {
        let state = self.state.lock().await;
        state.records.iter().find(|r| r.id == id).cloned()
    }

    /// Currently selected record, if it is still in the list.
    pub async fn selected(&self) -> Option<VolunteerRecord> {
        let state = self.state.lock().await;
        let id = state.selected.as_deref()?;
        state.records.iter().find(|r| r.id == id).cloned()
    }

    /// Select a record for detail display. Returns false for unknown ids.
    pub async fn select(&self, id: &str) -> bool {
        let mut state = self.state.lock().await;
        if state.records.iter().any(|r| r.id == id) {
            state.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub async fn clear_selection(&self) {
        self.state.lock().await.selected = None;
    }

    /// One past the highest sequence number in the list. Saturates at
    /// `i64::MAX`.
    pub async fn next_sequence_number(&self) -> i64 {
        let state = self.state.lock().await;
        state
            .records
            .iter()
            .map(|r| r.sequence_number)
            .max()
            .map_or(FIRST_SEQUENCE_NUMBER, |max| max.saturating_add(1))
    }

    pub async fn project(&self, query: &Query) -> Vec<VolunteerRecord> {
        let state = self.state.lock().await;
        projector::project(&state.records, query)
    }

    pub async fn categories(&self) -> Vec<String> {
        let state = self.state.lock().await;
        projector::categories(&state.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;
    use crate::testing::StubRemote;
    use pretty_assertions::assert_eq;

    fn record(id: &str, name: &str, code: &str) -> VolunteerRecord {
        VolunteerRecord {
            id: id.to_string(),
            sequence_number: 1,
            name: name.to_string(),
            membership_code: code.to_string(),
            mobile_number: "9876500000".to_string(),
            address: "Pune".to_string(),
            image_url: "https://img.example/p.png".to_string(),
            join_date: None,
            created_at: None,
        }
    }

    fn payload(name: &str) -> CreatePayload {
        CreatePayload {
            name: name.to_string(),
            membership_code: "AAK0100".to_string(),
            mobile_number: "9000000000".to_string(),
            address: "Nagpur".to_string(),
            image: None,
        }
    }

    fn directory(remote: StubRemote, store: Arc<MemoryRecordStore>) -> Directory {
        Directory::new(Arc::new(remote), store)
    }

    #[tokio::test]
    async fn load_from_remote_refreshes_cache() {
        let store = Arc::new(MemoryRecordStore::with_records(vec![record(
            "old", "Old", "AAK0009",
        )]));
        let r1 = record("r1", "Asha", "AAK0001");
        let dir = directory(StubRemote::online(vec![r1.clone()]), Arc::clone(&store));

        let outcome = dir.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::FromRemote { count: 1 });
        assert_eq!(dir.records().await, vec![r1.clone()]);
        assert_eq!(store.read(), vec![r1]);
        assert!(!dir.is_loading());
    }

    #[tokio::test]
    async fn load_falls_back_to_cache_in_order() {
        let cached = vec![
            record("c2", "Second", "AAK0002"),
            record("c1", "First", "AAK0001"),
        ];
        let store = Arc::new(MemoryRecordStore::with_records(cached.clone()));
        let dir = directory(StubRemote::offline(), Arc::clone(&store));

        let outcome = dir.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::FromCache { count: 2 });
        assert_eq!(dir.records().await, cached);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn load_seeds_when_remote_and_cache_are_empty() {
        let store = Arc::new(MemoryRecordStore::new());
        let dir = directory(StubRemote::offline(), Arc::clone(&store));

        let outcome = dir.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Seeded { count: 8 });

        let records = dir.records().await;
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "mock_1", "mock_2", "mock_3", "mock_4", "mock_5", "mock_6", "mock_7", "mock_8"
            ]
        );
        assert_eq!(records[0].membership_code, "AAK1001");
        assert_eq!(records[7].membership_code, "AAK1008");
        assert_eq!(store.read(), records);
    }

    #[tokio::test]
    async fn empty_remote_list_is_authoritative() {
        let store = Arc::new(MemoryRecordStore::with_records(vec![record(
            "stale", "Stale", "AAK0003",
        )]));
        let dir = directory(StubRemote::online(vec![]), Arc::clone(&store));

        assert_eq!(dir.load().await.unwrap(), LoadOutcome::FromRemote { count: 0 });
        assert!(dir.is_empty().await);
        assert!(store.read().is_empty());
    }

    #[tokio::test]
    async fn create_success_prepends_persists_and_selects() {
        let store = Arc::new(MemoryRecordStore::new());
        let remote = StubRemote::online(vec![record("r1", "Asha", "AAK0001")]);
        let dir = directory(remote, Arc::clone(&store));
        dir.load().await.unwrap();
        dir.select("r1").await;

        let outcome = dir.create(&payload("Ravi")).await.unwrap();
        let created = match outcome {
            CreateOutcome::Remote(record) => record,
            other => panic!("expected remote create, got {other:?}"),
        };
        assert!(created.id.starts_with("srv_"));

        let records = dir.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], created);
        assert_eq!(store.read(), records);
        assert_eq!(dir.selected().await, Some(created));
    }

    #[tokio::test]
    async fn create_failure_leaves_state_untouched() {
        let store = Arc::new(MemoryRecordStore::new());
        let remote = StubRemote::online(vec![record("r1", "Asha", "AAK0001")]);
        remote.fail_mutations();
        let dir = directory(remote, Arc::clone(&store));
        dir.load().await.unwrap();
        let writes = store.write_count();

        let outcome = dir.create(&payload("Ravi")).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::RemoteFailed(_)));
        assert_eq!(dir.len().await, 1);
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn caller_supplied_record_after_failed_create() {
        let store = Arc::new(MemoryRecordStore::new());
        let remote = StubRemote::online(vec![record("r1", "Asha", "AAK0001")]);
        remote.fail_mutations();
        let dir = directory(remote, Arc::clone(&store));
        dir.load().await.unwrap();

        let outcome = dir.create(&payload("Ravi")).await.unwrap();
        assert!(outcome.record().is_none());

        let local = record("local_1", "Ravi", "AAK0100");
        dir.record_created(local.clone()).await.unwrap();

        let ids: Vec<String> = dir.records().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["local_1", "r1"]);
        assert_eq!(store.read(), dir.records().await);
        assert_eq!(dir.selected().await.map(|r| r.id), Some("local_1".to_string()));
    }

    #[tokio::test]
    async fn create_with_fallback_builds_local_record() {
        let store = Arc::new(MemoryRecordStore::new());
        let remote = StubRemote::offline();
        let dir = directory(remote, Arc::clone(&store));
        dir.load().await.unwrap();

        let now = Utc::now();
        let outcome = dir.create_with_fallback(&payload("Ravi"), now).await.unwrap();
        let CreateOutcome::LocalFallback { record, .. } = outcome else {
            panic!("expected local fallback");
        };
        assert!(record.is_local_only());
        assert_eq!(record.sequence_number, 1009);
        assert_eq!(record.created_at, Some(now));
        assert_eq!(dir.records().await[0], record);
        assert_eq!(store.read(), dir.records().await);
        assert_eq!(dir.selected().await, Some(record));
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_before_remote_call() {
        let remote = Arc::new(StubRemote::online(vec![]));
        let dir = Directory::new(remote.clone(), Arc::new(MemoryRecordStore::new()));

        let err = dir.create(&payload("  ")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidPayload { .. }));
        assert!(!remote.calls().iter().any(|c| c.starts_with("create")));
    }

    #[tokio::test]
    async fn record_without_id_is_rejected() {
        let dir = directory(StubRemote::offline(), Arc::new(MemoryRecordStore::new()));
        let err = dir
            .record_created(record(" ", "Ghost", "AAK0000"))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidRecord { .. }));
        assert!(dir.is_empty().await);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_and_clears_selection() {
        let store = Arc::new(MemoryRecordStore::new());
        let dir = directory(StubRemote::offline(), Arc::clone(&store));
        dir.load().await.unwrap();
        assert!(dir.select("mock_3").await);

        let outcome = dir.delete("mock_3").await;
        assert_eq!(outcome.removed, 1);
        assert!(!outcome.remote_confirmed());

        let records = dir.records().await;
        assert_eq!(records.len(), 7);
        assert!(records.iter().all(|r| r.id != "mock_3"));
        assert_eq!(store.read(), records);
        assert_eq!(dir.selected().await, None);
    }

    #[tokio::test]
    async fn delete_keeps_other_selection() {
        let store = Arc::new(MemoryRecordStore::new());
        let dir = directory(StubRemote::offline(), Arc::clone(&store));
        dir.load().await.unwrap();
        dir.select("mock_1").await;

        dir.delete("mock_2").await;
        assert_eq!(dir.selected().await.map(|r| r.id), Some("mock_1".to_string()));
    }

    #[tokio::test]
    async fn delete_unknown_id_leaves_list_unchanged() {
        let store = Arc::new(MemoryRecordStore::new());
        let dir = directory(StubRemote::online(vec![]), Arc::clone(&store));
        dir.record_created(record("a", "A", "AAK0001")).await.unwrap();
        let before = dir.records().await;

        let outcome = dir.delete("missing").await;
        assert_eq!(outcome.removed, 0);
        assert!(outcome.remote_confirmed());
        assert_eq!(dir.records().await, before);
        assert_eq!(store.read(), before);
    }

    #[tokio::test]
    async fn remote_delete_success_is_reported() {
        let remote = StubRemote::online(vec![record("r1", "Asha", "AAK0001")]);
        let dir = directory(remote, Arc::new(MemoryRecordStore::new()));
        dir.load().await.unwrap();

        let outcome = dir.delete("r1").await;
        assert!(outcome.remote_confirmed());
        assert_eq!(outcome.removed, 1);
        assert!(dir.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_load_is_rejected() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let remote = StubRemote::gated(vec![record("r1", "Asha", "AAK0001")], Arc::clone(&gate));
        let dir = Arc::new(directory(remote, Arc::new(MemoryRecordStore::new())));

        let first = tokio::spawn({
            let dir = Arc::clone(&dir);
            async move { dir.load().await }
        });
        while !dir.is_loading() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            dir.load().await,
            Err(DirectoryError::LoadInProgress)
        ));

        gate.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome, LoadOutcome::FromRemote { count: 1 });
        assert!(!dir.is_loading());

        // The flag is released, so a second load goes through.
        gate.notify_one();
        assert!(dir.load().await.is_ok());
    }

    #[tokio::test]
    async fn next_sequence_number_follows_max() {
        let dir = directory(StubRemote::offline(), Arc::new(MemoryRecordStore::new()));
        assert_eq!(dir.next_sequence_number().await, 1001);

        let mut high = record("h", "High", "AAK0001");
        high.sequence_number = 1500;
        dir.record_created(high).await.unwrap();
        assert_eq!(dir.next_sequence_number().await, 1501);
    }

    #[tokio::test]
    async fn fallback_sequence_number_saturates_at_max() {
        let mut top = record("r1", "Asha", "AAK0001");
        top.sequence_number = i64::MAX;
        let remote = StubRemote::online(vec![top]);
        remote.fail_mutations();
        let dir = directory(remote, Arc::new(MemoryRecordStore::new()));
        dir.load().await.unwrap();

        assert_eq!(dir.next_sequence_number().await, i64::MAX);
        let outcome = dir
            .create_with_fallback(&payload("Ravi"), Utc::now())
            .await
            .unwrap();
        let CreateOutcome::LocalFallback { record, .. } = outcome else {
            panic!("expected local fallback");
        };
        assert_eq!(record.sequence_number, i64::MAX);
        assert_eq!(dir.len().await, 2);
    }

    #[tokio::test]
    async fn select_unknown_id_is_false() {
        let dir = directory(StubRemote::offline(), Arc::new(MemoryRecordStore::new()));
        dir.load().await.unwrap();
        assert!(!dir.select("nope").await);
        assert_eq!(dir.selected().await, None);
    }
}
