//! `volunteer-directory`: client-side sync layer for the volunteer directory.
//!
//! Loads the volunteer list from the remote directory service, falls back to
//! a local JSON cache (or a deterministic seed set) when the service is
//! unreachable, and applies create/delete mutations to both the in-memory
//! list and the cache.
//!
//! ## Layers (leaf first)
//! - [`store`]: best-effort local cache holding one full snapshot
//! - [`remote`]: HTTP client for the `{success, data}` envelope API
//! - [`reconciler`]: three-tier load and optimistic mutations
//! - [`projector`]: search + membership-code filtering
//! - [`gallery`]: intent dispatch and view state for front ends

pub mod config;
pub mod errors;
pub mod gallery;
pub mod projector;
pub mod reconciler;
pub mod record;
pub mod remote;
pub mod seed;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::DirectoryConfig;
pub use errors::DirectoryError;
pub use gallery::{Gallery, GalleryView, Intent, Notice, ViewMode};
pub use projector::Query;
pub use reconciler::{CreateOutcome, DeleteOutcome, Directory, LoadOutcome};
pub use record::{CreatePayload, RawVolunteer, VolunteerRecord};
pub use remote::{DirectoryRemote, HealthStatus, HttpDirectoryClient, RemoteError};
pub use store::{FileRecordStore, MemoryRecordStore, RecordStore, StoreError};
