//! Storage abstraction for saved sheets.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::record::NodeRecord;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Sheet not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A sheet as stored: its title, when it was saved and its node records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSheet {
    pub title: String,
    /// Milliseconds since the Unix epoch.
    pub saved_at: u64,
    pub records: Vec<NodeRecord>,
}

impl SavedSheet {
    /// Stamp a set of records with the current time.
    pub fn new(title: impl Into<String>, records: Vec<NodeRecord>) -> Self {
        Self {
            title: title.into(),
            saved_at: now_millis(),
            records,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Sheet storage keyed by title.
///
/// The engine never calls storage on its own; the host saves
/// `Sheet::to_records` and feeds loaded records back through
/// `Sheet::load_records`.
pub trait Storage: Send + Sync {
    /// Save records under a title, replacing what was there.
    fn save(&self, title: &str, records: &[NodeRecord]) -> BoxFuture<'_, StorageResult<SavedSheet>>;

    /// Load a sheet.
    fn load(&self, title: &str) -> BoxFuture<'_, StorageResult<SavedSheet>>;

    /// Delete a sheet. Deleting a missing sheet is not an error.
    fn delete(&self, title: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all sheet titles.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a sheet exists.
    fn exists(&self, title: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Minimal executor for driving storage futures in tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
