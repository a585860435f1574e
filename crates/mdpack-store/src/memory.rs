use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::FingerprintStore;
use crate::FingerprintMap;

/// In-memory fingerprint store.
///
/// Intended for tests and embedding. Both generations are held behind a
/// `RwLock`; nothing touches the filesystem.
#[derive(Default)]
pub struct InMemoryFingerprintStore {
    committed: RwLock<Option<FingerprintMap>>,
    staged: RwLock<Option<FingerprintMap>>,
}

impl InMemoryFingerprintStore {
    /// Create an empty store with no committed or staged generation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose committed generation is `mapping`.
    pub fn with_committed(mapping: FingerprintMap) -> Self {
        Self {
            committed: RwLock::new(Some(mapping)),
            staged: RwLock::new(None),
        }
    }

    /// Returns `true` if a staged generation exists.
    pub fn has_staged(&self) -> bool {
        self.staged.read().expect("lock poisoned").is_some()
    }
}

impl FingerprintStore for InMemoryFingerprintStore {
    fn load(&self) -> StoreResult<FingerprintMap> {
        Ok(self
            .committed
            .read()
            .expect("lock poisoned")
            .clone()
            .unwrap_or_default())
    }

    fn load_staged(&self) -> StoreResult<Option<FingerprintMap>> {
        Ok(self.staged.read().expect("lock poisoned").clone())
    }

    fn stage(&self, mapping: &FingerprintMap) -> StoreResult<()> {
        *self.staged.write().expect("lock poisoned") = Some(mapping.clone());
        Ok(())
    }

    fn commit(&self) -> StoreResult<()> {
        let staged = self
            .staged
            .read()
            .expect("lock poisoned")
            .clone()
            .ok_or_else(|| StoreError::CommitFailed("nothing staged".into()))?;
        *self.committed.write().expect("lock poisoned") = Some(staged);
        Ok(())
    }

    fn reset(&self, including_committed: bool) -> StoreResult<()> {
        *self.staged.write().expect("lock poisoned") = None;
        if including_committed {
            *self.committed.write().expect("lock poisoned") = None;
        }
        Ok(())
    }
}
