use crate::error::StoreResult;
use crate::FingerprintMap;

/// Two-generation fingerprint store.
///
/// All implementations must satisfy these invariants:
/// - A missing committed generation loads as an empty map, never an error.
/// - `stage` replaces the staged generation in full.
/// - `commit` replaces the committed generation with the staged one in full,
///   or fails leaving the committed generation untouched.
/// - Nothing is persisted implicitly; every write is caller-triggered.
pub trait FingerprintStore: Send + Sync {
    /// Load the committed generation.
    fn load(&self) -> StoreResult<FingerprintMap>;

    /// Load the staged generation, if one exists.
    fn load_staged(&self) -> StoreResult<Option<FingerprintMap>>;

    /// Persist `mapping` as the staged generation, overwriting any previous one.
    fn stage(&self, mapping: &FingerprintMap) -> StoreResult<()>;

    /// Promote the staged generation to committed.
    ///
    /// Fails with [`StoreError::CommitFailed`](crate::StoreError::CommitFailed)
    /// when nothing is staged.
    fn commit(&self) -> StoreResult<()>;

    /// Delete the staged generation, and the committed one too when
    /// `including_committed` is set.
    fn reset(&self, including_committed: bool) -> StoreResult<()>;
}
