use crate::document::Document;
use crate::error::StoreResult;

/// Owner of the single persisted [`Document`].
///
/// All implementations must satisfy these invariants:
/// - `load` callers may run in parallel with each other, never with a writer.
/// - `replace` and `update` are exclusive: no two writers interleave.
/// - `update` is the only way to mutate based on current contents. It loads,
///   applies the change, and persists inside one exclusive section, so a
///   racing writer can neither observe an intermediate state nor clobber
///   the change.
/// - If the mutation fails, nothing is persisted.
/// - All I/O errors are propagated, never silently ignored.
pub trait DocumentStore: Send + Sync {
    /// Create an empty document if none exists yet. Idempotent.
    fn ensure_exists(&self) -> StoreResult<()>;

    /// Read the whole document under the shared lock.
    fn load(&self) -> StoreResult<Document>;

    /// Overwrite the whole document under the exclusive lock.
    fn replace(&self, document: &Document) -> StoreResult<()>;

    /// Compose-then-replace: load, mutate, persist as one exclusive section.
    ///
    /// Returns whatever `mutate` returns. If `mutate` fails the stored
    /// document is left untouched.
    fn update<T, F>(&self, mutate: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Document) -> StoreResult<T>;
}
