use std::sync::RwLock;

use crate::document::Document;
use crate::error::StoreResult;
use crate::traits::DocumentStore;

/// In-memory document store.
///
/// Intended for tests and embedding. Holds the document behind a `RwLock`
/// with the same shared/exclusive discipline as [`JsonFileStore`]; `update`
/// mutates a copy and swaps it in only on success.
///
/// [`JsonFileStore`]: crate::JsonFileStore
pub struct InMemoryDocumentStore {
    document: RwLock<Document>,
}

impl InMemoryDocumentStore {
    /// Create a store holding an empty document.
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Create a store seeded with `document`.
    pub fn with_document(document: Document) -> Self {
        Self {
            document: RwLock::new(document),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn ensure_exists(&self) -> StoreResult<()> {
        Ok(())
    }

    fn load(&self) -> StoreResult<Document> {
        Ok(self.document.read().expect("lock poisoned").clone())
    }

    fn replace(&self, document: &Document) -> StoreResult<()> {
        *self.document.write().expect("lock poisoned") = document.clone();
        Ok(())
    }

    fn update<T, F>(&self, mutate: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Document) -> StoreResult<T>,
    {
        let mut current = self.document.write().expect("lock poisoned");
        let mut draft = current.clone();
        let output = mutate(&mut draft)?;
        *current = draft;
        Ok(output)
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let doc = self.document.read().expect("lock poisoned");
        f.debug_struct("InMemoryDocumentStore")
            .field("posts", &doc.posts.len())
            .field("accounts", &doc.accounts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use chirpy_types::{Post, PostId};

    #[test]
    fn starts_empty() {
        let store = InMemoryDocumentStore::new();
        store.ensure_exists().unwrap();
        assert_eq!(store.load().unwrap(), Document::new());
    }

    #[test]
    fn update_applies_on_success() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .update(|doc| {
                let id = doc.next_post_id()?;
                doc.posts.insert(id, Post::new(id, "hi"));
                Ok(id)
            })
            .unwrap();
        assert_eq!(id, PostId::new(1));
        assert_eq!(store.load().unwrap().posts.len(), 1);
    }

    #[test]
    fn update_discards_on_failure() {
        let store = InMemoryDocumentStore::new();
        let result: StoreResult<()> = store.update(|doc| {
            doc.posts.insert(PostId::new(1), Post::new(PostId::new(1), "draft"));
            Err(StoreError::Encode("boom".into()))
        });
        assert!(result.is_err());
        assert!(store.load().unwrap().posts.is_empty());
    }

    #[test]
    fn debug_shows_counts() {
        let store = InMemoryDocumentStore::new();
        assert_eq!(
            format!("{store:?}"),
            "InMemoryDocumentStore { posts: 0, accounts: 0 }"
        );
    }
}
