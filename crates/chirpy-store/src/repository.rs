use chirpy_crypto::hash_password;
use chirpy_types::{Account, AccountId, PasswordHash, Post, PostId};
use tracing::debug;

use crate::error::{AccountKey, StoreError, StoreResult};
use crate::traits::DocumentStore;

/// Per-entity CRUD over a [`DocumentStore`].
///
/// Every call re-reads the document; every mutation is a single
/// [`DocumentStore::update`], so id assignment and the email uniqueness
/// check happen in the same exclusive section as the insert.
#[derive(Debug)]
pub struct Repository<S> {
    store: S,
}

impl<S: DocumentStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    /// Create a post with the next sequential id.
    pub fn create_post(&self, body: impl Into<String>) -> StoreResult<Post> {
        let body = body.into();
        let post = self.store.update(move |doc| {
            let id = doc.next_post_id()?;
            let post = Post::new(id, body);
            doc.posts.insert(id, post.clone());
            Ok(post)
        })?;
        debug!(id = %post.id, "post created");
        Ok(post)
    }

    /// All posts, ascending by id.
    pub fn list_posts(&self) -> StoreResult<Vec<Post>> {
        Ok(self.store.load()?.sorted_posts())
    }

    pub fn get_post(&self, id: PostId) -> StoreResult<Post> {
        self.store
            .load()?
            .posts
            .remove(&id)
            .ok_or(StoreError::PostNotFound(id))
    }

    pub fn post_count(&self) -> StoreResult<usize> {
        Ok(self.store.load()?.posts.len())
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Create an account. Fails with [`StoreError::DuplicateEmail`] if the
    /// email (compared case-sensitively) is already taken.
    pub fn create_account(
        &self,
        email: impl Into<String>,
        password_hash: PasswordHash,
    ) -> StoreResult<Account> {
        let email = email.into();
        let account = self.store.update(move |doc| {
            if doc.email_in_use(&email, None) {
                return Err(StoreError::DuplicateEmail(email));
            }
            let id = doc.next_account_id()?;
            let account = Account::new(id, email, password_hash);
            doc.accounts.insert(id, account.clone());
            Ok(account)
        })?;
        debug!(id = %account.id, "account created");
        Ok(account)
    }

    pub fn get_account_by_email(&self, email: &str) -> StoreResult<Account> {
        self.store
            .load()?
            .account_by_email(email)
            .cloned()
            .ok_or_else(|| StoreError::AccountNotFound(AccountKey::Email(email.to_string())))
    }

    pub fn get_account_by_id(&self, id: AccountId) -> StoreResult<Account> {
        self.store
            .load()?
            .accounts
            .remove(&id)
            .ok_or(StoreError::AccountNotFound(AccountKey::Id(id)))
    }

    /// Replace an account's email and password.
    ///
    /// The cleartext password is hashed before the exclusive section is
    /// entered. The new email must not belong to any other account; keeping
    /// the current email is allowed.
    pub fn update_account(
        &self,
        id: AccountId,
        new_email: impl Into<String>,
        new_password: &str,
    ) -> StoreResult<Account> {
        let new_email = new_email.into();
        let new_hash = hash_password(new_password)?;

        let account = self.store.update(move |doc| {
            if !doc.accounts.contains_key(&id) {
                return Err(StoreError::AccountNotFound(AccountKey::Id(id)));
            }
            if doc.email_in_use(&new_email, Some(id)) {
                return Err(StoreError::DuplicateEmail(new_email));
            }
            let account = doc
                .accounts
                .get_mut(&id)
                .ok_or(StoreError::AccountNotFound(AccountKey::Id(id)))?;
            account.email = new_email;
            account.password_hash = new_hash;
            Ok(account.clone())
        })?;
        debug!(id = %account.id, "account updated");
        Ok(account)
    }

    pub fn account_count(&self) -> StoreResult<usize> {
        Ok(self.store.load()?.accounts.len())
    }
}
