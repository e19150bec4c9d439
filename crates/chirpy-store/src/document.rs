use std::collections::BTreeMap;

use chirpy_types::{Account, AccountId, Post, PostId};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// The single persisted aggregate: every post and every account.
///
/// On disk:
/// ```text
/// { "chirps": { "<id>": {"id": <int>, "body": <string>}, ... },
///   "users":  { "<id>": {"id": <int>, "email": <string>, "hashedPassword": <base64>}, ... } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "chirps", default)]
    pub posts: BTreeMap<PostId, Post>,
    #[serde(rename = "users", default)]
    pub accounts: BTreeMap<AccountId, Account>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for the next post: one past the highest id in use.
    ///
    /// Ids are never removed, so this equals `count + 1`. Fails only for a
    /// document whose highest id is `u64::MAX`.
    pub fn next_post_id(&self) -> StoreResult<PostId> {
        match self.posts.keys().next_back() {
            None => Ok(PostId::FIRST),
            Some(last) => last.next().ok_or(StoreError::IdsExhausted("post")),
        }
    }

    /// Id for the next account: one past the highest id in use.
    pub fn next_account_id(&self) -> StoreResult<AccountId> {
        match self.accounts.keys().next_back() {
            None => Ok(AccountId::FIRST),
            Some(last) => last.next().ok_or(StoreError::IdsExhausted("account")),
        }
    }

    /// Find an account by exact (case-sensitive) email.
    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|account| account.email == email)
    }

    /// Whether `email` belongs to an account other than `except`.
    pub fn email_in_use(&self, email: &str, except: Option<AccountId>) -> bool {
        self.accounts
            .values()
            .any(|account| account.email == email && Some(account.id) != except)
    }

    /// All posts, ascending by id.
    pub fn sorted_posts(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.values().cloned().collect();
        posts.sort_by_key(|post| post.id);
        posts
    }
}
