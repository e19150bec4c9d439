use serde::{Deserialize, Serialize};

use crate::id::PostId;

/// A short text entry ("chirp").
///
/// Posts are immutable once created. The id is stored redundantly inside
/// the record as well as being its key in the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub body: String,
}

impl Post {
    pub fn new(id: PostId, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
        }
    }
}
