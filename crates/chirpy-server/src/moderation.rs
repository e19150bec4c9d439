use std::collections::HashSet;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Replacement for a banned word.
pub const MASK: &str = "****";

/// Length check and profanity masking for chirp bodies.
#[derive(Clone, Debug)]
pub struct ContentFilter {
    max_length: usize,
    banned: HashSet<String>,
}

impl ContentFilter {
    pub fn new<I, W>(max_length: usize, banned_words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        Self {
            max_length,
            banned: banned_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.max_chirp_length, &config.banned_words)
    }

    /// Validate a body and return its cleaned form.
    pub fn check(&self, body: &str) -> ServerResult<String> {
        if body.trim().is_empty() {
            return Err(ServerError::BadRequest("chirp body must not be empty".into()));
        }
        if body.chars().count() > self.max_length {
            return Err(ServerError::ChirpTooLong {
                max: self.max_length,
            });
        }
        Ok(self.clean(body))
    }

    /// Mask banned words.
    ///
    /// Words are split on single spaces and compared case-insensitively; a
    /// word with punctuation attached (`"fornax!"`) is left alone.
    pub fn clean(&self, body: &str) -> String {
        body.split(' ')
            .map(|word| {
                if self.banned.contains(&word.to_lowercase()) {
                    MASK
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
