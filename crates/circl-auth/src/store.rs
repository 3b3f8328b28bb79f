// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token store implementations.
//!
//! [`MemoryTokenStore`] backs tests and short-lived sessions;
//! [`FileTokenStore`] persists the pair as JSON under the user data
//! directory, the CLI analog of the web client's local storage.

use std::path::PathBuf;
use std::sync::RwLock;

use circl_core::{TokenPair, TokenStore};
use tracing::warn;

/// In-memory token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store, convenient in tests.
    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            inner: RwLock::new(Some(pair)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .expect("token store lock poisoned")
            .as_ref()
            .map(|p| p.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner
            .read()
            .expect("token store lock poisoned")
            .as_ref()
            .and_then(|p| p.refresh_token.clone())
    }

    fn store(&self, pair: TokenPair) {
        let mut guard = self.inner.write().expect("token store lock poisoned");
        let merged = merge_pair(guard.take(), pair);
        *guard = Some(merged);
    }

    fn clear(&self) {
        *self.inner.write().expect("token store lock poisoned") = None;
    }
}

/// File-backed token store.
///
/// Reads the file once at construction and keeps the pair cached; every
/// mutation is written through. Persistence failures are logged, never
/// propagated -- losing the cache costs one re-login, not a crash.
pub struct FileTokenStore {
    path: PathBuf,
    cache: RwLock<Option<TokenPair>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<TokenPair>(&content) {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed credential file");
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    fn persist(&self, pair: Option<&TokenPair>) {
        match pair {
            Some(pair) => {
                if let Some(parent) = self.path.parent() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        warn!(path = %parent.display(), error = %e, "failed to create credential directory");
                        return;
                    }
                }
                match serde_json::to_string_pretty(pair) {
                    Ok(json) => {
                        if let Err(e) = std::fs::write(&self.path, json) {
                            warn!(path = %self.path.display(), error = %e, "failed to write credential file");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to serialize credentials");
                    }
                }
            }
            None => {
                if let Err(e) = std::fs::remove_file(&self.path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %self.path.display(), error = %e, "failed to remove credential file");
                    }
                }
            }
        }
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.cache
            .read()
            .expect("token store lock poisoned")
            .as_ref()
            .map(|p| p.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.cache
            .read()
            .expect("token store lock poisoned")
            .as_ref()
            .and_then(|p| p.refresh_token.clone())
    }

    fn store(&self, pair: TokenPair) {
        let mut guard = self.cache.write().expect("token store lock poisoned");
        let merged = merge_pair(guard.take(), pair);
        self.persist(Some(&merged));
        *guard = Some(merged);
    }

    fn clear(&self) {
        let mut guard = self.cache.write().expect("token store lock poisoned");
        *guard = None;
        self.persist(None);
    }
}

/// A new pair without a refresh token keeps the previously stored one.
fn merge_pair(existing: Option<TokenPair>, incoming: TokenPair) -> TokenPair {
    TokenPair {
        access_token: incoming.access_token,
        refresh_token: incoming
            .refresh_token
            .or_else(|| existing.and_then(|p| p.refresh_token)),
    }
}
