// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory holder for the current access token.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Short-lived bearer credential. Opaque to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value, for the Authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Called after every `set`, with the new value.
pub type ReplaceHook = Arc<dyn Fn(Option<&AccessToken>) + Send + Sync>;

/// Process-local storage of the current access token.
///
/// Cheap to clone; all clones share one slot. Writes are last-write-wins and
/// visible to the next `get` from any task.
#[derive(Clone)]
pub struct TokenHolder {
    slot: Arc<watch::Sender<Option<AccessToken>>>,
    hook: Option<ReplaceHook>,
}

impl TokenHolder {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
            hook: None,
        }
    }

    /// Create a holder that reports every replacement to `hook`.
    pub fn with_hook(hook: ReplaceHook) -> Self {
        Self {
            hook: Some(hook),
            ..Self::new()
        }
    }

    pub fn get(&self) -> Option<AccessToken> {
        self.slot.borrow().clone()
    }

    pub fn set(&self, token: Option<AccessToken>) {
        self.slot.send_replace(token.clone());
        if let Some(hook) = &self.hook {
            hook(token.as_ref());
        }
    }

    /// Store `token` only if the holder still holds `expected`.
    ///
    /// Returns false, leaving the holder untouched, when another writer got
    /// there first.
    pub fn set_if(&self, expected: &Option<AccessToken>, token: Option<AccessToken>) -> bool {
        let replaced = self.slot.send_if_modified(|current| {
            if current == expected {
                *current = token.clone();
                true
            } else {
                false
            }
        });
        if replaced {
            if let Some(hook) = &self.hook {
                hook(token.as_ref());
            }
        }
        replaced
    }

    /// Observe replacements without taking part in construction.
    pub fn subscribe(&self) -> watch::Receiver<Option<AccessToken>> {
        self.slot.subscribe()
    }
}

impl Default for TokenHolder {
    fn default() -> Self {
        Self::new()
    }
}
