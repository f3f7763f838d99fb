//! Typed records kept in the key-value store
//!
//! Two disjoint key namespaces hold the two record kinds:
//! - `oauth_sessions:<id>` holds a [`PendingAuthorization`] between sign-in
//!   and callback
//! - `tokens_by_session:<session id>` holds the [`TokenSession`] of a signed-in
//!   client

use crate::store::{KvStore, StoreError};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const PENDING_PREFIX: &str = "oauth_sessions";
const TOKENS_PREFIX: &str = "tokens_by_session";

/// Errors that can occur during record operations
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("Stored record is corrupt: {0}")]
    Corrupt(serde_json::Error),
}

/// State and PKCE verifier of an authorization request awaiting its callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub state: String,
    pub code_verifier: String,
}

/// Provider token material of a signed-in client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSession {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSession {
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            refresh_token: None,
            expires_at: None,
            scope: None,
        }
    }
}

/// Typed accessors over a [`KvStore`].
///
/// Nothing is cached in-process: each call is a fresh store round-trip.
#[derive(Clone)]
pub struct RecordStore {
    store: Arc<dyn KvStore>,
    pending_ttl: Duration,
    session_ttl: Duration,
}

impl RecordStore {
    /// Create a record store. Pending authorizations expire after
    /// `pending_ttl`, token sessions after `session_ttl`.
    pub fn new(store: Arc<dyn KvStore>, pending_ttl: Duration, session_ttl: Duration) -> Self {
        Self {
            store,
            pending_ttl,
            session_ttl,
        }
    }

    /// Underlying store handle
    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub async fn put_pending_authorization(
        &self,
        id: &str,
        record: &PendingAuthorization,
    ) -> Result<(), RecordError> {
        self.put(&key(PENDING_PREFIX, id), record, self.pending_ttl)
            .await?;
        debug!("Stored pending authorization, expires in {}s", self.pending_ttl.as_secs());
        Ok(())
    }

    /// Read and delete a pending authorization. Returns `None` once it has
    /// been taken or has expired, so each record is redeemable at most once.
    pub async fn take_pending_authorization(
        &self,
        id: &str,
    ) -> Result<Option<PendingAuthorization>, RecordError> {
        let raw = self.store.take(&key(PENDING_PREFIX, id)).await?;
        decode(raw)
    }

    pub async fn put_token_session(
        &self,
        session_id: &str,
        record: &TokenSession,
    ) -> Result<(), RecordError> {
        self.put(&key(TOKENS_PREFIX, session_id), record, self.session_ttl)
            .await
    }

    pub async fn get_token_session(
        &self,
        session_id: &str,
    ) -> Result<Option<TokenSession>, RecordError> {
        let raw = self.store.get(&key(TOKENS_PREFIX, session_id)).await?;
        decode(raw)
    }

    /// Remove a token session. Removing an unknown session succeeds.
    pub async fn delete_token_session(&self, session_id: &str) -> Result<(), RecordError> {
        self.store.delete(&key(TOKENS_PREFIX, session_id)).await?;
        Ok(())
    }

    async fn put<T: Serialize>(
        &self,
        key: &str,
        record: &T,
        ttl: Duration,
    ) -> Result<(), RecordError> {
        let serialized = serde_json::to_string(record).map_err(RecordError::Serialization)?;
        self.store.set(key, serialized, Some(ttl)).await?;
        Ok(())
    }
}

fn key(prefix: &str, id: &str) -> String {
    format!("{prefix}:{id}")
}

fn decode<T: DeserializeOwned>(raw: Option<String>) -> Result<Option<T>, RecordError> {
    raw.map(|value| serde_json::from_str(&value).map_err(RecordError::Corrupt))
        .transpose()
}
