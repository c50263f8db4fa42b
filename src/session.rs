// Copyright 2025 Cowboy AI, LLC.

//! Persisted current user
//!
//! An external sign-in flow persists the signed-in user as a small JSON
//! document. The cache only reads it, to authenticate gateway requests.

use crate::errors::{CatalogError, CatalogResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The signed-in user as persisted by the sign-in flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// Account name
    pub username: String,
    /// Bearer token issued at sign-in
    pub token: String,
    /// Token expiry, when the issuer set one
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CurrentUser {
    /// Read the persisted user from `path`
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Session(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Parse a persisted user document
    pub fn from_json(raw: &str) -> CatalogResult<Self> {
        serde_json::from_str(raw).map_err(|e| CatalogError::Session(e.to_string()))
    }

    /// True once `now` has reached the expiry
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Token to authenticate with at `now`, if it is still valid
    pub fn bearer_token(&self, now: DateTime<Utc>) -> Option<&str> {
        if self.is_expired(now) {
            debug!(username = %self.username, "persisted session has expired");
            return None;
        }
        Some(self.token.as_str())
    }
}
