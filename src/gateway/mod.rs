// Copyright 2025 Cowboy AI, LLC.

//! Remote collection gateway
//!
//! A gateway translates the five logical operations of one collection into
//! calls against the remote catalog API:
//!
//! | operation | call |
//! |---|---|
//! | create | `POST /<route>` |
//! | getAll | `GET /<route>` |
//! | getById | `GET /<route>/:id` |
//! | update | `PUT /<route>/:id` |
//! | delete | `DELETE /<route>/:id` |

mod http;
mod in_memory;

pub use http::HttpGateway;
pub use in_memory::InMemoryGateway;

use crate::entity::{normalize_name, CatalogEntity, CollectionKind, EntityId, Identified};
use crate::errors::CatalogResult;
use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

/// Key that lets the remote collapse repeated creates of the same record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Header carrying the key
    pub const HEADER: &'static str = "Idempotency-Key";

    /// Deterministic key for a record synthesized from a free-text reference
    ///
    /// References differing only in surrounding or repeated whitespace map
    /// to the same key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use catalog_cache::{CollectionKind, IdempotencyKey};
    ///
    /// let a = IdempotencyKey::for_reference(CollectionKind::Creators, "Jane  Doe");
    /// let b = IdempotencyKey::for_reference(CollectionKind::Creators, " Jane Doe ");
    /// let c = IdempotencyKey::for_reference(CollectionKind::Companies, "Jane Doe");
    /// assert_eq!(a, b);
    /// assert_ne!(a, c);
    /// ```
    pub fn for_reference(kind: CollectionKind, reference: &str) -> Self {
        let name = format!("catalog:{kind}:{}", normalize_name(reference));
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string())
    }

    /// Wrap a caller-provided key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as sent on the wire
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The five calls of one remote collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionGateway<E: CatalogEntity>: Send + Sync {
    /// `POST /<route>`; the body is the new record without an id
    async fn create(
        &self,
        record: &E,
        key: Option<IdempotencyKey>,
    ) -> CatalogResult<Identified<E>>;

    /// `GET /<route>`
    async fn get_all(&self) -> CatalogResult<Vec<Identified<E>>>;

    /// `GET /<route>/:id`
    async fn get_by_id(&self, id: &EntityId) -> CatalogResult<Identified<E>>;

    /// `PUT /<route>/:id`; the body is the patch
    async fn update(&self, id: &EntityId, patch: &E) -> CatalogResult<Identified<E>>;

    /// `DELETE /<route>/:id`; resolves to the deleted id
    async fn delete(&self, id: &EntityId) -> CatalogResult<EntityId>;
}
