// Copyright 2025 Cowboy AI, LLC.

//! Entity identity and the capability interface every cached collection
//! is instantiated over

use crate::operations::OperationTags;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the remote document store
///
/// Identifiers are opaque: the cache never parses or generates them, it only
/// compares and orders them.
///
/// # Examples
///
/// ```rust
/// use catalog_cache::EntityId;
///
/// let id = EntityId::new("c1");
/// assert_eq!(id.as_str(), "c1");
/// assert_eq!(id.to_string(), "c1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a remote identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A record together with the identifier the remote assigned to it
///
/// On the wire the record's fields sit next to the identifier, which the
/// document store names `_id`; `id` is accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identified<E> {
    /// Remote identifier
    #[serde(alias = "_id")]
    pub id: EntityId,
    /// Record fields, identifier excluded
    #[serde(flatten)]
    pub record: E,
}

impl<E> Identified<E> {
    /// Pair a record with its identifier
    pub fn new(id: impl Into<EntityId>, record: E) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }
}

/// The six collections of the media catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// Printed and electronic books
    Books,
    /// Film and music discs
    Discs,
    /// Video and tabletop games
    Games,
    /// Named series grouping items
    Series,
    /// Authors, directors, artists
    Creators,
    /// Publishers, studios, developers
    Companies,
}

impl CollectionKind {
    /// Every collection, in root-state order
    pub const ALL: [CollectionKind; 6] = [
        CollectionKind::Books,
        CollectionKind::Discs,
        CollectionKind::Games,
        CollectionKind::Series,
        CollectionKind::Creators,
        CollectionKind::Companies,
    ];

    /// Path segment of the collection's REST route
    pub fn route(&self) -> &'static str {
        self.as_str()
    }

    /// Lowercase collection name
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Books => "books",
            CollectionKind::Discs => "discs",
            CollectionKind::Games => "games",
            CollectionKind::Series => "series",
            CollectionKind::Creators => "creators",
            CollectionKind::Companies => "companies",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability interface a record type provides to be cached
///
/// Identifier extraction is structural (see [`Identified`]); the remaining
/// capabilities are optional and default to "not supported".
pub trait CatalogEntity:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Which collection this record type lives in
    const KIND: CollectionKind;

    /// Operation tags for this collection's messages
    fn tags() -> &'static OperationTags;

    /// Derived key for the secondary index: the normalized series name,
    /// absent when blank
    fn series_key(&self) -> Option<String> {
        None
    }

    /// Human-readable name a composite form would refer to this record by
    fn display_name(&self) -> Option<String> {
        None
    }
}

/// Collapse whitespace runs to single spaces and trim the ends
///
/// Free-text names typed into forms, the names synthesized from them and the
/// series index keys all go through this, so `"Frank  Herbert "` and
/// `"Frank Herbert"` refer to the same record.
///
/// # Examples
///
/// ```rust
/// use catalog_cache::normalize_name;
///
/// assert_eq!(normalize_name("  Frank \t Herbert "), "Frank Herbert");
/// assert_eq!(normalize_name("   "), "");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Records that can be synthesized from a free-text reference
pub trait Synthesize: CatalogEntity {
    /// Build the minimal record named by `reference`, seeded with the item
    /// that referenced it
    fn synthesize(reference: &str, origin: &EntityId) -> Self;
}

/// Items whose forms name related records by free text
pub trait RelatedReferences: CatalogEntity {
    /// Creator names, in form order
    fn creator_references(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Series name
    fn series_reference(&self) -> Option<&str> {
        None
    }

    /// Publisher, studio or developer name
    fn company_reference(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Label {
        name: String,
    }

    #[test]
    fn identified_accepts_document_store_key() {
        let parsed: Identified<Label> =
            serde_json::from_value(json!({ "_id": "c1", "name": "Test Co", "__v": 0 })).unwrap();
        assert_eq!(parsed, Identified::new("c1", Label { name: "Test Co".into() }));

        let parsed: Identified<Label> =
            serde_json::from_value(json!({ "id": "c2", "name": "Other" })).unwrap();
        assert_eq!(parsed.id, EntityId::new("c2"));
    }

    #[test]
    fn identified_serializes_flat() {
        let value = serde_json::to_value(Identified::new("c1", Label { name: "A".into() })).unwrap();
        assert_eq!(value, json!({ "id": "c1", "name": "A" }));
    }

    #[test]
    fn collection_routes() {
        let routes: Vec<_> = CollectionKind::ALL.iter().map(|k| k.route()).collect();
        assert_eq!(
            routes,
            vec!["books", "discs", "games", "series", "creators", "companies"]
        );
    }
}
