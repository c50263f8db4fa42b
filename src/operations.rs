// Copyright 2025 Cowboy AI, LLC.

//! Operation descriptors
//!
//! Every collection speaks the same five operations, each in three phases.
//! A collection names those fifteen messages with its own tags; the
//! descriptors built from a tag table are pure message constructors.

use crate::entity::{CatalogEntity, EntityId, Identified};
use crate::errors::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// The five logical CRUD operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Create a record
    Create,
    /// Fetch the whole collection
    GetAll,
    /// Fetch one record
    GetById,
    /// Replace a record's fields
    Update,
    /// Remove a record
    Delete,
}

impl Operation {
    /// All operations
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::GetAll,
        Operation::GetById,
        Operation::Update,
        Operation::Delete,
    ];

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::GetAll => "getAll",
            Operation::GetById => "getById",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle phase of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The call was issued
    Request,
    /// The call resolved with a payload
    Success,
    /// The call failed
    Failure,
}

impl Phase {
    /// All phases
    pub const ALL: [Phase; 3] = [Phase::Request, Phase::Success, Phase::Failure];

    fn suffix(&self) -> &'static str {
        match self {
            Phase::Request => "REQUEST",
            Phase::Success => "SUCCESS",
            Phase::Failure => "FAILURE",
        }
    }
}

/// Table mapping each (operation, phase) pair of one collection to a unique tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationTags {
    tags: HashMap<(Operation, Phase), String>,
    lookup: HashMap<String, (Operation, Phase)>,
}

impl OperationTags {
    /// Build a table from an explicit mapping
    ///
    /// The mapping must name all fifteen messages with non-empty, distinct tags.
    pub fn from_map(tags: HashMap<(Operation, Phase), String>) -> CatalogResult<Self> {
        let mut lookup = HashMap::with_capacity(tags.len());
        for operation in Operation::ALL {
            for phase in Phase::ALL {
                let tag = tags.get(&(operation, phase)).ok_or_else(|| {
                    CatalogError::InvalidTags(format!("missing tag for {operation} {phase:?}"))
                })?;
                if tag.is_empty() {
                    return Err(CatalogError::InvalidTags(format!(
                        "empty tag for {operation} {phase:?}"
                    )));
                }
                if lookup.insert(tag.clone(), (operation, phase)).is_some() {
                    return Err(CatalogError::InvalidTags(format!("duplicate tag {tag}")));
                }
            }
        }
        Ok(Self { tags, lookup })
    }

    /// Conventional table: `CREATE_BOOK_REQUEST`, `FETCH_BOOKS_SUCCESS`,
    /// `GET_BOOK_FAILURE`, `UPDATE_BOOK_REQUEST`, `DELETE_BOOK_SUCCESS`, ...
    ///
    /// # Examples
    ///
    /// ```rust
    /// use catalog_cache::operations::{Operation, OperationTags, Phase};
    ///
    /// let tags = OperationTags::conventional("SERIES", "SERIES");
    /// assert_eq!(tags.tag(Operation::GetAll, Phase::Success), "FETCH_SERIES_SUCCESS");
    /// assert_eq!(tags.tag(Operation::GetById, Phase::Success), "GET_SERIES_SUCCESS");
    /// assert_eq!(
    ///     tags.resolve("DELETE_SERIES_FAILURE"),
    ///     Some((Operation::Delete, Phase::Failure))
    /// );
    /// ```
    pub fn conventional(singular: &str, plural: &str) -> Self {
        let mut tags = HashMap::with_capacity(15);
        let mut lookup = HashMap::with_capacity(15);
        for operation in Operation::ALL {
            let stem = match operation {
                Operation::Create => format!("CREATE_{singular}"),
                Operation::GetAll => format!("FETCH_{plural}"),
                Operation::GetById => format!("GET_{singular}"),
                Operation::Update => format!("UPDATE_{singular}"),
                Operation::Delete => format!("DELETE_{singular}"),
            };
            for phase in Phase::ALL {
                let tag = format!("{stem}_{}", phase.suffix());
                lookup.insert(tag.clone(), (operation, phase));
                tags.insert((operation, phase), tag);
            }
        }
        Self { tags, lookup }
    }

    /// Tag of one message
    pub fn tag(&self, operation: Operation, phase: Phase) -> &str {
        // Both constructors guarantee every pair is present.
        self.tags
            .get(&(operation, phase))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Which message a tag names, if it belongs to this table
    pub fn resolve(&self, tag: &str) -> Option<(Operation, Phase)> {
        self.lookup.get(tag).copied()
    }
}

/// Payload of a success message
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<E> {
    /// A single record (create, getById, update)
    Record(Identified<E>),
    /// The whole collection (getAll)
    Records(Vec<Identified<E>>),
    /// The id of a deleted record (delete)
    Deleted(EntityId),
}

impl<E> From<Identified<E>> for Payload<E> {
    fn from(record: Identified<E>) -> Self {
        Payload::Record(record)
    }
}

impl<E> From<Vec<Identified<E>>> for Payload<E> {
    fn from(records: Vec<Identified<E>>) -> Self {
        Payload::Records(records)
    }
}

impl<E> From<EntityId> for Payload<E> {
    fn from(id: EntityId) -> Self {
        Payload::Deleted(id)
    }
}

/// Body of an operation message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody<E> {
    /// Request started
    Request,
    /// Request succeeded with a payload
    Success(Payload<E>),
    /// Request failed
    Failure(CatalogError),
}

/// Progress notification for one CRUD call
///
/// Messages carry no correlation token: two in-flight calls of the same
/// operation produce indistinguishable messages.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationMessage<E> {
    /// Tag naming the (operation, phase) pair
    pub tag: String,
    /// Phase-specific content
    pub body: MessageBody<E>,
}

impl<E> OperationMessage<E> {
    /// True for request-started messages
    pub fn is_request(&self) -> bool {
        matches!(self.body, MessageBody::Request)
    }

    /// True for failure messages
    pub fn is_failure(&self) -> bool {
        matches!(self.body, MessageBody::Failure(_))
    }
}

/// Message constructors for one operation
#[derive(Debug, Clone)]
pub struct Descriptor<E> {
    operation: Operation,
    request_tag: String,
    success_tag: String,
    failure_tag: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Descriptor<E> {
    fn new(tags: &OperationTags, operation: Operation) -> Self {
        Self {
            operation,
            request_tag: tags.tag(operation, Phase::Request).to_string(),
            success_tag: tags.tag(operation, Phase::Success).to_string(),
            failure_tag: tags.tag(operation, Phase::Failure).to_string(),
            _entity: PhantomData,
        }
    }

    /// The operation these constructors describe
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// `{ type: <request-tag> }`
    pub fn request(&self) -> OperationMessage<E> {
        OperationMessage {
            tag: self.request_tag.clone(),
            body: MessageBody::Request,
        }
    }

    /// `{ type: <success-tag>, payload }`
    pub fn success(&self, payload: impl Into<Payload<E>>) -> OperationMessage<E> {
        OperationMessage {
            tag: self.success_tag.clone(),
            body: MessageBody::Success(payload.into()),
        }
    }

    /// `{ type: <failure-tag>, error }`
    pub fn failure(&self, error: CatalogError) -> OperationMessage<E> {
        OperationMessage {
            tag: self.failure_tag.clone(),
            body: MessageBody::Failure(error),
        }
    }
}

/// The fifteen message constructors of one collection
#[derive(Debug, Clone)]
pub struct OperationDescriptors<E> {
    /// create
    pub create: Descriptor<E>,
    /// getAll
    pub get_all: Descriptor<E>,
    /// getById
    pub get_by_id: Descriptor<E>,
    /// update
    pub update: Descriptor<E>,
    /// delete
    pub delete: Descriptor<E>,
}

impl<E> OperationDescriptors<E> {
    /// Build the constructors from a tag table
    pub fn from_tags(tags: &OperationTags) -> Self {
        Self {
            create: Descriptor::new(tags, Operation::Create),
            get_all: Descriptor::new(tags, Operation::GetAll),
            get_by_id: Descriptor::new(tags, Operation::GetById),
            update: Descriptor::new(tags, Operation::Update),
            delete: Descriptor::new(tags, Operation::Delete),
        }
    }

    /// Constructors of one operation
    pub fn descriptor(&self, operation: Operation) -> &Descriptor<E> {
        match operation {
            Operation::Create => &self.create,
            Operation::GetAll => &self.get_all,
            Operation::GetById => &self.get_by_id,
            Operation::Update => &self.update,
            Operation::Delete => &self.delete,
        }
    }
}

impl<E: CatalogEntity> OperationDescriptors<E> {
    /// Constructors over the entity type's own tag table
    pub fn for_entity() -> Self {
        Self::from_tags(E::tags())
    }
}
