// Copyright 2025 Cowboy AI, LLC.

//! Normalized collection store
//!
//! One [`CollectionState`] per entity type holds the records keyed by id,
//! the fetch/insertion order of those ids, and a secondary index from series
//! name to the ids of the records in that series. A [`CollectionReducer`]
//! folds operation messages into the next state; it never fails and ignores
//! messages it does not recognise.

use crate::entity::{normalize_name, CatalogEntity, EntityId, Identified};
use crate::errors::CatalogError;
use crate::operations::{MessageBody, Operation, OperationMessage, OperationTags, Payload, Phase};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

/// How a collection tracks outstanding requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingTracking {
    /// A single boolean: the first call to settle clears `loading` even if
    /// another call is still outstanding
    #[default]
    Flag,
    /// Count in-flight calls; `loading` holds while the count is non-zero
    InFlightCounter,
}

/// Ordered mapping from a derived key to the ids of records carrying it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecondaryIndex {
    buckets: IndexMap<String, Vec<EntityId>>,
}

impl SecondaryIndex {
    /// Append `id` to the bucket for `key`, creating the bucket if absent.
    /// An id already in the bucket is not added twice.
    pub fn insert(&mut self, key: &str, id: &EntityId) {
        let bucket = self.buckets.entry(key.to_string()).or_default();
        if !bucket.contains(id) {
            bucket.push(id.clone());
        }
    }

    /// Remove `id` from whichever buckets hold it; empty buckets are dropped
    pub fn remove_id(&mut self, id: &EntityId) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|member| member != id);
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }

    /// Ids filed under `key`, in insertion order
    pub fn get(&self, key: &str) -> &[EntityId] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Keys in bucket creation order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Iterate over `(key, ids)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EntityId])> {
        self.buckets
            .iter()
            .map(|(key, ids)| (key.as_str(), ids.as_slice()))
    }

    /// Key of the bucket holding `id`
    pub fn key_of(&self, id: &EntityId) -> Option<&str> {
        self.buckets
            .iter()
            .find(|(_, ids)| ids.contains(id))
            .map(|(key, _)| key.as_str())
    }

    /// True when no bucket exists
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// A consistency rule a collection state broke
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// `all_ids` lists an id twice
    #[error("id {0} is listed more than once")]
    DuplicateId(EntityId),

    /// `all_ids` lists an id with no record
    #[error("id {0} has no record")]
    MissingRecord(EntityId),

    /// A record exists whose id is not listed
    #[error("record {0} is not listed in the id order")]
    UnlistedRecord(EntityId),

    /// The secondary index references an unknown id
    #[error("index key {key} references unknown id {id}")]
    DanglingIndexEntry {
        /// Bucket key
        key: String,
        /// Unknown id
        id: EntityId,
    },

    /// An id is filed twice under the same key
    #[error("index key {key} lists id {id} more than once")]
    DuplicateIndexEntry {
        /// Bucket key
        key: String,
        /// Repeated id
        id: EntityId,
    },
}

/// Normalized state of one collection
///
/// `CollectionState::default()` is the canonical empty collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionState<E> {
    all_ids: Vec<EntityId>,
    by_id: HashMap<EntityId, E>,
    by_series: SecondaryIndex,
    selected: Option<EntityId>,
    loading: bool,
    in_flight: u32,
    error: Option<CatalogError>,
}

impl<E> Default for CollectionState<E> {
    fn default() -> Self {
        Self {
            all_ids: Vec::new(),
            by_id: HashMap::new(),
            by_series: SecondaryIndex::default(),
            selected: None,
            loading: false,
            in_flight: 0,
            error: None,
        }
    }
}

impl<E: CatalogEntity> CollectionState<E> {
    /// Canonical state computed purely from a fetched set
    pub fn from_records(records: &[Identified<E>]) -> Self {
        let mut state = Self::default();
        for record in records {
            state.upsert(record);
        }
        state
    }

    /// Record by id
    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.by_id.get(id)
    }

    /// True when the collection holds `id`
    pub fn contains(&self, id: &EntityId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Ids in insertion/fetch order
    pub fn ids(&self) -> &[EntityId] {
        &self.all_ids
    }

    /// Records in insertion/fetch order
    pub fn records(&self) -> impl Iterator<Item = (&EntityId, &E)> {
        self.all_ids
            .iter()
            .filter_map(|id| self.by_id.get(id).map(|record| (id, record)))
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    /// True when the collection holds no record
    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }

    /// The series index
    pub fn index(&self) -> &SecondaryIndex {
        &self.by_series
    }

    /// Ids of the records in a series; `key` is matched after whitespace
    /// normalization
    pub fn ids_for_key(&self, key: &str) -> &[EntityId] {
        self.by_series.get(&normalize_name(key))
    }

    /// Records in a series, in index order
    pub fn records_for_key(&self, key: &str) -> Vec<(&EntityId, &E)> {
        self.ids_for_key(key)
            .iter()
            .filter_map(|id| self.by_id.get(id).map(|record| (id, record)))
            .collect()
    }

    /// Id of the most recently fetched-by-id record
    pub fn selected(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    /// The selected record, when it is also part of the collection
    pub fn selected_record(&self) -> Option<&E> {
        self.selected.as_ref().and_then(|id| self.by_id.get(id))
    }

    /// True while a request is considered outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Outstanding requests (always 0 under [`LoadingTracking::Flag`])
    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    /// Last failure
    pub fn error(&self) -> Option<&CatalogError> {
        self.error.as_ref()
    }

    /// Display names of every record
    pub fn display_names(&self) -> HashSet<String> {
        self.by_id.values().filter_map(E::display_name).collect()
    }

    /// Id of the first record (in collection order) whose display name matches
    /// `name`, ignoring differences in whitespace
    pub fn find_by_display_name(&self, name: &str) -> Option<&EntityId> {
        let wanted = normalize_name(name);
        self.records()
            .find(|(_, record)| {
                record
                    .display_name()
                    .is_some_and(|display| normalize_name(&display) == wanted)
            })
            .map(|(id, _)| id)
    }

    /// Validate the bijection between ids and records and the containment
    /// of the secondary index
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut listed = HashSet::with_capacity(self.all_ids.len());
        for id in &self.all_ids {
            if !listed.insert(id) {
                return Err(InvariantViolation::DuplicateId(id.clone()));
            }
            if !self.by_id.contains_key(id) {
                return Err(InvariantViolation::MissingRecord(id.clone()));
            }
        }
        if let Some(id) = self.by_id.keys().find(|id| !listed.contains(id)) {
            return Err(InvariantViolation::UnlistedRecord(id.clone()));
        }
        for (key, ids) in self.by_series.iter() {
            let mut seen = HashSet::with_capacity(ids.len());
            for id in ids {
                if !listed.contains(id) {
                    return Err(InvariantViolation::DanglingIndexEntry {
                        key: key.to_string(),
                        id: id.clone(),
                    });
                }
                if !seen.insert(id) {
                    return Err(InvariantViolation::DuplicateIndexEntry {
                        key: key.to_string(),
                        id: id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Insert or replace a record, keeping the series index in step
    fn upsert(&mut self, record: &Identified<E>) {
        let id = &record.id;
        let new_key = record.record.series_key();
        match self.by_id.get(id) {
            Some(previous) => {
                if previous.series_key() != new_key {
                    self.by_series.remove_id(id);
                    if let Some(key) = &new_key {
                        self.by_series.insert(key, id);
                    }
                }
            }
            None => {
                self.all_ids.push(id.clone());
                if let Some(key) = &new_key {
                    self.by_series.insert(key, id);
                }
            }
        }
        self.by_id.insert(id.clone(), record.record.clone());
    }

    fn remove(&mut self, id: &EntityId) {
        self.all_ids.retain(|member| member != id);
        self.by_id.remove(id);
        self.by_series.remove_id(id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
    }

    fn start(&mut self, tracking: LoadingTracking) {
        if tracking == LoadingTracking::InFlightCounter {
            self.in_flight += 1;
        }
        self.loading = true;
    }

    fn settle(&mut self, tracking: LoadingTracking) {
        match tracking {
            LoadingTracking::Flag => self.loading = false,
            LoadingTracking::InFlightCounter => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.loading = self.in_flight > 0;
            }
        }
    }
}

/// Pure state transition for one collection
#[derive(Debug, Clone)]
pub struct CollectionReducer<E> {
    tags: OperationTags,
    tracking: LoadingTracking,
    _entity: std::marker::PhantomData<fn() -> E>,
}

impl<E: CatalogEntity> Default for CollectionReducer<E> {
    fn default() -> Self {
        Self::new(LoadingTracking::default())
    }
}

impl<E: CatalogEntity> CollectionReducer<E> {
    /// Reducer over the entity type's own tags
    pub fn new(tracking: LoadingTracking) -> Self {
        Self::with_tags(E::tags().clone(), tracking)
    }

    /// Reducer recognising a custom tag table
    pub fn with_tags(tags: OperationTags, tracking: LoadingTracking) -> Self {
        Self {
            tags,
            tracking,
            _entity: std::marker::PhantomData,
        }
    }

    /// How outstanding requests are tracked
    pub fn tracking(&self) -> LoadingTracking {
        self.tracking
    }

    /// Fold one message into the next state
    ///
    /// Messages with an unknown tag, or whose body does not fit the
    /// operation its tag names, leave the state unchanged.
    pub fn reduce(
        &self,
        mut state: CollectionState<E>,
        message: &OperationMessage<E>,
    ) -> CollectionState<E> {
        let Some((operation, phase)) = self.tags.resolve(&message.tag) else {
            return state;
        };

        match (operation, phase, &message.body) {
            (_, Phase::Request, MessageBody::Request) => {
                state.start(self.tracking);
                state
            }
            (_, Phase::Failure, MessageBody::Failure(error)) => {
                state.error = Some(error.clone());
                state.settle(self.tracking);
                state
            }
            (Operation::GetAll, Phase::Success, MessageBody::Success(Payload::Records(records))) => {
                let in_flight = state.in_flight;
                let mut next = CollectionState::from_records(records);
                next.in_flight = in_flight;
                next.settle(self.tracking);
                next
            }
            (Operation::Create, Phase::Success, MessageBody::Success(Payload::Record(record))) => {
                state.upsert(record);
                state.error = None;
                state.settle(self.tracking);
                state
            }
            (Operation::GetById, Phase::Success, MessageBody::Success(Payload::Record(record))) => {
                state.selected = Some(record.id.clone());
                state.error = None;
                state.settle(self.tracking);
                state
            }
            (Operation::Update, Phase::Success, MessageBody::Success(Payload::Record(record))) => {
                if state.contains(&record.id) {
                    state.upsert(record);
                } else {
                    warn!(
                        collection = %E::KIND,
                        id = %record.id,
                        "update succeeded for a record the collection does not hold"
                    );
                }
                state.error = None;
                state.settle(self.tracking);
                state
            }
            (Operation::Delete, Phase::Success, MessageBody::Success(Payload::Deleted(id))) => {
                state.remove(id);
                state.error = None;
                state.settle(self.tracking);
                state
            }
            _ => {
                debug!(collection = %E::KIND, tag = %message.tag, "message body does not match its tag");
                state
            }
        }
    }
}
