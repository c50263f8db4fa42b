// Copyright 2025 Cowboy AI, LLC.

//! Cross-entity consistency
//!
//! Item forms refer to creators, series and companies by name. Before such a
//! reference is relied upon, the router looks the name up in the related
//! collection's current state and, when no record carries that display name,
//! synthesizes a minimal record and creates it.
//!
//! The remote offers no transaction across collections. Under
//! [`RouterPolicy::CheckThenCreate`] two lookups of the same new name that
//! race before the first create resolves both miss and both create, leaving
//! a duplicate. [`RouterPolicy::Idempotent`] closes that window: racing
//! lookups of one name share a single create, and the create carries a
//! deterministic idempotency key so a retried create collapses remotely.

use crate::collection::CollectionState;
use crate::commands::CollectionCommands;
use crate::dispatch::Dispatcher;
use crate::entity::{EntityId, Identified, Synthesize};
use crate::gateway::{CollectionGateway, IdempotencyKey};
use crate::operations::OperationMessage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// How the router guards check-then-create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterPolicy {
    /// Look up, create on a miss; racing lookups may duplicate
    #[default]
    CheckThenCreate,
    /// Share in-flight creates per name and send an idempotency key
    Idempotent,
}

/// What the router did for one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A record with that display name already exists
    Existing(EntityId),
    /// A record was synthesized and created
    Created(EntityId),
    /// Another lookup of the same name is already creating it
    InFlight,
    /// The create was issued and failed; the failure went to the related
    /// collection's store
    CreateFailed,
    /// The reference was empty
    Blank,
}

impl RouteOutcome {
    /// Id of the related record, when known
    pub fn id(&self) -> Option<&EntityId> {
        match self {
            RouteOutcome::Existing(id) | RouteOutcome::Created(id) => Some(id),
            _ => None,
        }
    }

    /// True when the router issued a create
    pub fn issued_create(&self) -> bool {
        matches!(self, RouteOutcome::Created(_) | RouteOutcome::CreateFailed)
    }
}

/// Ensures referenced entities of one related collection exist
pub struct ConsistencyRouter<R, G> {
    commands: CollectionCommands<R, G>,
    policy: RouterPolicy,
    in_flight: Mutex<HashSet<IdempotencyKey>>,
}

/// Releases an in-flight reservation when the create settles or is dropped
struct Reservation<'a> {
    in_flight: &'a Mutex<HashSet<IdempotencyKey>>,
    key: IdempotencyKey,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl<R, G> ConsistencyRouter<R, G>
where
    R: Synthesize,
    G: CollectionGateway<R>,
{
    /// Router creating through `commands`
    pub fn new(commands: CollectionCommands<R, G>, policy: RouterPolicy) -> Self {
        if policy == RouterPolicy::Idempotent {
            info!(collection = %R::KIND, "router de-duplicates in-flight creates and sends idempotency keys");
        }
        Self {
            commands,
            policy,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The policy in force
    pub fn policy(&self) -> RouterPolicy {
        self.policy
    }

    /// The related collection's commands
    pub fn commands(&self) -> &CollectionCommands<R, G> {
        &self.commands
    }

    /// Make sure a record named `reference` exists in the related collection
    ///
    /// `snapshot` is the related collection's state as the caller last saw
    /// it; the lookup is not repeated after the create is issued.
    pub async fn ensure<D>(
        &self,
        snapshot: &CollectionState<R>,
        reference: &str,
        origin: &EntityId,
        sink: &D,
    ) -> RouteOutcome
    where
        D: Dispatcher<OperationMessage<R>> + ?Sized,
    {
        if reference.trim().is_empty() {
            return RouteOutcome::Blank;
        }
        if let Some(id) = snapshot.find_by_display_name(reference) {
            debug!(collection = %R::KIND, reference, %id, "reference already exists");
            return RouteOutcome::Existing(id.clone());
        }

        let record = R::synthesize(reference, origin);
        match self.policy {
            RouterPolicy::CheckThenCreate => {
                info!(collection = %R::KIND, reference, %origin, "creating referenced record");
                Self::created(self.commands.create(&record, sink).await)
            }
            RouterPolicy::Idempotent => {
                let key = IdempotencyKey::for_reference(R::KIND, reference);
                let Some(_reservation) = self.reserve(&key) else {
                    debug!(collection = %R::KIND, reference, "create already in flight");
                    return RouteOutcome::InFlight;
                };
                info!(collection = %R::KIND, reference, %origin, %key, "creating referenced record");
                Self::created(
                    self.commands
                        .create_with_key(&record, Some(key.clone()), sink)
                        .await,
                )
            }
        }
    }

    fn reserve(&self, key: &IdempotencyKey) -> Option<Reservation<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.insert(key.clone()).then(|| Reservation {
            in_flight: &self.in_flight,
            key: key.clone(),
        })
    }

    fn created(result: Option<Identified<R>>) -> RouteOutcome {
        match result {
            Some(created) => RouteOutcome::Created(created.id),
            None => RouteOutcome::CreateFailed,
        }
    }
}
