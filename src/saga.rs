// Copyright 2025 Cowboy AI, LLC.

//! Composite item submission
//!
//! Submitting an item form is a saga with the new item as its root and the
//! referenced creators, series and company as participants. The item is
//! created first; each participant is then ensured through its collection's
//! [`ConsistencyRouter`], seeded with the new item's id.
//!
//! Participants are not rolled back and do not fail the submission: a
//! participant whose create fails is visible in the [`SubmissionReport`] and
//! as a failure on its own collection, while the item stays created.

use crate::catalog::{Company, Creator, Series};
use crate::commands::CollectionCommands;
use crate::entity::{normalize_name, CollectionKind, EntityId, RelatedReferences};
use crate::gateway::CollectionGateway;
use crate::router::{ConsistencyRouter, RouteOutcome};
use crate::store::{Store, StoreSlice};
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{info, warn};

/// Outcome of ensuring one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagaStep {
    /// Collection the participant lives in
    pub collection: CollectionKind,
    /// Reference text as submitted
    pub reference: String,
    /// What the router did
    pub outcome: RouteOutcome,
}

/// Everything one submission did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Id of the created item; `None` when the item create failed and no
    /// participant was touched
    pub item: Option<EntityId>,
    /// Participant steps, creators first, then series, then company
    pub steps: Vec<SagaStep>,
}

impl SubmissionReport {
    /// True when the item itself was created
    pub fn is_submitted(&self) -> bool {
        self.item.is_some()
    }

    /// Participants that had to be created
    pub fn created(&self) -> impl Iterator<Item = &SagaStep> {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, RouteOutcome::Created(_)))
    }

    /// Participants whose create failed
    pub fn failed(&self) -> impl Iterator<Item = &SagaStep> {
        self.steps
            .iter()
            .filter(|step| step.outcome == RouteOutcome::CreateFailed)
    }
}

/// Routers of the three participant collections
pub struct RelatedRouters<GC, GS, GO> {
    /// Creators
    pub creators: ConsistencyRouter<Creator, GC>,
    /// Series
    pub series: ConsistencyRouter<Series, GS>,
    /// Companies
    pub companies: ConsistencyRouter<Company, GO>,
}

impl<GC, GS, GO> RelatedRouters<GC, GS, GO>
where
    GC: CollectionGateway<Creator>,
    GS: CollectionGateway<Series>,
    GO: CollectionGateway<Company>,
{
    /// Bundle three routers
    pub fn new(
        creators: ConsistencyRouter<Creator, GC>,
        series: ConsistencyRouter<Series, GS>,
        companies: ConsistencyRouter<Company, GO>,
    ) -> Self {
        Self {
            creators,
            series,
            companies,
        }
    }
}

/// Item submission workflow for one item collection
pub struct ItemSubmission<I, G> {
    items: CollectionCommands<I, G>,
}

impl<I, G> ItemSubmission<I, G>
where
    I: RelatedReferences + StoreSlice,
    G: CollectionGateway<I>,
{
    /// Workflow creating items through `items`
    pub fn new(items: CollectionCommands<I, G>) -> Self {
        Self { items }
    }

    /// The item collection's commands
    pub fn items(&self) -> &CollectionCommands<I, G> {
        &self.items
    }

    /// Create `item`, then ensure every participant it references
    ///
    /// Participants are looked up in the store state as it stands once the
    /// item is created. Repeated creator names within one item are ensured
    /// once.
    pub async fn submit<GC, GS, GO>(
        &self,
        item: &I,
        related: &RelatedRouters<GC, GS, GO>,
        store: &Store,
    ) -> SubmissionReport
    where
        GC: CollectionGateway<Creator>,
        GS: CollectionGateway<Series>,
        GO: CollectionGateway<Company>,
    {
        let Some(created) = self.items.create(item, store).await else {
            warn!(collection = %I::KIND, "item create failed; participants skipped");
            return SubmissionReport::default();
        };
        let origin = created.id;
        let snapshot = store.snapshot();

        let mut seen = HashSet::new();
        let creator_refs: Vec<&str> = item
            .creator_references()
            .into_iter()
            .filter(|reference| seen.insert(normalize_name(reference)))
            .collect();
        let series_ref = item.series_reference();
        let company_ref = item.company_reference();

        let creators = join_all(creator_refs.iter().map(|reference| {
            related
                .creators
                .ensure(&snapshot.creators, reference, &origin, store)
        }));
        let series = async {
            match series_ref {
                Some(reference) => Some(
                    related
                        .series
                        .ensure(&snapshot.series, reference, &origin, store)
                        .await,
                ),
                None => None,
            }
        };
        let company = async {
            match company_ref {
                Some(reference) => Some(
                    related
                        .companies
                        .ensure(&snapshot.companies, reference, &origin, store)
                        .await,
                ),
                None => None,
            }
        };
        let (creators, series, company) = futures::join!(creators, series, company);

        let mut steps: Vec<SagaStep> = creator_refs
            .iter()
            .zip(creators)
            .map(|(reference, outcome)| step(CollectionKind::Creators, reference, outcome))
            .collect();
        if let (Some(reference), Some(outcome)) = (series_ref, series) {
            steps.push(step(CollectionKind::Series, reference, outcome));
        }
        if let (Some(reference), Some(outcome)) = (company_ref, company) {
            steps.push(step(CollectionKind::Companies, reference, outcome));
        }

        let report = SubmissionReport {
            item: Some(origin),
            steps,
        };
        info!(
            collection = %I::KIND,
            item = ?report.item,
            created = report.created().count(),
            failed = report.failed().count(),
            "item submitted"
        );
        report
    }
}

fn step(collection: CollectionKind, reference: &str, outcome: RouteOutcome) -> SagaStep {
    SagaStep {
        collection,
        reference: reference.to_string(),
        outcome,
    }
}
