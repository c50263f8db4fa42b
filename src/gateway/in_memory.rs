// Copyright 2025 Cowboy AI, LLC.

//! Process-local gateway for tests and offline tooling

use super::{CollectionGateway, IdempotencyKey};
use crate::entity::{CatalogEntity, EntityId, Identified};
use crate::errors::{CatalogError, CatalogResult};
use crate::operations::Operation;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

struct Documents<E> {
    records: IndexMap<EntityId, E>,
    keys: HashMap<IdempotencyKey, EntityId>,
    next_id: u64,
    failure: Option<CatalogError>,
    calls: Vec<Operation>,
}

/// In-memory document store speaking the gateway contract
///
/// Ids are assigned sequentially as `<prefix><n>`, continuing after the
/// highest seeded id of that shape. A create carrying an
/// idempotency key that was already used returns the record created the
/// first time. A gated gateway parks every call until [`release`] hands out
/// a permit, which lets tests hold several calls in flight at once.
///
/// [`release`]: InMemoryGateway::release
pub struct InMemoryGateway<E> {
    prefix: String,
    documents: Arc<Mutex<Documents<E>>>,
    gate: Option<Arc<Semaphore>>,
}

impl<E> Clone for InMemoryGateway<E> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            documents: Arc::clone(&self.documents),
            gate: self.gate.clone(),
        }
    }
}

impl<E: CatalogEntity> InMemoryGateway<E> {
    /// Empty store assigning ids `<prefix>1`, `<prefix>2`, ...
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            documents: Arc::new(Mutex::new(Documents {
                records: IndexMap::new(),
                keys: HashMap::new(),
                next_id: 1,
                failure: None,
                calls: Vec::new(),
            })),
            gate: None,
        }
    }

    /// Store whose calls wait for [`release`](Self::release)
    pub fn gated(prefix: impl Into<String>) -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new(prefix)
        }
    }

    /// Seed existing documents; later creates are numbered past the highest
    /// seeded `<prefix><n>` id
    pub fn with_records(self, records: impl IntoIterator<Item = Identified<E>>) -> Self {
        {
            let mut documents = self.lock();
            for record in records {
                let seeded = record
                    .id
                    .as_str()
                    .strip_prefix(self.prefix.as_str())
                    .and_then(|n| n.parse::<u64>().ok());
                if let Some(n) = seeded {
                    documents.next_id = documents.next_id.max(n.saturating_add(1));
                }
                documents.records.insert(record.id, record.record);
            }
        }
        self
    }

    /// Let `calls` parked calls proceed
    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    /// Make every following call fail with `error` (None to recover)
    pub fn fail_with(&self, error: Option<CatalogError>) {
        self.lock().failure = error;
    }

    /// Calls received so far, in arrival order
    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    /// Number of create calls received
    pub fn create_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|op| **op == Operation::Create)
            .count()
    }

    /// Stored documents, in creation order
    pub fn records(&self) -> Vec<Identified<E>> {
        self.lock()
            .records
            .iter()
            .map(|(id, record)| Identified::new(id.clone(), record.clone()))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Documents<E>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Log the call, wait for the gate, then report any configured failure
    async fn enter(&self, operation: Operation) -> CatalogResult<()> {
        self.lock().calls.push(operation);
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| CatalogError::transport(e.to_string()))?;
            permit.forget();
        }
        match &self.lock().failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn not_found(id: &EntityId) -> CatalogError {
        CatalogError::status(404, format!("{} {id} not found", E::KIND))
    }
}

#[async_trait]
impl<E: CatalogEntity> CollectionGateway<E> for InMemoryGateway<E> {
    async fn create(
        &self,
        record: &E,
        key: Option<IdempotencyKey>,
    ) -> CatalogResult<Identified<E>> {
        self.enter(Operation::Create).await?;
        let mut documents = self.lock();
        if let Some(existing) = key.as_ref().and_then(|key| documents.keys.get(key)).cloned() {
            if let Some(stored) = documents.records.get(&existing) {
                return Ok(Identified::new(existing, stored.clone()));
            }
        }
        let id = EntityId::new(format!("{}{}", self.prefix, documents.next_id));
        documents.next_id += 1;
        documents.records.insert(id.clone(), record.clone());
        if let Some(key) = key {
            documents.keys.insert(key, id.clone());
        }
        Ok(Identified::new(id, record.clone()))
    }

    async fn get_all(&self) -> CatalogResult<Vec<Identified<E>>> {
        self.enter(Operation::GetAll).await?;
        Ok(self.records())
    }

    async fn get_by_id(&self, id: &EntityId) -> CatalogResult<Identified<E>> {
        self.enter(Operation::GetById).await?;
        self.lock()
            .records
            .get(id)
            .map(|record| Identified::new(id.clone(), record.clone()))
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update(&self, id: &EntityId, patch: &E) -> CatalogResult<Identified<E>> {
        self.enter(Operation::Update).await?;
        let mut documents = self.lock();
        match documents.records.get_mut(id) {
            Some(record) => {
                *record = patch.clone();
                Ok(Identified::new(id.clone(), patch.clone()))
            }
            None => Err(Self::not_found(id)),
        }
    }

    async fn delete(&self, id: &EntityId) -> CatalogResult<EntityId> {
        self.enter(Operation::Delete).await?;
        self.lock()
            .records
            .shift_remove(id)
            .map(|_| id.clone())
            .ok_or_else(|| Self::not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Company;
    use crate::entity::CollectionKind;
    use pretty_assertions::assert_eq;

    fn company(name: &str) -> Company {
        Company {
            name: name.into(),
            works: vec![],
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let gateway = InMemoryGateway::<Company>::new("c");
        let first = gateway.create(&company("A"), None).await.unwrap();
        let second = gateway.create(&company("B"), None).await.unwrap();
        assert_eq!(first.id, EntityId::new("c1"));
        assert_eq!(second.id, EntityId::new("c2"));
        assert_eq!(gateway.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn creates_continue_past_highest_seeded_id() {
        let gateway = InMemoryGateway::<Company>::new("c")
            .with_records([Identified::new("c5", company("Valve"))]);
        let created = gateway.create(&company("Bungie"), None).await.unwrap();
        assert_eq!(created.id, EntityId::new("c6"));

        let gateway = InMemoryGateway::<Company>::new("c").with_records([
            Identified::new("c2", company("Valve")),
            Identified::new("legacy", company("Sierra")),
        ]);
        let created = gateway.create(&company("Bungie"), None).await.unwrap();
        assert_eq!(created.id, EntityId::new("c3"));
        let valve = gateway.get_by_id(&EntityId::new("c2")).await.unwrap();
        assert_eq!(valve.record.name, "Valve");
        assert_eq!(gateway.records().len(), 3);
    }

    #[tokio::test]
    async fn idempotency_key_collapses_repeats() {
        let gateway = InMemoryGateway::<Company>::new("c");
        let key = IdempotencyKey::for_reference(CollectionKind::Companies, "Bungie");
        let first = gateway.create(&company("Bungie"), Some(key.clone())).await.unwrap();
        let second = gateway.create(&company("Bungie"), Some(key)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(gateway.records().len(), 1);
        assert_eq!(gateway.create_calls(), 2);
    }

    #[tokio::test]
    async fn missing_records_are_404() {
        let gateway = InMemoryGateway::<Company>::new("c");
        let err = gateway.delete(&EntityId::new("c9")).await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn configured_failure_applies_to_every_call() {
        let gateway = InMemoryGateway::<Company>::new("c");
        gateway.fail_with(Some(CatalogError::transport("offline")));
        assert!(gateway.get_all().await.unwrap_err().is_transport());
        gateway.fail_with(None);
        assert!(gateway.get_all().await.is_ok());
    }

    #[test]
    fn gated_calls_wait_for_release() {
        let gateway = InMemoryGateway::<Company>::gated("c");
        let mut call = tokio_test::task::spawn(gateway.get_all());
        assert!(call.poll().is_pending());
        gateway.release(1);
        assert!(call.is_woken());
        assert!(matches!(call.poll(), std::task::Poll::Ready(Ok(_))));
    }
}
