// Copyright 2025 Cowboy AI, LLC.

//! Collection commands
//!
//! Each command announces itself with a request message the moment it is
//! invoked, awaits the gateway, and then reports the outcome as a success or
//! failure message. Commands never return an error: a failure is only ever
//! visible through the failure message (and a `None` result). There are no
//! retries and no local timeout.

use crate::dispatch::Dispatcher;
use crate::entity::{CatalogEntity, EntityId, Identified};
use crate::errors::CatalogResult;
use crate::gateway::{CollectionGateway, IdempotencyKey};
use crate::operations::{Descriptor, OperationDescriptors, OperationMessage, Payload};
use std::future::Future;
use tracing::{debug, warn};

/// The five commands of one collection
pub struct CollectionCommands<E, G> {
    gateway: G,
    descriptors: OperationDescriptors<E>,
}

impl<E, G> CollectionCommands<E, G>
where
    E: CatalogEntity,
    G: CollectionGateway<E>,
{
    /// Commands over the entity type's own tags
    pub fn new(gateway: G) -> Self {
        Self::with_descriptors(gateway, OperationDescriptors::for_entity())
    }

    /// Commands emitting custom descriptors
    pub fn with_descriptors(gateway: G, descriptors: OperationDescriptors<E>) -> Self {
        Self {
            gateway,
            descriptors,
        }
    }

    /// The underlying gateway
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The descriptors messages are built from
    pub fn descriptors(&self) -> &OperationDescriptors<E> {
        &self.descriptors
    }

    /// Create a record
    pub fn create<'a, D>(
        &'a self,
        record: &'a E,
        sink: &'a D,
    ) -> impl Future<Output = Option<Identified<E>>> + Send + 'a
    where
        D: Dispatcher<OperationMessage<E>> + ?Sized,
    {
        self.create_with_key(record, None, sink)
    }

    /// Create a record, letting the remote collapse repeats of `key`
    pub fn create_with_key<'a, D>(
        &'a self,
        record: &'a E,
        key: Option<IdempotencyKey>,
        sink: &'a D,
    ) -> impl Future<Output = Option<Identified<E>>> + Send + 'a
    where
        D: Dispatcher<OperationMessage<E>> + ?Sized,
    {
        let descriptor = &self.descriptors.create;
        self.begin(descriptor, sink);
        async move {
            let result = self.gateway.create(record, key).await;
            self.finish(descriptor, result, sink)
        }
    }

    /// Fetch the whole collection
    pub fn get_all<'a, D>(
        &'a self,
        sink: &'a D,
    ) -> impl Future<Output = Option<Vec<Identified<E>>>> + Send + 'a
    where
        D: Dispatcher<OperationMessage<E>> + ?Sized,
    {
        let descriptor = &self.descriptors.get_all;
        self.begin(descriptor, sink);
        async move {
            let result = self.gateway.get_all().await;
            self.finish(descriptor, result, sink)
        }
    }

    /// Fetch one record
    pub fn get_by_id<'a, D>(
        &'a self,
        id: &'a EntityId,
        sink: &'a D,
    ) -> impl Future<Output = Option<Identified<E>>> + Send + 'a
    where
        D: Dispatcher<OperationMessage<E>> + ?Sized,
    {
        let descriptor = &self.descriptors.get_by_id;
        self.begin(descriptor, sink);
        async move {
            let result = self.gateway.get_by_id(id).await;
            self.finish(descriptor, result, sink)
        }
    }

    /// Replace a record's fields
    pub fn update<'a, D>(
        &'a self,
        id: &'a EntityId,
        patch: &'a E,
        sink: &'a D,
    ) -> impl Future<Output = Option<Identified<E>>> + Send + 'a
    where
        D: Dispatcher<OperationMessage<E>> + ?Sized,
    {
        let descriptor = &self.descriptors.update;
        self.begin(descriptor, sink);
        async move {
            let result = self.gateway.update(id, patch).await;
            self.finish(descriptor, result, sink)
        }
    }

    /// Remove a record
    pub fn delete<'a, D>(
        &'a self,
        id: &'a EntityId,
        sink: &'a D,
    ) -> impl Future<Output = Option<EntityId>> + Send + 'a
    where
        D: Dispatcher<OperationMessage<E>> + ?Sized,
    {
        let descriptor = &self.descriptors.delete;
        self.begin(descriptor, sink);
        async move {
            let result = self.gateway.delete(id).await;
            self.finish(descriptor, result, sink)
        }
    }

    fn begin<D>(&self, descriptor: &Descriptor<E>, sink: &D)
    where
        D: Dispatcher<OperationMessage<E>> + ?Sized,
    {
        debug!(collection = %E::KIND, operation = %descriptor.operation(), "request started");
        sink.dispatch(descriptor.request());
    }

    fn finish<T, D>(&self, descriptor: &Descriptor<E>, result: CatalogResult<T>, sink: &D) -> Option<T>
    where
        T: Clone + Into<Payload<E>>,
        D: Dispatcher<OperationMessage<E>> + ?Sized,
    {
        match result {
            Ok(payload) => {
                sink.dispatch(descriptor.success(payload.clone()));
                Some(payload)
            }
            Err(error) => {
                warn!(
                    collection = %E::KIND,
                    operation = %descriptor.operation(),
                    %error,
                    "request failed"
                );
                sink.dispatch(descriptor.failure(error));
                None
            }
        }
    }
}
