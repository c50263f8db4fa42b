//! # Catalog Cache
//!
//! Client-side normalized entity cache for a personal media catalog (books,
//! discs, games, series, creators and companies) backed by a REST API.
//!
//! The crate provides:
//! - **Operations**: per-collection tag tables and the request/success/failure
//!   message constructors built from them
//! - **Commands**: asynchronous CRUD commands that report their lifecycle as
//!   messages through a [`Dispatcher`]
//! - **Collections**: a pure reducer keeping an id-keyed store, its order and
//!   a series index consistent under every message
//! - **Router**: ensures records referenced by name from item forms exist,
//!   creating them when they do not
//! - **Store**: the root state tree with reset and change subscription
//!
//! ## Design Principles
//!
//! 1. **Single mutation path**: state changes only by dispatching messages
//! 2. **Pure reduction**: reducers never fail and ignore unknown messages
//! 3. **Failures are data**: commands report errors as messages, not `Err`
//! 4. **Explicit construction**: stores and gateways are passed, never global

#![warn(missing_docs)]

pub mod catalog;
pub mod collection;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod entity;
pub mod errors;
pub mod gateway;
pub mod operations;
pub mod router;
pub mod saga;
pub mod session;
pub mod store;

pub use collection::{CollectionReducer, CollectionState, InvariantViolation, LoadingTracking, SecondaryIndex};
pub use commands::CollectionCommands;
pub use config::{CatalogConfig, GatewayConfig, StoreConfig};
pub use dispatch::{Dispatcher, MessageLog};
pub use entity::{
    normalize_name, CatalogEntity, CollectionKind, EntityId, Identified, RelatedReferences,
    Synthesize,
};
pub use errors::{CatalogError, CatalogResult};
pub use gateway::{CollectionGateway, HttpGateway, IdempotencyKey, InMemoryGateway};
pub use operations::{
    Descriptor, MessageBody, Operation, OperationDescriptors, OperationMessage, OperationTags,
    Payload, Phase,
};
pub use router::{ConsistencyRouter, RouteOutcome, RouterPolicy};
pub use saga::{ItemSubmission, RelatedRouters, SagaStep, SubmissionReport};
pub use session::CurrentUser;
pub use store::{CatalogMessage, RootReducer, RootState, Store, StoreSlice};
