// Copyright 2025 Cowboy AI, LLC.

//! Root store
//!
//! [`RootState`] holds one collection state per catalog collection. The
//! [`Store`] handle is constructed explicitly and passed to whatever needs
//! it; [`Store::dispatch`] is its only mutation path.

use crate::catalog::{Book, Company, Creator, Disc, Game, Series};
use crate::collection::{CollectionReducer, CollectionState};
use crate::config::StoreConfig;
use crate::dispatch::Dispatcher;
use crate::entity::CatalogEntity;
use crate::operations::OperationMessage;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info};

/// Application state tree
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootState {
    /// Books
    pub books: CollectionState<Book>,
    /// Discs
    pub discs: CollectionState<Disc>,
    /// Games
    pub games: CollectionState<Game>,
    /// Series
    pub series: CollectionState<Series>,
    /// Creators
    pub creators: CollectionState<Creator>,
    /// Companies
    pub companies: CollectionState<Company>,
}

/// Any message the root store accepts
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogMessage {
    /// Books collection message
    Books(OperationMessage<Book>),
    /// Discs collection message
    Discs(OperationMessage<Disc>),
    /// Games collection message
    Games(OperationMessage<Game>),
    /// Series collection message
    Series(OperationMessage<Series>),
    /// Creators collection message
    Creators(OperationMessage<Creator>),
    /// Companies collection message
    Companies(OperationMessage<Company>),
    /// Discard every collection (session teardown)
    Reset,
}

/// Record types that own a slice of the root state
pub trait StoreSlice: CatalogEntity {
    /// Route a collection message to the root store
    fn wrap(message: OperationMessage<Self>) -> CatalogMessage;

    /// This type's collection within the root state
    fn slice(state: &RootState) -> &CollectionState<Self>;
}

macro_rules! store_slice {
    ($entity:ty, $variant:ident, $field:ident) => {
        impl StoreSlice for $entity {
            fn wrap(message: OperationMessage<Self>) -> CatalogMessage {
                CatalogMessage::$variant(message)
            }

            fn slice(state: &RootState) -> &CollectionState<Self> {
                &state.$field
            }
        }

        impl From<OperationMessage<$entity>> for CatalogMessage {
            fn from(message: OperationMessage<$entity>) -> Self {
                CatalogMessage::$variant(message)
            }
        }
    };
}

store_slice!(Book, Books, books);
store_slice!(Disc, Discs, discs);
store_slice!(Game, Games, games);
store_slice!(Series, Series, series);
store_slice!(Creator, Creators, creators);
store_slice!(Company, Companies, companies);

/// One collection reducer per slice
#[derive(Debug, Clone, Default)]
pub struct RootReducer {
    books: CollectionReducer<Book>,
    discs: CollectionReducer<Disc>,
    games: CollectionReducer<Game>,
    series: CollectionReducer<Series>,
    creators: CollectionReducer<Creator>,
    companies: CollectionReducer<Company>,
}

impl RootReducer {
    /// Reducers configured from store settings
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            books: CollectionReducer::new(config.loading),
            discs: CollectionReducer::new(config.loading),
            games: CollectionReducer::new(config.loading),
            series: CollectionReducer::new(config.loading),
            creators: CollectionReducer::new(config.loading),
            companies: CollectionReducer::new(config.loading),
        }
    }

    /// Fold one message into the next root state
    ///
    /// `Reset` yields every slice in its canonical empty state; any other
    /// message reaches only the slice it belongs to.
    pub fn reduce(&self, state: RootState, message: &CatalogMessage) -> RootState {
        let mut state = state;
        match message {
            CatalogMessage::Reset => return RootState::default(),
            CatalogMessage::Books(m) => state.books = self.books.reduce(state.books, m),
            CatalogMessage::Discs(m) => state.discs = self.discs.reduce(state.discs, m),
            CatalogMessage::Games(m) => state.games = self.games.reduce(state.games, m),
            CatalogMessage::Series(m) => state.series = self.series.reduce(state.series, m),
            CatalogMessage::Creators(m) => {
                state.creators = self.creators.reduce(state.creators, m)
            }
            CatalogMessage::Companies(m) => {
                state.companies = self.companies.reduce(state.companies, m)
            }
        }
        state
    }
}

struct Shared {
    reducer: RootReducer,
    state: RwLock<RootState>,
    updates: watch::Sender<RootState>,
}

/// Cloneable handle to one application state tree
///
/// # Examples
///
/// ```rust
/// use catalog_cache::catalog::Company;
/// use catalog_cache::operations::OperationDescriptors;
/// use catalog_cache::{Dispatcher, Identified, Store};
///
/// let store = Store::default();
/// let ops = OperationDescriptors::<Company>::for_entity();
/// store.dispatch(ops.create.success(Identified::new(
///     "c1",
///     Company { name: "Test Co".into(), works: vec![] },
/// )));
/// assert_eq!(store.collection::<Company>().len(), 1);
/// ```
#[derive(Clone)]
pub struct Store {
    shared: Arc<Shared>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.snapshot())
            .finish()
    }
}

impl Store {
    /// Empty store
    pub fn new(config: &StoreConfig) -> Self {
        let (updates, _) = watch::channel(RootState::default());
        Self {
            shared: Arc::new(Shared {
                reducer: RootReducer::new(config),
                state: RwLock::new(RootState::default()),
                updates,
            }),
        }
    }

    /// Apply one message
    pub fn apply(&self, message: &CatalogMessage) {
        if matches!(message, CatalogMessage::Reset) {
            info!("resetting catalog store");
        }
        let mut state = self
            .shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let next = self.shared.reducer.reduce(std::mem::take(&mut *state), message);
        self.shared.updates.send_replace(next.clone());
        *state = next;
    }

    /// Discard every collection
    pub fn reset(&self) {
        self.apply(&CatalogMessage::Reset);
    }

    /// Copy of the whole state tree
    pub fn snapshot(&self) -> RootState {
        self.read(RootState::clone)
    }

    /// Copy of one collection
    pub fn collection<E: StoreSlice>(&self) -> CollectionState<E> {
        self.read(|state| E::slice(state).clone())
    }

    /// Run `f` against the current state without copying it
    pub fn read<R>(&self, f: impl FnOnce(&RootState) -> R) -> R {
        let state = self
            .shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Observe every transition; the receiver starts at the current state
    pub fn subscribe(&self) -> watch::Receiver<RootState> {
        self.shared.updates.subscribe()
    }
}

impl Dispatcher<CatalogMessage> for Store {
    fn dispatch(&self, message: CatalogMessage) {
        self.apply(&message);
    }
}

impl<E: StoreSlice> Dispatcher<OperationMessage<E>> for Store {
    fn dispatch(&self, message: OperationMessage<E>) {
        debug!(collection = %E::KIND, tag = %message.tag, "dispatch");
        self.apply(&E::wrap(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::LoadingTracking;
    use crate::entity::{EntityId, Identified};
    use crate::operations::OperationDescriptors;
    use pretty_assertions::assert_eq;

    fn populated() -> Store {
        let store = Store::default();
        let books = OperationDescriptors::<Book>::for_entity();
        let games = OperationDescriptors::<Game>::for_entity();
        store.dispatch(books.create.success(Identified::new(
            "b1",
            Book::titled("Dune").in_series("Dune"),
        )));
        store.dispatch(games.get_all.request());
        store
    }

    #[test]
    fn messages_reach_only_their_slice() {
        let store = populated();
        let state = store.snapshot();
        assert_eq!(state.books.len(), 1);
        assert!(state.games.is_loading());
        assert!(!state.books.is_loading());
        assert_eq!(state.discs, CollectionState::default());
    }

    #[test]
    fn reset_reinitializes_every_slice() {
        let store = populated();
        store.reset();
        assert_eq!(store.snapshot(), RootState::default());
    }

    #[test]
    fn foreign_tags_inside_a_slice_are_ignored() {
        let store = Store::default();
        let foreign = OperationDescriptors::<Book>::from_tags(Game::tags());
        store.dispatch(CatalogMessage::Books(
            foreign.create.success(Identified::new("b1", Book::titled("x"))),
        ));
        assert_eq!(store.snapshot(), RootState::default());
    }

    #[test]
    fn configured_tracking_applies_to_slices() {
        let store = Store::new(&StoreConfig {
            loading: LoadingTracking::InFlightCounter,
        });
        let ops = OperationDescriptors::<Series>::for_entity();
        store.dispatch(ops.get_all.request());
        store.dispatch(ops.get_all.request());
        store.dispatch(ops.get_all.success(Vec::new()));
        let series = store.collection::<Series>();
        assert!(series.is_loading());
        assert_eq!(series.in_flight(), 1);
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let store = Store::default();
        let mut updates = store.subscribe();
        let ops = OperationDescriptors::<Company>::for_entity();

        store.dispatch(ops.delete.success(EntityId::new("none")));
        updates.changed().await.unwrap();
        assert_eq!(*updates.borrow_and_update(), store.snapshot());

        store.dispatch(ops.create.request());
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().companies.is_loading());
    }
}
