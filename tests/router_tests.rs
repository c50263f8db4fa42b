//! Check-then-create behavior of the consistency router against a live store.

use catalog_cache::catalog::{Company, Creator, Series};
use catalog_cache::operations::OperationDescriptors;
use catalog_cache::{
    CollectionCommands, ConsistencyRouter, Dispatcher, EntityId, Identified, InMemoryGateway,
    RouteOutcome, RouterPolicy, Store, Synthesize,
};
use pretty_assertions::assert_eq;

fn router<R: Synthesize>(
    gateway: &InMemoryGateway<R>,
    policy: RouterPolicy,
) -> ConsistencyRouter<R, InMemoryGateway<R>> {
    ConsistencyRouter::new(CollectionCommands::new(gateway.clone()), policy)
}

/// Release the gate once `expected` creates are parked on it
async fn release_when_parked<R: Synthesize>(gateway: &InMemoryGateway<R>, expected: usize) {
    while gateway.create_calls() < expected {
        tokio::task::yield_now().await;
    }
    gateway.release(expected);
}

#[tokio::test]
async fn known_full_name_issues_no_create() {
    let gateway = InMemoryGateway::<Creator>::new("p");
    let router = router(&gateway, RouterPolicy::CheckThenCreate);
    let store = Store::default();
    store.dispatch(
        OperationDescriptors::<Creator>::for_entity()
            .get_all
            .success(vec![Identified::new(
                "p1",
                Creator {
                    first_name: "Jane".into(),
                    middle_name: Some("Q.".into()),
                    last_name: "Doe".into(),
                    works: vec![],
                },
            )]),
    );

    let outcome = router
        .ensure(
            &store.collection::<Creator>(),
            "Jane Q. Doe",
            &EntityId::new("b1"),
            &store,
        )
        .await;

    assert_eq!(outcome, RouteOutcome::Existing(EntityId::new("p1")));
    assert_eq!(gateway.create_calls(), 0);
    assert_eq!(store.collection::<Creator>().len(), 1);
}

#[tokio::test]
async fn new_name_is_synthesized_and_created_once() {
    let gateway = InMemoryGateway::<Creator>::new("p");
    let router = router(&gateway, RouterPolicy::CheckThenCreate);
    let store = Store::default();

    let outcome = router
        .ensure(
            &store.collection::<Creator>(),
            "New Person",
            &EntityId::new("b7"),
            &store,
        )
        .await;

    assert_eq!(outcome, RouteOutcome::Created(EntityId::new("p1")));
    assert_eq!(gateway.create_calls(), 1);
    let created = &gateway.records()[0].record;
    assert_eq!(created.first_name, "New");
    assert_eq!(created.last_name, "Person");
    assert_eq!(created.middle_name, None);
    assert_eq!(created.works, vec![EntityId::new("b7")]);
}

#[tokio::test]
async fn sequential_calls_create_once() {
    let gateway = InMemoryGateway::<Series>::new("s");
    let router = router(&gateway, RouterPolicy::CheckThenCreate);
    let store = Store::default();

    let first = router
        .ensure(&store.collection::<Series>(), "Discworld", &EntityId::new("b1"), &store)
        .await;
    let second = router
        .ensure(&store.collection::<Series>(), "Discworld", &EntityId::new("b2"), &store)
        .await;

    assert_eq!(first, RouteOutcome::Created(EntityId::new("s1")));
    assert_eq!(second, RouteOutcome::Existing(EntityId::new("s1")));
    assert_eq!(gateway.create_calls(), 1);
}

#[tokio::test]
async fn padded_series_name_is_created_once() {
    let gateway = InMemoryGateway::<Series>::new("s");
    let router = router(&gateway, RouterPolicy::CheckThenCreate);
    let store = Store::default();

    let first = router
        .ensure(&store.collection::<Series>(), "Halo ", &EntityId::new("g1"), &store)
        .await;
    let second = router
        .ensure(&store.collection::<Series>(), "Halo ", &EntityId::new("g2"), &store)
        .await;

    assert_eq!(first, RouteOutcome::Created(EntityId::new("s1")));
    assert_eq!(second, RouteOutcome::Existing(EntityId::new("s1")));
    assert_eq!(gateway.create_calls(), 1);
    let series = store.collection::<Series>();
    assert_eq!(series.len(), 1);
    assert!(series.display_names().contains("Halo"));
}

#[tokio::test]
async fn creator_with_repeated_spaces_is_created_once() {
    let gateway = InMemoryGateway::<Creator>::new("p");
    let router = router(&gateway, RouterPolicy::CheckThenCreate);
    let store = Store::default();

    let first = router
        .ensure(&store.collection::<Creator>(), "Frank  Herbert", &EntityId::new("b1"), &store)
        .await;
    let second = router
        .ensure(&store.collection::<Creator>(), "Frank  Herbert", &EntityId::new("b2"), &store)
        .await;
    let third = router
        .ensure(&store.collection::<Creator>(), "Frank Herbert", &EntityId::new("b3"), &store)
        .await;

    assert_eq!(first, RouteOutcome::Created(EntityId::new("p1")));
    assert_eq!(second, RouteOutcome::Existing(EntityId::new("p1")));
    assert_eq!(third, RouteOutcome::Existing(EntityId::new("p1")));
    assert_eq!(gateway.create_calls(), 1);
}

// Both lookups run before either create resolves, so both miss and the
// collection ends up with two records of the same name.
#[tokio::test]
async fn racing_calls_duplicate_under_check_then_create() {
    let gateway = InMemoryGateway::<Company>::gated("c");
    let router = router(&gateway, RouterPolicy::CheckThenCreate);
    let store = Store::default();
    let (a, b) = (EntityId::new("g1"), EntityId::new("g2"));
    let first_snapshot = store.collection::<Company>();
    let second_snapshot = store.collection::<Company>();

    let (first, second, ()) = tokio::join!(
        router.ensure(&first_snapshot, "Bungie", &a, &store),
        router.ensure(&second_snapshot, "Bungie", &b, &store),
        release_when_parked(&gateway, 2),
    );

    assert_eq!(first, RouteOutcome::Created(EntityId::new("c1")));
    assert_eq!(second, RouteOutcome::Created(EntityId::new("c2")));
    assert_eq!(gateway.create_calls(), 2);
    let companies = store.collection::<Company>();
    assert_eq!(companies.len(), 2);
    assert!(companies.records().all(|(_, company)| company.name == "Bungie"));
}

#[tokio::test]
async fn racing_calls_share_one_create_when_idempotent() {
    let gateway = InMemoryGateway::<Company>::gated("c");
    let router = router(&gateway, RouterPolicy::Idempotent);
    let store = Store::default();
    let (a, b) = (EntityId::new("g1"), EntityId::new("g2"));
    let first_snapshot = store.collection::<Company>();
    let second_snapshot = store.collection::<Company>();

    let (first, second, ()) = tokio::join!(
        router.ensure(&first_snapshot, "Bungie", &a, &store),
        router.ensure(&second_snapshot, " Bungie ", &b, &store),
        release_when_parked(&gateway, 1),
    );

    assert_eq!(first, RouteOutcome::Created(EntityId::new("c1")));
    assert_eq!(second, RouteOutcome::InFlight);
    assert_eq!(gateway.create_calls(), 1);
    assert_eq!(store.collection::<Company>().len(), 1);
}

#[tokio::test]
async fn failed_create_surfaces_only_on_related_collection() {
    let gateway = InMemoryGateway::<Series>::new("s");
    gateway.fail_with(Some(catalog_cache::CatalogError::transport("connection reset")));
    let router = router(&gateway, RouterPolicy::CheckThenCreate);
    let store = Store::default();

    let outcome = router
        .ensure(&store.collection::<Series>(), "Discworld", &EntityId::new("b1"), &store)
        .await;

    assert_eq!(outcome, RouteOutcome::CreateFailed);
    let state = store.snapshot();
    assert!(state.series.error().unwrap().is_transport());
    assert!(!state.series.is_loading());
    assert_eq!(state.books.error(), None);
}
