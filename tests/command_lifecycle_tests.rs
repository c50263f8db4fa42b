//! Every command announces itself before it settles.

use std::task::Poll;

use catalog_cache::catalog::Company;
use catalog_cache::{
    CatalogError, CollectionCommands, EntityId, Identified, InMemoryGateway, MessageBody,
    MessageLog, Operation, OperationMessage, Phase, Store,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use pretty_assertions::assert_eq;
use test_case::test_case;

type Commands = CollectionCommands<Company, InMemoryGateway<Company>>;
type Log = MessageLog<OperationMessage<Company>>;

fn company(name: &str) -> Company {
    Company {
        name: name.into(),
        works: vec![],
    }
}

fn seeded_gateway() -> InMemoryGateway<Company> {
    InMemoryGateway::gated("c").with_records([Identified::new("c1", company("Test Co"))])
}

/// Issue one command; resolves to whether it produced a payload
fn issue<'a>(
    commands: &'a Commands,
    operation: Operation,
    id: &'a EntityId,
    record: &'a Company,
    log: &'a Log,
) -> BoxFuture<'a, bool> {
    match operation {
        Operation::Create => commands.create(record, log).map(|r| r.is_some()).boxed(),
        Operation::GetAll => commands.get_all(log).map(|r| r.is_some()).boxed(),
        Operation::GetById => commands.get_by_id(id, log).map(|r| r.is_some()).boxed(),
        Operation::Update => commands.update(id, record, log).map(|r| r.is_some()).boxed(),
        Operation::Delete => commands.delete(id, log).map(|r| r.is_some()).boxed(),
    }
}

fn phase_of(commands: &Commands, operation: Operation, message: &OperationMessage<Company>) -> Phase {
    let descriptor = commands.descriptors().descriptor(operation);
    match &message.body {
        MessageBody::Request => {
            assert_eq!(message, &descriptor.request());
            Phase::Request
        }
        MessageBody::Success(_) => Phase::Success,
        MessageBody::Failure(_) => Phase::Failure,
    }
}

#[test_case(Operation::Create ; "create")]
#[test_case(Operation::GetAll ; "get all")]
#[test_case(Operation::GetById ; "get by id")]
#[test_case(Operation::Update ; "update")]
#[test_case(Operation::Delete ; "delete")]
fn request_precedes_success(operation: Operation) {
    let gateway = seeded_gateway();
    let commands = CollectionCommands::new(gateway.clone());
    let log = Log::new();
    let id = EntityId::new("c1");
    let record = company("Renamed Co");

    let mut call = tokio_test::task::spawn(issue(&commands, operation, &id, &record, &log));
    assert_eq!(log.len(), 1);
    assert!(call.poll().is_pending());
    assert_eq!(log.len(), 1);

    gateway.release(1);
    assert_eq!(call.poll(), Poll::Ready(true));

    let phases: Vec<_> = log
        .messages()
        .iter()
        .map(|m| phase_of(&commands, operation, m))
        .collect();
    assert_eq!(phases, vec![Phase::Request, Phase::Success]);
}

#[test_case(Operation::Create ; "create")]
#[test_case(Operation::GetAll ; "get all")]
#[test_case(Operation::GetById ; "get by id")]
#[test_case(Operation::Update ; "update")]
#[test_case(Operation::Delete ; "delete")]
fn request_precedes_failure(operation: Operation) {
    let gateway = seeded_gateway();
    gateway.fail_with(Some(CatalogError::status(500, "boom")));
    let commands = CollectionCommands::new(gateway.clone());
    let log = Log::new();
    let id = EntityId::new("c1");
    let record = company("Renamed Co");

    let mut call = tokio_test::task::spawn(issue(&commands, operation, &id, &record, &log));
    assert!(call.poll().is_pending());
    gateway.release(1);
    assert_eq!(call.poll(), Poll::Ready(false));

    let messages = log.messages();
    let phases: Vec<_> = messages
        .iter()
        .map(|m| phase_of(&commands, operation, m))
        .collect();
    assert_eq!(phases, vec![Phase::Request, Phase::Failure]);
    assert_eq!(
        messages[1],
        commands
            .descriptors()
            .descriptor(operation)
            .failure(CatalogError::status(500, "boom"))
    );
}

#[tokio::test]
async fn store_reads_loading_while_call_is_outstanding() {
    let gateway = InMemoryGateway::<Company>::gated("c");
    let commands = CollectionCommands::new(gateway.clone());
    let store = Store::default();

    let pending = commands.get_all(&store);
    assert!(store.collection::<Company>().is_loading());

    gateway.release(1);
    assert_eq!(pending.await, Some(Vec::new()));
    assert!(!store.collection::<Company>().is_loading());
}

#[tokio::test]
async fn missing_record_fails_through_store() {
    let gateway = InMemoryGateway::<Company>::new("c");
    let commands = CollectionCommands::new(gateway);
    let store = Store::default();

    assert_eq!(commands.get_by_id(&EntityId::new("c9"), &store).await, None);

    let state = store.collection::<Company>();
    assert_eq!(state.error().and_then(CatalogError::status_code), Some(404));
    assert_eq!(state.selected(), None);
}
