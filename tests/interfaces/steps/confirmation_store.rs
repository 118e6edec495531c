//! ConfirmationStore interface step definitions.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use cucumber::{given, then, when, World};
use rsvp::model::{ContactKey, GuestConfirmation, NewConfirmation, RecordField};
use rsvp::storage::{ConfirmationStore, StorageError};

use crate::backend::{StorageBackend, StorageContext};

/// Test context for ConfirmationStore scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct ConfirmationStoreWorld {
    backend: StorageBackend,
    context: Option<StorageContext>,
    last_inserted: Option<GuestConfirmation>,
    last_query: Vec<GuestConfirmation>,
    last_error: Option<StorageError>,
}

impl ConfirmationStoreWorld {
    fn new() -> Self {
        Self {
            backend: StorageBackend::from_env(),
            context: None,
            last_inserted: None,
            last_query: Vec::new(),
            last_error: None,
        }
    }

    fn store(&self) -> &dyn ConfirmationStore {
        self.context
            .as_ref()
            .expect("Storage context not initialized")
            .store
            .as_ref()
    }

    fn make_record(name: &str, key: &str, dish: &str) -> NewConfirmation {
        NewConfirmation {
            full_name: name.to_string(),
            contact_key: ContactKey::normalize(key),
            choices: BTreeMap::from([("plato".to_string(), dish.to_string())]),
        }
    }

    async fn all(&self) -> Vec<GuestConfirmation> {
        self.store().query_all().await.expect("Failed to query all")
    }
}

// --- Background ---

#[given("a ConfirmationStore backend")]
async fn given_store_backend(world: &mut ConfirmationStoreWorld) {
    println!("Using backend: {}", world.backend.name());
    let ctx = StorageContext::new(world.backend).await;
    world.context = Some(ctx);
}

// --- Given steps ---

#[given(expr = "a confirmation for {string} with contact key {string} choosing {string}")]
async fn given_confirmation(
    world: &mut ConfirmationStoreWorld,
    name: String,
    key: String,
    dish: String,
) {
    world
        .store()
        .insert(ConfirmationStoreWorld::make_record(&name, &key, &dish))
        .await
        .expect("Failed to insert confirmation");
}

// --- When steps ---

#[when(expr = "I insert a confirmation for {string} with contact key {string} choosing {string}")]
async fn when_insert(world: &mut ConfirmationStoreWorld, name: String, key: String, dish: String) {
    let record = ConfirmationStoreWorld::make_record(&name, &key, &dish);
    match world.store().insert(record).await {
        Ok(stored) => {
            world.last_inserted = Some(stored);
            world.last_error = None;
        }
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "I query confirmations by contact key {string}")]
async fn when_query_by_key(world: &mut ConfirmationStoreWorld, key: String) {
    world.last_query = world
        .store()
        .query_by_field(&RecordField::ContactKey, &key)
        .await
        .expect("Failed to query by contact key");
}

#[when(expr = "I query confirmations whose {string} is {string}")]
async fn when_query_by_choice(world: &mut ConfirmationStoreWorld, field: String, value: String) {
    world.last_query = world
        .store()
        .query_by_field(&RecordField::Choice(field), &value)
        .await
        .expect("Failed to query by choice");
}

#[when(expr = "I query confirmations submitted in the last {int} hours")]
async fn when_query_last_hours(world: &mut ConfirmationStoreWorld, hours: i64) {
    world.last_query = world
        .store()
        .query_since(Utc::now() - Duration::hours(hours))
        .await
        .expect("Failed to query since");
}

#[when(expr = "I query confirmations submitted since {int} hours from now")]
async fn when_query_future(world: &mut ConfirmationStoreWorld, hours: i64) {
    world.last_query = world
        .store()
        .query_since(Utc::now() + Duration::hours(hours))
        .await
        .expect("Failed to query since");
}

// --- Then steps ---

#[then("the insert succeeds")]
async fn then_insert_succeeds(world: &mut ConfirmationStoreWorld) {
    assert!(
        world.last_error.is_none(),
        "Expected success, got {:?}",
        world.last_error
    );
    assert!(world.last_inserted.is_some());
}

#[then(expr = "the store holds {int} confirmations")]
async fn then_store_holds(world: &mut ConfirmationStoreWorld, count: usize) {
    assert_eq!(world.all().await.len(), count);
}

#[then(expr = "the newest confirmation belongs to {string}")]
async fn then_newest_belongs_to(world: &mut ConfirmationStoreWorld, name: String) {
    let all = world.all().await;
    assert_eq!(all.first().map(|r| r.full_name.as_str()), Some(name.as_str()));
}

#[then("the newest confirmation has an id and a submission time")]
async fn then_assigned_fields(world: &mut ConfirmationStoreWorld) {
    let all = world.all().await;
    let newest = all.first().expect("No confirmations stored");
    assert!(!newest.id.is_empty());
    assert!(newest.submitted_at <= Utc::now());
    assert_eq!(Some(newest), world.last_inserted.as_ref());
}

#[then(expr = "the confirmations are listed as {string}")]
async fn then_listed_as(world: &mut ConfirmationStoreWorld, names: String) {
    let expected: Vec<&str> = names.split(", ").collect();
    let all = world.all().await;
    let actual: Vec<&str> = all.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(actual, expected);
}

#[then("the insert fails with a duplicate key error")]
async fn then_duplicate(world: &mut ConfirmationStoreWorld) {
    assert!(
        matches!(world.last_error, Some(StorageError::DuplicateKey { .. })),
        "Expected DuplicateKey, got {:?}",
        world.last_error
    );
}

#[then(expr = "the query returns {int} confirmations")]
async fn then_query_returns(world: &mut ConfirmationStoreWorld, count: usize) {
    assert_eq!(world.last_query.len(), count);
}

#[then(expr = "the first result belongs to {string}")]
async fn then_first_result(world: &mut ConfirmationStoreWorld, name: String) {
    assert_eq!(
        world.last_query.first().map(|r| r.full_name.as_str()),
        Some(name.as_str())
    );
}
