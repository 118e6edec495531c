//! RsvpWorkflow step definitions.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cucumber::{given, then, when, World};
use rsvp::config::MessagesConfig;
use rsvp::model::GuestConfirmation;
use rsvp::presentation::{Rejection, RsvpPresenter, SubmitOutcome};
use rsvp::test_utils::{presenter_with, workflow_with, MockConfirmationStore};
use rsvp::validation::FormInput;
use rsvp::workflow::{RsvpError, RsvpWorkflow};

use crate::backend::{StorageBackend, StorageContext};

/// Test context for RSVP workflow scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct RsvpWorkflowWorld {
    backend: StorageBackend,
    context: Option<StorageContext>,
    workflow: Option<Arc<RsvpWorkflow>>,
    presenter: Option<RsvpPresenter>,
    last_result: Option<Result<GuestConfirmation, RsvpError>>,
    loaded: Vec<GuestConfirmation>,
}

impl std::fmt::Debug for RsvpWorkflowWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsvpWorkflowWorld")
            .field("backend", &self.backend)
            .field("context", &self.context)
            .field("last_result", &self.last_result)
            .finish()
    }
}

impl RsvpWorkflowWorld {
    fn new() -> Self {
        Self {
            backend: StorageBackend::from_env(),
            context: None,
            workflow: None,
            presenter: None,
            last_result: None,
            loaded: Vec::new(),
        }
    }

    fn workflow(&self) -> &RsvpWorkflow {
        self.workflow.as_deref().expect("Workflow not initialized")
    }

    fn presenter(&self) -> &RsvpPresenter {
        self.presenter.as_ref().expect("Presenter not initialized")
    }

    fn form(name: &str, key: &str, dish: &str) -> FormInput {
        FormInput {
            full_name: name.to_string(),
            contact_key: key.to_string(),
            choices: BTreeMap::from([("plato".to_string(), dish.to_string())]),
        }
    }

    fn last_error(&self) -> &RsvpError {
        match &self.last_result {
            Some(Err(e)) => e,
            other => panic!("Expected a failed submission, got {:?}", other),
        }
    }
}

// --- Background ---

#[given("an RSVP workflow over the configured backend")]
async fn given_workflow(world: &mut RsvpWorkflowWorld) {
    println!("Using backend: {}", world.backend.name());
    let ctx = StorageContext::new(world.backend).await;
    world.workflow = Some(workflow_with(ctx.store.clone()));
    world.context = Some(ctx);
}

#[given("an RSVP presenter whose store rejects writes")]
async fn given_failing_presenter(world: &mut RsvpWorkflowWorld) {
    let store = Arc::new(MockConfirmationStore::new());
    store.set_fail_on_insert(true).await;
    let presenter = presenter_with(store, 1);
    presenter.init().await;
    world.workflow = Some(Arc::clone(presenter.workflow()));
    world.presenter = Some(presenter);
}

// --- Given steps ---

#[given(expr = "{string} confirmed with contact key {string} choosing {string}")]
async fn given_confirmed(world: &mut RsvpWorkflowWorld, name: String, key: String, dish: String) {
    world
        .workflow()
        .submit(RsvpWorkflowWorld::form(&name, &key, &dish))
        .await
        .expect("Failed to submit confirmation");
}

// --- When steps ---

#[when(expr = "{string} confirms with contact key {string} choosing {string}")]
async fn when_confirms(world: &mut RsvpWorkflowWorld, name: String, key: String, dish: String) {
    let result = world
        .workflow()
        .submit(RsvpWorkflowWorld::form(&name, &key, &dish))
        .await;
    world.last_result = Some(result);
}

#[when(expr = "{string} submits through the presenter with contact key {string} choosing {string}")]
async fn when_submits_through_presenter(
    world: &mut RsvpWorkflowWorld,
    name: String,
    key: String,
    dish: String,
) {
    let outcome = world
        .presenter()
        .submit(RsvpWorkflowWorld::form(&name, &key, &dish))
        .await;
    world.last_result = Some(match outcome {
        SubmitOutcome::Confirmed(stored) => Ok(stored),
        SubmitOutcome::Rejected {
            reason: Rejection::Failed(err),
            ..
        } => Err(err),
        SubmitOutcome::Rejected {
            reason: Rejection::Busy,
            ..
        } => panic!("Presenter unexpectedly busy"),
    });
}

#[when("the confirmation list is loaded")]
async fn when_loaded(world: &mut RsvpWorkflowWorld) {
    world.loaded = world.workflow().load_all().await;
}

// --- Then steps ---

#[then("the submission succeeds")]
async fn then_succeeds(world: &mut RsvpWorkflowWorld) {
    assert!(
        matches!(world.last_result, Some(Ok(_))),
        "Expected success, got {:?}",
        world.last_result
    );
}

#[then("the submission fails as a duplicate contact")]
async fn then_duplicate(world: &mut RsvpWorkflowWorld) {
    let err = world.last_error();
    assert!(
        matches!(err, RsvpError::DuplicateContact { .. }),
        "Expected DuplicateContact, got {:?}",
        err
    );
}

#[then("the submission fails with a persistence error")]
async fn then_persistence(world: &mut RsvpWorkflowWorld) {
    let err = world.last_error();
    assert!(
        matches!(err, RsvpError::Persistence(_)),
        "Expected Persistence, got {:?}",
        err
    );
}

#[then(expr = "the submission fails validation on {string}")]
async fn then_validation(world: &mut RsvpWorkflowWorld, fields: String) {
    match world.last_error() {
        RsvpError::Validation(errors) => {
            let actual: Vec<&str> = errors.fields.iter().map(|f| f.field.as_str()).collect();
            let expected: Vec<&str> = fields.split(", ").collect();
            assert_eq!(actual, expected);
        }
        other => panic!("Expected Validation, got {:?}", other),
    }
}

#[then(expr = "the confirmation list has {int} entries")]
async fn then_list_has(world: &mut RsvpWorkflowWorld, count: usize) {
    assert_eq!(world.workflow().view().len(), count);
}

#[then(expr = "contact key {string} is already registered")]
async fn then_registered(world: &mut RsvpWorkflowWorld, key: String) {
    assert!(world
        .workflow()
        .exists_by_contact_key(&key)
        .await
        .expect("Lookup failed"));
}

#[then(expr = "contact key {string} is not registered")]
async fn then_not_registered(world: &mut RsvpWorkflowWorld, key: String) {
    assert!(!world
        .workflow()
        .exists_by_contact_key(&key)
        .await
        .expect("Lookup failed"));
}

#[then("no fetch error is flagged")]
async fn then_no_fetch_error(world: &mut RsvpWorkflowWorld) {
    assert!(world.loaded.is_empty());
    assert!(world.workflow().state().last_fetch_error.is_none());
}

#[then(expr = "the loaded list is {string}")]
async fn then_loaded_list(world: &mut RsvpWorkflowWorld, names: String) {
    let expected: Vec<&str> = names.split(", ").collect();
    let actual: Vec<&str> = world.loaded.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(actual, expected);
}

#[then("exporting twice yields identical rows")]
async fn then_export_stable(world: &mut RsvpWorkflowWorld) {
    let first = world.workflow().export_snapshot();
    let second = world.workflow().export_snapshot();
    assert_eq!(first, second);
}

#[then(expr = "export row {int} shows {string} with {string}")]
async fn then_export_row(world: &mut RsvpWorkflowWorld, number: usize, name: String, dish: String) {
    let table = world.workflow().export_snapshot();
    let row = &table.rows[number - 1];
    assert_eq!(row[0], number.to_string());
    assert_eq!(row[2], name);
    assert_eq!(row[4], dish);
}

#[then("the error banner shows the persistence message")]
async fn then_banner_persistence(world: &mut RsvpWorkflowWorld) {
    let view = world.presenter().view(Utc::now()).await;
    assert_eq!(view.error_message, Some(MessagesConfig::default().persistence));
}

#[then(expr = "the error banner is gone after {int} seconds")]
async fn then_banner_cleared(world: &mut RsvpWorkflowWorld, secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
    let view = world.presenter().view(Utc::now()).await;
    assert!(view.error_message.is_none());
}
