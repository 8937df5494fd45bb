// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic controller shared by every managed resource kind.
//!
//! One controller runs per kind. It watches the kind's records, the kinds those records
//! depend on, and (for kinds that read credentials from a secret) every `Secret`. Each
//! reconcile:
//!
//! 1. takes the record's single-flight lock
//! 2. re-reads the record from the API server
//! 3. adds the finalizer (or skips records being deleted without it)
//! 4. runs one pass of [`reconcile_once`]
//! 5. writes status, connection secret and marker annotations, and releases the
//!    finalizer once the external resource is confirmed gone

use crate::constants::{
    ERROR_REQUEUE_DURATION_SECS, KIND_CONNECTION_POOL, KIND_DATABASE, KIND_KAFKA,
    KIND_KAFKA_ACL, KIND_KAFKA_TOPIC, KIND_POSTGRESQL, KIND_SERVICE_INTEGRATION,
    KIND_SERVICE_USER,
};
use crate::context::Context;
use crate::crd::{Database, Kafka, PostgreSQL, ProjectVPC, ServiceUser};
use crate::labels::FINALIZER;
use crate::reconcilers::adapter::KindAdapter;
use crate::reconcilers::dependencies::dependents_in;
use crate::reconcilers::engine::{reconcile_once, Mutation, Outcome, Requeue};
use crate::reconcilers::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use crate::reconcilers::status::{
    marker_annotations, markers_changed, patch_markers, patch_status, resource_status_changed,
};
use crate::resource::ManagedResource;
use crate::secrets::materialize::materialize;
use crate::secrets::watcher::records_using_secret;
use anyhow::Result;
use chrono::Utc;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::runtime::controller::{Action, Config as ControllerConfig};
use kube::runtime::reflector::Store;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Resource, ResourceExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Reconciliation error wrapper
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] anyhow::Error);

/// Related kinds a controller watches besides its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Watches {
    /// `PostgreSQL` and `Kafka` records
    pub services: bool,
    pub databases: bool,
    pub service_users: bool,
    pub project_vpcs: bool,
    /// Secrets referenced by `connInfoSecretSource`
    pub source_secrets: bool,
}

/// Watches of each kind, derived from what its records can reference.
#[must_use]
pub fn watches_for(kind: &str) -> Watches {
    match kind {
        KIND_POSTGRESQL | KIND_KAFKA => Watches {
            services: true,
            project_vpcs: true,
            ..Watches::default()
        },
        KIND_SERVICE_USER => Watches {
            services: true,
            source_secrets: true,
            ..Watches::default()
        },
        KIND_CONNECTION_POOL => Watches {
            services: true,
            databases: true,
            service_users: true,
            ..Watches::default()
        },
        KIND_DATABASE | KIND_KAFKA_TOPIC | KIND_KAFKA_ACL | KIND_SERVICE_INTEGRATION => Watches {
            services: true,
            ..Watches::default()
        },
        // ProjectVPC references nothing
        _ => Watches::default(),
    }
}

/// Per-controller state handed to every reconcile.
pub struct ControllerState<A> {
    pub context: Arc<Context>,
    pub adapter: A,
}

/// Map an action to the metrics label used for requeues.
fn requeue_label(requeue: Requeue) -> &'static str {
    match requeue {
        Requeue::After(_) => "timed",
        Requeue::AwaitChange => "await_change",
    }
}

/// Controller action for a requeue decision.
#[must_use]
pub fn action_for(requeue: Requeue) -> Action {
    match requeue {
        Requeue::After(delay) => Action::requeue(delay),
        Requeue::AwaitChange => Action::await_change(),
    }
}

/// Error policy for all controllers.
///
/// Returns an action to requeue the resource after a delay when reconciliation fails.
#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
fn error_policy<K, A>(
    resource: Arc<K>,
    err: &ReconcileError,
    _state: Arc<ControllerState<A>>,
) -> Action
where
    K: ManagedResource,
{
    error!(
        error = %err,
        kind = K::KIND,
        namespace = %resource.record_namespace(),
        name = %resource.name_any(),
        "Reconciliation error - will retry in {}s",
        ERROR_REQUEUE_DURATION_SECS
    );
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Re-enqueue records of `K` that depend on the record `P` provides.
fn watch_provider<K, P>(controller: Controller<K>, api: Api<P>, store: Store<K>) -> Controller<K>
where
    K: ManagedResource,
    P: ManagedResource,
{
    controller.watches(api, WatcherConfig::default(), move |provider: P| {
        let Some(provided) = provider.provides() else {
            return Vec::new();
        };
        let records = store.state();
        dependents_in(records.iter().map(AsRef::as_ref), &provided)
    })
}

/// Run the controller for the kind `adapter` manages.
///
/// # Errors
///
/// Returns an error if the controller fails to start or encounters a fatal error.
pub async fn run_controller<A>(context: Arc<Context>, adapter: A, concurrency: u16) -> Result<()>
where
    A: KindAdapter + 'static,
{
    let kind = A::Record::KIND;
    info!("Starting {kind} controller");

    let client = context.client.clone();
    let api = Api::<A::Record>::all(client.clone());
    let watches = watches_for(kind);
    debug!(kind, ?watches, concurrency, "Configuring controller watches");

    let mut controller = Controller::new(api, WatcherConfig::default())
        .with_config(ControllerConfig::default().concurrency(concurrency));
    let store = controller.store();

    if watches.services {
        controller =
            watch_provider(controller, Api::<PostgreSQL>::all(client.clone()), store.clone());
        controller = watch_provider(controller, Api::<Kafka>::all(client.clone()), store.clone());
    }
    if watches.databases {
        controller =
            watch_provider(controller, Api::<Database>::all(client.clone()), store.clone());
    }
    if watches.service_users {
        controller =
            watch_provider(controller, Api::<ServiceUser>::all(client.clone()), store.clone());
    }
    if watches.project_vpcs {
        controller =
            watch_provider(controller, Api::<ProjectVPC>::all(client.clone()), store.clone());
    }
    if watches.source_secrets {
        let store = store.clone();
        controller = controller.watches(
            Api::<Secret>::all(client.clone()),
            WatcherConfig::default(),
            move |secret: Secret| {
                let (Some(namespace), name) = (secret.namespace(), secret.name_any()) else {
                    return Vec::new();
                };
                let records = store.state();
                records_using_secret(records.iter().map(AsRef::as_ref), &namespace, &name)
            },
        );
    }

    let state = Arc::new(ControllerState { context, adapter });
    controller
        .run(reconcile_wrapper::<A>, error_policy, state)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile one record and record metrics for the pass.
async fn reconcile_wrapper<A>(
    record: Arc<A::Record>,
    state: Arc<ControllerState<A>>,
) -> Result<Action, ReconcileError>
where
    A: KindAdapter + 'static,
{
    let kind = A::Record::KIND;
    let start = Instant::now();
    let result = reconcile(record.as_ref(), &state).await;
    let duration = start.elapsed();

    match &result {
        Ok(_) => crate::metrics::record_reconciliation_success(kind, duration),
        Err(_) => {
            crate::metrics::record_reconciliation_error(kind, duration);
            crate::metrics::record_error(kind, "ReconcileFailed");
        }
    }
    result.map_err(ReconcileError::from)
}

async fn reconcile<A>(record: &A::Record, state: &ControllerState<A>) -> Result<Action>
where
    A: KindAdapter,
{
    let context = &state.context;
    let client = &context.client;
    let kind = A::Record::KIND;
    let namespace = record.record_namespace();
    let name = record.name_any();

    let _guard = context.locks.lock(&record.record_key()).await;

    // The cached copy may predate our own last status write.
    let api: Api<A::Record> = Api::namespaced(client.clone(), &namespace);
    let Some(record) = api.get_opt(&name).await? else {
        debug!(kind, namespace = %namespace, name = %name, "Record is gone");
        return Ok(Action::await_change());
    };

    let deleting = record.meta().deletion_timestamp.is_some();
    if deleting {
        if !has_finalizer(&record, FINALIZER) {
            return Ok(Action::await_change());
        }
    } else {
        ensure_finalizer(client, &record, FINALIZER).await?;
    }

    let outcome = reconcile_once(&state.adapter, &record, &context.settings, Utc::now()).await;
    info!(
        kind,
        namespace = %namespace,
        name = %name,
        phase = %outcome.phase,
        step = %outcome.step,
        reason = outcome.error_reason.unwrap_or_default(),
        "Reconciled"
    );

    apply_outcome(context, &record, &outcome).await?;
    record_outcome_metrics(kind, &outcome);
    Ok(action_for(outcome.requeue))
}

/// Persist what one pass decided, in order: status, secret, markers, finalizer.
async fn apply_outcome<K: ManagedResource>(
    context: &Context,
    record: &K,
    outcome: &Outcome,
) -> Result<()> {
    let client = &context.client;

    if outcome.remove_finalizer {
        remove_finalizer(client, record, FINALIZER).await?;
        return Ok(());
    }

    if resource_status_changed(record.resource_status(), &outcome.status) {
        patch_status(client, record, &outcome.status).await?;
    }

    if let Some(info) = &outcome.connection_info {
        materialize(client, record, info).await?;
    }

    let markers = marker_annotations(&outcome.status);
    if markers_changed(record, &markers) {
        patch_markers(client, record, &markers).await?;
    }
    Ok(())
}

fn record_outcome_metrics(kind: &str, outcome: &Outcome) {
    match outcome.mutation {
        Some(Mutation::Created) => crate::metrics::record_resource_created(kind),
        Some(Mutation::Updated) => crate::metrics::record_resource_updated(kind),
        Some(Mutation::Replaced) => crate::metrics::record_resource_replaced(kind),
        Some(Mutation::Deleted) => crate::metrics::record_resource_deleted(kind),
        None => {}
    }
    if let Some(reason) = outcome.error_reason {
        crate::metrics::record_error(kind, reason);
    }
    crate::metrics::record_reconciliation_requeue(kind, requeue_label(outcome.requeue));
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
