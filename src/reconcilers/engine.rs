// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The generic reconcile pass.
//!
//! [`reconcile_once`] runs one planned step for one record against its [`KindAdapter`]
//! and returns an [`Outcome`]: the new status, connection info to materialize, whether
//! the finalizer may be released, and when to come back. It never touches Kubernetes,
//! so every lifecycle rule is testable with an in-memory adapter.
//!
//! Error handling by class:
//! - `NotFound` is success on delete paths and an out-of-band deletion elsewhere
//! - `Retryable` requeues at the poll interval until the creation timeout elapses
//! - `Terminal` stops automatic retries until the generation changes
//! - `Transient` backs off exponentially and escalates to terminal when repeated
//!
//! Deletion never escalates; the finalizer is held until absence is confirmed.

use crate::config::ReconcileSettings;
use crate::crd::ResourceStatus;
use crate::errors::{ErrorClass, OperatorError};
use crate::reconcilers::adapter::{ConnectionInfo, Identity, KindAdapter};
use crate::reconcilers::phase::{plan, Observation, Phase, Step};
use crate::reconcilers::retry::transient_requeue;
use crate::reconcilers::status::{is_condition_true, update_condition_in_memory};
use crate::resource::ManagedResource;
use crate::status_reasons::{
    CONDITION_TYPE_ERROR, CONDITION_TYPE_RUNNING, REASON_DELETING, REASON_DELETION_TIMEOUT,
    REASON_EXTERNALLY_DELETED, REASON_PENDING, REASON_PROVISIONING, REASON_RECONCILED,
    REASON_RUNNING, REASON_TIMEOUT, REASON_TRANSPORT_EXHAUSTED,
};
use chrono::{DateTime, Utc};
use kube::{Resource, ResourceExt};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// When the controller should look at the record again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requeue {
    After(Duration),
    /// Only a change to the record (or a watched dependency) triggers the next pass.
    AwaitChange,
}

/// External mutation performed during the pass, for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Created,
    Updated,
    Replaced,
    Deleted,
}

/// Result of one reconcile pass.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub step: Step,
    pub phase: Phase,
    pub status: ResourceStatus,
    /// Present once the resource is ready; the controller writes it to the target secret.
    pub connection_info: Option<ConnectionInfo>,
    pub requeue: Requeue,
    /// External absence confirmed, the finalizer can go.
    pub remove_finalizer: bool,
    pub mutation: Option<Mutation>,
    /// Reason of the error recorded in the `Error` condition, if the pass failed.
    pub error_reason: Option<&'static str>,
}

impl Outcome {
    /// True when the `Running` condition is `True` after this pass.
    #[must_use]
    pub fn is_running(&self) -> bool {
        is_condition_true(&self.status.conditions, CONDITION_TYPE_RUNNING)
    }
}

/// Run one reconcile pass for `record`.
///
/// `now` stamps condition transitions and drives the timeout checks.
pub async fn reconcile_once<A: KindAdapter>(
    adapter: &A,
    record: &A::Record,
    settings: &ReconcileSettings,
    now: DateTime<Utc>,
) -> Outcome {
    let meta = record.meta();
    let mut observation = Observation {
        generation: meta.generation.unwrap_or_default(),
        deletion_requested: meta.deletion_timestamp.is_some(),
        source_fingerprint: None,
    };
    let replace = adapter.requires_replace();
    let status = record.resource_status().cloned().unwrap_or_default();
    let step = plan(&status, &observation, replace);

    let mut pass = Pass {
        adapter,
        record,
        settings,
        now,
        generation: observation.generation,
        deletion_requested: observation.deletion_requested,
        status,
        step,
        connection_info: None,
        remove_finalizer: false,
        mutation: None,
        error_reason: None,
    };

    if !matches!(pass.step, Step::Delete | Step::Blocked) {
        match adapter.source_fingerprint(record).await {
            Ok(fingerprint) => {
                observation.source_fingerprint = fingerprint;
                pass.step = plan(&pass.status, &observation, replace);
            }
            Err(e) => {
                if matches!(pass.step, Step::Create | Step::Update | Step::Replace) {
                    pass.begin_operation();
                }
                return pass.fail(e);
            }
        }
    }

    debug!(
        kind = A::Record::KIND,
        namespace = %record.record_namespace(),
        name = %record.name_any(),
        step = %pass.step,
        generation = observation.generation,
        "Planned reconcile step"
    );

    let fingerprint = observation.source_fingerprint;
    match pass.step {
        Step::Blocked => pass.finish(Requeue::AwaitChange),
        Step::Delete => pass.delete().await,
        Step::Create => pass.create(fingerprint).await,
        Step::Update => pass.update(fingerprint).await,
        Step::Replace => pass.replace(fingerprint).await,
        Step::AwaitReady => pass.converge(Converge::Poll).await,
        Step::Observe => pass.converge(Converge::Observe).await,
    }
}

/// Why the remote resource is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Converge {
    /// Right after a create or update in the same pass; absence is eventual consistency.
    AfterMutation,
    /// Waiting for readiness; drift the remote cannot settle on its own is corrected.
    Poll,
    /// Converged; check for drift.
    Observe,
}

struct Pass<'a, A: KindAdapter> {
    adapter: &'a A,
    record: &'a A::Record,
    settings: &'a ReconcileSettings,
    now: DateTime<Utc>,
    generation: i64,
    deletion_requested: bool,
    status: ResourceStatus,
    step: Step,
    connection_info: Option<ConnectionInfo>,
    remove_finalizer: bool,
    mutation: Option<Mutation>,
    error_reason: Option<&'static str>,
}

impl<A: KindAdapter> Pass<'_, A> {
    fn describe(&self) -> String {
        format!("{} {}", A::Record::KIND, self.record.name_any())
    }

    fn now_str(&self) -> String {
        self.now.to_rfc3339()
    }

    fn set_running(&mut self, running: bool, reason: &str, message: &str) {
        let now = self.now_str();
        let status = if running { "True" } else { "False" };
        update_condition_in_memory(
            &mut self.status.conditions,
            CONDITION_TYPE_RUNNING,
            status,
            reason,
            message,
            &now,
        );
    }

    fn set_error(&mut self, failed: bool, reason: &str, message: &str) {
        let now = self.now_str();
        let status = if failed { "True" } else { "False" };
        update_condition_in_memory(
            &mut self.status.conditions,
            CONDITION_TYPE_ERROR,
            status,
            reason,
            message,
            &now,
        );
    }

    fn begin_operation(&mut self) {
        if self.status.operation_started_at.is_none() {
            self.status.operation_started_at = Some(self.now_str());
        }
    }

    fn elapsed_since(&self, started: Option<&str>) -> Option<Duration> {
        let started = DateTime::parse_from_rfc3339(started?).ok()?;
        self.now
            .signed_duration_since(started.with_timezone(&Utc))
            .to_std()
            .ok()
    }

    fn creation_timed_out(&self) -> bool {
        self.elapsed_since(self.status.operation_started_at.as_deref())
            .is_some_and(|elapsed| elapsed > self.settings.creation_timeout)
    }

    fn deletion_timed_out(&self) -> bool {
        self.elapsed_since(self.status.deletion_started_at.as_deref())
            .is_some_and(|elapsed| elapsed > self.settings.deletion_timeout)
    }

    /// Record a successful mutation of generation `self.generation`.
    fn accept(&mut self, id: String, fingerprint: Option<String>) {
        self.status.id = Some(id);
        self.status.observed_generation = Some(self.generation);
        self.status.source_fingerprint = fingerprint;
        self.status.failed_generation = None;
        self.status.failed_attempts = 0;
    }

    fn finish(self, requeue: Requeue) -> Outcome {
        let phase = if self.remove_finalizer {
            Phase::Gone
        } else {
            Phase::of(&self.status, self.deletion_requested)
        };
        Outcome {
            step: self.step,
            phase,
            status: self.status,
            connection_info: self.connection_info,
            requeue,
            remove_finalizer: self.remove_finalizer,
            mutation: self.mutation,
            error_reason: self.error_reason,
        }
    }

    async fn create(mut self, fingerprint: Option<String>) -> Outcome {
        self.begin_operation();
        if let Err(e) = self.adapter.check_preconditions(self.record).await {
            return self.fail(e);
        }

        let id = match self.adapter.create(self.record).await {
            Ok(id) => {
                info!(resource = %self.describe(), id = %id, "Created external resource");
                self.mutation = Some(Mutation::Created);
                id
            }
            Err(e) if e.is_already_exists() => match self.adopt().await {
                Ok(id) => id,
                Err(e) => return self.fail(e),
            },
            Err(e) => return self.fail(e),
        };

        self.accept(id, fingerprint);
        self.converge(Converge::AfterMutation).await
    }

    /// Take over an existing external resource that collided with a create.
    async fn adopt(&mut self) -> Result<String, OperatorError> {
        let remote = self.adapter.get(self.record, None).await?;
        if !self.adapter.matches_existing(self.record, &remote) {
            return Err(OperatorError::AdoptionRefused {
                resource: self.describe(),
                message: format!(
                    "an existing resource in state {} does not match the declared spec",
                    self.adapter.observed_state(&remote)
                ),
            });
        }

        let id = self.adapter.remote_id(&remote);
        if A::IDENTITY == Identity::Name {
            self.adapter.update(self.record, &id).await?;
            self.mutation = Some(Mutation::Updated);
        }
        info!(resource = %self.describe(), id = %id, "Adopted existing external resource");
        Ok(id)
    }

    async fn update(mut self, fingerprint: Option<String>) -> Outcome {
        self.begin_operation();
        if let Err(e) = self.adapter.check_preconditions(self.record).await {
            return self.fail(e);
        }

        let id = self.status.id.clone().unwrap_or_default();
        match self.adapter.update(self.record, &id).await {
            Ok(()) => {
                info!(resource = %self.describe(), id = %id, "Updated external resource");
                self.mutation = Some(Mutation::Updated);
            }
            Err(e) if e.is_not_found() => return self.externally_deleted(),
            Err(e) => return self.fail(e),
        }

        self.accept(id, fingerprint);
        self.converge(Converge::AfterMutation).await
    }

    async fn replace(mut self, fingerprint: Option<String>) -> Outcome {
        self.begin_operation();
        if let Err(e) = self.adapter.check_preconditions(self.record).await {
            return self.fail(e);
        }

        let old = self.status.id.clone();
        match self.adapter.delete(self.record, old.as_deref()).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return self.fail(e),
        }
        match self.adapter.get(self.record, old.as_deref()).await {
            Err(e) if e.is_not_found() => {}
            Ok(_) => {
                let message = format!(
                    "previous {} {} is still being deleted",
                    A::Record::KIND,
                    old.unwrap_or_default()
                );
                return self.fail(OperatorError::RetryLater {
                    status: 409,
                    message,
                });
            }
            Err(e) => return self.fail(e),
        }

        let id = match self.adapter.create(self.record).await {
            Ok(id) => id,
            Err(e) if e.is_already_exists() => match self.adopt().await {
                Ok(id) => id,
                Err(e) => return self.fail(e),
            },
            Err(e) => return self.fail(e),
        };
        info!(
            resource = %self.describe(),
            old_id = ?old,
            new_id = %id,
            "Replaced external resource"
        );
        self.mutation = Some(Mutation::Replaced);

        self.accept(id, fingerprint);
        self.converge(Converge::AfterMutation).await
    }

    async fn converge(mut self, mode: Converge) -> Outcome {
        let id = self.status.id.clone();
        let remote = match self.adapter.get(self.record, id.as_deref()).await {
            Ok(remote) => remote,
            Err(e) if e.is_not_found() && mode != Converge::AfterMutation => {
                return self.externally_deleted()
            }
            Err(e) if e.is_not_found() => {
                return self.not_ready("waiting for the external resource to appear");
            }
            Err(e) => return self.fail(e),
        };
        let state = self.adapter.observed_state(&remote);
        self.status.state = Some(state.clone());

        if mode != Converge::AfterMutation && self.adapter.needs_update(self.record, &remote) {
            warn!(resource = %self.describe(), state = %state, "External drift detected, updating");
            self.begin_operation();
            let id = id.unwrap_or_default();
            match self.adapter.update(self.record, &id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => return self.externally_deleted(),
                Err(e) => return self.fail(e),
            }
            self.mutation = Some(Mutation::Updated);
            return self.not_ready("correcting drift of the external resource");
        }

        if !self.adapter.is_ready(self.record, &remote) {
            return self.not_ready(&format!("external state is {state}"));
        }

        match self.adapter.connection_info(self.record, &remote).await {
            Ok(info) => self.connection_info = Some(info),
            Err(e) => return self.fail(e),
        }

        if !is_condition_true(&self.status.conditions, CONDITION_TYPE_RUNNING) {
            info!(resource = %self.describe(), state = %state, "External resource is running");
        }
        self.status.operation_started_at = None;
        self.status.failed_attempts = 0;
        self.status.failed_generation = None;
        self.set_running(true, REASON_RUNNING, &format!("external state is {state}"));
        self.set_error(false, REASON_RECONCILED, "");
        let requeue = Requeue::After(self.settings.ready_requeue);
        self.finish(requeue)
    }

    /// Only a create or update in flight is subject to the creation timeout; a converged
    /// resource that stops being ready waits indefinitely.
    fn not_ready(mut self, message: &str) -> Outcome {
        if self.creation_timed_out() {
            let message = format!(
                "not ready after {}s: {message}",
                self.settings.creation_timeout.as_secs()
            );
            return self.terminal(REASON_TIMEOUT, &message);
        }

        self.set_running(false, REASON_PROVISIONING, message);
        self.set_error(false, REASON_RECONCILED, "");
        let requeue = Requeue::After(self.settings.poll_interval);
        self.finish(requeue)
    }

    fn externally_deleted(mut self) -> Outcome {
        warn!(
            resource = %self.describe(),
            id = ?self.status.id,
            "External resource disappeared, it will be recreated"
        );
        self.status.id = None;
        self.status.observed_generation = None;
        self.status.state = None;
        self.status.operation_started_at = None;
        self.set_running(
            false,
            REASON_EXTERNALLY_DELETED,
            "external resource was deleted out of band",
        );
        let requeue = Requeue::After(self.settings.poll_interval);
        self.finish(requeue)
    }

    fn fail(mut self, err: OperatorError) -> Outcome {
        let message = err.to_string();
        match err.class() {
            ErrorClass::Terminal => self.terminal(err.reason(), &message),
            ErrorClass::Retryable | ErrorClass::NotFound => {
                if self.creation_timed_out() {
                    let message = format!(
                        "operation did not complete within {}s: {message}",
                        self.settings.creation_timeout.as_secs()
                    );
                    return self.terminal(REASON_TIMEOUT, &message);
                }

                warn!(resource = %self.describe(), reason = err.reason(), "{message}");
                self.set_error(true, err.reason(), &message);
                if !is_condition_true(&self.status.conditions, CONDITION_TYPE_RUNNING) {
                    let reason = if self.status.observed_generation.is_some() {
                        REASON_PROVISIONING
                    } else {
                        REASON_PENDING
                    };
                    self.set_running(false, reason, &message);
                }
                self.error_reason = Some(err.reason());
                let requeue = Requeue::After(self.settings.poll_interval);
                self.finish(requeue)
            }
            ErrorClass::Transient => {
                self.status.failed_attempts = self.status.failed_attempts.saturating_add(1);
                let attempts = self.status.failed_attempts;
                if attempts >= self.settings.max_transient_failures {
                    let message = format!("giving up after {attempts} consecutive failures: {message}");
                    return self.terminal(REASON_TRANSPORT_EXHAUSTED, &message);
                }

                warn!(
                    resource = %self.describe(),
                    attempts,
                    "{message}"
                );
                self.set_error(true, err.reason(), &message);
                self.error_reason = Some(err.reason());
                let requeue = Requeue::After(transient_requeue(
                    attempts,
                    self.settings.transient_backoff_base,
                ));
                self.finish(requeue)
            }
        }
    }

    /// Stop automatic retries of this generation.
    fn terminal(mut self, reason: &'static str, message: &str) -> Outcome {
        error!(
            resource = %self.describe(),
            generation = self.generation,
            reason,
            "{message}"
        );
        self.status.failed_generation = Some(self.generation);
        self.status.operation_started_at = None;
        self.status.failed_attempts = 0;
        self.set_running(false, reason, message);
        self.set_error(true, reason, message);
        self.error_reason = Some(reason);
        self.finish(Requeue::AwaitChange)
    }

    async fn delete(mut self) -> Outcome {
        if self.status.deletion_started_at.is_none() {
            self.status.deletion_started_at = Some(self.now_str());
        }
        self.set_running(false, REASON_DELETING, "deleting external resource");

        let id = self.status.id.clone();
        match self.adapter.delete(self.record, id.as_deref()).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return self.delete_failed(e),
        }

        match self.adapter.get(self.record, id.as_deref()).await {
            Err(e) if e.is_not_found() => {
                info!(resource = %self.describe(), id = ?id, "External resource deleted");
                self.mutation = Some(Mutation::Deleted);
                self.remove_finalizer = true;
                self.finish(Requeue::AwaitChange)
            }
            Ok(remote) => {
                let state = self.adapter.observed_state(&remote);
                self.status.state = Some(state.clone());
                if self.deletion_timed_out() {
                    let message = format!("external resource still present in state {state}");
                    return self.deletion_timeout(&message);
                }
                self.set_running(
                    false,
                    REASON_DELETING,
                    &format!("waiting for external deletion, state is {state}"),
                );
                let requeue = Requeue::After(self.settings.poll_interval);
                self.finish(requeue)
            }
            Err(e) => self.delete_failed(e),
        }
    }

    fn delete_failed(mut self, err: OperatorError) -> Outcome {
        let message = err.to_string();
        if self.deletion_timed_out() {
            return self.deletion_timeout(&message);
        }

        warn!(resource = %self.describe(), reason = err.reason(), "Deletion failed: {message}");
        self.set_error(true, err.reason(), &message);
        self.error_reason = Some(err.reason());
        let delay = match err.class() {
            ErrorClass::Transient => {
                self.status.failed_attempts = self.status.failed_attempts.saturating_add(1);
                transient_requeue(
                    self.status.failed_attempts,
                    self.settings.transient_backoff_base,
                )
            }
            ErrorClass::Terminal => self.settings.ready_requeue,
            ErrorClass::Retryable | ErrorClass::NotFound => self.settings.poll_interval,
        };
        self.finish(Requeue::After(delay))
    }

    /// Deletion is overdue. Keep the finalizer and keep trying, more slowly.
    fn deletion_timeout(mut self, message: &str) -> Outcome {
        let message = format!(
            "deletion not confirmed after {}s: {message}",
            self.settings.deletion_timeout.as_secs()
        );
        error!(resource = %self.describe(), "{message}");
        self.set_error(true, REASON_DELETION_TIMEOUT, &message);
        self.error_reason = Some(REASON_DELETION_TIMEOUT);
        let requeue = Requeue::After(self.settings.ready_requeue);
        self.finish(requeue)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
