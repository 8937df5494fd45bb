// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dependency resolution.
//!
//! A record may only be created once every reference it declares resolves to a
//! converged resource. Declared records are consulted first; a reference with no
//! declared record falls back to the control plane, so resources created outside the
//! cluster can be referenced too.
//!
//! - declared and `Running` → ready
//! - declared but not yet `Running` → `DependencyNotReady`, retried at the poll interval
//! - neither declared nor present on the control plane → `DependencyMissing`
//!
//! Watch mappers use [`dependents_in`] to requeue dependents when a referent changes.

use crate::constants::SERVICE_STATE_RUNNING;
use crate::controlplane::ControlPlaneClient;
use crate::crd::{Database, Kafka, PostgreSQL, ProjectVPC, ResourceReference, ServiceUser};
use crate::errors::OperatorError;
use crate::reconcilers::retry::retry_api_call;
use crate::resource::{Dependency, DependencyTarget, ManagedResource};
use async_trait::async_trait;
use kube::api::ListParams;
use kube::runtime::reflector::ObjectRef;
use kube::{Api, Client};
use tracing::debug;

/// Resolution state of one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Exists but has not converged; the reason is shown in the dependent's status.
    NotReady(String),
    Absent,
}

/// Where dependencies are looked up.
#[async_trait]
pub trait DependencyLookup: Send + Sync {
    /// Readiness of the declared record satisfying `dependency`.
    async fn declared(&self, dependency: &Dependency) -> Result<Readiness, OperatorError>;

    /// Readiness of the external resource satisfying `dependency` in `project`.
    async fn external(
        &self,
        project: &str,
        dependency: &Dependency,
    ) -> Result<Readiness, OperatorError>;
}

/// Check every dependency in order and fail on the first one that is not ready.
///
/// # Errors
///
/// Returns `DependencyNotReady` or `DependencyMissing` for the first unresolved
/// dependency, or the lookup error itself.
pub async fn ensure_ready<L: DependencyLookup + ?Sized>(
    lookup: &L,
    project: &str,
    dependencies: &[Dependency],
) -> Result<(), OperatorError> {
    for dependency in dependencies {
        let readiness = match lookup.declared(dependency).await? {
            Readiness::Absent => lookup.external(project, dependency).await?,
            declared => declared,
        };

        match readiness {
            Readiness::Ready => debug!(dependency = %dependency, "Dependency is ready"),
            Readiness::NotReady(reason) => {
                return Err(OperatorError::dependency_not_ready(format!(
                    "{dependency} is not ready: {reason}"
                )))
            }
            Readiness::Absent => {
                return Err(OperatorError::dependency_missing(format!(
                    "{dependency} does not exist"
                )))
            }
        }
    }
    Ok(())
}

/// Readiness of a declared record from its `Running` condition.
#[must_use]
pub fn readiness_of<K: ManagedResource>(record: &K) -> Readiness {
    if record.is_ready_to_use() {
        return Readiness::Ready;
    }
    let state = record
        .resource_status()
        .and_then(|status| status.state.as_deref())
        .unwrap_or("not yet created");
    Readiness::NotReady(format!("{} state is {state}", K::KIND))
}

/// Records among `records` that declare `provided` as a dependency.
pub fn dependents_in<'a, K, I>(records: I, provided: &Dependency) -> Vec<ObjectRef<K>>
where
    K: ManagedResource + 'a,
    I: IntoIterator<Item = &'a K>,
{
    records
        .into_iter()
        .filter(|record| record.dependencies().contains(provided))
        .map(ObjectRef::from_obj)
        .collect()
}

/// Lookup against the Kubernetes API and the control plane.
#[derive(Clone)]
pub struct ClusterLookup {
    pub client: Client,
    pub control_plane: ControlPlaneClient,
}

impl ClusterLookup {
    async fn named<K: ManagedResource>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<K>, OperatorError> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        retry_api_call(
            || api.get_opt(name),
            &format!("get {} {namespace}/{name}", K::KIND),
        )
        .await
    }

    async fn providing<K: ManagedResource>(
        &self,
        dependency: &Dependency,
    ) -> Result<Option<K>, OperatorError> {
        let api: Api<K> = Api::namespaced(self.client.clone(), &dependency.namespace);
        let list = retry_api_call(
            || async { api.list(&ListParams::default()).await },
            &format!("list {} in {}", K::KIND, dependency.namespace),
        )
        .await?;
        Ok(list
            .items
            .into_iter()
            .find(|record| record.provides().as_ref() == Some(dependency)))
    }
}

fn readiness_or_absent<K: ManagedResource>(record: Option<K>) -> Readiness {
    record.as_ref().map_or(Readiness::Absent, readiness_of)
}

fn absent_if_not_found<T>(
    result: Result<T, OperatorError>,
    ready: impl FnOnce(T) -> Readiness,
) -> Result<Readiness, OperatorError> {
    match result {
        Ok(found) => Ok(ready(found)),
        Err(e) if e.is_not_found() => Ok(Readiness::Absent),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl DependencyLookup for ClusterLookup {
    async fn declared(&self, dependency: &Dependency) -> Result<Readiness, OperatorError> {
        let namespace = dependency.namespace.as_str();
        match &dependency.target {
            DependencyTarget::Service { name } => {
                if let Some(pg) = self.named::<PostgreSQL>(namespace, name).await? {
                    return Ok(readiness_of(&pg));
                }
                Ok(readiness_or_absent(self.named::<Kafka>(namespace, name).await?))
            }
            DependencyTarget::ProjectVpc { name } => Ok(readiness_or_absent(
                self.named::<ProjectVPC>(namespace, name).await?,
            )),
            DependencyTarget::Database { .. } => Ok(readiness_or_absent(
                self.providing::<Database>(dependency).await?,
            )),
            DependencyTarget::ServiceUser { .. } => Ok(readiness_or_absent(
                self.providing::<ServiceUser>(dependency).await?,
            )),
        }
    }

    async fn external(
        &self,
        project: &str,
        dependency: &Dependency,
    ) -> Result<Readiness, OperatorError> {
        match &dependency.target {
            DependencyTarget::Service { name } => absent_if_not_found(
                self.control_plane.get_service(project, name).await,
                |service| {
                    if service.state == SERVICE_STATE_RUNNING {
                        Readiness::Ready
                    } else {
                        Readiness::NotReady(format!("service state is {}", service.state))
                    }
                },
            ),
            // A VPC reference names a ProjectVPC record; there is nothing to look up by name.
            DependencyTarget::ProjectVpc { .. } => Ok(Readiness::Absent),
            DependencyTarget::Database { service, name } => absent_if_not_found(
                self.control_plane.get_database(project, service, name).await,
                |_| Readiness::Ready,
            ),
            DependencyTarget::ServiceUser { service, name } => absent_if_not_found(
                self.control_plane.get_user(project, service, name).await,
                |_| Readiness::Ready,
            ),
        }
    }
}

/// Resolve a `projectVPCRef` to the VPC id recorded on the referenced record.
///
/// # Errors
///
/// Returns `DependencyMissing` when the record does not exist and
/// `DependencyNotReady` while it has no id or is not yet active.
pub async fn resolve_project_vpc_id(
    client: &Client,
    namespace: &str,
    reference: &ResourceReference,
) -> Result<String, OperatorError> {
    let namespace = reference.namespace.as_deref().unwrap_or(namespace);
    let api: Api<ProjectVPC> = Api::namespaced(client.clone(), namespace);
    let vpc = retry_api_call(
        || api.get_opt(&reference.name),
        &format!("get ProjectVPC {namespace}/{}", reference.name),
    )
    .await?
    .ok_or_else(|| {
        OperatorError::dependency_missing(format!(
            "ProjectVPC {namespace}/{} does not exist",
            reference.name
        ))
    })?;

    match (vpc.is_ready_to_use(), vpc.resource_status().and_then(|s| s.id.clone())) {
        (true, Some(id)) => Ok(id),
        _ => Err(OperatorError::dependency_not_ready(format!(
            "ProjectVPC {namespace}/{} is not active yet",
            reference.name
        ))),
    }
}

#[cfg(test)]
#[path = "dependencies_tests.rs"]
mod dependencies_tests;
