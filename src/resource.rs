// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The typed interface every managed resource kind implements.
//!
//! [`ManagedResource`] is what the generic reconciler, the secret materializer and the
//! watch mappers see of a declared record: its status, its secret options, and the
//! dependency references that gate its creation. Implementations live in
//! [`crate::record_impls`].

use crate::crd::{Condition, ConnInfoSecretSource, ConnInfoSecretTarget, ResourceStatus};
use crate::status_reasons::CONDITION_TYPE_RUNNING;
use kube::{Resource, ResourceExt};
use k8s_openapi::NamespaceResourceScope;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// What a dependency reference points at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DependencyTarget {
    /// A service of any kind, by external service name.
    Service {
        /// External service name
        name: String,
    },
    /// A `ProjectVPC` record, by record name.
    ProjectVpc {
        /// Record name
        name: String,
    },
    /// A database on a service, by external database name.
    Database {
        /// External service name
        service: String,
        /// External database name
        name: String,
    },
    /// A user on a service, by external user name.
    ServiceUser {
        /// External service name
        service: String,
        /// External user name
        name: String,
    },
}

/// A namespaced dependency reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// Namespace in which referenced records are looked up.
    pub namespace: String,
    /// What is referenced.
    pub target: DependencyTarget,
}

impl Dependency {
    /// Reference to a service in `namespace`.
    pub fn service(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            target: DependencyTarget::Service { name: name.into() },
        }
    }

    /// Reference to a `ProjectVPC` record.
    pub fn project_vpc(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            target: DependencyTarget::ProjectVpc { name: name.into() },
        }
    }

    /// Reference to a database on a service.
    pub fn database(
        namespace: impl Into<String>,
        service: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            target: DependencyTarget::Database {
                service: service.into(),
                name: name.into(),
            },
        }
    }

    /// Reference to a user on a service.
    pub fn service_user(
        namespace: impl Into<String>,
        service: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            target: DependencyTarget::ServiceUser {
                service: service.into(),
                name: name.into(),
            },
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            DependencyTarget::Service { name } => write!(f, "service {}/{name}", self.namespace),
            DependencyTarget::ProjectVpc { name } => {
                write!(f, "ProjectVPC {}/{name}", self.namespace)
            }
            DependencyTarget::Database { service, name } => {
                write!(f, "database {name} on service {}/{service}", self.namespace)
            }
            DependencyTarget::ServiceUser { service, name } => {
                write!(f, "user {name} on service {}/{service}", self.namespace)
            }
        }
    }
}

/// A declared record managed by msop.
pub trait ManagedResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
    /// The resource kind (e.g. `PostgreSQL`)
    const KIND: &'static str;

    /// Default key prefix of the materialized secret, `None` for kinds without connection info.
    const SECRET_PREFIX: Option<&'static str> = None;

    /// Shared status, if the record has been reconciled at least once.
    fn resource_status(&self) -> Option<&ResourceStatus>;

    /// Project the external resource lives in.
    fn project(&self) -> &str;

    /// Where to write connection information.
    fn conn_info_secret_target(&self) -> Option<&ConnInfoSecretTarget> {
        None
    }

    /// Whether the record opted out of secret materialization.
    fn conn_info_secret_target_disabled(&self) -> bool {
        false
    }

    /// Secret supplying a credential value.
    fn conn_info_secret_source(&self) -> Option<&ConnInfoSecretSource> {
        None
    }

    /// References that must resolve to converged resources before creation.
    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    /// The reference this record satisfies for other records, if any.
    fn provides(&self) -> Option<Dependency> {
        None
    }

    /// Status conditions.
    fn conditions(&self) -> &[Condition] {
        self.resource_status()
            .map(|status| status.conditions.as_slice())
            .unwrap_or(&[])
    }

    /// True when the `Running` condition is `True`.
    fn is_ready_to_use(&self) -> bool {
        self.conditions()
            .iter()
            .any(|c| c.r#type == CONDITION_TYPE_RUNNING && c.status == "True")
    }

    /// Namespace of the record. Every kind is namespaced; an empty string means unset.
    fn record_namespace(&self) -> String {
        self.namespace().unwrap_or_default()
    }

    /// `kind/namespace/name` identity used for single-flight locking and logging.
    fn record_key(&self) -> String {
        format!("{}/{}/{}", Self::KIND, self.record_namespace(), self.name_any())
    }
}
