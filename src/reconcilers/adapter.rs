// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The capability interface every resource kind plugs into the generic reconciler.
//!
//! An adapter maps one kind's spec to control plane calls. It never decides whether to
//! retry, give up or adopt; it returns classified [`OperatorError`]s and the executor in
//! [`crate::reconcilers::engine`] decides.
//!
//! Idempotency rules every adapter follows:
//! - `create` reports a name collision as `AlreadyExists`, never as success
//! - `get` and `delete` report an absent resource (or absent parent) as `NotFound`
//! - `get` and `delete` with `id == None` look the resource up by its spec attributes

use crate::errors::OperatorError;
use crate::resource::ManagedResource;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// How the external resource is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// By a stable name taken from the spec. `update` after a create collision adopts it.
    Name,
    /// By an id assigned by the control plane on create.
    ServerAssigned,
}

/// Connection information rendered into the materialized secret, keyed without prefix.
pub type ConnectionInfo = BTreeMap<String, String>;

/// Kind-specific logic behind the generic reconciler.
#[async_trait]
pub trait KindAdapter: Send + Sync + 'static {
    /// The declared record type.
    type Record: ManagedResource;

    /// The control plane document returned by `get`.
    type Remote: Debug + Send + Sync;

    /// How the external resource is addressed.
    const IDENTITY: Identity;

    /// Verify that every dependency reference resolves to a converged resource.
    ///
    /// Returns `DependencyNotReady` while a referent is converging and
    /// `DependencyMissing` when a reference resolves to nothing.
    async fn check_preconditions(&self, _record: &Self::Record) -> Result<(), OperatorError> {
        Ok(())
    }

    /// Salted fingerprint of the source-secret value the record depends on, if any.
    async fn source_fingerprint(
        &self,
        _record: &Self::Record,
    ) -> Result<Option<String>, OperatorError> {
        Ok(None)
    }

    /// Create the external resource and return its identifier.
    async fn create(&self, record: &Self::Record) -> Result<String, OperatorError>;

    /// Apply the mutable part of the spec to an existing resource.
    async fn update(&self, record: &Self::Record, id: &str) -> Result<(), OperatorError>;

    /// Fetch the external resource.
    async fn get(
        &self,
        record: &Self::Record,
        id: Option<&str>,
    ) -> Result<Self::Remote, OperatorError>;

    /// Delete the external resource.
    async fn delete(&self, record: &Self::Record, id: Option<&str>) -> Result<(), OperatorError>;

    /// Key/value pairs for the materialized secret. Empty for kinds without one.
    async fn connection_info(
        &self,
        _record: &Self::Record,
        _remote: &Self::Remote,
    ) -> Result<ConnectionInfo, OperatorError> {
        Ok(ConnectionInfo::new())
    }

    /// Kind-specific readiness predicate.
    fn is_ready(&self, record: &Self::Record, remote: &Self::Remote) -> bool;

    /// Free-form external state written to `status.state`.
    fn observed_state(&self, remote: &Self::Remote) -> String;

    /// Identifier of a fetched resource.
    fn remote_id(&self, remote: &Self::Remote) -> String;

    /// Whether an existing resource found on a create collision may be adopted.
    fn matches_existing(&self, record: &Self::Record, remote: &Self::Remote) -> bool;

    /// Out-of-band drift that calls for an update, checked while awaiting readiness
    /// and once converged. Must stay false while the remote is still settling.
    fn needs_update(&self, _record: &Self::Record, _remote: &Self::Remote) -> bool {
        false
    }

    /// Spec changes are realised as delete-then-create instead of an update.
    fn requires_replace(&self) -> bool {
        false
    }
}
