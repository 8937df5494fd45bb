// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all controllers.
//!
//! Every controller receives an `Arc<Context>` holding:
//! - the Kubernetes client
//! - the control plane client, whose connection pool and credentials are process-wide
//! - the reconcile settings, read-only after startup
//! - the keyed locks that serialize reconciles of one record

use crate::config::ReconcileSettings;
use crate::controlplane::ControlPlaneClient;
use crate::reconcilers::dependencies::ClusterLookup;
use crate::reconcilers::single_flight::KeyedLocks;
use kube::Client;

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Control plane API client
    pub control_plane: ControlPlaneClient,

    /// Requeue intervals, timeouts and retry limits
    pub settings: ReconcileSettings,

    /// One lock per `kind/namespace/name`, shared by every controller
    pub locks: KeyedLocks,
}

impl Context {
    #[must_use]
    pub fn new(
        client: Client,
        control_plane: ControlPlaneClient,
        settings: ReconcileSettings,
    ) -> Self {
        Self {
            client,
            control_plane,
            settings,
            locks: KeyedLocks::new(),
        }
    }

    /// Clients adapters use to resolve dependencies and call the control plane.
    #[must_use]
    pub fn cluster(&self) -> ClusterLookup {
        ClusterLookup {
            client: self.client.clone(),
            control_plane: self.control_plane.clone(),
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
