// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # msop - Managed Service Operator for Kubernetes
//!
//! msop reconciles Kubernetes custom resources against a managed-service control plane.
//! Each record declares a service, or something living on one, and the operator creates,
//! updates and deletes the matching external resource until the two agree.
//!
//! ## Overview
//!
//! - Custom Resource Definitions for services, users, databases, pools, topics, ACLs,
//!   project VPCs and service integrations
//! - One generic reconciler with a small adapter per kind
//! - Connection details written to Kubernetes secrets
//! - Credentials read back from user-provided secrets and re-applied when they change
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`controlplane`] - HTTP client for the control plane API
//! - [`reconcilers`] - The generic state machine and its building blocks
//! - [`kinds`] - Per-kind adapters
//! - [`secrets`] - Secret materialization and source secrets
//! - [`controller`] - Wiring of adapters into kube-runtime controllers
//! - [`context`] - Shared context for controllers
//! - [`config`] - Command line and environment configuration
//! - [`metrics`] - Prometheus metrics and the health endpoints
//!
//! ## Example
//!
//! ```rust,no_run
//! use msop::crd::{PostgreSQL, PostgreSQLSpec, ServiceCommonSpec};
//!
//! let spec = PostgreSQLSpec {
//!     common: ServiceCommonSpec {
//!         project: "acme".to_string(),
//!         plan: "business-4".to_string(),
//!         cloud_name: Some("google-europe-west1".to_string()),
//!         ..Default::default()
//!     },
//!     fork_from_service_name: None,
//! };
//! let pg = PostgreSQL::new("orders-db", spec);
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod controlplane;
pub mod crd;
pub mod crdgen;
pub mod errors;
pub mod http_errors;
pub mod kinds;
pub mod labels;
pub mod metrics;
pub mod reconcilers;
pub mod record_impls;
pub mod resource;
pub mod secrets;
pub mod status_reasons;

#[cfg(test)]
mod crd_tests;
#[cfg(test)]
mod record_impls_tests;
