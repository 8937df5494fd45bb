// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic reconciliation of managed resources.
//!
//! Every kind is reconciled by the same state machine; only the [`adapter::KindAdapter`]
//! differs per kind.
//!
//! # Reconciliation Architecture
//!
//! 1. **Plan** - [`phase::plan`] picks one step from the stored status and the record
//! 2. **Execute** - [`engine::reconcile_once`] runs the step against the adapter
//! 3. **Persist** - the controller writes the resulting status, secret and markers
//!
//! # Modules
//!
//! - [`adapter`] - The per-kind capability interface
//! - [`dependencies`] - Dependency readiness checks and reverse lookups
//! - [`engine`] - The executor; no Kubernetes writes happen here
//! - [`finalizers`] - Finalizer add and remove
//! - [`phase`] - Lifecycle phases and the step planner
//! - [`retry`] - Exponential backoff for Kubernetes API calls
//! - [`single_flight`] - Keyed locks serializing reconciles of one record
//! - [`status`] - Condition helpers and status writes

pub mod adapter;
pub mod dependencies;
pub mod engine;
pub mod finalizers;
pub mod phase;
pub mod retry;
pub mod single_flight;
pub mod status;

pub use adapter::{ConnectionInfo, Identity, KindAdapter};
pub use engine::{reconcile_once, Mutation, Outcome, Requeue};
pub use phase::{Phase, Step};
