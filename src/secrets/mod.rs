// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes secrets written and read on behalf of declared records.
//!
//! - [`materialize`] renders a record's connection information into a `Secret`
//!   owned by the record and applies it with server-side apply.
//! - [`source`] reads a credential value a record takes from an existing secret and
//!   fingerprints it, so value rotations can be detected without storing the value.
//! - [`watcher`] maps a changed secret to the records that source from it.

pub mod materialize;
pub mod source;
pub mod watcher;
