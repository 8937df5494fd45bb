// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Database` adapter. Databases have nothing mutable once created.

use super::check_termination_protection;
use crate::constants::STATE_ACTIVE;
use crate::controlplane::types::{CreateDatabaseRequest, DatabaseInfo};
use crate::crd::Database;
use crate::errors::OperatorError;
use crate::reconcilers::adapter::{Identity, KindAdapter};
use crate::reconcilers::dependencies::{ensure_ready, ClusterLookup};
use crate::resource::ManagedResource;
use async_trait::async_trait;

pub struct DatabaseAdapter {
    cluster: ClusterLookup,
}

impl DatabaseAdapter {
    #[must_use]
    pub fn new(cluster: ClusterLookup) -> Self {
        Self { cluster }
    }
}

/// A locale set in the spec must equal the existing one.
fn locale_matches(wanted: Option<&String>, existing: Option<&String>) -> bool {
    wanted.is_none_or(|wanted| existing == Some(wanted))
}

#[async_trait]
impl KindAdapter for DatabaseAdapter {
    type Record = Database;
    type Remote = DatabaseInfo;

    const IDENTITY: Identity = Identity::Name;

    async fn check_preconditions(&self, record: &Database) -> Result<(), OperatorError> {
        ensure_ready(&self.cluster, record.project(), &record.dependencies()).await
    }

    async fn create(&self, record: &Database) -> Result<String, OperatorError> {
        let request = CreateDatabaseRequest {
            database: record.database_name(),
            lc_collate: record.spec.lc_collate.clone(),
            lc_ctype: record.spec.lc_ctype.clone(),
        };
        self.cluster
            .control_plane
            .create_database(record.project(), &record.spec.service_name, &request)
            .await?;
        Ok(request.database)
    }

    async fn update(&self, _record: &Database, _id: &str) -> Result<(), OperatorError> {
        Ok(())
    }

    async fn get(&self, record: &Database, id: Option<&str>) -> Result<DatabaseInfo, OperatorError> {
        let name = id.map_or_else(|| record.database_name(), str::to_string);
        self.cluster
            .control_plane
            .get_database(record.project(), &record.spec.service_name, &name)
            .await
    }

    async fn delete(&self, record: &Database, id: Option<&str>) -> Result<(), OperatorError> {
        let name = id.map_or_else(|| record.database_name(), str::to_string);
        check_termination_protection(
            record.spec.termination_protection,
            &format!("database {name}"),
        )?;
        self.cluster
            .control_plane
            .delete_database(record.project(), &record.spec.service_name, &name)
            .await
    }

    fn is_ready(&self, _record: &Database, _remote: &DatabaseInfo) -> bool {
        true
    }

    fn observed_state(&self, _remote: &DatabaseInfo) -> String {
        STATE_ACTIVE.to_string()
    }

    fn remote_id(&self, remote: &DatabaseInfo) -> String {
        remote.database_name.clone()
    }

    fn matches_existing(&self, record: &Database, remote: &DatabaseInfo) -> bool {
        locale_matches(record.spec.lc_collate.as_ref(), remote.lc_collate.as_ref())
            && locale_matches(record.spec.lc_ctype.as_ref(), remote.lc_ctype.as_ref())
    }
}

#[cfg(test)]
#[path = "database_tests.rs"]
mod database_tests;
