// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `ConnectionPool` adapter.
//!
//! Pools have no endpoint of their own. They are read from the service document, which
//! also carries the `pgbouncer` endpoint and the pool user's password.

use super::require;
use crate::constants::{DEFAULT_POOL_SIZE, DEFAULT_SSLMODE, STATE_ACTIVE};
use crate::controlplane::types::{ConnectionPoolInfo, ConnectionPoolRequest, Service};
use crate::crd::ConnectionPool;
use crate::errors::OperatorError;
use crate::reconcilers::adapter::{ConnectionInfo, Identity, KindAdapter};
use crate::reconcilers::dependencies::{ensure_ready, ClusterLookup};
use crate::resource::ManagedResource;
use async_trait::async_trait;
use kube::ResourceExt;

/// Component serving pooled connections.
const PGBOUNCER_COMPONENT: &str = "pgbouncer";

/// A pool together with the service document it was read from.
#[derive(Debug, Clone)]
pub struct PoolRemote {
    pub service: Service,
    pub pool: ConnectionPoolInfo,
}

pub struct ConnectionPoolAdapter {
    cluster: ClusterLookup,
}

impl ConnectionPoolAdapter {
    #[must_use]
    pub fn new(cluster: ClusterLookup) -> Self {
        Self { cluster }
    }
}

fn pool_size(record: &ConnectionPool) -> u32 {
    record.spec.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
}

fn pool_mode(record: &ConnectionPool) -> &'static str {
    record.spec.pool_mode.unwrap_or_default().as_str()
}

/// Request body for `record`; `pool_name` is only sent on create.
#[must_use]
pub fn pool_request(record: &ConnectionPool, pool_name: Option<String>) -> ConnectionPoolRequest {
    ConnectionPoolRequest {
        pool_name,
        database: record.spec.database_name.clone(),
        username: record.spec.username.clone(),
        pool_size: pool_size(record),
        pool_mode: pool_mode(record).to_string(),
    }
}

#[async_trait]
impl KindAdapter for ConnectionPoolAdapter {
    type Record = ConnectionPool;
    type Remote = PoolRemote;

    const IDENTITY: Identity = Identity::Name;

    async fn check_preconditions(&self, record: &ConnectionPool) -> Result<(), OperatorError> {
        ensure_ready(&self.cluster, record.project(), &record.dependencies()).await
    }

    async fn create(&self, record: &ConnectionPool) -> Result<String, OperatorError> {
        let name = record.name_any();
        self.cluster
            .control_plane
            .create_connection_pool(
                record.project(),
                &record.spec.service_name,
                &pool_request(record, Some(name.clone())),
            )
            .await?;
        Ok(name)
    }

    async fn update(&self, record: &ConnectionPool, id: &str) -> Result<(), OperatorError> {
        self.cluster
            .control_plane
            .update_connection_pool(
                record.project(),
                &record.spec.service_name,
                id,
                &pool_request(record, None),
            )
            .await
    }

    async fn get(
        &self,
        record: &ConnectionPool,
        id: Option<&str>,
    ) -> Result<PoolRemote, OperatorError> {
        let name = id.map_or_else(|| record.name_any(), str::to_string);
        let service = self
            .cluster
            .control_plane
            .get_service(record.project(), &record.spec.service_name)
            .await?;
        let pool = service.connection_pool(&name).cloned().ok_or_else(|| {
            OperatorError::not_found(format!(
                "connection pool {name} on service {}",
                record.spec.service_name
            ))
        })?;
        Ok(PoolRemote { service, pool })
    }

    async fn delete(&self, record: &ConnectionPool, id: Option<&str>) -> Result<(), OperatorError> {
        let name = id.map_or_else(|| record.name_any(), str::to_string);
        self.cluster
            .control_plane
            .delete_connection_pool(record.project(), &record.spec.service_name, &name)
            .await
    }

    async fn connection_info(
        &self,
        record: &ConnectionPool,
        remote: &PoolRemote,
    ) -> Result<ConnectionInfo, OperatorError> {
        let ca_cert = self
            .cluster
            .control_plane
            .get_project_ca(record.project())
            .await?;
        connection_info(record, remote, ca_cert)
    }

    fn is_ready(&self, _record: &ConnectionPool, _remote: &PoolRemote) -> bool {
        true
    }

    fn observed_state(&self, _remote: &PoolRemote) -> String {
        STATE_ACTIVE.to_string()
    }

    fn remote_id(&self, remote: &PoolRemote) -> String {
        remote.pool.pool_name.clone()
    }

    fn matches_existing(&self, record: &ConnectionPool, remote: &PoolRemote) -> bool {
        remote.pool.database == record.spec.database_name
            && remote.pool.username.as_deref() == Some(record.spec.username.as_str())
    }

    fn needs_update(&self, record: &ConnectionPool, remote: &PoolRemote) -> bool {
        remote.pool.pool_size != Some(pool_size(record))
            || remote.pool.pool_mode.as_deref() != Some(pool_mode(record))
    }
}

/// Connection key set of a pool. Clients connect to `pgbouncer` using the pool name as
/// database name.
///
/// # Errors
///
/// Returns `Transport` when the service lacks the `pgbouncer` endpoint or the pool
/// user's password.
pub fn connection_info(
    record: &ConnectionPool,
    remote: &PoolRemote,
    ca_cert: String,
) -> Result<ConnectionInfo, OperatorError> {
    let service = &remote.service;
    let source = format!("service {}", service.service_name);
    let pgbouncer = service.component(PGBOUNCER_COMPONENT);
    let password = service
        .user(&record.spec.username)
        .and_then(|user| user.password.clone());
    let sslmode = service
        .service_uri_params
        .get("sslmode")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SSLMODE.to_string());

    let mut info = ConnectionInfo::new();
    require(&mut info, "HOST", pgbouncer.map(|c| &c.host), &source)?;
    require(&mut info, "PORT", pgbouncer.map(|c| c.port), &source)?;
    info.insert("DATABASE".to_string(), remote.pool.pool_name.clone());
    info.insert("USER".to_string(), record.spec.username.clone());
    require(&mut info, "PASSWORD", password.as_ref(), &source)?;
    info.insert("SSLMODE".to_string(), sslmode.clone());

    let uri = match &remote.pool.connection_uri {
        Some(uri) => uri.clone(),
        None => format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={sslmode}",
            info["USER"], info["PASSWORD"], info["HOST"], info["PORT"], info["DATABASE"]
        ),
    };
    info.insert("DATABASE_URI".to_string(), uri);
    info.insert("CA_CERT".to_string(), ca_cert);
    Ok(info)
}

#[cfg(test)]
#[path = "connection_pool_tests.rs"]
mod connection_pool_tests;
