// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Logical database and connection pool endpoints.
//!
//! Neither family has a single-item GET. Databases are found by listing them, and pools
//! are read from the service document.

use super::types::{
    ConnectionPoolInfo, ConnectionPoolRequest, CreateDatabaseRequest, DatabaseInfo, DatabaseList,
};
use super::ControlPlaneClient;
use crate::errors::OperatorError;
use reqwest::Method;
use tracing::info;

impl ControlPlaneClient {
    /// List the databases of a service.
    pub async fn list_databases(
        &self,
        project: &str,
        service: &str,
    ) -> Result<Vec<DatabaseInfo>, OperatorError> {
        let list: DatabaseList = self
            .get_json(
                &["project", project, "service", service, "db"],
                &format!("databases of service {service}"),
            )
            .await?;
        Ok(list.databases)
    }

    /// Find one database by name. A missing service or database is `NotFound`.
    pub async fn get_database(
        &self,
        project: &str,
        service: &str,
        database: &str,
    ) -> Result<DatabaseInfo, OperatorError> {
        self.list_databases(project, service)
            .await?
            .into_iter()
            .find(|db| db.database_name == database)
            .ok_or_else(|| {
                OperatorError::not_found(format!("database {database} on service {service}"))
            })
    }

    /// Create a database. Returns `AlreadyExists` when the name is taken.
    pub async fn create_database(
        &self,
        project: &str,
        service: &str,
        request: &CreateDatabaseRequest,
    ) -> Result<(), OperatorError> {
        self.send(
            Method::POST,
            &["project", project, "service", service, "db"],
            Some(request),
            &format!("database {} on service {service}", request.database),
        )
        .await?;

        info!(project = %project, service = %service, database = %request.database, "Created database");
        Ok(())
    }

    /// Delete a database.
    pub async fn delete_database(
        &self,
        project: &str,
        service: &str,
        database: &str,
    ) -> Result<(), OperatorError> {
        self.send(
            Method::DELETE,
            &["project", project, "service", service, "db", database],
            None::<&()>,
            &format!("database {database} on service {service}"),
        )
        .await?;

        info!(project = %project, service = %service, database = %database, "Deleted database");
        Ok(())
    }

    /// Find one connection pool in the service document.
    pub async fn get_connection_pool(
        &self,
        project: &str,
        service: &str,
        pool: &str,
    ) -> Result<ConnectionPoolInfo, OperatorError> {
        self.get_service(project, service)
            .await?
            .connection_pool(pool)
            .cloned()
            .ok_or_else(|| {
                OperatorError::not_found(format!("connection pool {pool} on service {service}"))
            })
    }

    /// Create a connection pool. `request.pool_name` must be set.
    pub async fn create_connection_pool(
        &self,
        project: &str,
        service: &str,
        request: &ConnectionPoolRequest,
    ) -> Result<(), OperatorError> {
        let pool = request.pool_name.as_deref().unwrap_or_default();
        self.send(
            Method::POST,
            &["project", project, "service", service, "connection_pool"],
            Some(request),
            &format!("connection pool {pool} on service {service}"),
        )
        .await?;

        info!(project = %project, service = %service, pool = %pool, "Created connection pool");
        Ok(())
    }

    /// Update a connection pool in place.
    pub async fn update_connection_pool(
        &self,
        project: &str,
        service: &str,
        pool: &str,
        request: &ConnectionPoolRequest,
    ) -> Result<(), OperatorError> {
        self.send(
            Method::PUT,
            &["project", project, "service", service, "connection_pool", pool],
            Some(request),
            &format!("connection pool {pool} on service {service}"),
        )
        .await?;

        info!(project = %project, service = %service, pool = %pool, "Updated connection pool");
        Ok(())
    }

    /// Delete a connection pool.
    pub async fn delete_connection_pool(
        &self,
        project: &str,
        service: &str,
        pool: &str,
    ) -> Result<(), OperatorError> {
        self.send(
            Method::DELETE,
            &["project", project, "service", service, "connection_pool", pool],
            None::<&()>,
            &format!("connection pool {pool} on service {service}"),
        )
        .await?;

        info!(project = %project, service = %service, pool = %pool, "Deleted connection pool");
        Ok(())
    }
}
