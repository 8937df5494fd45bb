// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `ProjectVPC` adapter.
//!
//! VPCs are addressed by a server-assigned id and their spec is immutable. A deleted
//! VPC lingers in state `DELETED`, which counts as absent.

use crate::constants::{STATE_ACTIVE, VPC_STATE_DELETED};
use crate::controlplane::types::{CreateVpcRequest, Vpc};
use crate::crd::ProjectVPC;
use crate::errors::OperatorError;
use crate::reconcilers::adapter::{Identity, KindAdapter};
use crate::reconcilers::dependencies::ClusterLookup;
use crate::resource::ManagedResource;
use async_trait::async_trait;

pub struct ProjectVpcAdapter {
    cluster: ClusterLookup,
}

impl ProjectVpcAdapter {
    #[must_use]
    pub fn new(cluster: ClusterLookup) -> Self {
        Self { cluster }
    }

    async fn find(&self, record: &ProjectVPC) -> Result<Vpc, OperatorError> {
        self.cluster
            .control_plane
            .list_vpcs(record.project())
            .await?
            .into_iter()
            .find(|vpc| vpc.state != VPC_STATE_DELETED && same_network(record, vpc))
            .ok_or_else(|| {
                OperatorError::not_found(format!(
                    "VPC {} in {}",
                    record.spec.network_cidr, record.spec.cloud_name
                ))
            })
    }
}

fn same_network(record: &ProjectVPC, vpc: &Vpc) -> bool {
    vpc.cloud_name == record.spec.cloud_name && vpc.network_cidr == record.spec.network_cidr
}

#[async_trait]
impl KindAdapter for ProjectVpcAdapter {
    type Record = ProjectVPC;
    type Remote = Vpc;

    const IDENTITY: Identity = Identity::ServerAssigned;

    async fn create(&self, record: &ProjectVPC) -> Result<String, OperatorError> {
        let request = CreateVpcRequest {
            cloud_name: record.spec.cloud_name.clone(),
            network_cidr: record.spec.network_cidr.clone(),
            peering_connections: Vec::new(),
        };
        let vpc = self
            .cluster
            .control_plane
            .create_vpc(record.project(), &request)
            .await?;
        Ok(vpc.project_vpc_id)
    }

    async fn update(&self, _record: &ProjectVPC, _id: &str) -> Result<(), OperatorError> {
        Ok(())
    }

    async fn get(&self, record: &ProjectVPC, id: Option<&str>) -> Result<Vpc, OperatorError> {
        let Some(id) = id else {
            return self.find(record).await;
        };
        let vpc = self
            .cluster
            .control_plane
            .get_vpc(record.project(), id)
            .await?;
        if vpc.state == VPC_STATE_DELETED {
            return Err(OperatorError::not_found(format!("VPC {id}")));
        }
        Ok(vpc)
    }

    async fn delete(&self, record: &ProjectVPC, id: Option<&str>) -> Result<(), OperatorError> {
        let id = match id {
            Some(id) => id.to_string(),
            None => self.find(record).await?.project_vpc_id,
        };
        self.cluster
            .control_plane
            .delete_vpc(record.project(), &id)
            .await
    }

    fn is_ready(&self, _record: &ProjectVPC, remote: &Vpc) -> bool {
        remote.state == STATE_ACTIVE
    }

    fn observed_state(&self, remote: &Vpc) -> String {
        remote.state.clone()
    }

    fn remote_id(&self, remote: &Vpc) -> String {
        remote.project_vpc_id.clone()
    }

    fn matches_existing(&self, record: &ProjectVPC, remote: &Vpc) -> bool {
        same_network(record, remote)
    }
}

#[cfg(test)]
#[path = "project_vpc_tests.rs"]
mod project_vpc_tests;
