// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML rendering shared by the `crdgen` binary and its tests.

use crate::crd::{
    ConnectionPool, Database, Kafka, KafkaACL, KafkaTopic, PostgreSQL, ProjectVPC,
    ServiceIntegration, ServiceUser,
};
use anyhow::{Context as _, Result};
use kube::CustomResourceExt;
use std::fs;
use std::path::{Path, PathBuf};

/// Header prepended to every generated file.
pub const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

/// Render the CRD of `T` as YAML with the header.
///
/// # Errors
///
/// Returns an error if the CRD cannot be serialized.
pub fn render_crd<T: CustomResourceExt>() -> Result<String> {
    let yaml = serde_yaml::to_string(&T::crd())
        .with_context(|| format!("failed to serialize CRD {}", T::crd_name()))?;
    Ok(format!("{COPYRIGHT_HEADER}{yaml}"))
}

fn write_crd<T: CustomResourceExt>(output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}.crd.yaml", T::api_resource().plural));
    fs::write(&path, render_crd::<T>()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Write one YAML file per kind into `output_dir`, creating it if needed.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn write_all(output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    Ok(vec![
        write_crd::<PostgreSQL>(output_dir)?,
        write_crd::<Kafka>(output_dir)?,
        write_crd::<ServiceUser>(output_dir)?,
        write_crd::<Database>(output_dir)?,
        write_crd::<ConnectionPool>(output_dir)?,
        write_crd::<KafkaTopic>(output_dir)?,
        write_crd::<KafkaACL>(output_dir)?,
        write_crd::<ProjectVPC>(output_dir)?,
        write_crd::<ServiceIntegration>(output_dir)?,
    ])
}

#[cfg(test)]
#[path = "crdgen_tests.rs"]
mod crdgen_tests;
