// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mapping from a changed `Secret` to the records that take a value from it.

use crate::resource::ManagedResource;
use crate::secrets::source::source_namespace;
use kube::runtime::reflector::ObjectRef;

/// Records among `records` whose source secret is `namespace/name`.
pub fn records_using_secret<'a, K, I>(records: I, namespace: &str, name: &str) -> Vec<ObjectRef<K>>
where
    K: ManagedResource + 'a,
    I: IntoIterator<Item = &'a K>,
{
    records
        .into_iter()
        .filter(|record| {
            record.conn_info_secret_source().is_some_and(|source| {
                source.name == name
                    && source_namespace(source, &record.record_namespace()) == namespace
            })
        })
        .map(ObjectRef::from_obj)
        .collect()
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod watcher_tests;
