// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `source.rs`

#[cfg(test)]
mod tests {
    use super::super::{extract_value, fingerprint, source_namespace, SourceValue};
    use crate::crd::ConnInfoSecretSource;
    use crate::errors::ErrorClass;
    use crate::status_reasons::REASON_DEPENDENCY_NOT_READY;
    use k8s_openapi::api::core::v1::Secret;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    fn secret(data: &[(&str, &[u8])]) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some("app-credentials".to_string()),
                namespace: Some("team-a".to_string()),
                ..Default::default()
            },
            data: Some(
                data.iter()
                    .map(|(k, v)| ((*k).to_string(), ByteString(v.to_vec())))
                    .collect::<BTreeMap<_, _>>(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_fingerprint_is_salted_by_uid() {
        let a = fingerprint("uid-a", "hunter2");
        assert_eq!(a.len(), 64);
        assert_eq!(a, fingerprint("uid-a", "hunter2"));
        assert_ne!(a, fingerprint("uid-b", "hunter2"));
        assert_ne!(a, fingerprint("uid-a", "hunter3"));
        assert!(!a.contains("hunter2"));
    }

    #[test]
    fn test_source_namespace_defaults_to_record() {
        let mut source = ConnInfoSecretSource {
            name: "app-credentials".to_string(),
            namespace: None,
            password_key: "password".to_string(),
        };
        assert_eq!(source_namespace(&source, "team-a"), "team-a");

        source.namespace = Some("shared".to_string());
        assert_eq!(source_namespace(&source, "team-a"), "shared");
    }

    #[test]
    fn test_extract_value_reads_key() {
        let secret = secret(&[("password", b"s3cret"), ("other", b"x")]);
        assert_eq!(extract_value(&secret, "password").unwrap(), "s3cret");
    }

    #[test]
    fn test_missing_or_empty_key_is_not_ready() {
        let secret = secret(&[("password", b"")]);

        let empty = extract_value(&secret, "password").unwrap_err();
        assert_eq!(empty.reason(), REASON_DEPENDENCY_NOT_READY);
        assert_eq!(empty.class(), ErrorClass::Retryable);

        let missing = extract_value(&secret, "pass").unwrap_err();
        assert_eq!(missing.reason(), REASON_DEPENDENCY_NOT_READY);
    }

    #[test]
    fn test_non_utf8_value_is_terminal() {
        let secret = secret(&[("password", &[0xff, 0xfe])]);
        let err = extract_value(&secret, "password").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Terminal);
    }

    #[test]
    fn test_debug_redacts_value() {
        let value = SourceValue {
            value: "s3cret".to_string(),
            fingerprint: fingerprint("uid", "s3cret"),
        };
        let rendered = format!("{value:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
