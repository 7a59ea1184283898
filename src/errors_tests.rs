// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for error types.

#[cfg(test)]
mod tests {
    use crate::errors::*;

    #[test]
    fn test_override_error_messages() {
        let error = OverrideError::MalformedKey {
            key: "a..b".to_string(),
            reason: "empty path segment".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed override key 'a..b': empty path segment"
        );

        let error = OverrideError::IndexTooLarge {
            key: "list[70000]".to_string(),
            index: 70000,
            max: 65536,
        };
        assert_eq!(
            error.to_string(),
            "Override key 'list[70000]' uses index 70000, maximum is 65536"
        );
    }

    #[test]
    fn test_render_error_wraps_override_error_transparently() {
        let source = OverrideError::MalformedKey {
            key: "[0]".to_string(),
            reason: "index without a key".to_string(),
        };
        let error = RenderError::from(source.clone());
        assert_eq!(error.to_string(), source.to_string());
    }

    #[test]
    fn test_render_error_messages() {
        let error = RenderError::UnknownTemplate {
            template: "charts/web-modeler/templates/ingress.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Could not find template charts/web-modeler/templates/ingress.yaml in chart"
        );

        let error = RenderError::NothingRendered {
            templates: vec!["a.yaml".to_string(), "b.yaml".to_string()],
        };
        assert_eq!(error.to_string(), "No manifest rendered for templates [a.yaml, b.yaml]");

        let error = RenderError::InvalidValue {
            key: "global.identity.keycloak.url.port".to_string(),
            reason: "'x' is not a port".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for 'global.identity.keycloak.url.port': 'x' is not a port"
        );
    }

    #[test]
    fn test_manifest_error_messages() {
        assert_eq!(
            ManifestError::DocumentCount { found: 2 }.to_string(),
            "Expected exactly one manifest document, found 2"
        );
        assert_eq!(
            ManifestError::KindMismatch {
                expected: "Deployment".to_string(),
                found: "Service".to_string(),
            }
            .to_string(),
            "Expected a Deployment manifest, found Service"
        );
    }

    #[test]
    fn test_case_failure_messages() {
        let failure = CaseFailure::Mismatch {
            field: "spec.template.spec.serviceAccountName".to_string(),
            expected: "Some(\"accName\")".to_string(),
            actual: "Some(\"default\")".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "spec.template.spec.serviceAccountName: expected Some(\"accName\"), got Some(\"default\")"
        );

        let failure = CaseFailure::Missing {
            field: "spec.template.spec.affinity".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "spec.template.spec.affinity: missing from rendered manifest"
        );

        let failure = CaseFailure::from(ManifestError::DocumentCount { found: 0 });
        assert!(matches!(failure, CaseFailure::Manifest(_)));
        assert_eq!(
            failure.to_string(),
            "manifest parse failed: Expected exactly one manifest document, found 0"
        );
    }
}
