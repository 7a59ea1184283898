// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `render`

#[cfg(test)]
mod tests {
    use crate::component::Component;
    use crate::errors::RenderError;
    use crate::manifest::{document_kind, parse_documents, unmarshal_k8s_yaml};
    use crate::overrides::Overrides;
    use crate::render::{ChartRenderer, ChartTemplate, HelmRenderer, RenderOptions, Renderer};
    use k8s_openapi::api::apps::v1::Deployment;
    use std::path::PathBuf;

    const RELEASE: &str = "camunda-platform-test";

    fn enabled() -> RenderOptions {
        RenderOptions::new(
            "camunda-platform-abc123",
            Overrides::new().with("web-modeler.enabled", "true"),
        )
    }

    #[test]
    fn test_chart_template_paths() {
        assert_eq!(ChartTemplate::all().len(), 7);
        assert_eq!(
            ChartTemplate::RestapiSecret.path(),
            "charts/web-modeler/templates/secret-restapi.yaml"
        );
        assert_eq!(
            ChartTemplate::from_path("charts/web-modeler/templates/deployment-webapp.yaml")
                .unwrap(),
            ChartTemplate::Deployment(Component::Webapp)
        );
        assert!(matches!(
            ChartTemplate::from_path("charts/web-modeler/templates/ingress.yaml"),
            Err(RenderError::UnknownTemplate { .. })
        ));
    }

    #[test]
    fn test_chart_renderer_single_template() {
        let template = Component::Restapi.deployment_template();
        let output = ChartRenderer::new()
            .render(RELEASE, &enabled(), &[template.clone()])
            .unwrap();

        assert!(output.starts_with(&format!("---\n# Source: camunda-platform/{template}\n")));
        let documents = parse_documents(&output).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(document_kind(&documents[0]), Some("Deployment"));
    }

    #[test]
    fn test_chart_renderer_renders_everything_without_templates() {
        let output = ChartRenderer::new().render(RELEASE, &enabled(), &[]).unwrap();
        let documents = parse_documents(&output).unwrap();
        let kinds: Vec<_> = documents.iter().filter_map(document_kind).collect();
        assert_eq!(
            kinds,
            vec!["Secret", "Service", "Service", "Service", "Deployment", "Deployment", "Deployment"]
        );
    }

    #[test]
    fn test_chart_renderer_needs_web_modeler_enabled() {
        let options = RenderOptions::new("default", Overrides::new());
        let err = ChartRenderer::new()
            .render(RELEASE, &options, &[Component::Webapp.deployment_template()])
            .unwrap_err();
        match err {
            RenderError::NothingRendered { templates } => {
                assert_eq!(templates, vec![Component::Webapp.deployment_template()]);
            }
            other => panic!("expected NothingRendered, got {other:?}"),
        }
    }

    #[test]
    fn test_chart_renderer_rejects_unknown_template() {
        let err = ChartRenderer::new()
            .render(RELEASE, &enabled(), &["templates/nope.yaml".to_string()])
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate { .. }));
    }

    #[test]
    fn test_chart_renderer_propagates_override_errors() {
        let options = RenderOptions::new(
            "default",
            Overrides::new()
                .with("web-modeler.enabled", "true")
                .with("web-modeler.restapi.tolerations[99999].key", "x"),
        );
        let err = ChartRenderer::new().render(RELEASE, &options, &[]).unwrap_err();
        assert!(matches!(err, RenderError::Override(_)));
    }

    #[test]
    fn test_helm_build_args() {
        let renderer = HelmRenderer::new("/charts/camunda-platform");
        let options = RenderOptions {
            namespace: "camunda-platform-abc123".to_string(),
            set_values: Overrides::new()
                .with("web-modeler.enabled", "true")
                .with("global.annotations.list", "a,b"),
            values_files: vec![PathBuf::from("values-test.yaml")],
        };
        let args = renderer.build_args(
            RELEASE,
            &options,
            &[Component::Restapi.deployment_template()],
        );
        assert_eq!(
            args,
            vec![
                "template",
                RELEASE,
                "/charts/camunda-platform",
                "--namespace",
                "camunda-platform-abc123",
                "--values",
                "values-test.yaml",
                "--set",
                r"global.annotations.list=a\,b",
                "--set",
                "web-modeler.enabled=true",
                "--show-only",
                "charts/web-modeler/templates/deployment-restapi.yaml",
            ]
        );
    }

    #[test]
    fn test_brace_list_means_the_same_to_both_renderers() {
        let set_values = Overrides::new()
            .with("web-modeler.enabled", "true")
            .with("web-modeler.webapp.command", "{printenv,env}");
        let options = RenderOptions::new("camunda-platform-abc123", set_values);
        let templates = [Component::Webapp.deployment_template()];

        let output = ChartRenderer::new()
            .render(RELEASE, &options, &templates)
            .unwrap();
        let deployment: Deployment = unmarshal_k8s_yaml(&output).unwrap();
        let command = deployment.spec.unwrap().template.spec.unwrap().containers[0]
            .command
            .clone();
        assert_eq!(
            command,
            Some(vec!["printenv".to_string(), "env".to_string()])
        );

        let args = HelmRenderer::new("chart").build_args(RELEASE, &options, &templates);
        assert!(args.contains(&"web-modeler.webapp.command={printenv,env}".to_string()));
    }

    #[test]
    fn test_helm_build_args_without_namespace() {
        let renderer = HelmRenderer::new("chart");
        let args = renderer.build_args(RELEASE, &RenderOptions::default(), &[]);
        assert_eq!(args, vec!["template", RELEASE, "chart"]);
        assert_eq!(renderer.chart_dir(), std::path::Path::new("chart"));
    }

    #[test]
    fn test_helm_missing_binary() {
        let renderer = HelmRenderer::with_binary("/nonexistent/helm", "chart");
        let err = renderer.render(RELEASE, &enabled(), &[]).unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
    }

    #[cfg(unix)]
    fn fake_helm(dir: &std::path::Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("helm");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_helm_renderer_returns_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let helm = fake_helm(dir.path(), "#!/bin/sh\necho \"$@\"\n");
        let renderer = HelmRenderer::with_binary(helm, "my-chart");

        let output = renderer.render(RELEASE, &enabled(), &[]).unwrap();
        assert_eq!(
            output.trim(),
            "template camunda-platform-test my-chart --namespace camunda-platform-abc123 \
             --set web-modeler.enabled=true"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_helm_renderer_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let helm = fake_helm(
            dir.path(),
            "#!/bin/sh\necho 'Error: could not find template' >&2\nexit 1\n",
        );
        let renderer = HelmRenderer::with_binary(helm, "my-chart");

        let err = renderer.render(RELEASE, &enabled(), &[]).unwrap_err();
        match err {
            RenderError::HelmFailed { status, stderr } => {
                assert_eq!(status.code(), Some(1));
                assert_eq!(stderr, "Error: could not find template");
            }
            other => panic!("expected HelmFailed, got {other:?}"),
        }
    }
}
