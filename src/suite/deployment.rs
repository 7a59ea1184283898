// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deployment cases shared by every web-modeler component.
//!
//! Each case is written against [`SuiteContext::component`], so the same table
//! runs for restapi, webapp and websockets.

use super::{expect_eq, expect_some, first_container, pod_metadata, pod_spec, Case, SuiteContext};
use crate::errors::CaseFailure;
use crate::overrides::Overrides;
use k8s_openapi::api::core::v1::{Probe, Toleration};

/// Every component case, in run order.
pub const CASES: &[Case] = &[
    Case {
        name: "container_set_pod_labels",
        run: container_set_pod_labels,
    },
    Case {
        name: "container_set_pod_annotations",
        run: container_set_pod_annotations,
    },
    Case {
        name: "container_set_global_annotations",
        run: container_set_global_annotations,
    },
    Case {
        name: "container_set_image_name_subchart",
        run: container_set_image_name_subchart,
    },
    Case {
        name: "container_set_image_name_global_registry",
        run: container_set_image_name_global_registry,
    },
    Case {
        name: "container_set_image_pull_secrets_global",
        run: container_set_image_pull_secrets_global,
    },
    Case {
        name: "container_set_image_pull_secrets_subchart",
        run: container_set_image_pull_secrets_subchart,
    },
    Case {
        name: "container_overwrite_image_tag",
        run: container_overwrite_image_tag,
    },
    Case {
        name: "container_overwrite_global_image_tag",
        run: container_overwrite_global_image_tag,
    },
    Case {
        name: "container_overwrite_image_tag_with_chart_direct_setting",
        run: container_overwrite_image_tag_with_chart_direct_setting,
    },
    Case {
        name: "container_set_container_command",
        run: container_set_container_command,
    },
    Case {
        name: "container_set_service_account_name",
        run: container_set_service_account_name,
    },
    Case {
        name: "pod_set_security_context",
        run: pod_set_security_context,
    },
    Case {
        name: "container_set_security_context",
        run: container_set_security_context,
    },
    Case {
        name: "container_set_node_selector",
        run: container_set_node_selector,
    },
    Case {
        name: "container_set_affinity",
        run: container_set_affinity,
    },
    Case {
        name: "container_set_tolerations",
        run: container_set_tolerations,
    },
    Case {
        name: "container_should_overwrite_global_image_pull_policy",
        run: container_should_overwrite_global_image_pull_policy,
    },
    Case {
        name: "container_startup_probe",
        run: container_startup_probe,
    },
    Case {
        name: "container_liveness_probe",
        run: container_liveness_probe,
    },
];

/// `registry.camunda.cloud/web-modeler-ee/modeler-<component>:<tag>`
fn default_image(ctx: &SuiteContext, tag: &str) -> String {
    format!(
        "registry.camunda.cloud/web-modeler-ee/modeler-{}:{tag}",
        ctx.component
    )
}

/// Checks the deployment has exactly one container running `expected_image`.
fn expect_single_container_image(
    ctx: &SuiteContext,
    set_values: Overrides,
    expected_image: &str,
) -> Result<(), CaseFailure> {
    let deployment = ctx.render_deployment(set_values)?;
    let containers = &pod_spec(&deployment)?.containers;
    expect_eq("spec.template.spec.containers.len()", &1, &containers.len())?;
    expect_eq(
        "spec.template.spec.containers[0].image",
        &Some(expected_image),
        &containers[0].image.as_deref(),
    )
}

pub fn container_set_pod_labels(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        ctx.key("podLabels.foo") => "bar",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let labels = pod_metadata(&deployment)?.labels.as_ref();
    expect_eq(
        "spec.template.metadata.labels.foo",
        &Some("bar"),
        &labels.and_then(|labels| labels.get("foo")).map(String::as_str),
    )
}

pub fn container_set_pod_annotations(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        ctx.key("podAnnotations.foo") => "bar",
        ctx.key("podAnnotations.foz") => "baz",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let annotations = expect_some(
        "spec.template.metadata.annotations",
        pod_metadata(&deployment)?.annotations.as_ref(),
    )?;
    expect_eq(
        "spec.template.metadata.annotations.foo",
        &Some("bar"),
        &annotations.get("foo").map(String::as_str),
    )?;
    expect_eq(
        "spec.template.metadata.annotations.foz",
        &Some("baz"),
        &annotations.get("foz").map(String::as_str),
    )
}

pub fn container_set_global_annotations(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.annotations.foo" => "bar",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let annotations = deployment.metadata.annotations.as_ref();
    expect_eq(
        "metadata.annotations.foo",
        &Some("bar"),
        &annotations
            .and_then(|annotations| annotations.get("foo"))
            .map(String::as_str),
    )
}

pub fn container_set_image_name_subchart(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.image.registry" => "global.custom.registry.io",
        "global.image.tag" => "8.x.x",
        "web-modeler.image.registry" => "subchart.custom.registry.io",
        "web-modeler.image.tag" => "snapshot",
        ctx.key("image.repository") => format!("web-modeler/modeler-{}", ctx.component),
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let expected = format!(
        "subchart.custom.registry.io/web-modeler/modeler-{}:snapshot",
        ctx.component
    );
    expect_eq(
        "spec.template.spec.containers[0].image",
        &Some(expected.as_str()),
        &first_container(&deployment)?.image.as_deref(),
    )
}

pub fn container_set_image_name_global_registry(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.image.registry" => "global.custom.registry.io",
        "web-modeler.image.registry" => "",
        "web-modeler.image.tag" => "snapshot",
        ctx.key("image.repository") => format!("web-modeler/modeler-{}", ctx.component),
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let expected = format!(
        "global.custom.registry.io/web-modeler/modeler-{}:snapshot",
        ctx.component
    );
    expect_eq(
        "spec.template.spec.containers[0].image",
        &Some(expected.as_str()),
        &first_container(&deployment)?.image.as_deref(),
    )
}

pub fn container_set_image_pull_secrets_global(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.image.pullSecrets[0].name" => "SecretName",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let secrets = expect_some(
        "spec.template.spec.imagePullSecrets",
        pod_spec(&deployment)?.image_pull_secrets.as_ref(),
    )?;
    let first = expect_some("spec.template.spec.imagePullSecrets[0]", secrets.first())?;
    expect_eq(
        "spec.template.spec.imagePullSecrets[0].name",
        "SecretName",
        first.name.as_str(),
    )
}

pub fn container_set_image_pull_secrets_subchart(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.image.pullSecrets[0].name" => "SecretName",
        "web-modeler.image.pullSecrets[0].name" => "SecretNameSubChart",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let secrets = expect_some(
        "spec.template.spec.imagePullSecrets",
        pod_spec(&deployment)?.image_pull_secrets.as_ref(),
    )?;
    let first = expect_some("spec.template.spec.imagePullSecrets[0]", secrets.first())?;
    expect_eq(
        "spec.template.spec.imagePullSecrets[0].name",
        "SecretNameSubChart",
        first.name.as_str(),
    )
}

pub fn container_overwrite_image_tag(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "web-modeler.image.tag" => "a.b.c",
    };

    // when / then
    expect_single_container_image(ctx, set_values, &default_image(ctx, "a.b.c"))
}

pub fn container_overwrite_global_image_tag(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "web-modeler.image.tag" => "",
        "global.image.tag" => "a.b.c",
    };

    // when / then
    expect_single_container_image(ctx, set_values, &default_image(ctx, "a.b.c"))
}

pub fn container_overwrite_image_tag_with_chart_direct_setting(
    ctx: &SuiteContext,
) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "web-modeler.image.tag" => "a.b.c",
        "global.image.tag" => "x.y.z",
    };

    // when / then
    expect_single_container_image(ctx, set_values, &default_image(ctx, "a.b.c"))
}

pub fn container_set_container_command(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        ctx.key("command") => "[printenv]",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let containers = &pod_spec(&deployment)?.containers;
    expect_eq("spec.template.spec.containers.len()", &1, &containers.len())?;
    let command = expect_some(
        "spec.template.spec.containers[0].command",
        containers[0].command.as_deref(),
    )?;
    expect_eq(
        "spec.template.spec.containers[0].command",
        &["printenv".to_string()][..],
        command,
    )
}

pub fn container_set_service_account_name(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "web-modeler.serviceAccount.name" => "accName",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    expect_eq(
        "spec.template.spec.serviceAccountName",
        &Some("accName"),
        &pod_spec(&deployment)?.service_account_name.as_deref(),
    )
}

pub fn pod_set_security_context(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        ctx.key("podSecurityContext.runAsUser") => "1000",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let security_context = expect_some(
        "spec.template.spec.securityContext",
        pod_spec(&deployment)?.security_context.as_ref(),
    )?;
    expect_eq(
        "spec.template.spec.securityContext.runAsUser",
        &Some(1000),
        &security_context.run_as_user,
    )
}

pub fn container_set_security_context(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        ctx.key("containerSecurityContext.privileged") => "true",
        ctx.key("containerSecurityContext.capabilities.add[0]") => "NET_ADMIN",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let security_context = expect_some(
        "spec.template.spec.containers[0].securityContext",
        first_container(&deployment)?.security_context.as_ref(),
    )?;
    expect_eq(
        "spec.template.spec.containers[0].securityContext.privileged",
        &Some(true),
        &security_context.privileged,
    )?;
    let added = security_context
        .capabilities
        .as_ref()
        .and_then(|capabilities| capabilities.add.as_ref())
        .and_then(|add| add.first())
        .map(String::as_str);
    expect_eq(
        "spec.template.spec.containers[0].securityContext.capabilities.add[0]",
        &Some("NET_ADMIN"),
        &added,
    )
}

pub fn container_set_node_selector(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        ctx.key("nodeSelector.disktype") => "ssd",
        ctx.key("nodeSelector.cputype") => "arm",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let node_selector = expect_some(
        "spec.template.spec.nodeSelector",
        pod_spec(&deployment)?.node_selector.as_ref(),
    )?;
    expect_eq(
        "spec.template.spec.nodeSelector.disktype",
        &Some("ssd"),
        &node_selector.get("disktype").map(String::as_str),
    )?;
    expect_eq(
        "spec.template.spec.nodeSelector.cputype",
        &Some("arm"),
        &node_selector.get("cputype").map(String::as_str),
    )
}

pub fn container_set_affinity(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let required = "affinity.nodeAffinity.requiredDuringSchedulingIgnoredDuringExecution.nodeSelectorTerms[0].matchExpressions[0]";
    let preferred = "affinity.nodeAffinity.preferredDuringSchedulingIgnoredDuringExecution[0]";
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        ctx.key(&format!("{required}.key")) => "kubernetes.io/e2e-az-name",
        ctx.key(&format!("{required}.operator")) => "In",
        ctx.key(&format!("{required}.values[0]")) => "e2e-a1",
        ctx.key(&format!("{required}.values[1]")) => "e2e-a2",
        ctx.key(&format!("{preferred}.weight")) => "1",
        ctx.key(&format!("{preferred}.preference.matchExpressions[0].key")) => "another-node-label-key",
        ctx.key(&format!("{preferred}.preference.matchExpressions[0].operator")) => "In",
        ctx.key(&format!("{preferred}.preference.matchExpressions[0].values[0]")) => "another-node-label-value",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let affinity = expect_some(
        "spec.template.spec.affinity",
        pod_spec(&deployment)?.affinity.as_ref(),
    )?;
    let node_affinity = expect_some(
        "spec.template.spec.affinity.nodeAffinity",
        affinity.node_affinity.as_ref(),
    )?;

    let node_selector = expect_some(
        "nodeAffinity.requiredDuringSchedulingIgnoredDuringExecution",
        node_affinity
            .required_during_scheduling_ignored_during_execution
            .as_ref(),
    )?;
    let term = expect_some(
        "nodeAffinity.required.nodeSelectorTerms[0]",
        node_selector.node_selector_terms.first(),
    )?;
    let expression = expect_some(
        "nodeAffinity.required.nodeSelectorTerms[0].matchExpressions[0]",
        term.match_expressions.as_ref().and_then(|m| m.first()),
    )?;
    expect_eq(
        "required matchExpressions[0].key",
        "kubernetes.io/e2e-az-name",
        expression.key.as_str(),
    )?;
    expect_eq(
        "required matchExpressions[0].operator",
        "In",
        expression.operator.as_str(),
    )?;
    expect_eq(
        "required matchExpressions[0].values",
        &Some(vec!["e2e-a1".to_string(), "e2e-a2".to_string()]),
        &expression.values,
    )?;

    let preferred_term = expect_some(
        "nodeAffinity.preferredDuringSchedulingIgnoredDuringExecution[0]",
        node_affinity
            .preferred_during_scheduling_ignored_during_execution
            .as_ref()
            .and_then(|terms| terms.first()),
    )?;
    expect_eq("preferred[0].weight", &1, &preferred_term.weight)?;
    let expression = expect_some(
        "nodeAffinity.preferred[0].preference.matchExpressions[0]",
        preferred_term
            .preference
            .match_expressions
            .as_ref()
            .and_then(|m| m.first()),
    )?;
    expect_eq(
        "preferred matchExpressions[0].key",
        "another-node-label-key",
        expression.key.as_str(),
    )?;
    expect_eq(
        "preferred matchExpressions[0].operator",
        "In",
        expression.operator.as_str(),
    )?;
    expect_eq(
        "preferred matchExpressions[0].values",
        &Some(vec!["another-node-label-value".to_string()]),
        &expression.values,
    )
}

pub fn container_set_tolerations(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        ctx.key("tolerations[0].key") => "key1",
        ctx.key("tolerations[0].operator") => "Equal",
        ctx.key("tolerations[0].value") => "Value1",
        ctx.key("tolerations[0].effect") => "NoSchedule",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let tolerations = expect_some(
        "spec.template.spec.tolerations",
        pod_spec(&deployment)?.tolerations.as_deref(),
    )?;
    let expected = Toleration {
        key: Some("key1".into()),
        operator: Some("Equal".into()),
        value: Some("Value1".into()),
        effect: Some("NoSchedule".into()),
        ..Default::default()
    };
    expect_eq("spec.template.spec.tolerations", &[expected][..], tolerations)
}

pub fn container_should_overwrite_global_image_pull_policy(
    ctx: &SuiteContext,
) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.image.pullPolicy" => "Always",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let containers = &pod_spec(&deployment)?.containers;
    expect_eq("spec.template.spec.containers.len()", &1, &containers.len())?;
    expect_eq(
        "spec.template.spec.containers[0].imagePullPolicy",
        &Some("Always"),
        &containers[0].image_pull_policy.as_deref(),
    )
}

/// Overrides enabling `probe` with the timings the probe cases check.
fn probe_timings(ctx: &SuiteContext, probe: &str) -> Overrides {
    overrides! {
        "web-modeler.enabled" => "true",
        ctx.key(&format!("{probe}.enabled")) => "true",
        ctx.key(&format!("{probe}.initialDelaySeconds")) => "5",
        ctx.key(&format!("{probe}.periodSeconds")) => "10",
        ctx.key(&format!("{probe}.successThreshold")) => "1",
        ctx.key(&format!("{probe}.failureThreshold")) => "5",
        ctx.key(&format!("{probe}.timeoutSeconds")) => "1",
    }
}

fn expect_probe_timings(field: &str, probe: &Probe) -> Result<(), CaseFailure> {
    expect_eq(
        &format!("{field}.initialDelaySeconds"),
        &Some(5),
        &probe.initial_delay_seconds,
    )?;
    expect_eq(
        &format!("{field}.periodSeconds"),
        &Some(10),
        &probe.period_seconds,
    )?;
    expect_eq(
        &format!("{field}.successThreshold"),
        &Some(1),
        &probe.success_threshold,
    )?;
    expect_eq(
        &format!("{field}.failureThreshold"),
        &Some(5),
        &probe.failure_threshold,
    )?;
    expect_eq(
        &format!("{field}.timeoutSeconds"),
        &Some(1),
        &probe.timeout_seconds,
    )
}

pub fn container_startup_probe(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = probe_timings(ctx, "startupProbe");

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let field = "spec.template.spec.containers[0].startupProbe";
    let probe = expect_some(field, first_container(&deployment)?.startup_probe.as_ref())?;
    expect_probe_timings(field, probe)
}

pub fn container_liveness_probe(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = probe_timings(ctx, "livenessProbe");

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let field = "spec.template.spec.containers[0].livenessProbe";
    let probe = expect_some(field, first_container(&deployment)?.liveness_probe.as_ref())?;
    expect_probe_timings(field, probe)
}
