// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! restapi-only deployment cases: service URLs, database, mail and probe paths.
//!
//! Run these against a [`SuiteContext`] for [`Component::Restapi`].
//!
//! [`Component::Restapi`]: crate::component::Component::Restapi

use super::{expect_contains, expect_eq, expect_some, first_container, Case, SuiteContext};
use crate::constants::{
    PORT_NAME_MANAGEMENT, SECRET_KEY_DATABASE_PASSWORD, SECRET_KEY_SMTP_PASSWORD,
};
use crate::errors::CaseFailure;
use crate::overrides::Overrides;
use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, Probe, SecretKeySelector};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// Every restapi case, in run order.
pub const CASES: &[Case] = &[
    Case {
        name: "container_should_set_correct_keycloak_service_url",
        run: container_should_set_correct_keycloak_service_url,
    },
    Case {
        name: "container_should_set_correct_keycloak_service_url_with_custom_port",
        run: container_should_set_correct_keycloak_service_url_with_custom_port,
    },
    Case {
        name: "container_should_set_correct_identity_service_url_with_fullname_override",
        run: container_should_set_correct_identity_service_url_with_fullname_override,
    },
    Case {
        name: "container_should_set_correct_identity_service_url_with_name_override",
        run: container_should_set_correct_identity_service_url_with_name_override,
    },
    Case {
        name: "container_should_set_external_database_configuration",
        run: container_should_set_external_database_configuration,
    },
    Case {
        name: "container_should_set_smtp_credentials",
        run: container_should_set_smtp_credentials,
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

/// Secret the restapi password references point at, `<release>-web-modeler-restapi`
fn restapi_secret_name(ctx: &SuiteContext) -> String {
    format!("{}-web-modeler-restapi", ctx.release)
}

fn plain_env(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        ..Default::default()
    }
}

fn secret_env(name: &str, secret_name: &str, key: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret_name.to_string(),
                key: key.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Renders the deployment and returns the first container's environment.
fn render_env(ctx: &SuiteContext, set_values: Overrides) -> Result<Vec<EnvVar>, CaseFailure> {
    let deployment = ctx.render_deployment(set_values)?;
    let env = first_container(&deployment)?.env.clone();
    expect_some("spec.template.spec.containers[0].env", env)
}

pub fn container_should_set_correct_keycloak_service_url(
    ctx: &SuiteContext,
) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.identity.keycloak.url.protocol" => "http",
        "global.identity.keycloak.url.host" => "keycloak",
        "global.identity.keycloak.url.port" => "80",
    };

    // when
    let env = render_env(ctx, set_values)?;

    // then
    expect_contains(
        "spec.template.spec.containers[0].env",
        &env,
        &plain_env(
            "RESTAPI_OAUTH2_TOKEN_ISSUER_BACKEND_URL",
            "http://keycloak/auth/realms/camunda-platform",
        ),
    )
}

pub fn container_should_set_correct_keycloak_service_url_with_custom_port(
    ctx: &SuiteContext,
) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.identity.keycloak.url.protocol" => "http",
        "global.identity.keycloak.url.host" => "keycloak",
        "global.identity.keycloak.url.port" => "8888",
    };

    // when
    let env = render_env(ctx, set_values)?;

    // then
    expect_contains(
        "spec.template.spec.containers[0].env",
        &env,
        &plain_env(
            "RESTAPI_OAUTH2_TOKEN_ISSUER_BACKEND_URL",
            "http://keycloak:8888/auth/realms/camunda-platform",
        ),
    )
}

pub fn container_should_set_correct_identity_service_url_with_fullname_override(
    ctx: &SuiteContext,
) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.identity.fullnameOverride" => "custom-identity-fullname",
    };

    // when
    let env = render_env(ctx, set_values)?;

    // then
    expect_contains(
        "spec.template.spec.containers[0].env",
        &env,
        &plain_env("RESTAPI_IDENTITY_BASE_URL", "http://custom-identity-fullname:80"),
    )
}

pub fn container_should_set_correct_identity_service_url_with_name_override(
    ctx: &SuiteContext,
) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "global.identity.nameOverride" => "custom-identity",
    };

    // when
    let env = render_env(ctx, set_values)?;

    // then
    expect_contains(
        "spec.template.spec.containers[0].env",
        &env,
        &plain_env(
            "RESTAPI_IDENTITY_BASE_URL",
            &format!("http://{}-custom-identity:80", ctx.release),
        ),
    )
}

pub fn container_should_set_external_database_configuration(
    ctx: &SuiteContext,
) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "web-modeler.postgresql.enabled" => "false",
        "web-modeler.restapi.externalDatabase.host" => "postgres.example.com",
        "web-modeler.restapi.externalDatabase.port" => "65432",
        "web-modeler.restapi.externalDatabase.database" => "modeler-database",
        "web-modeler.restapi.externalDatabase.user" => "modeler-user",
        "web-modeler.restapi.externalDatabase.password" => "modeler-password",
    };

    // when
    let env = render_env(ctx, set_values)?;

    // then
    let field = "spec.template.spec.containers[0].env";
    for expected in [
        plain_env("RESTAPI_DB_HOST", "postgres.example.com"),
        plain_env("RESTAPI_DB_PORT", "65432"),
        plain_env("RESTAPI_DB_NAME", "modeler-database"),
        plain_env("RESTAPI_DB_USER", "modeler-user"),
        secret_env(
            "RESTAPI_DB_PASSWORD",
            &restapi_secret_name(ctx),
            SECRET_KEY_DATABASE_PASSWORD,
        ),
    ] {
        expect_contains(field, &env, &expected)?;
    }
    Ok(())
}

pub fn container_should_set_smtp_credentials(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "web-modeler.restapi.mail.smtpUser" => "modeler-user",
        "web-modeler.restapi.mail.smtpPassword" => "modeler-password",
    };

    // when
    let env = render_env(ctx, set_values)?;

    // then
    let field = "spec.template.spec.containers[0].env";
    expect_contains(field, &env, &plain_env("RESTAPI_MAIL_USER", "modeler-user"))?;
    expect_contains(
        field,
        &env,
        &secret_env(
            "RESTAPI_MAIL_PASSWORD",
            &restapi_secret_name(ctx),
            SECRET_KEY_SMTP_PASSWORD,
        ),
    )
}

fn expect_probe_path(field: &str, probe: &Probe) -> Result<(), CaseFailure> {
    let http_get = expect_some(&format!("{field}.httpGet"), probe.http_get.as_ref())?;
    expect_eq(
        &format!("{field}.httpGet.path"),
        &Some("/healthz"),
        &http_get.path.as_deref(),
    )?;
    expect_eq(
        &format!("{field}.httpGet.port"),
        &IntOrString::String(PORT_NAME_MANAGEMENT.to_string()),
        &http_get.port,
    )
}

pub fn container_startup_probe(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "web-modeler.restapi.startupProbe.enabled" => "true",
        "web-modeler.restapi.startupProbe.probePath" => "/healthz",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let field = "spec.template.spec.containers[0].startupProbe";
    let probe = expect_some(field, first_container(&deployment)?.startup_probe.as_ref())?;
    expect_probe_path(field, probe)
}

pub fn container_liveness_probe(ctx: &SuiteContext) -> Result<(), CaseFailure> {
    // given
    let set_values = overrides! {
        "web-modeler.enabled" => "true",
        "web-modeler.restapi.livenessProbe.enabled" => "true",
        "web-modeler.restapi.livenessProbe.probePath" => "/healthz",
    };

    // when
    let deployment = ctx.render_deployment(set_values)?;

    // then
    let field = "spec.template.spec.containers[0].livenessProbe";
    let probe = expect_some(field, first_container(&deployment)?.liveness_probe.as_ref())?;
    expect_probe_path(field, probe)
}
