// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! web-modeler Kubernetes resource builders
//!
//! This module provides functions to build the Kubernetes resources (`Deployment`,
//! `Service`, `Secret`) the web-modeler templates render from a set of chart values.
//! All functions are pure and easily testable.

use crate::component::Component;
use crate::constants::{
    DEFAULT_SERVICE_ACCOUNT, PORT_NAME_HTTP, PORT_NAME_MANAGEMENT, POSTGRESQL_PORT,
    RESTAPI_MANAGEMENT_PORT, SECRET_KEY_DATABASE_PASSWORD, SECRET_KEY_POSTGRESQL_PASSWORD,
    SECRET_KEY_SMTP_PASSWORD, SERVICE_HTTP_PORT, WEB_MODELER_CHART_NAME,
    WEB_MODELER_CHART_VERSION,
};
use crate::endpoints::{
    identity_base_url, keycloak_base_url, keycloak_issuer_backend_url, keycloak_jwks_url,
};
use crate::errors::RenderError;
use crate::image::{resolve_image, resolve_pull_policy, resolve_pull_secrets, resolve_tag};
use crate::labels::{
    APP, HELM_CHART, K8S_COMPONENT, K8S_INSTANCE, K8S_MANAGED_BY, K8S_NAME, K8S_PART_OF,
    K8S_VERSION, MANAGED_BY_HELM, PART_OF_CAMUNDA_PLATFORM,
};
use crate::naming::{component_fullname, postgresql_fullname, web_modeler_fullname};
use crate::values::{non_empty, ChartValues, ProbeValues};
use k8s_openapi::api::{
    apps::v1::{Deployment, DeploymentSpec},
    core::v1::{
        Container, ContainerPort, EnvVar, EnvVarSource, HTTPGetAction, PodSpec, PodTemplateSpec,
        Probe, Secret, SecretKeySelector, Service, ServicePort, ServiceSpec,
    },
};
use k8s_openapi::apimachinery::pkg::{
    apis::meta::v1::{LabelSelector, ObjectMeta},
    util::intstr::IntOrString,
};
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use tracing::debug;

/// Builds the selector labels of a component.
///
/// These never change between upgrades, so they are safe to use in a
/// `Deployment` selector.
///
/// # Arguments
///
/// * `release` - Helm release name
/// * `component` - The web-modeler component
///
/// # Returns
///
/// A `BTreeMap` of label key-value pairs
#[must_use]
pub fn build_selector_labels(release: &str, component: Component) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(APP.into(), PART_OF_CAMUNDA_PLATFORM.into());
    labels.insert(K8S_NAME.into(), WEB_MODELER_CHART_NAME.into());
    labels.insert(K8S_INSTANCE.into(), release.into());
    labels.insert(K8S_MANAGED_BY.into(), MANAGED_BY_HELM.into());
    labels.insert(K8S_PART_OF.into(), PART_OF_CAMUNDA_PLATFORM.into());
    labels.insert(K8S_COMPONENT.into(), component.as_str().into());
    labels
}

/// Builds the metadata labels of a component's resources.
///
/// `global.labels` are included, but the standard labels always win over a
/// global label with the same key.
#[must_use]
pub fn build_labels(
    release: &str,
    values: &ChartValues,
    component: Component,
) -> BTreeMap<String, String> {
    let web_modeler = &values.web_modeler;
    let mut labels = values.global.labels.clone();
    labels.extend(build_selector_labels(release, component));
    labels.insert(
        K8S_VERSION.into(),
        resolve_tag(
            &values.global.image,
            &web_modeler.image,
            &web_modeler.component(component).image,
        )
        .into(),
    );
    labels.insert(
        HELM_CHART.into(),
        format!("{WEB_MODELER_CHART_NAME}-{WEB_MODELER_CHART_VERSION}"),
    );
    labels
}

fn build_metadata(
    name: String,
    namespace: &str,
    labels: BTreeMap<String, String>,
    values: &ChartValues,
) -> ObjectMeta {
    ObjectMeta {
        name: Some(name),
        namespace: Some(namespace.into()),
        labels: Some(labels),
        annotations: (!values.global.annotations.is_empty())
            .then(|| values.global.annotations.clone()),
        ..Default::default()
    }
}

/// Name of the service account the pods run as.
///
/// An explicit `web-modeler.serviceAccount.name` wins; otherwise the chart's
/// own account when it creates one, else the namespace default.
#[must_use]
pub fn service_account_name(release: &str, values: &ChartValues) -> String {
    let service_account = &values.web_modeler.service_account;
    if !service_account.name.is_empty() {
        service_account.name.clone()
    } else if service_account.enabled {
        web_modeler_fullname(release, &values.web_modeler)
    } else {
        DEFAULT_SERVICE_ACCOUNT.to_string()
    }
}

/// Builds the `Deployment` of one web-modeler component.
///
/// # Arguments
///
/// * `release` - Helm release name, the base of every resource name
/// * `namespace` - Namespace the release is rendered into
/// * `values` - Resolved chart values
/// * `component` - Which of the three workloads to build
///
/// # Errors
///
/// Returns [`RenderError::InvalidValue`] when a URL-bearing value cannot be used.
pub fn build_deployment(
    release: &str,
    namespace: &str,
    values: &ChartValues,
    component: Component,
) -> Result<Deployment, RenderError> {
    let name = component_fullname(release, &values.web_modeler, component);
    debug!(
        name = %name,
        namespace = %namespace,
        component = %component,
        "Building Deployment for web-modeler component"
    );

    let settings = values.web_modeler.component(component);
    let selector_labels = build_selector_labels(release, component);

    let mut pod_labels = selector_labels.clone();
    for (key, value) in &settings.pod_labels {
        pod_labels.entry(key.clone()).or_insert_with(|| value.clone());
    }

    Ok(Deployment {
        metadata: build_metadata(
            name,
            namespace,
            build_labels(release, values, component),
            values,
        ),
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(selector_labels),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(pod_labels),
                    annotations: (!settings.pod_annotations.is_empty())
                        .then(|| settings.pod_annotations.clone()),
                    ..Default::default()
                }),
                spec: Some(build_pod_spec(release, values, component)?),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn build_pod_spec(
    release: &str,
    values: &ChartValues,
    component: Component,
) -> Result<PodSpec, RenderError> {
    let web_modeler = &values.web_modeler;
    let settings = web_modeler.component(component);

    Ok(PodSpec {
        containers: vec![build_container(release, values, component)?],
        image_pull_secrets: resolve_pull_secrets(&values.global.image, &web_modeler.image),
        service_account_name: Some(service_account_name(release, values)),
        security_context: non_empty(settings.pod_security_context.clone()),
        node_selector: (!settings.node_selector.is_empty())
            .then(|| settings.node_selector.clone()),
        tolerations: (!settings.tolerations.is_empty()).then(|| settings.tolerations.clone()),
        affinity: non_empty(settings.affinity.clone()),
        ..Default::default()
    })
}

fn build_container(
    release: &str,
    values: &ChartValues,
    component: Component,
) -> Result<Container, RenderError> {
    let web_modeler = &values.web_modeler;
    let settings = web_modeler.component(component);

    let mut env = build_env(release, values, component)?;
    env.extend(settings.env.iter().cloned());

    let probe_port = component.probe_port_name();

    Ok(Container {
        name: component.container_name(),
        image: Some(resolve_image(
            &values.global.image,
            &web_modeler.image,
            &settings.image,
        )),
        image_pull_policy: resolve_pull_policy(&values.global.image, &web_modeler.image),
        command: (!settings.command.is_empty()).then(|| settings.command.clone()),
        env: Some(env),
        ports: Some(build_container_ports(component)),
        resources: non_empty(settings.resources.clone()),
        security_context: non_empty(settings.container_security_context.clone()),
        startup_probe: build_probe(&settings.startup_probe, probe_port),
        readiness_probe: build_probe(&settings.readiness_probe, probe_port),
        liveness_probe: build_probe(&settings.liveness_probe, probe_port),
        ..Default::default()
    })
}

fn build_container_ports(component: Component) -> Vec<ContainerPort> {
    let mut ports = vec![ContainerPort {
        name: Some(PORT_NAME_HTTP.into()),
        container_port: component.http_port(),
        protocol: Some("TCP".into()),
        ..Default::default()
    }];
    if let Some(management_port) = component.management_port() {
        ports.push(ContainerPort {
            name: Some(PORT_NAME_MANAGEMENT.into()),
            container_port: management_port,
            protocol: Some("TCP".into()),
            ..Default::default()
        });
    }
    ports
}

/// Builds an HTTP probe, or `None` when the probe is disabled.
#[must_use]
pub fn build_probe(probe: &ProbeValues, port_name: &str) -> Option<Probe> {
    if !probe.enabled {
        return None;
    }
    Some(Probe {
        http_get: Some(HTTPGetAction {
            path: Some(probe.probe_path.clone()),
            port: IntOrString::String(port_name.into()),
            ..Default::default()
        }),
        initial_delay_seconds: Some(probe.initial_delay_seconds),
        period_seconds: Some(probe.period_seconds),
        success_threshold: Some(probe.success_threshold),
        failure_threshold: Some(probe.failure_threshold),
        timeout_seconds: Some(probe.timeout_seconds),
        ..Default::default()
    })
}

fn env_value(name: &str, value: impl Into<String>) -> EnvVar {
    EnvVar {
        name: name.into(),
        value: Some(value.into()),
        ..Default::default()
    }
}

fn env_secret(name: &str, secret_name: impl Into<String>, key: impl Into<String>) -> EnvVar {
    EnvVar {
        name: name.into(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret_name.into(),
                key: key.into(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Builds the chart-provided environment of a component, before user `env` entries.
///
/// # Errors
///
/// Returns [`RenderError::InvalidValue`] when the keycloak URL values are unusable.
pub fn build_env(
    release: &str,
    values: &ChartValues,
    component: Component,
) -> Result<Vec<EnvVar>, RenderError> {
    match component {
        Component::Restapi => build_restapi_env(release, values),
        Component::Webapp => build_webapp_env(release, values),
        Component::Websockets => Ok(build_websockets_env(values)),
    }
}

fn build_restapi_env(release: &str, values: &ChartValues) -> Result<Vec<EnvVar>, RenderError> {
    let web_modeler = &values.web_modeler;
    let restapi = &web_modeler.restapi;
    let identity = &values.global.identity;
    let restapi_name = component_fullname(release, web_modeler, Component::Restapi);
    let pusher = &web_modeler.pusher;
    let mail = &restapi.mail;

    let mut env = vec![env_value("JAVA_OPTIONS", restapi.java_opts.as_str())];
    env.extend(build_database_env(release, values));
    env.extend([
        env_value("RESTAPI_OAUTH2_TOKEN_ISSUER", identity.auth.public_issuer_url.as_str()),
        env_value(
            "RESTAPI_OAUTH2_TOKEN_ISSUER_BACKEND_URL",
            keycloak_issuer_backend_url(release, identity)?,
        ),
        env_value("RESTAPI_IDENTITY_BASE_URL", identity_base_url(release, identity)),
        env_value("RESTAPI_SERVER_URL", restapi.server_url.as_str()),
        env_value(
            "RESTAPI_PUSHER_HOST",
            component_fullname(release, web_modeler, Component::Websockets),
        ),
        env_value("RESTAPI_PUSHER_PORT", SERVICE_HTTP_PORT.to_string()),
        env_value("RESTAPI_PUSHER_APP_ID", pusher.app_id.as_str()),
        env_value("RESTAPI_PUSHER_KEY", pusher.app_key.as_str()),
        env_value("RESTAPI_PUSHER_SECRET", pusher.app_secret.as_str()),
        env_value("RESTAPI_MAIL_HOST", mail.smtp_host.as_str()),
        env_value("RESTAPI_MAIL_PORT", mail.smtp_port.as_str()),
        env_value("RESTAPI_MAIL_ENABLE_TLS", mail.smtp_tls_enabled.as_str()),
        env_value("RESTAPI_MAIL_FROM_ADDRESS", mail.from_address.as_str()),
        env_value("RESTAPI_MAIL_FROM_NAME", mail.from_name.as_str()),
    ]);

    if !mail.smtp_user.is_empty() {
        env.push(env_value("RESTAPI_MAIL_USER", mail.smtp_user.as_str()));
        env.push(env_secret(
            "RESTAPI_MAIL_PASSWORD",
            restapi_name,
            SECRET_KEY_SMTP_PASSWORD,
        ));
    }

    Ok(env)
}

/// Database connection settings of restapi.
///
/// The password is always a secret reference: the bundled PostgreSQL secret,
/// a user-provided existing secret, or the restapi secret this chart renders.
fn build_database_env(release: &str, values: &ChartValues) -> Vec<EnvVar> {
    let web_modeler = &values.web_modeler;
    let postgresql = &web_modeler.postgresql;

    if postgresql.enabled {
        let postgresql_name = postgresql_fullname(release);
        let secret_name = if postgresql.auth.existing_secret.is_empty() {
            postgresql_name.clone()
        } else {
            postgresql.auth.existing_secret.clone()
        };
        let secret_key = if postgresql.auth.secret_keys.user_password_key.is_empty() {
            SECRET_KEY_POSTGRESQL_PASSWORD.to_string()
        } else {
            postgresql.auth.secret_keys.user_password_key.clone()
        };
        return vec![
            env_value("RESTAPI_DB_HOST", postgresql_name),
            env_value("RESTAPI_DB_PORT", POSTGRESQL_PORT.to_string()),
            env_value("RESTAPI_DB_NAME", postgresql.auth.database.as_str()),
            env_value("RESTAPI_DB_USER", postgresql.auth.username.as_str()),
            env_secret("RESTAPI_DB_PASSWORD", secret_name, secret_key),
        ];
    }

    let database = &web_modeler.restapi.external_database;
    let (secret_name, secret_key) = if database.existing_secret.is_empty() {
        (
            component_fullname(release, web_modeler, Component::Restapi),
            SECRET_KEY_DATABASE_PASSWORD.to_string(),
        )
    } else if database.existing_secret_password_key.is_empty() {
        (
            database.existing_secret.clone(),
            SECRET_KEY_DATABASE_PASSWORD.to_string(),
        )
    } else {
        (
            database.existing_secret.clone(),
            database.existing_secret_password_key.clone(),
        )
    };

    vec![
        env_value("RESTAPI_DB_HOST", database.host.as_str()),
        env_value("RESTAPI_DB_PORT", database.port.as_str()),
        env_value("RESTAPI_DB_NAME", database.database.as_str()),
        env_value("RESTAPI_DB_USER", database.user.as_str()),
        env_secret("RESTAPI_DB_PASSWORD", secret_name, secret_key),
    ]
}

fn build_webapp_env(release: &str, values: &ChartValues) -> Result<Vec<EnvVar>, RenderError> {
    let web_modeler = &values.web_modeler;
    let identity = &values.global.identity;
    let auth = &identity.auth.web_modeler;
    let pusher = &web_modeler.pusher;
    let websockets = &web_modeler.websockets;

    Ok(vec![
        env_value("NODE_ENV", "production"),
        env_value("NODE_OPTIONS", "--max-old-space-size=128"),
        env_value(
            "RESTAPI_HOST",
            component_fullname(release, web_modeler, Component::Restapi),
        ),
        env_value("RESTAPI_PORT", SERVICE_HTTP_PORT.to_string()),
        env_value("RESTAPI_MANAGEMENT_PORT", RESTAPI_MANAGEMENT_PORT.to_string()),
        env_value("SERVER_URL", auth.redirect_url.as_str()),
        env_value("OAUTH2_CLIENT_ID", auth.client_id.as_str()),
        env_value("OAUTH2_TOKEN_AUDIENCE", auth.client_api_audience.as_str()),
        env_value("OAUTH2_TOKEN_ISSUER", identity.auth.public_issuer_url.as_str()),
        env_value("OAUTH2_JWKS_URL", keycloak_jwks_url(release, identity)?),
        env_value(
            "KEYCLOAK_BASE_URL",
            keycloak_base_url(release, identity)?.to_string(),
        ),
        env_value("IDENTITY_BASE_URL", identity_base_url(release, identity)),
        env_value(
            "PUSHER_HOST",
            component_fullname(release, web_modeler, Component::Websockets),
        ),
        env_value("PUSHER_PORT", SERVICE_HTTP_PORT.to_string()),
        env_value("PUSHER_APP_ID", pusher.app_id.as_str()),
        env_value("PUSHER_KEY", pusher.app_key.as_str()),
        env_value("PUSHER_SECRET", pusher.app_secret.as_str()),
        env_value("CLIENT_PUSHER_HOST", websockets.public_host.as_str()),
        env_value("CLIENT_PUSHER_PORT", websockets.public_port.as_str()),
        env_value("CLIENT_PUSHER_FORCE_TLS", "false"),
        env_value("CLIENT_PUSHER_KEY", pusher.app_key.as_str()),
    ])
}

fn build_websockets_env(values: &ChartValues) -> Vec<EnvVar> {
    let pusher = &values.web_modeler.pusher;
    vec![
        env_value("PUSHER_APP_ID", pusher.app_id.as_str()),
        env_value("PUSHER_APP_KEY", pusher.app_key.as_str()),
        env_value("PUSHER_APP_SECRET", pusher.app_secret.as_str()),
    ]
}

/// Builds the `Service` in front of one component.
///
/// Port 80 forwards to the named `http` container port; components with a
/// management port expose it under the same number.
#[must_use]
pub fn build_service(
    release: &str,
    namespace: &str,
    values: &ChartValues,
    component: Component,
) -> Service {
    let name = component_fullname(release, &values.web_modeler, component);
    debug!(name = %name, namespace = %namespace, "Building Service for web-modeler component");

    let mut ports = vec![ServicePort {
        name: Some(PORT_NAME_HTTP.into()),
        port: SERVICE_HTTP_PORT,
        target_port: Some(IntOrString::String(PORT_NAME_HTTP.into())),
        protocol: Some("TCP".into()),
        ..Default::default()
    }];
    if let Some(management_port) = component.management_port() {
        ports.push(ServicePort {
            name: Some(PORT_NAME_MANAGEMENT.into()),
            port: management_port,
            target_port: Some(IntOrString::String(PORT_NAME_MANAGEMENT.into())),
            protocol: Some("TCP".into()),
            ..Default::default()
        });
    }

    Service {
        metadata: build_metadata(
            name,
            namespace,
            build_labels(release, values, component),
            values,
        ),
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".into()),
            selector: Some(build_selector_labels(release, component)),
            ports: Some(ports),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Builds the restapi `Secret` holding the passwords restapi reads via secret references.
///
/// `database-password` is only written when an external database is used
/// without an existing secret; `smtp-password` only when one is configured.
#[must_use]
pub fn build_restapi_secret(release: &str, namespace: &str, values: &ChartValues) -> Secret {
    let web_modeler = &values.web_modeler;
    let restapi = &web_modeler.restapi;
    let name = component_fullname(release, web_modeler, Component::Restapi);
    debug!(name = %name, namespace = %namespace, "Building Secret for restapi");

    let mut data = BTreeMap::new();
    let database = &restapi.external_database;
    if !web_modeler.postgresql.enabled
        && database.existing_secret.is_empty()
        && !database.password.is_empty()
    {
        data.insert(
            SECRET_KEY_DATABASE_PASSWORD.to_string(),
            ByteString(database.password.clone().into_bytes()),
        );
    }
    if !restapi.mail.smtp_password.is_empty() {
        data.insert(
            SECRET_KEY_SMTP_PASSWORD.to_string(),
            ByteString(restapi.mail.smtp_password.clone().into_bytes()),
        );
    }

    Secret {
        metadata: build_metadata(
            name,
            namespace,
            build_labels(release, values, Component::Restapi),
            values,
        ),
        type_: Some("Opaque".into()),
        data: Some(data),
        ..Default::default()
    }
}
