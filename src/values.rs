// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed chart values.
//!
//! The values tree starts from the defaults embedded at compile time, gets
//! values files merged on top and `--set` overrides applied last. The result is
//! deserialized into [`ChartValues`], which the resource builders read.
//!
//! Scalars that Helm would happily print into a template (registries, tags,
//! ports, label values) are deserialized leniently: `--set` turns `8888` into
//! an integer and `true` into a boolean, but the template only ever sees text.

use crate::component::Component;
use crate::errors::RenderError;
use crate::overrides::{merge_values, Overrides};
use k8s_openapi::api::core::v1::{
    Affinity, EnvVar, LocalObjectReference, PodSecurityContext, ResourceRequirements,
    SecurityContext, Toleration,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

// Embed the chart defaults at compile time
const DEFAULT_VALUES: &str = include_str!("../templates/values.yaml");

/// Root of the values tree: the umbrella chart's `global` section and the
/// `web-modeler` subchart section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChartValues {
    pub global: GlobalValues,
    #[serde(rename = "web-modeler")]
    pub web_modeler: WebModelerValues,
}

/// Cross-component defaults under `global.`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalValues {
    #[serde(deserialize_with = "lenient_string_map")]
    pub annotations: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient_string_map")]
    pub labels: BTreeMap<String, String>,
    pub image: ImageValues,
    pub identity: IdentityValues,
}

/// Image coordinates. Every level of the tree (global, subchart, component)
/// uses the same shape; empty fields fall through to the next level.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageValues {
    #[serde(deserialize_with = "lenient_string")]
    pub registry: String,
    #[serde(deserialize_with = "lenient_string")]
    pub repository: String,
    #[serde(deserialize_with = "lenient_string")]
    pub tag: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pull_policy: String,
    pub pull_secrets: Vec<LocalObjectReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityValues {
    #[serde(deserialize_with = "lenient_string")]
    pub fullname_override: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name_override: String,
    pub service: IdentityServiceValues,
    pub keycloak: KeycloakValues,
    pub auth: AuthValues,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityServiceValues {
    #[serde(deserialize_with = "lenient_string")]
    pub port: String,
}

/// Keycloak location. An empty `url.host` means the in-cluster keycloak.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeycloakValues {
    #[serde(deserialize_with = "lenient_string")]
    pub fullname: String,
    pub url: KeycloakUrlValues,
    #[serde(deserialize_with = "lenient_string")]
    pub context_path: String,
    #[serde(deserialize_with = "lenient_string")]
    pub realm: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeycloakUrlValues {
    #[serde(deserialize_with = "lenient_string")]
    pub protocol: String,
    #[serde(deserialize_with = "lenient_string")]
    pub host: String,
    #[serde(deserialize_with = "lenient_string")]
    pub port: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthValues {
    #[serde(deserialize_with = "lenient_string")]
    pub public_issuer_url: String,
    pub web_modeler: WebModelerAuthValues,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebModelerAuthValues {
    #[serde(deserialize_with = "lenient_string")]
    pub client_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub client_api_audience: String,
    #[serde(deserialize_with = "lenient_string")]
    pub public_api_audience: String,
    #[serde(deserialize_with = "lenient_string")]
    pub redirect_url: String,
}

/// The `web-modeler` subchart section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebModelerValues {
    pub enabled: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub name_override: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fullname_override: String,
    pub image: ImageValues,
    pub service_account: ServiceAccountValues,
    pub pusher: PusherValues,
    pub restapi: RestapiValues,
    pub webapp: ComponentValues,
    pub websockets: WebsocketsValues,
    pub postgresql: PostgresqlValues,
}

impl WebModelerValues {
    /// Settings shared by every component
    #[must_use]
    pub fn component(&self, component: Component) -> &ComponentValues {
        match component {
            Component::Restapi => &self.restapi.common,
            Component::Webapp => &self.webapp,
            Component::Websockets => &self.websockets.common,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceAccountValues {
    pub enabled: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
}

/// Credentials of the pusher-protocol app shared by restapi, webapp and websockets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PusherValues {
    #[serde(deserialize_with = "lenient_string")]
    pub app_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub app_key: String,
    #[serde(deserialize_with = "lenient_string")]
    pub app_secret: String,
}

/// Per-component workload settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentValues {
    pub image: ImageValues,
    #[serde(deserialize_with = "lenient_string_map")]
    pub pod_labels: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient_string_map")]
    pub pod_annotations: BTreeMap<String, String>,
    pub env: Vec<EnvVar>,
    #[serde(deserialize_with = "command_list")]
    pub command: Vec<String>,
    pub pod_security_context: Option<PodSecurityContext>,
    pub container_security_context: Option<SecurityContext>,
    #[serde(deserialize_with = "lenient_string_map")]
    pub node_selector: BTreeMap<String, String>,
    pub tolerations: Vec<Toleration>,
    pub affinity: Option<Affinity>,
    pub resources: Option<ResourceRequirements>,
    pub startup_probe: ProbeValues,
    pub readiness_probe: ProbeValues,
    pub liveness_probe: ProbeValues,
}

/// An HTTP probe toggle plus its timings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbeValues {
    pub enabled: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub probe_path: String,
    pub initial_delay_seconds: i32,
    pub period_seconds: i32,
    pub success_threshold: i32,
    pub failure_threshold: i32,
    pub timeout_seconds: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RestapiValues {
    #[serde(flatten)]
    pub common: ComponentValues,
    pub external_database: ExternalDatabaseValues,
    pub mail: MailValues,
    #[serde(deserialize_with = "lenient_string")]
    pub java_opts: String,
    #[serde(deserialize_with = "lenient_string")]
    pub server_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebsocketsValues {
    #[serde(flatten)]
    pub common: ComponentValues,
    #[serde(deserialize_with = "lenient_string")]
    pub public_host: String,
    #[serde(deserialize_with = "lenient_string")]
    pub public_port: String,
}

/// Database used by restapi when the bundled PostgreSQL is disabled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalDatabaseValues {
    #[serde(deserialize_with = "lenient_string")]
    pub host: String,
    #[serde(deserialize_with = "lenient_string")]
    pub port: String,
    #[serde(deserialize_with = "lenient_string")]
    pub database: String,
    #[serde(deserialize_with = "lenient_string")]
    pub user: String,
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(deserialize_with = "lenient_string")]
    pub existing_secret: String,
    #[serde(deserialize_with = "lenient_string")]
    pub existing_secret_password_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MailValues {
    #[serde(deserialize_with = "lenient_string")]
    pub smtp_host: String,
    #[serde(deserialize_with = "lenient_string")]
    pub smtp_port: String,
    #[serde(deserialize_with = "lenient_string")]
    pub smtp_user: String,
    #[serde(deserialize_with = "lenient_string")]
    pub smtp_password: String,
    #[serde(deserialize_with = "lenient_string")]
    pub smtp_tls_enabled: String,
    #[serde(deserialize_with = "lenient_string")]
    pub from_address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub from_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostgresqlValues {
    pub enabled: bool,
    pub auth: PostgresqlAuthValues,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostgresqlAuthValues {
    #[serde(deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(deserialize_with = "lenient_string")]
    pub database: String,
    #[serde(deserialize_with = "lenient_string")]
    pub existing_secret: String,
    pub secret_keys: PostgresqlSecretKeys,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostgresqlSecretKeys {
    #[serde(deserialize_with = "lenient_string")]
    pub user_password_key: String,
}

/// Parses the embedded chart defaults into a values tree.
///
/// # Errors
///
/// Returns [`RenderError::Values`] if the embedded YAML is broken.
pub fn default_tree() -> Result<Value, RenderError> {
    serde_yaml::from_str(DEFAULT_VALUES)
        .map_err(|e| RenderError::Values(format!("embedded defaults: {e}")))
}

/// Builds the values tree: defaults, then each values file in order, then overrides.
///
/// # Errors
///
/// Returns [`RenderError`] when a values file cannot be read or parsed, or an
/// override key is malformed.
pub fn build_tree(
    values_files: &[impl AsRef<Path>],
    set_values: &Overrides,
) -> Result<Value, RenderError> {
    let mut tree = default_tree()?;

    for path in values_files {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::ValuesFile {
            path: path.display().to_string(),
            source,
        })?;
        let overlay: Value = serde_yaml::from_str(&text)
            .map_err(|e| RenderError::Values(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Merging values file");
        merge_values(&mut tree, overlay);
    }

    set_values.apply_to(&mut tree)?;
    debug!(overrides = set_values.len(), "Applied value overrides");
    Ok(tree)
}

impl ChartValues {
    /// Deserializes a fully merged values tree.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Values`] if the tree does not fit the chart schema.
    pub fn from_tree(tree: Value) -> Result<Self, RenderError> {
        let values =
            Self::deserialize(&tree).map_err(|e| RenderError::Values(e.to_string()))?;
        for path in dropped_keys(&tree, &values) {
            warn!(key = %path, "Value is not a field of its Kubernetes type and was dropped");
        }
        Ok(values)
    }

    /// Defaults, values files and overrides, typed.
    ///
    /// # Errors
    ///
    /// See [`build_tree`] and [`ChartValues::from_tree`].
    pub fn resolve(
        values_files: &[impl AsRef<Path>],
        set_values: &Overrides,
    ) -> Result<Self, RenderError> {
        Self::from_tree(build_tree(values_files, set_values)?)
    }
}

/// Keys under the Kubernetes-typed component values (`affinity`, `tolerations`,
/// security contexts, `resources`) that the typed objects do not keep.
///
/// Field names are case-sensitive, so `matchexpressions` is reported while
/// `matchExpressions` is not.
#[must_use]
pub fn dropped_keys(tree: &Value, values: &ChartValues) -> Vec<String> {
    let mut dropped = Vec::new();
    for component in Component::ALL {
        let raw = &tree["web-modeler"][component.as_str()];
        let settings = values.web_modeler.component(component);
        let typed = [
            ("affinity", serde_json::to_value(&settings.affinity)),
            ("tolerations", serde_json::to_value(&settings.tolerations)),
            (
                "podSecurityContext",
                serde_json::to_value(&settings.pod_security_context),
            ),
            (
                "containerSecurityContext",
                serde_json::to_value(&settings.container_security_context),
            ),
            ("resources", serde_json::to_value(&settings.resources)),
        ];
        for (key, typed) in typed {
            if let Ok(typed) = typed {
                let path = format!("{}.{key}", component.values_prefix());
                collect_dropped(&raw[key], &typed, &path, &mut dropped);
            }
        }
    }
    dropped
}

fn collect_dropped(raw: &Value, typed: &Value, path: &str, dropped: &mut Vec<String>) {
    match (raw, typed) {
        (Value::Object(raw_map), Value::Object(typed_map)) => {
            for (key, raw_value) in raw_map {
                if raw_value.is_null() {
                    continue;
                }
                let child = format!("{path}.{key}");
                match typed_map.get(key) {
                    Some(typed_value) => collect_dropped(raw_value, typed_value, &child, dropped),
                    None => dropped.push(child),
                }
            }
        }
        (Value::Array(raw_items), Value::Array(typed_items)) => {
            for (index, (raw_item, typed_item)) in raw_items.iter().zip(typed_items).enumerate() {
                collect_dropped(raw_item, typed_item, &format!("{path}[{index}]"), dropped);
            }
        }
        _ => {}
    }
}

/// Treats a `{}` block from the values tree as unset.
#[must_use]
pub fn non_empty<T: Default + PartialEq>(value: Option<T>) -> Option<T> {
    value.filter(|v| *v != T::default())
}

fn scalar_to_string<E: serde::de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(E::custom(format!("expected a scalar, found {other}"))),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value)?.unwrap_or_default())
}

fn lenient_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut map = BTreeMap::new();
    for (key, value) in raw {
        if let Some(text) = scalar_to_string(value)? {
            map.insert(key, text);
        }
    }
    Ok(map)
}

/// Accepts a list, or a YAML flow sequence given as one string (`[printenv]`),
/// which is what a `--set command=[printenv]` override produces.
fn command_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| scalar_to_string(item).map(Option::unwrap_or_default))
            .collect(),
        Value::String(s) if s.trim_start().starts_with('[') => {
            serde_yaml::from_str::<Vec<String>>(&s).map_err(D::Error::custom)
        }
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        other => Err(D::Error::custom(format!(
            "expected a list of strings, found {other}"
        ))),
    }
}
