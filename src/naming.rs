// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource names, following Helm's `fullname` helper convention.
//!
//! A fullname is the override when one is given, otherwise
//! `<release>-<name>`, collapsing to just `<release>` when the release name
//! already contains the chart name. Names are cut to 63 characters and
//! trailing dashes are trimmed.

use crate::component::Component;
use crate::constants::{
    IDENTITY_CHART_NAME, KEYCLOAK_CHART_NAME, MAX_RESOURCE_NAME_LEN, POSTGRESQL_NAME_SUFFIX,
    WEB_MODELER_CHART_NAME,
};
use crate::values::{IdentityValues, KeycloakValues, WebModelerValues};

/// Truncates to the Kubernetes name limit and trims trailing dashes.
#[must_use]
pub fn trunc_name(name: &str) -> String {
    let truncated: String = name.chars().take(MAX_RESOURCE_NAME_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Helm's `fullname` helper.
#[must_use]
pub fn fullname(
    release: &str,
    chart_name: &str,
    name_override: &str,
    fullname_override: &str,
) -> String {
    if !fullname_override.is_empty() {
        return trunc_name(fullname_override);
    }
    let name = if name_override.is_empty() {
        chart_name
    } else {
        name_override
    };
    if release.contains(name) {
        trunc_name(release)
    } else {
        trunc_name(&format!("{release}-{name}"))
    }
}

/// Fullname of the web-modeler subchart (`<release>-web-modeler` by default)
#[must_use]
pub fn web_modeler_fullname(release: &str, values: &WebModelerValues) -> String {
    fullname(
        release,
        WEB_MODELER_CHART_NAME,
        &values.name_override,
        &values.fullname_override,
    )
}

/// Fullname of one component, also the name of its `Deployment` and `Service`
#[must_use]
pub fn component_fullname(
    release: &str,
    values: &WebModelerValues,
    component: Component,
) -> String {
    trunc_name(&format!(
        "{}-{}",
        web_modeler_fullname(release, values),
        component.as_str()
    ))
}

/// Fullname of the identity service
#[must_use]
pub fn identity_fullname(release: &str, identity: &IdentityValues) -> String {
    fullname(
        release,
        IDENTITY_CHART_NAME,
        &identity.name_override,
        &identity.fullname_override,
    )
}

/// Fullname of the in-cluster keycloak service
#[must_use]
pub fn keycloak_fullname(release: &str, keycloak: &KeycloakValues) -> String {
    fullname(release, KEYCLOAK_CHART_NAME, "", &keycloak.fullname)
}

/// Fullname of the bundled PostgreSQL release
#[must_use]
pub fn postgresql_fullname(release: &str) -> String {
    trunc_name(&format!("{release}-{POSTGRESQL_NAME_SUFFIX}"))
}
