// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Container image resolution.
//!
//! Registry and tag are looked up component first, then on the web-modeler
//! subchart, then under `global.image`. The first non-empty value wins, so an
//! explicitly empty subchart value falls back to the global one.

use crate::values::ImageValues;
use k8s_openapi::api::core::v1::LocalObjectReference;

/// Returns the first non-empty candidate, or an empty string.
fn first_non_empty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Builds `<registry>/<repository>:<tag>`.
///
/// The registry prefix is dropped when no level sets one, and the tag suffix
/// is dropped when no level sets one.
#[must_use]
pub fn resolve_image(
    global: &ImageValues,
    subchart: &ImageValues,
    component: &ImageValues,
) -> String {
    let registry = first_non_empty(&[
        component.registry.as_str(),
        subchart.registry.as_str(),
        global.registry.as_str(),
    ]);
    let repository =
        first_non_empty(&[component.repository.as_str(), subchart.repository.as_str()]);
    let tag = resolve_tag(global, subchart, component);

    let mut image = String::new();
    if !registry.is_empty() {
        image.push_str(registry.trim_end_matches('/'));
        image.push('/');
    }
    image.push_str(repository);
    if !tag.is_empty() {
        image.push(':');
        image.push_str(tag);
    }
    image
}

/// Tag the image resolves to, used for the `app.kubernetes.io/version` label.
#[must_use]
pub fn resolve_tag<'a>(
    global: &'a ImageValues,
    subchart: &'a ImageValues,
    component: &'a ImageValues,
) -> &'a str {
    first_non_empty(&[
        component.tag.as_str(),
        subchart.tag.as_str(),
        global.tag.as_str(),
    ])
}

/// Pull policy: subchart value, else the global one.
#[must_use]
pub fn resolve_pull_policy(global: &ImageValues, subchart: &ImageValues) -> Option<String> {
    let policy = first_non_empty(&[
        subchart.pull_policy.as_str(),
        global.pull_policy.as_str(),
    ]);
    (!policy.is_empty()).then(|| policy.to_string())
}

/// Pull secrets: subchart list when non-empty, else the global list.
#[must_use]
pub fn resolve_pull_secrets(
    global: &ImageValues,
    subchart: &ImageValues,
) -> Option<Vec<LocalObjectReference>> {
    let secrets = if subchart.pull_secrets.is_empty() {
        &global.pull_secrets
    } else {
        &subchart.pull_secrets
    };
    (!secrets.is_empty()).then(|| secrets.clone())
}
