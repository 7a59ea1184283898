// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Template cases for the web-modeler deployments.
//!
//! A case sets overrides, renders one template, parses it into a typed object
//! and checks fields. Cases are plain functions collected in tables so the same
//! checks can run per component, from `cargo test` or from the `verify`
//! command.
//!
//! ## Modules
//!
//! - [`deployment`] - Checks shared by restapi, webapp and websockets
//! - [`restapi`] - restapi-only checks (database, mail, identity URLs)

pub mod deployment;
pub mod restapi;

use crate::component::Component;
use crate::constants::{TEST_NAMESPACE_PREFIX, TEST_RELEASE_NAME};
use crate::errors::CaseFailure;
use crate::manifest::unmarshal_k8s_yaml;
use crate::overrides::Overrides;
use crate::render::{ChartRenderer, RenderOptions, Renderer};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Container, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};

/// Length of the random part of a suite namespace
const UNIQUE_ID_LEN: usize = 6;

/// A random lowercase alphanumeric id.
#[must_use]
pub fn unique_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    (0..UNIQUE_ID_LEN)
        .map(|_| char::from(ALPHABET[rand::random_range(0..ALPHABET.len())]))
        .collect()
}

/// Namespace for one suite run, unique so parallel suites never collide.
#[must_use]
pub fn unique_namespace() -> String {
    format!("{TEST_NAMESPACE_PREFIX}{}", unique_id())
}

/// Everything a case needs to render its template.
#[derive(Clone)]
pub struct SuiteContext {
    renderer: Arc<dyn Renderer>,
    pub release: String,
    pub namespace: String,
    pub component: Component,
    pub templates: Vec<String>,
}

impl SuiteContext {
    /// Context for `component`'s deployment template with a fresh namespace.
    #[must_use]
    pub fn new(renderer: Arc<dyn Renderer>, component: Component) -> Self {
        Self {
            renderer,
            release: TEST_RELEASE_NAME.to_string(),
            namespace: unique_namespace(),
            component,
            templates: vec![component.deployment_template()],
        }
    }

    /// Context backed by the bundled chart.
    #[must_use]
    pub fn bundled(component: Component) -> Self {
        Self::new(Arc::new(ChartRenderer::new()), component)
    }

    /// Component-scoped values key: `web-modeler.<component>.<suffix>`
    #[must_use]
    pub fn key(&self, suffix: &str) -> String {
        format!("{}.{suffix}", self.component.values_prefix())
    }

    /// Renders the context's templates with `set_values`.
    ///
    /// # Errors
    ///
    /// Returns [`CaseFailure::Render`] if rendering fails.
    pub fn render(&self, set_values: Overrides) -> Result<String, CaseFailure> {
        let options = RenderOptions::new(self.namespace.clone(), set_values);
        Ok(self
            .renderer
            .render(&self.release, &options, &self.templates)?)
    }

    /// Renders and parses the component's `Deployment`.
    ///
    /// # Errors
    ///
    /// Returns [`CaseFailure::Render`] or [`CaseFailure::Manifest`].
    pub fn render_deployment(&self, set_values: Overrides) -> Result<Deployment, CaseFailure> {
        let output = self.render(set_values)?;
        Ok(unmarshal_k8s_yaml::<Deployment>(&output)?)
    }
}

impl Debug for SuiteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteContext")
            .field("release", &self.release)
            .field("namespace", &self.namespace)
            .field("component", &self.component)
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}

/// Signature of a template case
pub type CaseFn = fn(&SuiteContext) -> Result<(), CaseFailure>;

/// A named template case.
#[derive(Debug, Clone, Copy)]
pub struct Case {
    pub name: &'static str,
    pub run: CaseFn,
}

/// Result of one case in a suite run.
#[derive(Debug)]
pub struct CaseOutcome {
    pub name: &'static str,
    pub result: Result<(), CaseFailure>,
}

/// Results of running a case table against one context.
#[derive(Debug)]
pub struct SuiteReport {
    pub component: Component,
    pub namespace: String,
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    /// Outcomes that failed, in run order
    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err())
    }
}

/// Runs every case in order. A failing case is recorded and the run moves on.
#[must_use]
pub fn run_suite(context: &SuiteContext, cases: &[Case]) -> SuiteReport {
    let mut outcomes = Vec::with_capacity(cases.len());
    for case in cases {
        let result = (case.run)(context);
        match &result {
            Ok(()) => debug!(case = case.name, component = %context.component, "Case passed"),
            Err(failure) => warn!(
                case = case.name,
                component = %context.component,
                error = %failure,
                "Case failed"
            ),
        }
        outcomes.push(CaseOutcome {
            name: case.name,
            result,
        });
    }
    SuiteReport {
        component: context.component,
        namespace: context.namespace.clone(),
        outcomes,
    }
}

// ============================================================================
// Expectations
// ============================================================================

/// Checks `actual == expected`.
///
/// # Errors
///
/// Returns [`CaseFailure::Mismatch`] with both values rendered via `Debug`.
pub fn expect_eq<T: PartialEq + Debug + ?Sized>(
    field: &str,
    expected: &T,
    actual: &T,
) -> Result<(), CaseFailure> {
    if expected == actual {
        Ok(())
    } else {
        Err(CaseFailure::Mismatch {
            field: field.to_string(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}

/// Unwraps an optional field.
///
/// # Errors
///
/// Returns [`CaseFailure::Missing`] for `None`.
pub fn expect_some<T>(field: &str, value: Option<T>) -> Result<T, CaseFailure> {
    value.ok_or_else(|| CaseFailure::Missing {
        field: field.to_string(),
    })
}

/// Checks that `list` holds an element equal to `item`.
///
/// # Errors
///
/// Returns [`CaseFailure::NotContained`] otherwise.
pub fn expect_contains<T: PartialEq + Debug>(
    field: &str,
    list: &[T],
    item: &T,
) -> Result<(), CaseFailure> {
    if list.contains(item) {
        Ok(())
    } else {
        Err(CaseFailure::NotContained {
            field: field.to_string(),
            expected: format!("{item:?}"),
            actual: format!("{list:?}"),
        })
    }
}

/// Pod template metadata of a deployment
///
/// # Errors
///
/// Returns [`CaseFailure::Missing`] when the deployment has no spec or pod metadata.
pub fn pod_metadata(deployment: &Deployment) -> Result<&ObjectMeta, CaseFailure> {
    let spec = expect_some("spec", deployment.spec.as_ref())?;
    expect_some("spec.template.metadata", spec.template.metadata.as_ref())
}

/// Pod spec of a deployment
///
/// # Errors
///
/// Returns [`CaseFailure::Missing`] when the deployment has no spec or pod spec.
pub fn pod_spec(deployment: &Deployment) -> Result<&PodSpec, CaseFailure> {
    let spec = expect_some("spec", deployment.spec.as_ref())?;
    expect_some("spec.template.spec", spec.template.spec.as_ref())
}

/// First container of a deployment's pod
///
/// # Errors
///
/// Returns [`CaseFailure::Missing`] when the pod has no containers.
pub fn first_container(deployment: &Deployment) -> Result<&Container, CaseFailure> {
    expect_some(
        "spec.template.spec.containers[0]",
        pod_spec(deployment)?.containers.first(),
    )
}
