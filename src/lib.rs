// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # modeler-chart - web-modeler Helm chart template checks
//!
//! Renders the web-modeler subchart of the Camunda Platform Helm chart with
//! value overrides, parses the output into typed Kubernetes objects and checks
//! the fields the overrides should have changed.
//!
//! ## Overview
//!
//! A check goes through three steps:
//!
//! - Render templates with `--set` style overrides ([`render`])
//! - Parse the YAML output into `k8s-openapi` types ([`manifest`])
//! - Compare fields against expectations ([`suite`])
//!
//! Rendering goes through the [`render::Renderer`] trait. [`render::ChartRenderer`]
//! builds the web-modeler manifests in-process from the bundled chart defaults;
//! [`render::HelmRenderer`] runs `helm template` against a chart directory.
//!
//! ## Modules
//!
//! - [`overrides`] - Dotted override keys and Helm `--set` value typing
//! - [`values`] - Chart defaults and the typed values tree
//! - [`chart_resources`] - `Deployment`, `Service` and `Secret` builders
//! - [`render`] - Renderers and render options
//! - [`manifest`] - Typed deserialization of rendered output
//! - [`suite`] - Template cases and the suite runner
//!
//! ## Example
//!
//! ```rust,no_run
//! use k8s_openapi::api::apps::v1::Deployment;
//! use modeler_chart::component::Component;
//! use modeler_chart::manifest::unmarshal_k8s_yaml;
//! use modeler_chart::overrides;
//! use modeler_chart::render::{ChartRenderer, RenderOptions, Renderer};
//!
//! let set_values = overrides! {
//!     "web-modeler.enabled" => "true",
//!     "web-modeler.restapi.podLabels.foo" => "bar",
//! };
//! let options = RenderOptions::new("camunda-platform-abc123", set_values);
//! let output = ChartRenderer::new()
//!     .render(
//!         "camunda-platform-test",
//!         &options,
//!         &[Component::Restapi.deployment_template()],
//!     )
//!     .unwrap();
//! let deployment: Deployment = unmarshal_k8s_yaml(&output).unwrap();
//! ```

pub mod chart_resources;
pub mod component;
pub mod constants;
pub mod endpoints;
pub mod errors;
pub mod image;
pub mod labels;
pub mod manifest;
pub mod naming;

#[macro_use]
pub mod overrides;

pub mod render;
pub mod suite;
pub mod values;

#[cfg(test)]
mod errors_tests;
#[cfg(test)]
mod image_tests;
#[cfg(test)]
mod overrides_tests;
#[cfg(test)]
mod render_tests;
