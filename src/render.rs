// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Template rendering.
//!
//! A [`Renderer`] turns a release name, render options and a list of template
//! paths into rendered multi-document YAML text. Two implementations exist:
//!
//! - [`ChartRenderer`] renders the bundled web-modeler templates in-process
//! - [`HelmRenderer`] shells out to `helm template` against a chart directory
//!
//! Both produce the same document framing (`---` plus a `# Source:` comment),
//! so the manifest parser does not care which one ran.

use crate::chart_resources::{build_deployment, build_restapi_secret, build_service};
use crate::component::Component;
use crate::constants::{UMBRELLA_CHART_NAME, WEB_MODELER_TEMPLATE_DIR};
use crate::errors::RenderError;
use crate::overrides::{escape_set_value, Overrides};
use crate::values::ChartValues;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Inputs of a render besides the release name and templates.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Namespace passed to the renderer (`--namespace`)
    pub namespace: String,
    /// `--set` overrides, applied after the values files
    pub set_values: Overrides,
    /// Values files merged onto the chart defaults in order (`--values`)
    pub values_files: Vec<PathBuf>,
}

impl RenderOptions {
    #[must_use]
    pub fn new(namespace: impl Into<String>, set_values: Overrides) -> Self {
        Self {
            namespace: namespace.into(),
            set_values,
            values_files: Vec::new(),
        }
    }
}

/// Renders chart templates to YAML text.
///
/// An empty `templates` list renders every template of the chart.
pub trait Renderer: Send + Sync {
    /// Renders `templates` for `release`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the values are invalid, a template is
    /// unknown, or the external tool fails.
    fn render(
        &self,
        release: &str,
        options: &RenderOptions,
        templates: &[String],
    ) -> Result<String, RenderError>;
}

/// The templates the bundled web-modeler chart provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartTemplate {
    Deployment(Component),
    Service(Component),
    RestapiSecret,
}

impl ChartTemplate {
    /// Every bundled template, in the order a full render emits them
    #[must_use]
    pub fn all() -> Vec<ChartTemplate> {
        let mut templates = vec![ChartTemplate::RestapiSecret];
        templates.extend(Component::ALL.into_iter().map(ChartTemplate::Service));
        templates.extend(Component::ALL.into_iter().map(ChartTemplate::Deployment));
        templates
    }

    /// Template path relative to the umbrella chart
    #[must_use]
    pub fn path(self) -> String {
        match self {
            ChartTemplate::Deployment(component) => component.deployment_template(),
            ChartTemplate::Service(component) => component.service_template(),
            ChartTemplate::RestapiSecret => {
                format!("{WEB_MODELER_TEMPLATE_DIR}/secret-restapi.yaml")
            }
        }
    }

    /// Looks up a template by path.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownTemplate`] for paths the chart does not have.
    pub fn from_path(path: &str) -> Result<ChartTemplate, RenderError> {
        Self::all()
            .into_iter()
            .find(|template| template.path() == path)
            .ok_or_else(|| RenderError::UnknownTemplate {
                template: path.to_string(),
            })
    }
}

/// Renders the bundled web-modeler chart without any external tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartRenderer;

impl ChartRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn render_template(
        release: &str,
        namespace: &str,
        values: &ChartValues,
        template: ChartTemplate,
    ) -> Result<String, RenderError> {
        match template {
            ChartTemplate::Deployment(component) => {
                to_document(&build_deployment(release, namespace, values, component)?)
            }
            ChartTemplate::Service(component) => {
                to_document(&build_service(release, namespace, values, component))
            }
            ChartTemplate::RestapiSecret => {
                to_document(&build_restapi_secret(release, namespace, values))
            }
        }
    }
}

fn to_document<T: Serialize>(resource: &T) -> Result<String, RenderError> {
    serde_yaml::to_string(resource).map_err(|e| RenderError::Serialize(e.to_string()))
}

impl Renderer for ChartRenderer {
    fn render(
        &self,
        release: &str,
        options: &RenderOptions,
        templates: &[String],
    ) -> Result<String, RenderError> {
        let selected = if templates.is_empty() {
            ChartTemplate::all()
        } else {
            templates
                .iter()
                .map(|path| ChartTemplate::from_path(path))
                .collect::<Result<Vec<_>, _>>()?
        };

        let values = ChartValues::resolve(&options.values_files, &options.set_values)?;
        if !values.web_modeler.enabled {
            debug!(release = %release, "web-modeler disabled, templates render nothing");
            return Err(RenderError::NothingRendered {
                templates: selected.iter().map(|t| t.path()).collect(),
            });
        }

        let mut output = String::new();
        for template in selected {
            let document = Self::render_template(release, &options.namespace, &values, template)?;
            output.push_str("---\n");
            output.push_str(&format!("# Source: {UMBRELLA_CHART_NAME}/{}\n", template.path()));
            output.push_str(&document);
        }

        debug!(
            release = %release,
            namespace = %options.namespace,
            bytes = output.len(),
            "Rendered bundled chart templates"
        );
        Ok(output)
    }
}

/// Renders a chart directory through the `helm` binary.
#[derive(Debug, Clone)]
pub struct HelmRenderer {
    helm_bin: PathBuf,
    chart_dir: PathBuf,
}

impl HelmRenderer {
    /// Uses the `helm` found on `PATH`
    #[must_use]
    pub fn new(chart_dir: impl Into<PathBuf>) -> Self {
        Self::with_binary("helm", chart_dir)
    }

    #[must_use]
    pub fn with_binary(helm_bin: impl Into<PathBuf>, chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            helm_bin: helm_bin.into(),
            chart_dir: chart_dir.into(),
        }
    }

    #[must_use]
    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }

    /// Command line arguments for `helm`, without the program name.
    #[must_use]
    pub fn build_args(
        &self,
        release: &str,
        options: &RenderOptions,
        templates: &[String],
    ) -> Vec<String> {
        let mut args = vec![
            "template".to_string(),
            release.to_string(),
            self.chart_dir.display().to_string(),
        ];
        if !options.namespace.is_empty() {
            args.push("--namespace".to_string());
            args.push(options.namespace.clone());
        }
        for file in &options.values_files {
            args.push("--values".to_string());
            args.push(file.display().to_string());
        }
        for (key, value) in options.set_values.iter() {
            args.push("--set".to_string());
            args.push(format!("{key}={}", escape_set_value(value)));
        }
        for template in templates {
            args.push("--show-only".to_string());
            args.push(template.clone());
        }
        args
    }
}

impl Renderer for HelmRenderer {
    fn render(
        &self,
        release: &str,
        options: &RenderOptions,
        templates: &[String],
    ) -> Result<String, RenderError> {
        let args = self.build_args(release, options, templates);
        let program = self.helm_bin.display().to_string();
        info!(program = %program, args = ?args, "Running helm template");

        let output = Command::new(&self.helm_bin)
            .args(&args)
            .output()
            .map_err(|source| RenderError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::HelmFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| RenderError::NonUtf8)
    }
}
