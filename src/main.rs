// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{Secret, Service},
};
use kube::ResourceExt;
use modeler_chart::{
    component::Component,
    constants::TEST_RELEASE_NAME,
    manifest::documents_of_kind,
    overrides::Overrides,
    render::{ChartRenderer, HelmRenderer, RenderOptions, Renderer},
    suite::{deployment, restapi, run_suite, SuiteContext, SuiteReport},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Renders and verifies the web-modeler chart templates
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render templates and print the YAML
    Render(RenderArgs),
    /// Run every template case against the chart
    Verify(ChartArgs),
}

/// Where templates come from
#[derive(Args, Debug)]
struct ChartArgs {
    /// Chart directory rendered with `helm template`; the bundled chart when unset
    #[arg(long, env = "MODELER_CHART_DIR")]
    chart_dir: Option<PathBuf>,

    /// helm binary used with --chart-dir
    #[arg(long, env = "HELM_BIN", default_value = "helm")]
    helm_bin: PathBuf,
}

impl ChartArgs {
    fn renderer(&self) -> Arc<dyn Renderer> {
        match &self.chart_dir {
            Some(chart_dir) => {
                info!(chart_dir = %chart_dir.display(), "Rendering with helm");
                Arc::new(HelmRenderer::with_binary(&self.helm_bin, chart_dir))
            }
            None => {
                info!("Rendering the bundled web-modeler chart");
                Arc::new(ChartRenderer::new())
            }
        }
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    chart: ChartArgs,

    #[arg(long, default_value = TEST_RELEASE_NAME)]
    release: String,

    #[arg(long, default_value = "default")]
    namespace: String,

    /// Values file, merged in order
    #[arg(short = 'f', long = "values")]
    values_files: Vec<PathBuf>,

    /// Override as key=value
    #[arg(long = "set")]
    set_values: Vec<String>,

    /// Template path to render; all templates when omitted
    #[arg(long = "show-only")]
    templates: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("modeler-chart")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

/// Logs go to stderr so rendered YAML on stdout stays clean.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
    debug!("Logging initialized with file and line number tracking");
}

async fn async_main(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render(args) => render(&args),
        Command::Verify(args) => verify(args.renderer()).await,
    }
}

/// Parses `--set key=value` arguments.
fn parse_set_values(assignments: &[String]) -> Result<Overrides> {
    assignments
        .iter()
        .map(|assignment| {
            Overrides::parse_assignment(assignment)
                .with_context(|| format!("Invalid --set argument '{assignment}'"))
        })
        .collect()
}

/// Renders the requested templates and logs the objects found in the output.
fn render_output(args: &RenderArgs) -> Result<String> {
    let options = RenderOptions {
        namespace: args.namespace.clone(),
        set_values: parse_set_values(&args.set_values)?,
        values_files: args.values_files.clone(),
    };

    let output = args
        .chart
        .renderer()
        .render(&args.release, &options, &args.templates)
        .with_context(|| format!("Failed to render release {}", args.release))?;

    for deployment in documents_of_kind::<Deployment>(&output)? {
        info!(name = %deployment.name_any(), "Rendered Deployment");
    }
    for service in documents_of_kind::<Service>(&output)? {
        info!(name = %service.name_any(), "Rendered Service");
    }
    for secret in documents_of_kind::<Secret>(&output)? {
        info!(name = %secret.name_any(), "Rendered Secret");
    }
    Ok(output)
}

fn render(args: &RenderArgs) -> Result<()> {
    print!("{}", render_output(args)?);
    Ok(())
}

/// Runs the component suite for every component and the restapi suite, one
/// blocking job each. Reports come back in completion order.
async fn run_suites(renderer: Arc<dyn Renderer>) -> Result<Vec<(&'static str, SuiteReport)>> {
    let mut jobs = JoinSet::new();
    for component in Component::ALL {
        let renderer = renderer.clone();
        jobs.spawn_blocking(move || {
            let context = SuiteContext::new(renderer, component);
            ("deployment", run_suite(&context, deployment::CASES))
        });
    }
    jobs.spawn_blocking(move || {
        let context = SuiteContext::new(renderer, Component::Restapi);
        ("deployment-restapi", run_suite(&context, restapi::CASES))
    });

    let mut reports = Vec::new();
    while let Some(joined) = jobs.join_next().await {
        reports.push(joined.context("Suite job panicked")?);
    }
    Ok(reports)
}

async fn verify(renderer: Arc<dyn Renderer>) -> Result<()> {
    let reports = run_suites(renderer).await?;

    let mut total = 0;
    let mut failed = 0;
    for (suite, report) in &reports {
        for line in report_lines(suite, report) {
            println!("{line}");
        }
        total += report.outcomes.len();
        failed += report.failures().count();
    }

    info!(total, failed, "Template cases finished");
    if failed > 0 {
        anyhow::bail!("{failed} of {total} template cases failed");
    }
    Ok(())
}

/// One `ok` or `FAIL` line per case.
fn report_lines(suite: &str, report: &SuiteReport) -> Vec<String> {
    report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(()) => format!("ok   {suite}/{}/{}", report.component, outcome.name),
            Err(failure) => format!(
                "FAIL {suite}/{}/{}: {failure}",
                report.component, outcome.name
            ),
        })
        .collect()
}
