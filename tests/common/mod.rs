// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use modeler_chart::component::Component;
use modeler_chart::render::HelmRenderer;
use modeler_chart::suite::{CaseFn, SuiteContext, SuiteReport};
use std::path::PathBuf;
use std::process::Command;

/// Runs one case against the bundled chart and panics with the failure.
pub fn run_bundled_case(component: Component, case: CaseFn) {
    let context = SuiteContext::bundled(component);
    if let Err(failure) = case(&context) {
        panic!("[{component}] namespace {}: {failure}", context.namespace);
    }
}

/// Get a helm renderer for the chart in `MODELER_CHART_DIR`, or skip the test
pub fn helm_renderer_or_skip() -> Option<HelmRenderer> {
    let Some(chart_dir) = std::env::var_os("MODELER_CHART_DIR").map(PathBuf::from) else {
        eprintln!("Skipping helm test: MODELER_CHART_DIR is not set");
        return None;
    };
    let helm_bin = std::env::var_os("HELM_BIN").map_or_else(|| PathBuf::from("helm"), PathBuf::from);

    match Command::new(&helm_bin).arg("version").output() {
        Ok(output) if output.status.success() => {
            Some(HelmRenderer::with_binary(helm_bin, chart_dir))
        }
        Ok(output) => {
            eprintln!(
                "Skipping helm test: {} version failed: {}",
                helm_bin.display(),
                String::from_utf8_lossy(&output.stderr)
            );
            None
        }
        Err(e) => {
            eprintln!("Skipping helm test: cannot run {}: {e}", helm_bin.display());
            None
        }
    }
}

/// Panics listing every failed case of a report
pub fn assert_report_passed(suite: &str, report: &SuiteReport) {
    let failures: Vec<String> = report
        .failures()
        .filter_map(|outcome| outcome.result.as_ref().err().map(|failure| {
            format!("{suite}/{}/{}: {failure}", report.component, outcome.name)
        }))
        .collect();
    assert!(failures.is_empty(), "failed cases:\n{}", failures.join("\n"));
}
