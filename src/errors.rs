// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for rendering and checking chart manifests.
//!
//! This module provides specialized error types for:
//! - Override keys that cannot be applied to the values tree
//! - Template rendering, either in-process or through the `helm` binary
//! - Parsing rendered YAML into typed Kubernetes objects
//! - Failed expectations inside a template case
//!
//! Render and manifest errors are fatal to the case that hit them. Nothing in
//! this crate retries.

use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised while applying `--set` style overrides to a values tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverrideError {
    /// The key could not be split into path segments.
    ///
    /// Covers empty segments (`a..b`), unterminated or non-numeric indices
    /// (`a[x]`, `a[0`) and a trailing escape character.
    #[error("Malformed override key '{key}': {reason}")]
    MalformedKey {
        /// The full override key as given
        key: String,
        /// What is wrong with it
        reason: String,
    },

    /// A list index above the supported maximum.
    #[error("Override key '{key}' uses index {index}, maximum is {max}")]
    IndexTooLarge {
        /// The full override key as given
        key: String,
        /// The offending index
        index: usize,
        /// The largest accepted index
        max: usize,
    },
}

/// Errors that can occur while rendering chart templates.
#[derive(Error, Debug)]
pub enum RenderError {
    /// An override could not be applied
    #[error(transparent)]
    Override(#[from] OverrideError),

    /// The values tree (defaults, values files, overrides) does not fit the chart schema
    #[error("Invalid chart values: {0}")]
    Values(String),

    /// A value passed the schema but cannot be used by a template (e.g. a port that is not a number)
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue {
        /// Dotted key of the offending value
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// A values file could not be read
    #[error("Failed to read values file {path}: {source}")]
    ValuesFile {
        /// Path of the values file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The requested template does not exist in the chart
    #[error("Could not find template {template} in chart")]
    UnknownTemplate {
        /// Template path relative to the chart root
        template: String,
    },

    /// The requested templates produced no document
    #[error("No manifest rendered for templates [{}]", templates.join(", "))]
    NothingRendered {
        /// Template paths that were requested
        templates: Vec<String>,
    },

    /// Rendered objects could not be serialized to YAML
    #[error("Failed to serialize rendered manifest: {0}")]
    Serialize(String),

    /// The `helm` binary could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        /// Program that was executed
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// `helm template` exited unsuccessfully
    #[error("helm template failed ({status}): {stderr}")]
    HelmFailed {
        /// Exit status of the process
        status: ExitStatus,
        /// Captured standard error
        stderr: String,
    },

    /// `helm template` wrote something that is not UTF-8
    #[error("helm template produced non UTF-8 output")]
    NonUtf8,
}

/// Errors raised when turning rendered YAML into typed objects.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The text is not valid YAML or does not fit the target type
    #[error("Failed to parse manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The text did not contain exactly one document
    #[error("Expected exactly one manifest document, found {found}")]
    DocumentCount {
        /// Number of non-empty documents found
        found: usize,
    },

    /// The document is of a different kind than requested
    #[error("Expected a {expected} manifest, found {found}")]
    KindMismatch {
        /// Kind of the requested type
        expected: String,
        /// Kind of the rendered document (empty when missing)
        found: String,
    },
}

/// Outcome of a failed template case.
///
/// `expected` and `actual` hold `Debug` renderings so that any field type can
/// be reported side by side.
#[derive(Error, Debug)]
pub enum CaseFailure {
    /// Rendering failed
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// The rendered output did not parse
    #[error("manifest parse failed: {0}")]
    Manifest(#[from] ManifestError),

    /// A field had a different value than expected
    #[error("{field}: expected {expected}, got {actual}")]
    Mismatch {
        /// Path of the checked field
        field: String,
        /// Expected value
        expected: String,
        /// Rendered value
        actual: String,
    },

    /// A field that should be set was absent
    #[error("{field}: missing from rendered manifest")]
    Missing {
        /// Path of the missing field
        field: String,
    },

    /// A list did not contain an expected element
    #[error("{field}: {expected} not found in {actual}")]
    NotContained {
        /// Path of the checked list
        field: String,
        /// Element that should be present
        expected: String,
        /// The rendered list
        actual: String,
    },
}
