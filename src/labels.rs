// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label constants stamped on every rendered web-modeler resource.
//!
//! The selector labels are a strict subset of the metadata labels so that a
//! `Deployment` selector keeps matching when only versions change.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture (e.g., "restapi")
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of the application (e.g., "web-modeler")
pub const K8S_NAME: &str = "app.kubernetes.io/name";

/// Standard label for a unique name identifying the instance of an application
pub const K8S_INSTANCE: &str = "app.kubernetes.io/instance";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

/// Standard label for the current version of the application
pub const K8S_VERSION: &str = "app.kubernetes.io/version";

/// Helm's chart label (`<chart>-<version>`)
pub const HELM_CHART: &str = "helm.sh/chart";

/// Legacy `app` label kept by the Camunda charts
pub const APP: &str = "app";

// ============================================================================
// Label Values
// ============================================================================

/// Value for `app` and `app.kubernetes.io/part-of`
pub const PART_OF_CAMUNDA_PLATFORM: &str = "camunda-platform";

/// Value for `app.kubernetes.io/managed-by`
pub const MANAGED_BY_HELM: &str = "Helm";
