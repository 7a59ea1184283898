// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the web-modeler chart renderer.
//!
//! This module contains the names, ports and defaults baked into the
//! `web-modeler` templates. Constants are organized by category for easy maintenance.

// ============================================================================
// Chart Constants
// ============================================================================

/// Name of the umbrella chart the web-modeler subchart ships in
pub const UMBRELLA_CHART_NAME: &str = "camunda-platform";

/// Name of the web-modeler subchart
pub const WEB_MODELER_CHART_NAME: &str = "web-modeler";

/// Version stamped into the `helm.sh/chart` label
pub const WEB_MODELER_CHART_VERSION: &str = "8.2.0";

/// Directory of the subchart templates, relative to the umbrella chart
pub const WEB_MODELER_TEMPLATE_DIR: &str = "charts/web-modeler/templates";

/// Release name used by the template suites
pub const TEST_RELEASE_NAME: &str = "camunda-platform-test";

/// Prefix of the randomized namespace used by the template suites
pub const TEST_NAMESPACE_PREFIX: &str = "camunda-platform-";

/// Kubernetes names are capped at 63 characters (DNS-1123 label)
pub const MAX_RESOURCE_NAME_LEN: usize = 63;

// ============================================================================
// Override Constants
// ============================================================================

/// Largest list index accepted in an override key (same cap as `helm --set`)
pub const MAX_OVERRIDE_INDEX: usize = 65536;

// ============================================================================
// Container Port Constants
// ============================================================================

/// Name of the application HTTP port on every component
pub const PORT_NAME_HTTP: &str = "http";

/// Name of the management (actuator/health) port
pub const PORT_NAME_MANAGEMENT: &str = "http-management";

/// restapi application port
pub const RESTAPI_HTTP_PORT: i32 = 8081;

/// restapi management port
pub const RESTAPI_MANAGEMENT_PORT: i32 = 8091;

/// webapp application port
pub const WEBAPP_HTTP_PORT: i32 = 8070;

/// webapp management port
pub const WEBAPP_MANAGEMENT_PORT: i32 = 8071;

/// websockets application port
pub const WEBSOCKETS_HTTP_PORT: i32 = 8060;

/// Port every web-modeler `Service` exposes for application traffic
pub const SERVICE_HTTP_PORT: i32 = 80;

// ============================================================================
// Secret Constants
// ============================================================================

/// Key of the external database password in the restapi `Secret`
pub const SECRET_KEY_DATABASE_PASSWORD: &str = "database-password";

/// Key of the SMTP password in the restapi `Secret`
pub const SECRET_KEY_SMTP_PASSWORD: &str = "smtp-password";

/// Key of the user password in the bundled PostgreSQL `Secret`
pub const SECRET_KEY_POSTGRESQL_PASSWORD: &str = "password";

// ============================================================================
// Identity Constants
// ============================================================================

/// Default name of the identity chart
pub const IDENTITY_CHART_NAME: &str = "identity";

/// Default name of the keycloak chart
pub const KEYCLOAK_CHART_NAME: &str = "keycloak";

/// Port of the in-cluster keycloak service
pub const KEYCLOAK_SERVICE_PORT: u16 = 80;

/// Suffix of the in-cluster PostgreSQL release used by web-modeler
pub const POSTGRESQL_NAME_SUFFIX: &str = "postgresql-web-modeler";

/// Port of the bundled PostgreSQL service
pub const POSTGRESQL_PORT: u16 = 5432;

/// Fallback service account when none is created or named
pub const DEFAULT_SERVICE_ACCOUNT: &str = "default";
