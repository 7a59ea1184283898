// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The deployable web-modeler components.

use crate::constants::{
    PORT_NAME_HTTP, PORT_NAME_MANAGEMENT, RESTAPI_HTTP_PORT, RESTAPI_MANAGEMENT_PORT,
    WEBAPP_HTTP_PORT, WEBAPP_MANAGEMENT_PORT, WEBSOCKETS_HTTP_PORT, WEB_MODELER_TEMPLATE_DIR,
};
use std::fmt;
use std::str::FromStr;

/// One of the three web-modeler workloads, each rendered as its own `Deployment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    Restapi,
    Webapp,
    Websockets,
}

impl Component {
    /// Every component, in the order the suites run them
    pub const ALL: [Component; 3] = [Component::Restapi, Component::Webapp, Component::Websockets];

    /// Name used in value keys, template file names and resource names
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Component::Restapi => "restapi",
            Component::Webapp => "webapp",
            Component::Websockets => "websockets",
        }
    }

    /// Name of the single container in the component's pod
    #[must_use]
    pub fn container_name(self) -> String {
        format!("web-modeler-{}", self.as_str())
    }

    /// Prefix of the component's keys in the values tree (`web-modeler.<component>`)
    #[must_use]
    pub fn values_prefix(self) -> String {
        format!("web-modeler.{}", self.as_str())
    }

    /// Path of the component's `Deployment` template relative to the umbrella chart
    #[must_use]
    pub fn deployment_template(self) -> String {
        format!("{WEB_MODELER_TEMPLATE_DIR}/deployment-{}.yaml", self.as_str())
    }

    /// Path of the component's `Service` template relative to the umbrella chart
    #[must_use]
    pub fn service_template(self) -> String {
        format!("{WEB_MODELER_TEMPLATE_DIR}/service-{}.yaml", self.as_str())
    }

    /// Application container port
    #[must_use]
    pub fn http_port(self) -> i32 {
        match self {
            Component::Restapi => RESTAPI_HTTP_PORT,
            Component::Webapp => WEBAPP_HTTP_PORT,
            Component::Websockets => WEBSOCKETS_HTTP_PORT,
        }
    }

    /// Management container port, if the component has one
    #[must_use]
    pub fn management_port(self) -> Option<i32> {
        match self {
            Component::Restapi => Some(RESTAPI_MANAGEMENT_PORT),
            Component::Webapp => Some(WEBAPP_MANAGEMENT_PORT),
            Component::Websockets => None,
        }
    }

    /// Named port the health probes target
    #[must_use]
    pub fn probe_port_name(self) -> &'static str {
        if self.management_port().is_some() {
            PORT_NAME_MANAGEMENT
        } else {
            PORT_NAME_HTTP
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Component::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown web-modeler component '{s}'"))
    }
}
