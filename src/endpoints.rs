// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service URLs injected into the web-modeler containers.

use crate::constants::KEYCLOAK_SERVICE_PORT;
use crate::errors::RenderError;
use crate::naming::{identity_fullname, keycloak_fullname};
use crate::values::IdentityValues;
use url::Url;

/// Keycloak origin plus context path, as seen from inside the cluster.
///
/// Uses `global.identity.keycloak.url` when a host is set, otherwise the
/// in-cluster keycloak service. A port equal to the scheme default (80 for
/// http, 443 for https) is left out.
///
/// # Errors
///
/// Returns [`RenderError::InvalidValue`] for an unusable protocol, host or port.
pub fn keycloak_base_url(release: &str, identity: &IdentityValues) -> Result<Url, RenderError> {
    let keycloak = &identity.keycloak;
    let (protocol, host, port) = if keycloak.url.host.is_empty() {
        (
            "http".to_string(),
            keycloak_fullname(release, keycloak),
            Some(KEYCLOAK_SERVICE_PORT),
        )
    } else {
        let protocol = if keycloak.url.protocol.is_empty() {
            "http".to_string()
        } else {
            keycloak.url.protocol.clone()
        };
        let port = if keycloak.url.port.is_empty() {
            None
        } else {
            Some(keycloak.url.port.parse::<u16>().map_err(|e| {
                RenderError::InvalidValue {
                    key: "global.identity.keycloak.url.port".to_string(),
                    reason: format!("'{}' is not a port: {e}", keycloak.url.port),
                }
            })?)
        };
        (protocol, keycloak.url.host.clone(), port)
    };

    let mut url = Url::parse(&format!("{protocol}://{host}")).map_err(|e| {
        RenderError::InvalidValue {
            key: "global.identity.keycloak.url".to_string(),
            reason: format!("'{protocol}://{host}' is not a URL: {e}"),
        }
    })?;
    // The url crate stores a scheme-default port as None, which drops it from the output.
    url.set_port(port).map_err(|()| RenderError::InvalidValue {
        key: "global.identity.keycloak.url.port".to_string(),
        reason: format!("scheme '{protocol}' does not take a port"),
    })?;
    url.set_path(&keycloak.context_path);
    Ok(url)
}

/// Token issuer URL restapi uses to reach keycloak: base URL plus realm path.
///
/// # Errors
///
/// See [`keycloak_base_url`].
pub fn keycloak_issuer_backend_url(
    release: &str,
    identity: &IdentityValues,
) -> Result<String, RenderError> {
    let mut url = keycloak_base_url(release, identity)?;
    let path = format!(
        "{}{}",
        identity.keycloak.context_path.trim_end_matches('/'),
        identity.keycloak.realm
    );
    url.set_path(&path);
    Ok(url.to_string())
}

/// JWKS endpoint of the realm
///
/// # Errors
///
/// See [`keycloak_base_url`].
pub fn keycloak_jwks_url(release: &str, identity: &IdentityValues) -> Result<String, RenderError> {
    Ok(format!(
        "{}/protocol/openid-connect/certs",
        keycloak_issuer_backend_url(release, identity)?
    ))
}

/// Base URL of the identity service. The port is always spelled out.
#[must_use]
pub fn identity_base_url(release: &str, identity: &IdentityValues) -> String {
    let port = if identity.service.port.is_empty() {
        "80"
    } else {
        identity.service.port.as_str()
    };
    format!("http://{}:{port}", identity_fullname(release, identity))
}
