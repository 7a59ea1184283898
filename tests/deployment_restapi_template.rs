// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! restapi-only deployment template cases, rendered with the bundled chart.
//!
//! Run with: cargo test --test deployment_restapi_template

mod common;

use common::run_bundled_case;
use modeler_chart::component::Component;
use modeler_chart::suite::restapi;

#[test]
fn container_should_set_correct_keycloak_service_url() {
    run_bundled_case(
        Component::Restapi,
        restapi::container_should_set_correct_keycloak_service_url,
    );
}

#[test]
fn container_should_set_correct_keycloak_service_url_with_custom_port() {
    run_bundled_case(
        Component::Restapi,
        restapi::container_should_set_correct_keycloak_service_url_with_custom_port,
    );
}

#[test]
fn container_should_set_correct_identity_service_url_with_fullname_override() {
    run_bundled_case(
        Component::Restapi,
        restapi::container_should_set_correct_identity_service_url_with_fullname_override,
    );
}

#[test]
fn container_should_set_correct_identity_service_url_with_name_override() {
    run_bundled_case(
        Component::Restapi,
        restapi::container_should_set_correct_identity_service_url_with_name_override,
    );
}

#[test]
fn container_should_set_external_database_configuration() {
    run_bundled_case(
        Component::Restapi,
        restapi::container_should_set_external_database_configuration,
    );
}

#[test]
fn container_should_set_smtp_credentials() {
    run_bundled_case(
        Component::Restapi,
        restapi::container_should_set_smtp_credentials,
    );
}

#[test]
fn container_startup_probe() {
    run_bundled_case(Component::Restapi, restapi::container_startup_probe);
}

#[test]
fn container_liveness_probe() {
    run_bundled_case(Component::Restapi, restapi::container_liveness_probe);
}
