// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deployment template cases for every web-modeler component.
//!
//! One test per (component, case) pair, rendered with the bundled chart.
//! Run with: cargo test --test deployment_template

mod common;

use modeler_chart::component::Component;
use modeler_chart::suite::deployment;

macro_rules! component_suite {
    ($module:ident, $component:expr) => {
        component_suite!(@cases $module, $component, [
            container_set_pod_labels,
            container_set_pod_annotations,
            container_set_global_annotations,
            container_set_image_name_subchart,
            container_set_image_name_global_registry,
            container_set_image_pull_secrets_global,
            container_set_image_pull_secrets_subchart,
            container_overwrite_image_tag,
            container_overwrite_global_image_tag,
            container_overwrite_image_tag_with_chart_direct_setting,
            container_set_container_command,
            container_set_service_account_name,
            pod_set_security_context,
            container_set_security_context,
            container_set_node_selector,
            container_set_affinity,
            container_set_tolerations,
            container_should_overwrite_global_image_pull_policy,
            container_startup_probe,
            container_liveness_probe,
        ]);
    };
    (@cases $module:ident, $component:expr, [$($case:ident),* $(,)?]) => {
        mod $module {
            use super::*;

            $(
                #[test]
                fn $case() {
                    common::run_bundled_case($component, deployment::$case);
                }
            )*
        }
    };
}

component_suite!(restapi, Component::Restapi);
component_suite!(webapp, Component::Webapp);
component_suite!(websockets, Component::Websockets);

#[test]
fn test_case_table_matches_generated_tests() {
    let names: Vec<_> = deployment::CASES.iter().map(|case| case.name).collect();
    assert_eq!(names.len(), 20);
    assert!(names.contains(&"container_set_affinity"));
    assert!(names.contains(&"container_liveness_probe"));
}
