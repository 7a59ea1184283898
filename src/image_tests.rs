// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `image`

#[cfg(test)]
mod tests {
    use crate::image::{resolve_image, resolve_pull_policy, resolve_pull_secrets, resolve_tag};
    use crate::values::ImageValues;
    use k8s_openapi::api::core::v1::LocalObjectReference;

    fn image(registry: &str, repository: &str, tag: &str) -> ImageValues {
        ImageValues {
            registry: registry.to_string(),
            repository: repository.to_string(),
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    fn secret(name: &str) -> LocalObjectReference {
        LocalObjectReference {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_subchart_registry_beats_global() {
        let global = image("global.custom.registry.io", "", "8.x.x");
        let subchart = image("subchart.custom.registry.io", "", "snapshot");
        let component = image("", "web-modeler/modeler-restapi", "");
        assert_eq!(
            resolve_image(&global, &subchart, &component),
            "subchart.custom.registry.io/web-modeler/modeler-restapi:snapshot"
        );
    }

    #[test]
    fn test_empty_subchart_registry_falls_back_to_global() {
        let global = image("global.custom.registry.io", "", "8.2.0");
        let subchart = image("", "", "snapshot");
        let component = image("", "web-modeler/modeler-webapp", "");
        assert_eq!(
            resolve_image(&global, &subchart, &component),
            "global.custom.registry.io/web-modeler/modeler-webapp:snapshot"
        );
    }

    #[test]
    fn test_component_values_win() {
        let global = image("g.io", "", "1");
        let subchart = image("s.io", "", "2");
        let component = image("c.io", "modeler-websockets", "3");
        assert_eq!(
            resolve_image(&global, &subchart, &component),
            "c.io/modeler-websockets:3"
        );
        assert_eq!(resolve_tag(&global, &subchart, &component), "3");
    }

    #[test]
    fn test_missing_registry_and_tag() {
        let empty = ImageValues::default();
        let component = image("", "modeler-restapi", "");
        assert_eq!(resolve_image(&empty, &empty, &component), "modeler-restapi");
    }

    #[test]
    fn test_pull_policy() {
        let global = ImageValues {
            pull_policy: "Always".to_string(),
            ..Default::default()
        };
        let subchart = ImageValues::default();
        assert_eq!(resolve_pull_policy(&global, &subchart), Some("Always".to_string()));

        let subchart = ImageValues {
            pull_policy: "Never".to_string(),
            ..Default::default()
        };
        assert_eq!(resolve_pull_policy(&global, &subchart), Some("Never".to_string()));
        assert_eq!(
            resolve_pull_policy(&ImageValues::default(), &ImageValues::default()),
            None
        );
    }

    #[test]
    fn test_pull_secrets() {
        let global = ImageValues {
            pull_secrets: vec![secret("SecretName")],
            ..Default::default()
        };
        let subchart = ImageValues::default();
        assert_eq!(
            resolve_pull_secrets(&global, &subchart),
            Some(vec![secret("SecretName")])
        );

        let subchart = ImageValues {
            pull_secrets: vec![secret("SecretNameSubChart")],
            ..Default::default()
        };
        assert_eq!(
            resolve_pull_secrets(&global, &subchart),
            Some(vec![secret("SecretNameSubChart")])
        );
        assert_eq!(
            resolve_pull_secrets(&ImageValues::default(), &ImageValues::default()),
            None
        );
    }
}
