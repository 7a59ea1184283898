// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `overrides`

#[cfg(test)]
mod tests {
    use crate::errors::OverrideError;
    use crate::overrides::{
        apply_override, escape_set_value, merge_values, parse_key, typed_value, Overrides,
        PathSegment,
    };
    use serde_json::{json, Value};

    fn key(name: &str) -> PathSegment {
        PathSegment::Key(name.to_string())
    }

    #[test]
    fn test_parse_key_dotted() {
        assert_eq!(
            parse_key("web-modeler.restapi.podLabels.foo").unwrap(),
            vec![key("web-modeler"), key("restapi"), key("podLabels"), key("foo")]
        );
    }

    #[test]
    fn test_parse_key_with_indices() {
        assert_eq!(
            parse_key("tolerations[0].key").unwrap(),
            vec![key("tolerations"), PathSegment::Index(0), key("key")]
        );
        assert_eq!(
            parse_key("matrix[1][2]").unwrap(),
            vec![key("matrix"), PathSegment::Index(1), PathSegment::Index(2)]
        );
    }

    #[test]
    fn test_parse_key_escaped_dot() {
        assert_eq!(
            parse_key(r"podAnnotations.prometheus\.io/scrape").unwrap(),
            vec![key("podAnnotations"), key("prometheus.io/scrape")]
        );
    }

    #[test]
    fn test_parse_key_rejects_malformed_keys() {
        for bad in ["", "a..b", "a.", ".a", "a[x]", "a[0", "[0]", r"a\", "a[0]b"] {
            let err = parse_key(bad).unwrap_err();
            assert!(
                matches!(err, OverrideError::MalformedKey { .. }),
                "expected malformed key error for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_key_rejects_huge_index() {
        let err = parse_key("list[65537]").unwrap_err();
        assert_eq!(
            err,
            OverrideError::IndexTooLarge {
                key: "list[65537]".to_string(),
                index: 65537,
                max: 65536,
            }
        );
        assert!(parse_key("list[65536]").is_ok());
    }

    #[test]
    fn test_typed_value() {
        assert_eq!(typed_value("true"), Some(Value::Bool(true)));
        assert_eq!(typed_value("FALSE"), Some(Value::Bool(false)));
        assert_eq!(typed_value("null"), None);
        assert_eq!(typed_value("0"), Some(json!(0)));
        assert_eq!(typed_value("1000"), Some(json!(1000)));
        assert_eq!(typed_value("-5"), Some(json!(-5)));
        assert_eq!(typed_value("0755"), Some(json!("0755")));
        assert_eq!(typed_value("a.b.c"), Some(json!("a.b.c")));
        assert_eq!(typed_value(""), Some(json!("")));
        assert_eq!(typed_value("[printenv]"), Some(json!("[printenv]")));
    }

    #[test]
    fn test_typed_value_brace_list() {
        assert_eq!(typed_value("{a,b}"), Some(json!(["a", "b"])));
        assert_eq!(typed_value("{printenv}"), Some(json!(["printenv"])));
        assert_eq!(typed_value("{}"), Some(json!([])));
        assert_eq!(typed_value("{1,true,0755,null}"), Some(json!([1, true, "0755", null])));
        assert_eq!(typed_value(r"{a\,b,c}"), Some(json!(["a,b", "c"])));
        // Only a value both opening and closing with a brace is a list.
        assert_eq!(typed_value("{open"), Some(json!("{open")));
        assert_eq!(typed_value("[a,b]"), Some(json!("[a,b]")));
    }

    #[test]
    fn test_apply_override_brace_list() {
        let mut tree = json!({"command": []});
        apply_override(&mut tree, "web-modeler.webapp.command", "{printenv,env}").unwrap();
        assert_eq!(
            tree["web-modeler"]["webapp"]["command"],
            json!(["printenv", "env"])
        );
    }

    #[test]
    fn test_apply_override_builds_nested_maps() {
        let mut tree = json!({});
        apply_override(&mut tree, "web-modeler.restapi.podLabels.foo", "bar").unwrap();
        assert_eq!(
            tree,
            json!({"web-modeler": {"restapi": {"podLabels": {"foo": "bar"}}}})
        );
    }

    #[test]
    fn test_apply_override_pads_lists_with_null() {
        let mut tree = json!({});
        apply_override(&mut tree, "capabilities.add[2]", "NET_ADMIN").unwrap();
        assert_eq!(
            tree,
            json!({"capabilities": {"add": [null, null, "NET_ADMIN"]}})
        );
    }

    #[test]
    fn test_apply_override_into_existing_list_element() {
        let mut tree = json!({"tolerations": [{"key": "old", "effect": "NoSchedule"}]});
        apply_override(&mut tree, "tolerations[0].key", "key1").unwrap();
        assert_eq!(
            tree,
            json!({"tolerations": [{"key": "key1", "effect": "NoSchedule"}]})
        );
    }

    #[test]
    fn test_apply_override_replaces_scalar_with_map() {
        let mut tree = json!({"url": ""});
        apply_override(&mut tree, "url.host", "keycloak").unwrap();
        assert_eq!(tree, json!({"url": {"host": "keycloak"}}));
    }

    #[test]
    fn test_apply_override_null_removes_key() {
        let mut tree = json!({"resources": {"limits": {"cpu": "1"}}, "keep": true});
        apply_override(&mut tree, "resources", "null").unwrap();
        assert_eq!(tree, json!({"keep": true}));
    }

    #[test]
    fn test_apply_override_keeps_tree_on_bad_key() {
        let mut tree = json!({"a": 1});
        assert!(apply_override(&mut tree, "a..b", "x").is_err());
        assert_eq!(tree, json!({"a": 1}));
    }

    #[test]
    fn test_overrides_apply_in_key_order() {
        let set = Overrides::new()
            .with("image.tag", "b")
            .with("image", "null")
            .with("image.registry", "r");
        let mut tree = json!({"image": {"tag": "a"}});
        set.apply_to(&mut tree).unwrap();
        // "image" sorts first and removes the map, then the nested keys rebuild it.
        assert_eq!(tree, json!({"image": {"registry": "r", "tag": "b"}}));
    }

    #[test]
    fn test_overrides_macro_and_set() {
        let component = "webapp";
        let mut set = crate::overrides! {
            "web-modeler.enabled" => "true",
            format!("web-modeler.{component}.command") => "[printenv]",
        };
        set.set("global.image.tag", "a.b.c");

        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
        let keys: Vec<&str> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "global.image.tag",
                "web-modeler.enabled",
                "web-modeler.webapp.command"
            ]
        );
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            Overrides::parse_assignment("global.image.tag=a.b.c").unwrap(),
            ("global.image.tag".to_string(), "a.b.c".to_string())
        );
        assert_eq!(
            Overrides::parse_assignment("env[0].value=a=b").unwrap(),
            ("env[0].value".to_string(), "a=b".to_string())
        );
        assert!(Overrides::parse_assignment("no-equals-sign").is_err());
    }

    #[test]
    fn test_overrides_from_iterator() {
        let set: Overrides = vec![("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(set, Overrides::new().with("b", "2").with("a", "1"));
    }

    #[test]
    fn test_merge_values_deep_merges_maps() {
        let mut base = json!({
            "image": {"registry": "registry.camunda.cloud", "tag": "8.2.0"},
            "labels": {"a": "1"}
        });
        merge_values(
            &mut base,
            json!({"image": {"tag": "snapshot"}, "labels": null, "extra": [1, 2]}),
        );
        assert_eq!(
            base,
            json!({
                "image": {"registry": "registry.camunda.cloud", "tag": "snapshot"},
                "extra": [1, 2]
            })
        );
    }

    #[test]
    fn test_merge_values_replaces_lists() {
        let mut base = json!({"pullSecrets": [{"name": "a"}, {"name": "b"}]});
        merge_values(&mut base, json!({"pullSecrets": [{"name": "c"}]}));
        assert_eq!(base, json!({"pullSecrets": [{"name": "c"}]}));
    }

    #[test]
    fn test_escape_set_value() {
        assert_eq!(escape_set_value("plain"), "plain");
        assert_eq!(escape_set_value("a,b"), r"a\,b");
        assert_eq!(escape_set_value(r"C:\tmp"), r"C:\\tmp");
        assert_eq!(escape_set_value("{a,b}"), "{a,b}");
        assert_eq!(escape_set_value(r"{a\,b}"), r"{a\,b}");
        assert_eq!(escape_set_value("{open,x"), r"\{open\,x");
    }
}
