// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `--set` style overrides for the chart values tree.
//!
//! Keys are dotted paths into the values tree. A segment may carry one or more
//! list indices (`tolerations[0].key`, `matrix[1][2]`) and `\.` escapes a literal
//! dot (`podAnnotations.prometheus\.io/scrape`). Values are typed the way
//! `helm --set` types them: booleans, `null`, and integers not starting with `0`
//! are converted, everything else stays a string. A value wrapped in braces is
//! a list (`{a,b}`); its items are split on unescaped commas and typed one by
//! one.

use crate::constants::MAX_OVERRIDE_INDEX;
use crate::errors::OverrideError;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use tracing::trace;

/// A flat mapping from dotted key to string value.
///
/// Keys are kept ordered so that rendering the same overrides twice applies
/// them in the same order and builds identical `helm` command lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides(BTreeMap<String, String>);

impl Overrides {
    /// Creates an empty override map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing an earlier value for the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`Overrides::set`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Parses a `key=value` pair as given on a command line.
    ///
    /// Only the first `=` separates key and value, so values may contain `=`.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::MalformedKey`] when there is no `=` or the key is empty.
    pub fn parse_assignment(assignment: &str) -> Result<(String, String), OverrideError> {
        match assignment.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(OverrideError::MalformedKey {
                key: assignment.to_string(),
                reason: "expected key=value".to_string(),
            }),
        }
    }

    /// Iterates over the overrides in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies every override to `tree` in key order.
    ///
    /// # Errors
    ///
    /// Returns the first [`OverrideError`] hit; `tree` may be partially updated.
    pub fn apply_to(&self, tree: &mut Value) -> Result<(), OverrideError> {
        for (key, value) in self.iter() {
            apply_override(tree, key, value)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Builds an [`Overrides`] map from `key => value` pairs.
///
/// ```
/// use modeler_chart::overrides;
///
/// let set = overrides! {
///     "web-modeler.enabled" => "true",
///     "global.image.tag" => "8.2.0",
/// };
/// assert_eq!(set.len(), 2);
/// ```
#[macro_export]
macro_rules! overrides {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut set = $crate::overrides::Overrides::new();
        $( set.set($key, $value); )*
        set
    }};
}

/// One step of an override path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A map key
    Key(String),
    /// A list index
    Index(usize),
}

/// Splits an override key into path segments.
///
/// # Errors
///
/// Returns [`OverrideError`] for empty segments, bad indices or a dangling escape.
pub fn parse_key(key: &str) -> Result<Vec<PathSegment>, OverrideError> {
    let malformed = |reason: &str| OverrideError::MalformedKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut name = String::new();
    // Set once a segment has produced a key or index, so `a[0].b` does not see an empty name.
    let mut segment_started = false;
    let mut chars = key.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or_else(|| malformed("trailing escape"))?;
                name.push(escaped);
            }
            '.' => {
                if name.is_empty() && !segment_started {
                    return Err(malformed("empty path segment"));
                }
                if !name.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut name)));
                }
                segment_started = false;
                if chars.peek().is_none() {
                    return Err(malformed("empty path segment"));
                }
            }
            '[' => {
                if !name.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut name)));
                } else if !segment_started {
                    return Err(malformed("index without a key"));
                }
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(d) => digits.push(d),
                        None => return Err(malformed("unterminated index")),
                    }
                }
                let index: usize = digits
                    .parse()
                    .map_err(|_| malformed(&format!("index '{digits}' is not a number")))?;
                if index > MAX_OVERRIDE_INDEX {
                    return Err(OverrideError::IndexTooLarge {
                        key: key.to_string(),
                        index,
                        max: MAX_OVERRIDE_INDEX,
                    });
                }
                segments.push(PathSegment::Index(index));
                segment_started = true;
                if let Some(next) = chars.peek() {
                    if *next != '.' && *next != '[' {
                        return Err(malformed("expected '.' or '[' after index"));
                    }
                }
            }
            _ => name.push(c),
        }
    }

    if !name.is_empty() {
        segments.push(PathSegment::Key(name));
    }
    if segments.is_empty() {
        return Err(malformed("empty key"));
    }
    Ok(segments)
}

/// Types a raw override value the way `helm --set` does.
///
/// Returns `None` for `null`, which removes the key. `{a,b}` becomes a list.
#[must_use]
pub fn typed_value(raw: &str) -> Option<Value> {
    if let Some(inner) = brace_list_items(raw) {
        let items = split_list_items(inner)
            .iter()
            .map(|item| typed_scalar(item).unwrap_or(Value::Null))
            .collect();
        return Some(Value::Array(items));
    }
    typed_scalar(raw)
}

/// The text between the braces of a `{...}` list value.
fn brace_list_items(raw: &str) -> Option<&str> {
    raw.strip_prefix('{')?.strip_suffix('}')
}

/// Splits list items on unescaped commas; `\x` yields `x`.
fn split_list_items(inner: &str) -> Vec<String> {
    if inner.is_empty() {
        return Vec::new();
    }
    let mut items = Vec::new();
    let mut item = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => item.extend(chars.next()),
            ',' => items.push(std::mem::take(&mut item)),
            _ => item.push(c),
        }
    }
    items.push(item);
    items
}

fn typed_scalar(raw: &str) -> Option<Value> {
    if raw.eq_ignore_ascii_case("true") {
        return Some(Value::Bool(true));
    }
    if raw.eq_ignore_ascii_case("false") {
        return Some(Value::Bool(false));
    }
    if raw.eq_ignore_ascii_case("null") {
        return None;
    }
    if raw == "0" {
        return Some(Value::Number(Number::from(0)));
    }
    // Leading zeros keep the value a string ("0755", "007").
    if !raw.starts_with('0') {
        if let Ok(n) = raw.parse::<i64>() {
            return Some(Value::Number(Number::from(n)));
        }
    }
    Some(Value::String(raw.to_string()))
}

/// Applies a single `key=value` override to `tree`.
///
/// # Errors
///
/// Returns [`OverrideError`] when the key does not parse.
pub fn apply_override(tree: &mut Value, key: &str, raw: &str) -> Result<(), OverrideError> {
    let segments = parse_key(key)?;
    trace!(key = %key, value = %raw, "Applying override");
    set_path(tree, &segments, typed_value(raw));
    Ok(())
}

fn set_path(node: &mut Value, segments: &[PathSegment], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    match head {
        PathSegment::Key(name) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                return;
            };
            if rest.is_empty() {
                match value {
                    Some(v) => {
                        map.insert(name.clone(), v);
                    }
                    None => {
                        map.remove(name);
                    }
                }
            } else {
                let child = map.entry(name.clone()).or_insert(Value::Null);
                set_path(child, rest, value);
            }
        }
        PathSegment::Index(index) => {
            if !node.is_array() {
                *node = Value::Array(Vec::new());
            }
            let Value::Array(list) = node else {
                return;
            };
            if list.len() <= *index {
                list.resize(*index + 1, Value::Null);
            }
            if rest.is_empty() {
                list[*index] = value.unwrap_or(Value::Null);
            } else {
                set_path(&mut list[*index], rest, value);
            }
        }
    }
}

/// Deep-merges `overlay` onto `base`.
///
/// Maps merge key by key; any other value in `overlay` replaces the one in
/// `base`. A `null` in `overlay` removes the key, matching how Helm treats
/// `null` in a values file.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if value.is_null() {
                    base_map.remove(&key);
                    continue;
                }
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_values(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Escapes a value for a `helm --set key=value` argument.
///
/// Helm splits `--set` on unescaped commas, so a value containing a comma would
/// otherwise turn into several assignments. A `{...}` list is passed through
/// as written, since its commas separate items. Any other value starting with
/// `{` gets the brace escaped so Helm keeps it a string.
#[must_use]
pub fn escape_set_value(value: &str) -> String {
    if brace_list_items(value).is_some() {
        return value.to_string();
    }
    let mut escaped = String::with_capacity(value.len() + 1);
    for (i, c) in value.chars().enumerate() {
        if c == ',' || c == '\\' || (i == 0 && c == '{') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
