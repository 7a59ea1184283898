// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed views of rendered manifests.
//!
//! Rendered output is a stream of YAML documents. Documents that are empty or
//! only hold comments (Helm emits those for templates that render nothing) are
//! skipped.

use crate::errors::ManifestError;
use k8s_openapi::Resource;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;

/// Splits rendered text into its non-empty YAML documents.
///
/// # Errors
///
/// Returns [`ManifestError::Yaml`] if any document is not valid YAML.
pub fn parse_documents(text: &str) -> Result<Vec<Value>, ManifestError> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// `kind` of a parsed document, if it has one.
#[must_use]
pub fn document_kind(document: &Value) -> Option<&str> {
    document.get("kind").and_then(Value::as_str)
}

/// Deserializes rendered text that holds exactly one document into `T`.
///
/// # Errors
///
/// Returns [`ManifestError::DocumentCount`] when the text holds zero or several
/// documents, [`ManifestError::KindMismatch`] when the document is of another
/// kind, and [`ManifestError::Yaml`] when it does not fit `T`.
pub fn unmarshal_k8s_yaml<T>(text: &str) -> Result<T, ManifestError>
where
    T: Resource + DeserializeOwned,
{
    let mut documents = parse_documents(text)?;
    if documents.len() != 1 {
        return Err(ManifestError::DocumentCount {
            found: documents.len(),
        });
    }
    let document = documents.remove(0);
    let kind = document_kind(&document).unwrap_or_default();
    if kind != T::KIND {
        return Err(ManifestError::KindMismatch {
            expected: T::KIND.to_string(),
            found: kind.to_string(),
        });
    }
    Ok(serde_yaml::from_value(document)?)
}

/// Deserializes every document of `T`'s kind, in rendered order.
///
/// # Errors
///
/// Returns [`ManifestError::Yaml`] when the text does not parse or a matching
/// document does not fit `T`.
pub fn documents_of_kind<T>(text: &str) -> Result<Vec<T>, ManifestError>
where
    T: Resource + DeserializeOwned,
{
    parse_documents(text)?
        .into_iter()
        .filter(|document| document_kind(document) == Some(T::KIND))
        .map(|document| serde_yaml::from_value(document).map_err(ManifestError::from))
        .collect()
}
