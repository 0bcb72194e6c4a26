//! Manifest files.
//!
//! # Responsibilities
//! - Read YAML (multi-document) or JSON manifests into untyped documents
//! - Admit documents through the scheme and hand back typed routes
//!
//! # Design Decisions
//! - Document order is preserved; lists are flattened in place
//! - Empty YAML documents (`---` separators, comments) are skipped
//! - Loading is all-or-nothing: the first rejection fails the file

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::admission::{AdmissionError, Scheme, ValidationOptions};
use crate::api::v1alpha1::DirectResponseRoute;

/// Errors produced while reading manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document {index}: {source}")]
    Rejected {
        index: usize,
        #[source]
        source: AdmissionError,
    },
}

/// Manifest encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from a file extension; anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Split manifest text into documents.
pub fn parse_documents(content: &str, format: Format) -> Result<Vec<Value>, ManifestError> {
    match format {
        Format::Json => Ok(vec![serde_json::from_str(content)?]),
        Format::Yaml => {
            let mut documents = Vec::new();
            for document in serde_yaml::Deserializer::from_str(content) {
                let value = Value::deserialize(document)?;
                if !value.is_null() {
                    documents.push(value);
                }
            }
            Ok(documents)
        }
    }
}

/// Read a manifest file into documents.
pub fn read_documents(path: &Path) -> Result<Vec<Value>, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_documents(&content, Format::from_path(path))
}

/// Admit every document and return the objects, in order.
pub fn admit_documents(
    documents: Vec<Value>,
    scheme: &Scheme,
    options: &ValidationOptions,
) -> Result<Vec<Value>, ManifestError> {
    let mut admitted = Vec::new();
    for (index, document) in documents.into_iter().enumerate() {
        let objects = scheme
            .admit(document, options)
            .map_err(|source| ManifestError::Rejected { index, source })?;
        admitted.extend(objects);
    }
    Ok(admitted)
}

/// Load the DirectResponseRoutes of a manifest file.
///
/// Every document must be admitted; objects of other registered kinds are
/// skipped.
pub fn load_routes(
    path: &Path,
    scheme: &Scheme,
    options: &ValidationOptions,
) -> Result<Vec<DirectResponseRoute>, ManifestError> {
    let admitted = admit_documents(read_documents(path)?, scheme, options)?;
    routes_of(admitted)
}

fn routes_of(objects: Vec<Value>) -> Result<Vec<DirectResponseRoute>, ManifestError> {
    let mut routes = Vec::new();
    for object in objects {
        if object.get("kind").and_then(Value::as_str) == Some("DirectResponseRoute") {
            routes.push(serde_json::from_value(object)?);
        }
    }
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::default_scheme;
    use crate::api::v1alpha1::DirectResponseAccess;
    use kube::ResourceExt;
    use std::io::Write;

    const ROUTES: &str = r#"
# maintenance page
apiVersion: gateway.gloo.solo.io/v1alpha1
kind: DirectResponseRoute
metadata:
  name: maintenance
  namespace: gloo-system
spec:
  code: 503
  body: down for maintenance
---
---
apiVersion: gateway.gloo.solo.io/v1alpha1
kind: DirectResponseRoute
metadata:
  name: not-found
  namespace: gloo-system
spec:
  code: 404
"#;

    #[test]
    fn test_parse_multi_document_yaml() {
        let documents = parse_documents(ROUTES, Format::Yaml).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1]["metadata"]["name"], "not-found");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("routes.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("routes.JSON")), Format::Json);
        assert_eq!(Format::from_path(Path::new("routes.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("routes")), Format::Yaml);
    }

    #[test]
    fn test_load_routes_in_order() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(ROUTES.as_bytes()).unwrap();

        let routes = load_routes(file.path(), &default_scheme(), &ValidationOptions::default()).unwrap();
        let names: Vec<_> = routes.iter().map(|r| r.name_any()).collect();
        assert_eq!(names, vec!["maintenance", "not-found"]);
        assert_eq!(routes[0].code(), Some(503));
        assert_eq!(routes[0].body(), Some("down for maintenance"));
        assert_eq!(routes[1].body(), None);
    }

    #[test]
    fn test_load_json_list() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "apiVersion": "gateway.gloo.solo.io/v1alpha1",
                "kind": "DirectResponseRouteList",
                "metadata": {{}},
                "items": [
                    {{"metadata": {{"name": "ok"}}, "spec": {{"code": 200, "body": "ok"}}}}
                ]
            }}"#
        )
        .unwrap();

        let routes = load_routes(file.path(), &default_scheme(), &ValidationOptions::default()).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].code(), Some(200));
    }

    #[test]
    fn test_rejection_names_document() {
        let documents = parse_documents(
            "apiVersion: gateway.gloo.solo.io/v1alpha1\nkind: DirectResponseRoute\nmetadata:\n  name: a\nspec:\n  code: 301\n---\napiVersion: gateway.gloo.solo.io/v1alpha1\nkind: DirectResponseRoute\nmetadata:\n  name: b\nspec:\n  code: 200\n",
            Format::Yaml,
        )
        .unwrap();

        let err = admit_documents(documents, &default_scheme(), &ValidationOptions::default()).unwrap_err();
        assert!(matches!(err, ManifestError::Rejected { index: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_documents(Path::new("/nonexistent/routes.yaml")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
