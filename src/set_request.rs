//! Rebuilding Set requests from stored configuration
//!
//! Configuration pulled back out of the store is a map of model path to the
//! JSON subtree for that model. All three Set variants are built up front so
//! the caller can choose whether to delete, merge, or replace.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::messages::{SetRequest, Update};
use crate::path::{encode_path, Path};
use crate::value::TypedValue;

/// Delete, update and replace operations for one configuration set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSetRequest {
    pub delete: Vec<Path>,
    pub update: Vec<Update>,
    pub replace: Vec<Update>,
}

impl ParsedSetRequest {
    /// Build requests from a map of path to configuration
    ///
    /// The empty path addresses the device root: it gets an update and a
    /// replace entry but is never deleted.
    pub fn from_configs(configs: &Map<String, Value>) -> Result<Self> {
        let mut delete = Vec::new();
        let mut updates = Vec::with_capacity(configs.len());

        for (path, config) in configs {
            let path = encode_path(path)?;
            if !path.is_empty() {
                delete.push(path.clone());
            }
            updates.push(Update {
                path,
                val: TypedValue::json_ietf(config)?,
            });
        }

        log::debug!(
            "Built set request with {} deletes and {} updates",
            delete.len(),
            updates.len()
        );

        Ok(Self {
            delete,
            replace: updates.clone(),
            update: updates,
        })
    }

    /// Build requests carrying a raw ASCII configuration at the root
    pub fn from_ascii(payload: impl Into<String>) -> Self {
        let update = vec![Update {
            path: Path::default(),
            val: TypedValue::Ascii(payload.into()),
        }];
        Self {
            delete: Vec::new(),
            replace: update.clone(),
            update,
        }
    }

    pub fn delete_request(&self) -> SetRequest {
        SetRequest {
            delete: self.delete.clone(),
            ..Default::default()
        }
    }

    pub fn update_request(&self) -> SetRequest {
        SetRequest {
            update: self.update.clone(),
            ..Default::default()
        }
    }

    pub fn replace_request(&self) -> SetRequest {
        SetRequest {
            replace: self.replace.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn configs(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_single_path_builds_all_three() {
        let parsed = ParsedSetRequest::from_configs(&configs(json!({"a/b": {"x": 1}}))).unwrap();
        let expected_path = encode_path("a/b").unwrap();

        assert_eq!(parsed.delete, vec![expected_path.clone()]);
        assert_eq!(parsed.update.len(), 1);
        assert_eq!(parsed.replace.len(), 1);
        assert_eq!(parsed.update[0].path, expected_path);
        assert_eq!(parsed.replace[0].path, expected_path);
        assert_eq!(
            parsed.update[0].val.decode().unwrap(),
            crate::value::LeafValue::Json(json!({"x": 1}))
        );
    }

    #[test]
    fn test_root_path_not_deleted() {
        let parsed = ParsedSetRequest::from_configs(&configs(json!({
            "": {"openconfig-system:system": {}},
            "openconfig-interfaces:interfaces": {"interface": []}
        })))
        .unwrap();
        assert_eq!(parsed.delete.len(), 1);
        assert_eq!(parsed.update.len(), 2);
        assert!(parsed.update[0].path.is_empty());
    }

    #[test]
    fn test_ascii_payload_wrapped_once() {
        let parsed = ParsedSetRequest::from_ascii("hostname edge-r1\n");
        assert!(parsed.delete.is_empty());
        assert_eq!(parsed.update.len(), 1);
        assert!(parsed.update[0].path.is_empty());
        assert_eq!(
            parsed.replace[0].val,
            TypedValue::Ascii("hostname edge-r1\n".into())
        );
    }

    #[test]
    fn test_request_views() {
        let parsed =
            ParsedSetRequest::from_configs(&configs(json!({"a[k=1]": 1, "b": true}))).unwrap();
        let delete = parsed.delete_request();
        assert_eq!(delete.delete.len(), 2);
        assert!(delete.update.is_empty() && delete.replace.is_empty());
        assert_eq!(parsed.update_request().update.len(), 2);
        assert_eq!(parsed.replace_request().replace.len(), 2);
    }

    #[test]
    fn test_bad_path_rejected() {
        let err = ParsedSetRequest::from_configs(&configs(json!({"a[broken]": 1}))).unwrap_err();
        assert!(matches!(err, Error::PathFormat { .. }));
    }
}
