//! Per-namespace YANG list key names
//!
//! The keyword file maps each root module to the leaf names that act as
//! list keys anywhere inside it. Two shapes are accepted:
//!
//! ```json
//! { "openconfig-interfaces": ["name", "index"] }
//! ```
//!
//! ```json
//! {
//!   "openconfig-interfaces": {
//!     "keys": ["name", "index"],
//!     "paths": ["openconfig-interfaces:interfaces/interface/name"],
//!     "leaves": [{ "name": "string" }]
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Schema details recorded for one module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleKeywords {
    /// Leaf names that identify list entries
    pub keys: HashSet<String>,
    /// Every leaf path the module defines (may be empty)
    pub paths: Vec<String>,
    /// Leaf name to YANG type name (may be empty)
    pub leaves: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawModule {
    Keys(Vec<String>),
    Detailed {
        keys: Vec<String>,
        #[serde(default)]
        paths: Vec<String>,
        #[serde(default)]
        leaves: Vec<BTreeMap<String, String>>,
    },
}

impl From<RawModule> for ModuleKeywords {
    fn from(raw: RawModule) -> Self {
        match raw {
            RawModule::Keys(keys) => ModuleKeywords {
                keys: keys.into_iter().collect(),
                ..Default::default()
            },
            RawModule::Detailed { keys, paths, leaves } => ModuleKeywords {
                keys: keys.into_iter().collect(),
                paths,
                leaves: leaves.into_iter().flatten().collect(),
            },
        }
    }
}

/// Keyword sets by root namespace, read-only once loaded
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    modules: HashMap<String, ModuleKeywords>,
}

impl KeywordIndex {
    /// Load the keyword index from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| Error::KeywordsFile(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json(&content)
            .map_err(|e| Error::KeywordsFile(format!("{}: {}", path.as_ref().display(), e)))
    }

    /// Parse the keyword index from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, RawModule> = serde_json::from_str(json)?;
        let modules: HashMap<String, ModuleKeywords> =
            raw.into_iter().map(|(k, v)| (k, v.into())).collect();
        log::info!("Loaded keywords for {} namespaces", modules.len());
        Ok(Self { modules })
    }

    /// Build an index directly from namespace/key-name pairs
    pub fn from_keys<I, N, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<K>)>,
        N: Into<String>,
        K: Into<String>,
    {
        let modules = entries
            .into_iter()
            .map(|(ns, keys)| {
                (
                    ns.into(),
                    ModuleKeywords {
                        keys: keys.into_iter().map(Into::into).collect(),
                        ..Default::default()
                    },
                )
            })
            .collect();
        Self { modules }
    }

    /// Key leaf names for `namespace`
    ///
    /// A namespace with no entry is an error, never an empty set: treating
    /// every leaf as a measurement would give documents the wrong identity.
    pub fn keywords(&self, namespace: &str) -> Result<&HashSet<String>> {
        self.modules
            .get(namespace)
            .map(|m| &m.keys)
            .ok_or_else(|| Error::MissingKeywordNamespace(namespace.to_string()))
    }

    /// Full schema details for `namespace`, if registered
    pub fn module(&self, namespace: &str) -> Option<&ModuleKeywords> {
        self.modules.get(namespace)
    }

    /// Number of registered namespaces
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plain_list_format() {
        let index = KeywordIndex::from_json(r#"{"openconfig-interfaces": ["name", "index"]}"#).unwrap();
        let keys = index.keywords("openconfig-interfaces").unwrap();
        assert!(keys.contains("name"));
        assert!(keys.contains("index"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_detailed_format() {
        let json = r#"{
            "Cisco-IOS-XR-ipv4-bgp-cfg": {
                "keys": ["instance-name", "as"],
                "paths": ["Cisco-IOS-XR-ipv4-bgp-cfg:bgp/instance/instance-name"],
                "leaves": [{"instance-name": "string"}, {"as": "uint32"}]
            }
        }"#;
        let index = KeywordIndex::from_json(json).unwrap();
        let module = index.module("Cisco-IOS-XR-ipv4-bgp-cfg").unwrap();
        assert_eq!(module.keys.len(), 2);
        assert_eq!(module.paths.len(), 1);
        assert_eq!(module.leaves["as"], "uint32");
    }

    #[test]
    fn test_missing_namespace_is_error() {
        let index = KeywordIndex::from_keys([("a", vec!["id"])]);
        let err = index.keywords("b").unwrap_err();
        assert!(matches!(err, Error::MissingKeywordNamespace(ref ns) if ns == "b"));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("gnmi-docs-keys-{}.json", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            write!(file, r#"{{"openconfig-platform": ["name"]}}"#).unwrap();
        }
        let index = KeywordIndex::from_file(&path).unwrap();
        fs::remove_file(&path).ok();
        assert!(index.keywords("openconfig-platform").unwrap().contains("name"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = KeywordIndex::from_file("/nonexistent/keys.json").unwrap_err();
        assert!(matches!(err, Error::KeywordsFile(ref m) if m.contains("/nonexistent/keys.json")));
    }
}
