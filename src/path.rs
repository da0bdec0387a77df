//! Structured gNMI paths
//!
//! Turns textual paths such as `/interfaces/interface[name=eth0]/state`
//! into the element/key form carried by gNMI requests. Slashes inside a
//! `[...]` predicate belong to the predicate, not to the path.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One named step of a path with its key predicates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathElem {
    pub name: String,
    #[serde(default, rename = "key", skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, String>,
}

impl PathElem {
    /// Create an element without keys
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: BTreeMap::new(),
        }
    }

    /// Add a key predicate
    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.insert(key.into(), value.into());
        self
    }
}

/// An ordered gNMI path, optionally qualified by an origin
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Path {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub origin: String,
    #[serde(default)]
    pub elem: Vec<PathElem>,
}

impl Path {
    /// Build a path from elements with no origin
    pub fn from_elems(elem: Vec<PathElem>) -> Self {
        Self {
            origin: String::new(),
            elem,
        }
    }

    /// True for the root path (no elements)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elem.is_empty()
    }

    /// Element names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elem.iter().map(|e| e.name.as_str())
    }

    /// All key predicates along the path, quote characters removed
    ///
    /// A key repeated deeper in the path overrides the shallower one.
    pub fn keys(&self) -> BTreeMap<String, String> {
        let mut keys = BTreeMap::new();
        for elem in &self.elem {
            for (k, v) in &elem.keys {
                keys.insert(k.clone(), strip_quotes(v).to_string());
            }
        }
        keys
    }

    /// Module of the first element: its name up to the first `:`
    ///
    /// The origin is not consulted.
    pub fn module(&self) -> Option<&str> {
        self.elem
            .first()
            .map(|first| first.name.split_once(':').map_or(first.name.as_str(), |(m, _)| m))
    }

    /// Root namespace of a subscription path
    ///
    /// Like [`Path::module`], but falls back to the origin when the first
    /// element is unprefixed, since streamed prefixes carry the module there.
    pub fn namespace(&self) -> Option<&str> {
        match self.elem.first() {
            Some(first) => match first.name.split_once(':') {
                Some((module, _)) => Some(module),
                None if !self.origin.is_empty() => Some(self.origin.as_str()),
                None => Some(first.name.as_str()),
            },
            None if !self.origin.is_empty() => Some(self.origin.as_str()),
            None => None,
        }
    }

    /// Slash-joined element names, without origin or keys
    pub fn joined_names(&self) -> String {
        self.names().collect::<Vec<_>>().join("/")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.origin.is_empty() {
            write!(f, "{}:", self.origin)?;
        }
        f.write_str(&self.joined_names())
    }
}

impl std::str::FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        encode_path(s)
    }
}

/// Encode a textual path into a structured [`Path`]
///
/// Leading and trailing slashes are ignored and an empty string yields the
/// root path. Every `[...]` group of a segment must read `key=value`.
pub fn encode_path(path: &str) -> Result<Path> {
    let mut elem = Vec::new();
    for segment in split_segments(path) {
        if segment.is_empty() {
            continue;
        }
        elem.push(parse_segment(path, segment)?);
    }
    Ok(Path::from_elems(elem))
}

/// Split on `/` outside of bracket predicates
fn split_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in path.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&path[start..]);
    segments
}

fn parse_segment(path: &str, segment: &str) -> Result<PathElem> {
    let (name, mut rest) = match segment.find('[') {
        Some(pos) => (&segment[..pos], &segment[pos..]),
        None => (segment, ""),
    };

    if name.is_empty() {
        return Err(Error::PathFormat {
            path: path.to_string(),
            predicate: segment.to_string(),
        });
    }

    let mut elem = PathElem::new(name);
    while !rest.is_empty() {
        let Some(after) = rest.strip_prefix('[') else {
            return Err(Error::PathFormat {
                path: path.to_string(),
                predicate: rest.to_string(),
            });
        };
        let close = after.find(']').ok_or_else(|| Error::PathFormat {
            path: path.to_string(),
            predicate: after.to_string(),
        })?;
        let predicate = &after[..close];
        let (key, value) = predicate.split_once('=').ok_or_else(|| Error::PathFormat {
            path: path.to_string(),
            predicate: predicate.to_string(),
        })?;
        elem.keys
            .insert(key.to_string(), strip_quotes(value).to_string());
        rest = &after[close + 1..];
    }

    Ok(elem)
}

/// Remove one layer of surrounding `"` or `'` quotes
pub(crate) fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple_with_key() {
        let path = encode_path("/a/b[k=1]/c").unwrap();
        assert_eq!(
            path.elem,
            vec![
                PathElem::new("a"),
                PathElem::new("b").with_key("k", "1"),
                PathElem::new("c"),
            ]
        );
        assert!(path.origin.is_empty());
    }

    #[test]
    fn test_leading_and_trailing_slashes_ignored() {
        let a = encode_path("/a/b/").unwrap();
        let b = encode_path("a/b").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.elem.len(), 2);
    }

    #[test]
    fn test_segment_count_matches_slashes() {
        let raw = "/openconfig-interfaces:interfaces/interface/state/counters";
        let path = encode_path(raw).unwrap();
        let expected = raw.trim_matches('/').matches('/').count() + 1;
        assert_eq!(path.elem.len(), expected);
    }

    #[test]
    fn test_text_after_predicate_rejected() {
        let err = encode_path("a/b[k=1]junk[z=2]tail/c").unwrap_err();
        assert!(matches!(err, Error::PathFormat { ref predicate, .. } if predicate == "junk[z=2]tail"));
        assert!(encode_path("a/b[k=1]tail").is_err());
        assert!(encode_path("a/b[k=1][z=2]").is_ok());
    }

    #[test]
    fn test_module_ignores_origin() {
        let mut path = encode_path("interfaces/interface").unwrap();
        path.origin = "openconfig".into();
        assert_eq!(path.module(), Some("interfaces"));
        assert_eq!(path.namespace(), Some("openconfig"));

        let prefixed = encode_path("openconfig-interfaces:interfaces").unwrap();
        assert_eq!(prefixed.module(), Some("openconfig-interfaces"));
        assert_eq!(Path::default().module(), None);
    }

    #[test]
    fn test_slash_inside_predicate() {
        let path = encode_path("interfaces/interface[name=GigabitEthernet0/0/0/1]/state").unwrap();
        assert_eq!(path.elem.len(), 3);
        assert_eq!(path.elem[1].keys["name"], "GigabitEthernet0/0/0/1");
    }

    #[test]
    fn test_multiple_predicates_and_quotes() {
        let path = encode_path(r#"/net/route[prefix="10.0.0.0/8"][vrf='red']"#).unwrap();
        let route = &path.elem[1];
        assert_eq!(route.name, "route");
        assert_eq!(route.keys["prefix"], "10.0.0.0/8");
        assert_eq!(route.keys["vrf"], "red");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let path = encode_path("a[filter=x=y]").unwrap();
        assert_eq!(path.elem[0].keys["filter"], "x=y");
    }

    #[test]
    fn test_empty_path_is_root() {
        let path = encode_path("").unwrap();
        assert!(path.is_empty());
        assert!(encode_path("/").unwrap().is_empty());
    }

    #[test]
    fn test_predicate_without_equals_rejected() {
        let err = encode_path("/a/b[oops]/c").unwrap_err();
        assert!(matches!(err, Error::PathFormat { ref predicate, .. } if predicate == "oops"));
    }

    #[test]
    fn test_unterminated_predicate_rejected() {
        assert!(matches!(
            encode_path("/a/b[k=1").unwrap_err(),
            Error::PathFormat { .. }
        ));
    }

    #[test]
    fn test_namespace_and_display() {
        let mut path = encode_path("openconfig-platform:components/component").unwrap();
        assert_eq!(path.namespace(), Some("openconfig-platform"));
        assert_eq!(path.to_string(), "openconfig-platform:components/component");

        path = encode_path("infra-statistics/interfaces").unwrap();
        path.origin = "Cisco-IOS-XR-infra-statsd-oper".into();
        assert_eq!(path.namespace(), Some("Cisco-IOS-XR-infra-statsd-oper"));
        assert_eq!(
            path.to_string(),
            "Cisco-IOS-XR-infra-statsd-oper:infra-statistics/interfaces"
        );
    }

    #[test]
    fn test_keys_merge_and_unquote() {
        let mut path = encode_path("a[x=1]/b[y=2]").unwrap();
        path.elem[1].keys.insert("z".into(), "\"q\"".into());
        let keys = path.keys();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys["z"], "q");
    }
}
