//! Turning gNMI responses into documents for the store
//!
//! Each update is decoded, flattened against the keyword set of its root
//! namespace, and every resulting leaf becomes one [`Document`] stamped with
//! response and session metadata.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Map, Value};

use crate::device::DeviceMetadata;
use crate::error::{Error, Result};
use crate::flatten::{flatten, FlatLeafRecord};
use crate::index::{derive_index, derive_index_today};
use crate::keywords::KeywordIndex;
use crate::messages::{GetResponse, SubscribeResponse};
use crate::path::Path;
use crate::value::{LeafValue, TypedValue};

/// Model name of the synthetic document listing every split-out model
pub const CONFIG_ROLLUP_MODEL: &str = "router-configs";

/// One measured leaf, ready to index
///
/// Serializes with the measurement under a field named after the last two
/// segments of `yang_path`, e.g. `counters-in-octets`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Milliseconds since the epoch
    pub timestamp: i64,
    pub byte_size: usize,
    pub ip: String,
    pub index: String,
    pub yang_path: String,
    pub keys: Map<String, Value>,
    pub field: String,
    pub value: Value,
    pub version: String,
    pub hostname: String,
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(9))?;
        map.serialize_entry("@timestamp", &self.timestamp)?;
        map.serialize_entry("byte_size", &self.byte_size)?;
        map.serialize_entry("keys", &self.keys)?;
        map.serialize_entry("yang_path", &self.yang_path)?;
        map.serialize_entry(&self.field, &self.value)?;
        map.serialize_entry("ip", &self.ip)?;
        map.serialize_entry("index", &self.index)?;
        map.serialize_entry("version", &self.version)?;
        map.serialize_entry("hostname", &self.hostname)?;
        map.end()
    }
}

/// One top-level configuration model, stored whole
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ConfigDocument {
    #[serde(rename = "@timestamp")]
    pub timestamp: i64,
    pub byte_size: usize,
    pub model: String,
    pub index: String,
    pub ip: String,
    pub config: Value,
    pub version: String,
    pub hostname: String,
}

/// Document members a leaf field name may not take
const RESERVED_FIELDS: [&str; 8] = [
    "@timestamp",
    "byte_size",
    "keys",
    "yang_path",
    "ip",
    "index",
    "version",
    "hostname",
];

/// Field name for a leaf: the last two path segments joined by `-`
pub fn leaf_field_name(yang_path: &str) -> String {
    let segments: Vec<&str> = yang_path.split('/').collect();
    let start = segments.len().saturating_sub(2);
    segments[start..].join("-")
}

/// Builds documents for one device session
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    keywords: Arc<KeywordIndex>,
    ip: String,
    metadata: DeviceMetadata,
    /// Fixed index date; today's date when unset
    index_date: Option<NaiveDate>,
}

/// Response-level fields shared by every document of a notification
struct Stamp {
    timestamp: i64,
    byte_size: usize,
}

impl RecordAssembler {
    /// Create an assembler for the device at `ip`
    pub fn new(keywords: Arc<KeywordIndex>, ip: impl Into<String>) -> Self {
        Self {
            keywords,
            ip: ip.into(),
            metadata: DeviceMetadata::default(),
            index_date: None,
        }
    }

    /// Attach the device's version and hostname
    pub fn with_metadata(mut self, metadata: DeviceMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Pin the date used in index names
    pub fn with_index_date(mut self, date: NaiveDate) -> Self {
        self.index_date = Some(date);
        self
    }

    pub fn metadata(&self) -> &DeviceMetadata {
        &self.metadata
    }

    pub fn keywords(&self) -> &KeywordIndex {
        &self.keywords
    }

    /// Documents for an operational Get response
    ///
    /// Every update must carry JSON; anything else is
    /// [`Error::UnsupportedEncoding`].
    pub fn parse_get(&self, response: &GetResponse) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for notification in &response.notification {
            let stamp = Stamp {
                timestamp: notification.timestamp_millis(),
                byte_size: response.byte_size,
            };
            for update in &notification.update {
                if !update.val.is_json() {
                    return Err(Error::UnsupportedEncoding(format!(
                        "Get returned {} for {}",
                        update.val.tag(),
                        update.path
                    )));
                }
                let path = absolute_path(notification.prefix.as_ref(), &update.path);
                let namespace = path.module().unwrap_or_default();
                documents.extend(self.flatten_update(
                    &stamp,
                    namespace,
                    &path.joined_names(),
                    &path,
                    &update.val,
                )?);
            }
        }
        Ok(documents)
    }

    /// Documents for one message of a Subscribe stream
    ///
    /// JSON values are flattened like Get responses. Scalar values become a
    /// single document each, keyed by the predicates of the prefix and
    /// update paths.
    pub fn parse_subscribe(&self, response: &SubscribeResponse) -> Result<Vec<Document>> {
        let (notification, byte_size) = match response {
            SubscribeResponse::SyncResponse => {
                log::debug!("Subscription sync received");
                return Ok(Vec::new());
            }
            SubscribeResponse::Update {
                notification,
                byte_size,
            } => (notification, *byte_size),
        };

        let stamp = Stamp {
            timestamp: notification.timestamp_millis(),
            byte_size,
        };
        let mut documents = Vec::new();
        for update in &notification.update {
            let path = absolute_path(notification.prefix.as_ref(), &update.path);
            if update.val.is_json() {
                let namespace = path.namespace().unwrap_or_default();
                documents.extend(self.flatten_update(
                    &stamp,
                    namespace,
                    &path.to_string(),
                    &path,
                    &update.val,
                )?);
            } else {
                documents.push(self.scalar_document(&stamp, &path, &update.val)?);
            }
        }
        Ok(documents)
    }

    /// Documents for a configuration Get response
    ///
    /// A response to a root-path Get holds the whole configuration as one
    /// object keyed by model; it is split into one document per model plus
    /// a [`CONFIG_ROLLUP_MODEL`] document listing them. Responses for
    /// explicit model paths yield one document per update.
    pub fn parse_config(&self, response: &GetResponse) -> Result<Vec<ConfigDocument>> {
        let full_config = response.notification.iter().all(|n| {
            n.update
                .iter()
                .all(|u| absolute_path(n.prefix.as_ref(), &u.path).is_empty())
        });
        if full_config {
            return self.split_full_config(response);
        }

        let mut documents = Vec::new();
        for notification in &response.notification {
            for update in &notification.update {
                let path = absolute_path(notification.prefix.as_ref(), &update.path);
                let model = path.elem.first().map(|e| e.name.clone()).unwrap_or_default();
                let config = decode_json(&update.val)?;
                documents.push(self.config_document(
                    notification.timestamp_millis(),
                    response.byte_size,
                    model,
                    config,
                )?);
            }
        }
        Ok(documents)
    }

    fn split_full_config(&self, response: &GetResponse) -> Result<Vec<ConfigDocument>> {
        let Some(first) = response.notification.first() else {
            log::debug!("Empty configuration response");
            return Ok(Vec::new());
        };
        let timestamp = first.timestamp_millis();

        // The last update carries the complete configuration
        let Some(last) = response.notification.iter().flat_map(|n| &n.update).last() else {
            return Ok(Vec::new());
        };
        let models = match decode_json(&last.val)? {
            Value::Object(models) => models,
            other => {
                return Err(Error::UnsupportedEncoding(format!(
                    "full configuration is not an object: {other}"
                )))
            }
        };

        let mut documents = Vec::with_capacity(models.len() + 1);
        let mut names = Vec::with_capacity(models.len());
        for (model, config) in models {
            let byte_size = serde_json::to_vec(&config)?.len();
            names.push(model.clone());
            documents.push(self.config_document(timestamp, byte_size, model, config)?);
        }

        let rollup = json!({ "configs": names });
        let byte_size = serde_json::to_vec(&rollup)?.len();
        documents.push(self.config_document(
            timestamp,
            byte_size,
            CONFIG_ROLLUP_MODEL.to_string(),
            rollup,
        )?);
        log::debug!("Split configuration into {} models", names.len());
        Ok(documents)
    }

    fn config_document(
        &self,
        timestamp: i64,
        byte_size: usize,
        model: String,
        config: Value,
    ) -> Result<ConfigDocument> {
        Ok(ConfigDocument {
            timestamp,
            byte_size,
            index: self.index_for(&model)?,
            model,
            ip: self.ip.clone(),
            config,
            version: self.metadata.version.clone(),
            hostname: self.metadata.hostname.clone(),
        })
    }

    /// Flatten one JSON update whose absolute path renders as `base`
    fn flatten_update(
        &self,
        stamp: &Stamp,
        namespace: &str,
        base: &str,
        path: &Path,
        val: &TypedValue,
    ) -> Result<Vec<Document>> {
        let keywords = self.keywords.keywords(namespace)?;
        let payload = decode_json(val)?;

        let leaves = flatten(keywords, &payload, &path_keys(path))?;
        log::debug!("{} produced {} leaves", base, leaves.len());

        leaves
            .into_iter()
            .map(|leaf| {
                let FlatLeafRecord {
                    keys,
                    yang_path,
                    value,
                } = leaf;
                let yang_path = if base.is_empty() {
                    yang_path
                } else {
                    format!("{base}/{yang_path}")
                };
                self.document(stamp, yang_path, keys, value)
            })
            .collect()
    }

    fn scalar_document(&self, stamp: &Stamp, path: &Path, val: &TypedValue) -> Result<Document> {
        let value = val.decode()?.into_json();
        self.document(stamp, path.to_string(), path_keys(path), value)
    }

    fn document(
        &self,
        stamp: &Stamp,
        yang_path: String,
        keys: Map<String, Value>,
        value: Value,
    ) -> Result<Document> {
        let field = leaf_field_name(&yang_path);
        if RESERVED_FIELDS.contains(&field.as_str()) {
            return Err(Error::FieldCollision(yang_path));
        }
        Ok(Document {
            timestamp: stamp.timestamp,
            byte_size: stamp.byte_size,
            ip: self.ip.clone(),
            index: self.index_for(&yang_path)?,
            field,
            yang_path,
            keys,
            value,
            version: self.metadata.version.clone(),
            hostname: self.metadata.hostname.clone(),
        })
    }

    fn index_for(&self, path: &str) -> Result<String> {
        match self.index_date {
            Some(date) => derive_index(path, date),
            None => derive_index_today(path),
        }
    }
}

/// Prefix and update path combined; the prefix origin wins
fn absolute_path(prefix: Option<&Path>, path: &Path) -> Path {
    match prefix {
        Some(prefix) => Path {
            origin: if prefix.origin.is_empty() {
                path.origin.clone()
            } else {
                prefix.origin.clone()
            },
            elem: prefix.elem.iter().chain(&path.elem).cloned().collect(),
        },
        None => path.clone(),
    }
}

fn path_keys(path: &Path) -> Map<String, Value> {
    path.keys()
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

fn decode_json(val: &TypedValue) -> Result<Value> {
    match val.decode()? {
        LeafValue::Json(doc) => Ok(doc),
        _ => Err(Error::UnsupportedEncoding(val.tag().to_string())),
    }
}
