//! gNMI message model exchanged with the transport
//!
//! These mirror the Get, Set and Subscribe messages closely enough for the
//! transport to fill them in from the wire and for captured responses to be
//! stored as JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::{encode_path, Path};
use crate::value::TypedValue;

/// A single path/value change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub path: Path,
    pub val: TypedValue,
}

impl Update {
    /// Build an update from a textual path
    pub fn from_path(path: &str, val: TypedValue) -> Result<Self> {
        Ok(Self {
            path: encode_path(path)?,
            val,
        })
    }
}

/// Updates reported by the device at one instant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Notification {
    /// Device time in nanoseconds since the epoch
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Path>,
    #[serde(default)]
    pub update: Vec<Update>,
}

impl Notification {
    pub fn new(timestamp: i64, update: Vec<Update>) -> Self {
        Self {
            timestamp,
            prefix: None,
            update,
        }
    }

    /// Timestamp converted to milliseconds since the epoch
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp / 1_000_000
    }
}

/// Response to a Get request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetResponse {
    #[serde(default)]
    pub notification: Vec<Notification>,
    /// Encoded size of the response as received
    #[serde(default)]
    pub byte_size: usize,
}

/// One message received on a Subscribe stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeResponse {
    Update {
        #[serde(flatten)]
        notification: Notification,
        #[serde(default)]
        byte_size: usize,
    },
    /// Marks the end of the initial data dump
    SyncResponse,
}

/// Data store selected by a Get request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    #[default]
    All,
    Config,
    State,
    Operational,
}

/// Value encoding requested from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Encoding {
    Json,
    Bytes,
    Proto,
    Ascii,
    #[default]
    JsonIetf,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Json => "JSON",
            Encoding::Bytes => "BYTES",
            Encoding::Proto => "PROTO",
            Encoding::Ascii => "ASCII",
            Encoding::JsonIetf => "JSON_IETF",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "JSON" => Ok(Encoding::Json),
            "BYTES" => Ok(Encoding::Bytes),
            "PROTO" => Ok(Encoding::Proto),
            "ASCII" => Ok(Encoding::Ascii),
            "JSON_IETF" => Ok(Encoding::JsonIetf),
            other => Err(Error::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// A Get request for one or more paths
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetRequest {
    pub path: Vec<Path>,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub encoding: Encoding,
}

impl GetRequest {
    pub fn new(path: Vec<Path>, data_type: DataType, encoding: Encoding) -> Self {
        Self {
            path,
            data_type,
            encoding,
        }
    }
}

/// A Set request carrying one kind of operation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SetRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<Path>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replace: Vec<Update>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<Update>,
}
