//! Device identity lookups through the transport
//!
//! Documents carry the software version and hostname of the device they came
//! from. Both are fetched once per session with ordinary Get requests.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::messages::{DataType, Encoding, GetRequest, GetResponse};
use crate::path::encode_path;
use crate::value::TypedValue;

/// Path holding the running software version
pub const VERSION_PATH: &str = "openconfig-platform:components/component/state/software-version";

/// Path holding the configured hostname
pub const HOSTNAME_PATH: &str = "Cisco-IOS-XR-shellutil-cfg:host-names";

/// Unary Get access to a device
///
/// Implemented by the gRPC client that owns the channel; the core only ever
/// issues Get requests through it.
pub trait DeviceTransport {
    fn get(&self, request: &GetRequest) -> Result<GetResponse>;
}

/// Identity of the device a session is connected to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMetadata {
    pub version: String,
    pub hostname: String,
}

impl DeviceMetadata {
    pub fn new(version: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            hostname: hostname.into(),
        }
    }

    /// Query version and hostname from the device
    pub fn resolve<T: DeviceTransport + ?Sized>(transport: &T) -> Result<Self> {
        let hostname = fetch_hostname(transport)?;
        let version = fetch_version(transport)?;

        if hostname.is_empty() {
            log::warn!("Device reported no hostname");
        }
        log::info!("Resolved device {} running {}", hostname, version);

        Ok(Self { version, hostname })
    }
}

fn fetch_version<T: DeviceTransport + ?Sized>(transport: &T) -> Result<String> {
    let request = GetRequest::new(
        vec![encode_path(VERSION_PATH)?],
        DataType::State,
        Encoding::JsonIetf,
    );
    let response = transport.get(&request)?;
    Ok(parse_version(&response))
}

fn fetch_hostname<T: DeviceTransport + ?Sized>(transport: &T) -> Result<String> {
    let request = GetRequest::new(
        vec![encode_path(HOSTNAME_PATH)?],
        DataType::Config,
        Encoding::JsonIetf,
    );
    let response = transport.get(&request)?;
    parse_hostname(&response)
}

/// The last update's raw payload, stripped of JSON punctuation
fn parse_version(response: &GetResponse) -> String {
    let mut version = String::new();
    for update in response.notification.iter().flat_map(|n| &n.update) {
        if let TypedValue::JsonIetf(raw) | TypedValue::Json(raw) = &update.val {
            version = String::from_utf8_lossy(raw)
                .trim_end_matches('}')
                .trim_matches('"')
                .to_string();
        }
    }
    version
}

/// `host-name` from the first update; an empty payload means no hostname
fn parse_hostname(response: &GetResponse) -> Result<String> {
    let Some(update) = response.notification.iter().flat_map(|n| &n.update).next() else {
        return Ok(String::new());
    };

    let raw = match &update.val {
        TypedValue::JsonIetf(raw) | TypedValue::Json(raw) => raw,
        other => {
            return Err(Error::Device(format!(
                "hostname returned as {}",
                other.tag()
            )))
        }
    };
    if raw.is_empty() {
        return Ok(String::new());
    }

    let doc: Value = serde_json::from_slice(raw)?;
    doc["host-name"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| Error::Device(format!("no host-name in {doc}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Notification, Update};
    use crate::path::Path;
    use std::cell::RefCell;

    struct FakeDevice {
        requests: RefCell<Vec<GetRequest>>,
        hostname_payload: Vec<u8>,
    }

    impl FakeDevice {
        fn new(hostname_payload: &[u8]) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                hostname_payload: hostname_payload.to_vec(),
            }
        }
    }

    fn response(payload: Vec<u8>) -> GetResponse {
        GetResponse {
            notification: vec![Notification {
                timestamp: 0,
                prefix: None,
                update: vec![Update {
                    path: Path::default(),
                    val: TypedValue::JsonIetf(payload),
                }],
            }],
            byte_size: 0,
        }
    }

    impl DeviceTransport for FakeDevice {
        fn get(&self, request: &GetRequest) -> Result<GetResponse> {
            self.requests.borrow_mut().push(request.clone());
            match request.data_type {
                DataType::State => Ok(response(br#""7.3.2""#.to_vec())),
                _ => Ok(response(self.hostname_payload.clone())),
            }
        }
    }

    #[test]
    fn test_resolve_metadata() {
        let device = FakeDevice::new(br#"{"host-name": "edge-r1"}"#);
        let meta = DeviceMetadata::resolve(&device).unwrap();
        assert_eq!(meta, DeviceMetadata::new("7.3.2", "edge-r1"));

        let requests = device.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests
            .iter()
            .any(|r| r.path[0].to_string() == VERSION_PATH && r.data_type == DataType::State));
        assert!(requests.iter().all(|r| r.encoding == Encoding::JsonIetf));
    }

    #[test]
    fn test_empty_hostname_payload() {
        let device = FakeDevice::new(b"");
        let meta = DeviceMetadata::resolve(&device).unwrap();
        assert!(meta.hostname.is_empty());
    }

    #[test]
    fn test_hostname_without_member_is_error() {
        let device = FakeDevice::new(br#"{"domain": "lab"}"#);
        assert!(matches!(
            DeviceMetadata::resolve(&device).unwrap_err(),
            Error::Device(_)
        ));
    }

    #[test]
    fn test_version_last_update_wins() {
        let mut resp = response(br#""6.0""#.to_vec());
        resp.notification.push(Notification {
            update: vec![Update {
                path: Path::default(),
                val: TypedValue::JsonIetf(br#""7.1.1"}"#.to_vec()),
            }],
            ..Default::default()
        });
        assert_eq!(parse_version(&resp), "7.1.1");
    }
}
