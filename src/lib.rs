//! gnmi-docs: reshaping gNMI data for a document store
//!
//! This crate sits between a gNMI client and a search/document store. It
//! takes Get and Subscribe responses that have already been received and
//! turns them into flat, indexable documents, and it turns stored
//! configuration back into Set requests.
//!
//! # Key Features
//!
//! - **Path codec**: textual paths such as
//!   `interfaces/interface[name=Gi0/0/0/0]/state` become structured paths;
//!   slashes inside key predicates are kept intact
//!
//! - **Typed value decoding**: every gNMI value encoding maps to a native
//!   value; unsigned integers beyond `i64::MAX` are kept as decimal strings
//!
//! - **YANG flattening**: nested JSON payloads are walked leaf by leaf, with
//!   list keys (from a per-module keyword file) promoted into each leaf's
//!   key context instead of being stored as measurements
//!
//! - **Index naming**: each leaf path maps to a dated index name that never
//!   exceeds 255 bytes
//!
//! - **Set request rebuilding**: a map of path to configuration produces
//!   delete, update and replace requests in one go
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gnmi_docs::{DeviceMetadata, GetResponse, KeywordIndex, RecordAssembler};
//!
//! let keywords = KeywordIndex::from_file("keys.json").unwrap();
//! let assembler = RecordAssembler::new(Arc::new(keywords), "192.0.2.10")
//!     .with_metadata(DeviceMetadata::new("7.3.2", "edge-r1"));
//!
//! // Response as delivered by the transport
//! let response: GetResponse = serde_json::from_str("{}").unwrap();
//! for document in assembler.parse_get(&response).unwrap() {
//!     println!("{} -> {}", document.index, serde_json::to_string(&document).unwrap());
//! }
//! ```

pub mod assembler;
pub mod device;
mod error;
pub mod flatten;
pub mod index;
pub mod keywords;
pub mod messages;
pub mod path;
pub mod set_request;
pub mod stream;
pub mod value;

pub use assembler::{leaf_field_name, ConfigDocument, Document, RecordAssembler, CONFIG_ROLLUP_MODEL};
pub use device::{DeviceMetadata, DeviceTransport};
pub use error::{Error, Result};
pub use flatten::{flatten, FlatLeafRecord};
pub use index::{derive_index, derive_index_today, MAX_INDEX_BYTES};
pub use keywords::{KeywordIndex, ModuleKeywords};
pub use messages::{
    DataType, Encoding, GetRequest, GetResponse, Notification, SetRequest, SubscribeResponse,
    Update,
};
pub use path::{encode_path, Path, PathElem};
pub use set_request::ParsedSetRequest;
pub use stream::DocumentStream;
pub use value::{Decimal64, LeafValue, TypedValue};
