//! Flatten a captured gNMI response into documents
//!
//! Reads a response saved as JSON and prints the documents that would be
//! sent to the store, one per line.
//!
//! Usage:
//!   # Operational Get
//!   cargo run --example flatten_capture -- get demos/samples/get-interfaces.json
//!
//!   # Subscribe stream (JSON array of messages)
//!   cargo run --example flatten_capture -- subscribe demos/samples/subscribe-counters.json
//!
//!   # Configuration Get
//!   cargo run --example flatten_capture -- config <capture.json>
//!
//! Options:
//!   --keys <file>   keyword file (default: demos/samples/keys.json)
//!   --ip <address>  device address recorded in each document

use std::fs;
use std::sync::Arc;

use gnmi_docs::{DeviceMetadata, GetResponse, KeywordIndex, RecordAssembler, SubscribeResponse};

const DEFAULT_KEYS_PATH: &str = "demos/samples/keys.json";

fn main() -> gnmi_docs::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        print_usage();
        return Ok(());
    }

    let keys_path = args
        .iter()
        .position(|a| a == "--keys")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_KEYS_PATH);
    let ip = args
        .iter()
        .position(|a| a == "--ip")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("127.0.0.1");

    let keywords = KeywordIndex::from_file(keys_path)?;
    let assembler = RecordAssembler::new(Arc::new(keywords), ip)
        .with_metadata(DeviceMetadata::new("capture", "capture"));
    let capture = fs::read_to_string(&args[2])?;

    match args[1].as_str() {
        "get" => {
            let response: GetResponse = serde_json::from_str(&capture)?;
            for document in assembler.parse_get(&response)? {
                println!("{}", serde_json::to_string(&document)?);
            }
        }
        "config" => {
            let response: GetResponse = serde_json::from_str(&capture)?;
            for document in assembler.parse_config(&response)? {
                println!("{}", serde_json::to_string(&document)?);
            }
        }
        "subscribe" => {
            let messages: Vec<SubscribeResponse> = serde_json::from_str(&capture)?;
            for document in assembler.documents(messages) {
                match document {
                    Ok(document) => println!("{}", serde_json::to_string(&document)?),
                    Err(e) => eprintln!("skipped message: {}", e),
                }
            }
        }
        _ => print_usage(),
    }

    Ok(())
}

fn print_usage() {
    println!("Flatten a captured gNMI response");
    println!();
    println!("Usage:");
    println!("  flatten_capture get <response.json> [--keys <file>] [--ip <address>]");
    println!("  flatten_capture config <response.json> [--keys <file>] [--ip <address>]");
    println!("  flatten_capture subscribe <messages.json> [--keys <file>] [--ip <address>]");
}
