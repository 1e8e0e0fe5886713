//! MessagePack framing of the link.
//!
//! Outbound frames are assembled from the raw bytes held by the store, so
//! actuator values are never decoded and re-encoded on their way out.

use rov_store::Value;
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::BTreeMap;
use std::io;
use tracing::warn;

/// Anything the onboard controller may send.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Frame {
    Map(BTreeMap<String, Entry>),
    Other(IgnoredAny),
}

/// One telemetry value. Nil and nested values land in `Other`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Scalar(Value),
    Other(IgnoredAny),
}

/// Build a MessagePack map from already-encoded values.
///
/// # Errors
///
/// Only if a length does not fit the MessagePack header.
pub fn encode_frame(raw: &BTreeMap<String, Vec<u8>>) -> io::Result<Vec<u8>> {
    let len = u32::try_from(raw.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many entries"))?;

    let mut frame = Vec::with_capacity(raw.values().map(|v| v.len() + 8).sum::<usize>() + 5);
    rmp::encode::write_map_len(&mut frame, len).map_err(io::Error::other)?;
    for (key, value) in raw {
        rmp::encode::write_str(&mut frame, key).map_err(io::Error::other)?;
        frame.extend_from_slice(value);
    }
    Ok(frame)
}

/// Decode an inbound frame.
///
/// Returns the scalar entries of a telemetry map, or `None` when there
/// are none. Entries that are not scalars are skipped with a warning, as
/// are payloads that are valid MessagePack but not a map.
///
/// # Errors
///
/// The payload is not valid MessagePack.
pub fn decode_frame(bytes: &[u8]) -> Result<Option<BTreeMap<String, Value>>, rmp_serde::decode::Error> {
    let entries = match rmp_serde::from_slice::<Frame>(bytes)? {
        Frame::Map(entries) => entries,
        Frame::Other(_) => {
            warn!(len = bytes.len(), "Ignoring telemetry payload that is not a map");
            return Ok(None);
        }
    };

    let mut values = BTreeMap::new();
    for (key, entry) in entries {
        match entry {
            Entry::Scalar(value) => {
                values.insert(key, value);
            }
            Entry::Other(_) => warn!(%key, "Skipping telemetry value that is not a scalar"),
        }
    }

    Ok((!values.is_empty()).then_some(values))
}
