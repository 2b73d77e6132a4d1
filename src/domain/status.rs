//! Icecast status document model.
//!
//! Parses the `status-json.xsl` document into a normalized, ordered
//! list of streams. Icecast reports `icestats.source` as a bare object
//! when one mount is live and as an array when several are; both shapes
//! collapse into the same `Vec<StreamStatus>` here so nothing downstream
//! branches on shape.

use serde::Deserialize;

/// One monitored stream's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatus {
    /// Current listener count reported by Icecast.
    pub listener_count: u64,
    /// `server_name` of the mount (empty when unset).
    pub stream_name: String,
}

/// Label set identifying one exported listener series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamLabels {
    /// Stream name as reported upstream.
    pub name: String,
    /// Zero-based position of the stream in the snapshot.
    pub id: String,
}

impl StreamLabels {
    /// Label values in registration order (`name`, `id`).
    pub fn values(&self) -> [&str; 2] {
        [self.name.as_str(), self.id.as_str()]
    }
}

/// Parsed status document, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    streams: Vec<StreamStatus>,
}

impl StatusSnapshot {
    /// Build a snapshot from already-normalized streams.
    pub fn new(streams: Vec<StreamStatus>) -> Self {
        Self { streams }
    }

    /// Decode a raw status body.
    ///
    /// Missing `listeners` decode as 0 and missing or `null`
    /// `server_name` as an empty string. A document without
    /// `icestats` or `source` (no live mounts) yields an empty snapshot.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let root: StatusRoot = serde_json::from_slice(body)?;
        Ok(root.into())
    }

    /// Streams in upstream order.
    pub fn streams(&self) -> &[StreamStatus] {
        &self.streams
    }

    /// Whether the upstream reported no streams.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Streams paired with their exported label sets.
    ///
    /// The id is the stream's position, so a lone object and the first
    /// element of an array both map to `id="0"`.
    pub fn labeled(&self) -> impl Iterator<Item = (StreamLabels, &StreamStatus)> {
        self.streams.iter().enumerate().map(|(idx, stream)| {
            let labels = StreamLabels {
                name: stream.stream_name.clone(),
                id: idx.to_string(),
            };
            (labels, stream)
        })
    }

    /// Sum of listeners across every stream.
    pub fn total_listeners(&self) -> u64 {
        self.streams
            .iter()
            .map(|s| s.listener_count)
            .fold(0u64, u64::saturating_add)
    }
}

// ── Wire format ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StatusRoot {
    #[serde(default)]
    icestats: Option<IceStats>,
}

#[derive(Debug, Default, Deserialize)]
struct IceStats {
    #[serde(default)]
    source: Option<SourceField>,
}

/// `icestats.source` is either one mount or a list of mounts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceField {
    Many(Vec<WireStream>),
    One(WireStream),
}

#[derive(Debug, Deserialize)]
struct WireStream {
    #[serde(default)]
    listeners: u64,
    #[serde(default)]
    server_name: Option<String>,
}

impl From<WireStream> for StreamStatus {
    fn from(wire: WireStream) -> Self {
        Self {
            listener_count: wire.listeners,
            stream_name: wire.server_name.unwrap_or_default(),
        }
    }
}

impl From<StatusRoot> for StatusSnapshot {
    fn from(root: StatusRoot) -> Self {
        let streams = match root.icestats.unwrap_or_default().source {
            None => Vec::new(),
            Some(SourceField::One(stream)) => vec![stream.into()],
            Some(SourceField::Many(streams)) => {
                streams.into_iter().map(StreamStatus::from).collect()
            }
        };
        Self { streams }
    }
}
