//! Persistent-connection message protocol
//!
//! Messages travel as JSON envelopes tagged on `"type"`. Inbound parsing is
//! two-stage so the service can distinguish a malformed envelope from a
//! well-formed envelope of an unrecognized type; both are reported back as
//! `ERROR` without affecting the connection.

use serde::Serialize;
use thiserror::Error;
use verity_domain::ClassificationResult;

/// Protocol-level failure, reported to the offending connection only
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not parseable as the expected envelope
    #[error("Invalid message format")]
    Malformed,

    /// Well-formed envelope with an unrecognized type tag
    #[error("Unknown message type: {0}")]
    UnknownType(String),
}

/// Messages a client may send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMessage {
    /// Start (or restart) the monitoring session
    StartMonitoring,
    /// Stop the monitoring session
    StopMonitoring,
    /// Application-level liveness check
    Ping,
}

impl InboundMessage {
    /// Parse a raw inbound payload.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Malformed`] if the payload is not a JSON object
    /// with a string `type` field; [`ProtocolError::UnknownType`] if the
    /// type tag is not recognized.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|_| ProtocolError::Malformed)?;
        let kind = value
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(ProtocolError::Malformed)?;

        match kind {
            "START_MONITORING" => Ok(Self::StartMonitoring),
            "STOP_MONITORING" => Ok(Self::StopMonitoring),
            "PING" => Ok(Self::Ping),
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }
}

/// A synthetic item that went through the pipeline, as delivered to
/// monitoring clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEvent {
    /// Item identifier
    pub id: String,
    /// The content that was classified
    pub content: String,
    /// Synthetic source tag
    pub source: String,
    /// When the item was sampled, unix epoch milliseconds
    pub timestamp: u64,
    /// The classification result
    #[serde(flatten)]
    pub result: ClassificationResult,
}

/// Messages the service emits
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Envelope {
    /// Sent once on connection establishment
    #[serde(rename = "CONNECTION_ESTABLISHED")]
    ConnectionEstablished {
        /// The identity assigned to this connection
        #[serde(rename = "connectionId")]
        connection_id: String,
        /// Establishment time, unix epoch milliseconds
        timestamp: u64,
    },

    /// Confirmation that a monitoring session started
    #[serde(rename = "MONITORING_STARTED")]
    MonitoringStarted {
        /// Human-readable confirmation
        message: String,
    },

    /// Confirmation that a monitoring session stopped
    #[serde(rename = "MONITORING_STOPPED")]
    MonitoringStopped {
        /// Human-readable confirmation
        message: String,
    },

    /// A monitoring session event
    #[serde(rename = "ANALYSIS_RESULT")]
    AnalysisResult {
        /// The analyzed item and its result
        data: Box<AnalysisEvent>,
    },

    /// Reply to an application-level PING
    #[serde(rename = "PONG")]
    Pong,

    /// Non-fatal protocol error report
    #[serde(rename = "ERROR")]
    Error {
        /// What went wrong
        message: String,
    },
}

impl Envelope {
    /// The standard monitoring start acknowledgment
    pub fn monitoring_started() -> Self {
        Envelope::MonitoringStarted {
            message: "Real-time monitoring started".to_string(),
        }
    }

    /// The standard monitoring stop acknowledgment
    pub fn monitoring_stopped() -> Self {
        Envelope::MonitoringStopped {
            message: "Real-time monitoring stopped".to_string(),
        }
    }
}
