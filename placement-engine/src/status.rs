use constants::interaction::CENTIMETRES_PER_UNIT;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing status. `Display` gives the text the host shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Status {
    #[default]
    Ready,
    LongPressToMeasure,
    Measuring,
    Distance {
        metres: f32,
    },
    NoSurfaceDetected,
    TrackingInterrupted,
    TrackingReset,
    SessionFailed {
        reason: String,
    },
    MissingResource {
        asset: String,
    },
    Stopped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::LongPressToMeasure => write!(f, "Long press to measure"),
            Self::Measuring => write!(f, "Measuring..."),
            Self::Distance { metres } => write!(f, "{:.2} cm", metres * CENTIMETRES_PER_UNIT),
            Self::NoSurfaceDetected => write!(f, "No surface detected"),
            Self::TrackingInterrupted => write!(f, "Tracking interrupted"),
            Self::TrackingReset => write!(f, "Tracking reset"),
            Self::SessionFailed { reason } => write!(f, "Session failed: {reason}"),
            Self::MissingResource { asset } => write!(f, "Could not load {asset}"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// JSON-RPC 2.0 notification, one-way from engine to host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// Current status plus an outbox of notifications the host drains.
#[derive(Debug, Default)]
pub struct StatusBoard {
    current: Status,
    outgoing: Vec<Notification>,
}

impl StatusBoard {
    pub fn current(&self) -> &Status {
        &self.current
    }

    /// Change the status. Repeats of the current status are not re-announced.
    pub fn set(&mut self, status: Status) {
        if status == self.current {
            return;
        }
        let params = serde_json::json!({
            "status": &status,
            "text": status.to_string(),
        });
        self.current = status;
        self.send_notification("status_changed", params);
    }

    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing.push(Notification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn pending(&self) -> &[Notification] {
        &self.outgoing
    }
}
