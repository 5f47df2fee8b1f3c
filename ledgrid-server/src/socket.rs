//! Frame channel stub. Messages are accepted and logged; nothing is
//! forwarded to hardware.

use std::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use ledgrid::error::FrameError;
use ledgrid::pack::ByteMatrix;
use ledgrid::sink::{FrameSink, LogSink};

use crate::http::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketEvent {
    /// The page finished a new frame.
    NewDisplayFrame,
    /// A client asks for the current frame.
    RequestDisplayFrame,
}

impl SocketEvent {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "newDisplayFrame" => Some(SocketEvent::NewDisplayFrame),
            "requestDisplayFrame" => Some(SocketEvent::RequestDisplayFrame),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SocketEvent::NewDisplayFrame => "newDisplayFrame",
            SocketEvent::RequestDisplayFrame => "requestDisplayFrame",
        }
    }
}

/// Body of a `newDisplayFrame` message: register bytes, one array per row.
#[derive(Debug, Deserialize)]
pub struct DisplayFrameMessage {
    pub frame: Vec<Vec<u8>>,
}

impl DisplayFrameMessage {
    pub fn to_matrix(&self) -> Result<ByteMatrix, FrameError> {
        let rows = self.frame.len();
        let registers = self.frame.first().map_or(0, Vec::len);
        if let Some(bad) = self.frame.iter().position(|row| row.len() != registers) {
            return Err(FrameError::Parse(format!(
                "row {bad} has {} registers, expected {registers}",
                self.frame[bad].len()
            )));
        }
        ByteMatrix::from_bytes(rows, registers, self.frame.concat())
    }
}

#[derive(Default)]
pub struct SocketStub {
    sink: Mutex<LogSink>,
}

impl SocketStub {
    /// Frames handed to the sink so far.
    pub fn received(&self) -> u64 {
        self.sink.lock().unwrap_or_else(|e| e.into_inner()).received()
    }

    pub fn handle(&self, event: SocketEvent, body: &[u8]) -> Result<Value, HttpError> {
        let message: Value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(body)
                .map_err(|e| HttpError::BadRequest(format!("invalid JSON: {e}")))?
        };
        log::info!("received message {}: {}", event.name(), message);

        match event {
            SocketEvent::NewDisplayFrame => {
                if message.get("frame").is_none() {
                    return Ok(json!({ "ok": true }));
                }
                let frame: DisplayFrameMessage = serde_json::from_value(message)
                    .map_err(|e| HttpError::BadRequest(format!("invalid frame: {e}")))?;
                let matrix = frame
                    .to_matrix()
                    .map_err(|e| HttpError::BadRequest(e.to_string()))?;
                let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
                sink.send(&matrix);
                Ok(json!({ "ok": true, "received": sink.received() }))
            }
            SocketEvent::RequestDisplayFrame => Ok(json!({ "ok": true })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        for event in [SocketEvent::NewDisplayFrame, SocketEvent::RequestDisplayFrame] {
            assert_eq!(SocketEvent::from_name(event.name()), Some(event));
        }
        assert_eq!(SocketEvent::from_name("other"), None);
    }

    #[test]
    fn frame_message_to_matrix() {
        let msg: DisplayFrameMessage =
            serde_json::from_str(r#"{"frame": [[192, 0], [1, 255]]}"#).unwrap();
        let m = msg.to_matrix().unwrap();
        assert_eq!((m.rows(), m.registers()), (2, 2));
        assert_eq!(m.as_bytes(), &[192, 0, 1, 255]);
    }

    #[test]
    fn ragged_frame_is_rejected() {
        let msg: DisplayFrameMessage = serde_json::from_str(r#"{"frame": [[1, 2], [3]]}"#).unwrap();
        assert!(msg.to_matrix().is_err());
    }

    #[test]
    fn new_frame_reaches_sink() {
        let stub = SocketStub::default();
        let reply = stub
            .handle(SocketEvent::NewDisplayFrame, br#"{"frame": [[1]]}"#)
            .unwrap();
        assert_eq!(reply["received"], 1);
        assert_eq!(stub.received(), 1);
    }

    #[test]
    fn plain_messages_are_only_logged() {
        let stub = SocketStub::default();
        stub.handle(SocketEvent::RequestDisplayFrame, b"").unwrap();
        stub.handle(SocketEvent::NewDisplayFrame, br#""hello""#).unwrap();
        assert_eq!(stub.received(), 0);
    }

    #[test]
    fn bad_payloads() {
        let stub = SocketStub::default();
        let err = stub.handle(SocketEvent::NewDisplayFrame, b"{nope").unwrap_err();
        assert_eq!(err.status(), 400);
        let err = stub
            .handle(SocketEvent::NewDisplayFrame, br#"{"frame": [[300]]}"#)
            .unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
