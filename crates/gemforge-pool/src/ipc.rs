//! The tagged-variant IPC message type (§9 "Inter-process IPC") carried
//! over a worker's stdin/stdout pipe, length-delimited-framed as JSON.

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

/// A message exchanged between a worker and the pooler's supervisor.
///
/// The original source used a list/tuple convention with the first element
/// as a tag; this is the typed equivalent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Message {
    /// Pooler -> worker: begin a polite shutdown. The worker finishes its
    /// current job (if any) before exiting.
    Stop,
    /// Pooler -> worker: report current state.
    Status,
    /// Worker -> pooler: reply to [`Message::Status`].
    StatusReply {
        current_job: Option<String>,
        running: bool,
    },
    /// Worker -> pooler: acknowledgement of any recognized inbound message,
    /// or a negative ack for a tag the worker doesn't recognize.
    Ack { tag: String, ok: bool },
}

impl Message {
    /// The tag a worker echoes back for an unrecognized inbound message.
    pub fn unrecognized_ack(tag: impl Into<String>) -> Self {
        Message::Ack {
            tag: tag.into(),
            ok: false,
        }
    }
}

/// Wraps a writer half in a length-delimited JSON frame sink.
pub fn writer<W: AsyncWrite>(io: W) -> FramedWrite<W, LengthDelimitedCodec> {
    FramedWrite::new(io, LengthDelimitedCodec::new())
}

/// Wraps a reader half in a length-delimited JSON frame source.
pub fn reader<R: AsyncRead>(io: R) -> FramedRead<R, LengthDelimitedCodec> {
    FramedRead::new(io, LengthDelimitedCodec::new())
}

/// Serializes a [`Message`] into a length-delimited frame payload.
pub fn encode(message: &Message) -> crate::PoolResult<Bytes> {
    let bytes = serde_json::to_vec(message).map_err(|err| crate::PoolError::Ipc {
        worker_id: String::new(),
        message: format!("failed to encode IPC message: {err}"),
    })?;
    Ok(Bytes::from(bytes))
}

/// Deserializes a frame payload into a [`Message`].
pub fn decode(frame: BytesMut) -> crate::PoolResult<Message> {
    serde_json::from_slice(&frame).map_err(|err| crate::PoolError::Ipc {
        worker_id: String::new(),
        message: format!("failed to decode IPC message: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let message = Message::StatusReply {
            current_job: Some("abc".to_string()),
            running: true,
        };
        let encoded = encode(&message).unwrap();
        let decoded = decode(BytesMut::from(&encoded[..])).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn unrecognized_tag_naks() {
        let ack = Message::unrecognized_ack("bogus");
        assert_eq!(ack, Message::Ack { tag: "bogus".to_string(), ok: false });
    }
}
