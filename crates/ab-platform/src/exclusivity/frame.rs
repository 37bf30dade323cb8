//! Wire format of the forwarding side channel.
//!
//! Every message is one length-delimited frame (4-byte big-endian length
//! prefix) holding a JSON document. A secondary sends a [`ForwardFrame`] and
//! waits for the matching [`AckFrame`].

use ab_core::{LaunchAttempt, LaunchId};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::codec::LengthDelimitedCodec;

pub const PROTOCOL_VERSION: u8 = 1;

/// Upper bound for a single frame; argv larger than this is refused.
pub const MAX_FRAME_LENGTH: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardFrame {
    pub version: u8,
    pub attempt: LaunchAttempt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckFrame {
    pub launch_id: LaunchId,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),
}

pub fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

impl ForwardFrame {
    pub fn new(attempt: LaunchAttempt) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            attempt,
        }
    }

    pub fn encode(&self) -> Result<Bytes, FrameError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let frame: Self = serde_json::from_slice(bytes)?;
        if frame.version != PROTOCOL_VERSION {
            return Err(FrameError::UnsupportedVersion(frame.version));
        }
        Ok(frame)
    }
}

impl AckFrame {
    pub fn encode(&self) -> Result<Bytes, FrameError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    #[test]
    fn frames_survive_codec_boundaries() {
        let attempt = LaunchAttempt::new(vec!["app".into(), "--x".into()], "/tmp");
        let first = ForwardFrame::new(attempt.clone()).encode().unwrap();
        let second = AckFrame {
            launch_id: attempt.launch_id.clone(),
        }
        .encode()
        .unwrap();

        let mut codec = codec();
        let mut buf = BytesMut::new();
        codec.encode(first, &mut buf).unwrap();
        codec.encode(second, &mut buf).unwrap();

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(ForwardFrame::decode(&decoded).unwrap().attempt, attempt);
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(AckFrame::decode(&decoded).unwrap().launch_id, attempt.launch_id);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn rejects_unknown_protocol_version() {
        let mut frame = ForwardFrame::new(LaunchAttempt::new(vec![], "/"));
        frame.version = 99;
        let bytes = serde_json::to_vec(&frame).unwrap();

        let err = ForwardFrame::decode(&bytes).unwrap_err();
        assert!(matches!(err, FrameError::UnsupportedVersion(99)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            ForwardFrame::decode(b"not json"),
            Err(FrameError::Malformed(_))
        ));
    }
}
