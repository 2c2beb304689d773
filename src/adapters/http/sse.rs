//! Server-Sent Events framing.
//!
//! Each frame is a single `data: <json>` line followed by a blank line. The
//! JSON carries a `type` discriminator. Readers buffer on `\n\n` because a
//! frame may be split across network reads.

use axum::response::sse::Event;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

const DATA_PREFIX: &str = "data:";

/// A frame that could not be decoded. It is dropped; the stream goes on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamProtocolError {
    #[error("frame has no data line: {frame:?}")]
    MissingDataPrefix { frame: String },

    #[error("frame data is not valid JSON: {0}")]
    MalformedJson(String),
}

/// Encodes one frame as wire text.
pub fn encode_frame<T: Serialize>(frame: &T) -> Result<String, serde_json::Error> {
    Ok(format!("data: {}\n\n", serde_json::to_string(frame)?))
}

/// Encodes one frame as an axum SSE event.
pub fn to_event<T: Serialize>(frame: &T) -> Event {
    match serde_json::to_string(frame) {
        Ok(json) => Event::default().data(json),
        Err(e) => {
            tracing::warn!("Failed to serialize SSE frame: {}", e);
            Event::default().comment("unserializable frame")
        }
    }
}

/// Decodes a single frame, without the trailing blank line.
pub fn decode_frame<T: DeserializeOwned>(raw: &str) -> Result<Option<T>, StreamProtocolError> {
    let mut data = Vec::new();
    let mut comment_only = true;
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
            data.push(rest.strip_prefix(' ').unwrap_or(rest));
            comment_only = false;
        } else if !line.starts_with(':') && !line.is_empty() {
            comment_only = false;
        }
    }

    if data.is_empty() {
        // Keep-alive comments carry nothing.
        if comment_only {
            return Ok(None);
        }
        return Err(StreamProtocolError::MissingDataPrefix {
            frame: raw.to_string(),
        });
    }

    serde_json::from_str(&data.join("\n"))
        .map(Some)
        .map_err(|e| StreamProtocolError::MalformedJson(e.to_string()))
}

/// Incremental reader for a byte stream of SSE frames.
pub struct SseDecoder<T> {
    buffer: Vec<u8>,
    _frame: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Default for SseDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> SseDecoder<T> {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            _frame: PhantomData,
        }
    }

    /// Feeds one read and returns the frames it completed. Bad frames are
    /// logged and skipped.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<T> {
        self.buffer.extend_from_slice(bytes);
        let mut frames = Vec::new();
        while let Some(end) = find_boundary(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let text = String::from_utf8_lossy(&raw[..end]).replace('\r', "");
            match decode_frame(&text) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => {}
                Err(e) => tracing::warn!("Dropping SSE frame: {}", e),
            }
        }
        frames
    }

    /// Bytes held back waiting for a frame boundary.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_boundary(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum Frame {
        Token { token: String },
        Error { error: String },
    }

    #[test]
    fn encodes_data_line_and_blank_line() {
        let text = encode_frame(&Frame::Token { token: "hi".into() }).unwrap();
        assert_eq!(text, "data: {\"type\":\"token\",\"token\":\"hi\"}\n\n");
    }

    #[test]
    fn decoder_joins_frames_split_across_reads() {
        let wire = encode_frame(&Frame::Token { token: "a b".into() }).unwrap()
            + &encode_frame(&Frame::Error { error: "x".into() }).unwrap();
        let (first, second) = wire.as_bytes().split_at(13);

        let mut decoder = SseDecoder::<Frame>::new();
        assert!(decoder.push(first).is_empty());
        let frames = decoder.push(second);

        assert_eq!(
            frames,
            vec![
                Frame::Token { token: "a b".into() },
                Frame::Error { error: "x".into() }
            ]
        );
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn bad_frames_are_dropped_and_stream_continues() {
        let mut decoder = SseDecoder::<Frame>::new();
        let frames = decoder.push(
            b"event: nothing\n\ndata: {not json\n\n: keep-alive\n\ndata: {\"type\":\"token\",\"token\":\"ok\"}\n\n",
        );
        assert_eq!(frames, vec![Frame::Token { token: "ok".into() }]);
    }

    #[test]
    fn decode_frame_reports_each_protocol_error() {
        assert!(matches!(
            decode_frame::<Frame>("event: x"),
            Err(StreamProtocolError::MissingDataPrefix { .. })
        ));
        assert!(matches!(
            decode_frame::<Frame>("data: [1,"),
            Err(StreamProtocolError::MalformedJson(_))
        ));
        assert_eq!(decode_frame::<Frame>(": ping").unwrap(), None);
    }

    #[test]
    fn multibyte_text_survives_split_reads() {
        let wire = encode_frame(&Frame::Token { token: "é".into() }).unwrap();
        let bytes = wire.as_bytes();
        let split = wire.find('é').unwrap() + 1;

        let mut decoder = SseDecoder::<Frame>::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        assert_eq!(decoder.push(&bytes[split..]), vec![Frame::Token { token: "é".into() }]);
    }
}
