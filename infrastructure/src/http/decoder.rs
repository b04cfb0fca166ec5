//! # Stream Decoder
//!
//! Turns a chunked reply body into a lazy sequence of [`StreamEvent`]s.
//!
//! The body is newline-delimited JSON, but chunks arrive at arbitrary
//! boundaries: a record can be split across chunks, and so can a multi-byte
//! UTF-8 character. Raw bytes are therefore buffered and only complete
//! records are converted to text.
//!
//! - Malformed or unknown records are discarded with a warning
//! - A transport error is yielded once, then the sequence ends
//! - A partial record left over at end of input is dropped

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::fmt::Display;
use threadline_application::GatewayError;
use threadline_domain::{StreamEvent, truncate};
use tracing::{debug, warn};

/// Byte buffer that hands out complete newline-terminated records.
#[derive(Debug)]
pub struct LineBuffer {
    buffer: BytesMut,
    /// Prefix of `buffer` already known to contain no newline.
    scanned: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            scanned: 0,
        }
    }

    /// Append a raw chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Remove and return the next complete record, without its line ending.
    pub fn next_record(&mut self) -> Option<String> {
        let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') else {
            self.scanned = self.buffer.len();
            return None;
        };
        let newline_pos = self.scanned + offset;
        self.scanned = 0;
        let mut line = self.buffer.split_to(newline_pos + 1);
        line.truncate(newline_pos);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Bytes of the incomplete trailing record.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Parse one record into an event.
///
/// Returns `None` for blank lines and for records that are not valid.
pub fn parse_record(line: &str) -> Option<StreamEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<super::protocol::WireRecord>(trimmed) {
        Ok(record) => record.into_event(),
        Err(e) => {
            warn!(
                "Discarding malformed stream record ({}): {}",
                e,
                truncate(trimmed, 120)
            );
            None
        }
    }
}

/// Decode a byte stream into stream events.
///
/// Events are yielded strictly in arrival order. The returned stream can
/// only be consumed once.
pub fn decode_event_stream<S, E>(
    byte_stream: S,
) -> impl Stream<Item = Result<StreamEvent, GatewayError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display,
{
    futures::stream::unfold(
        (Box::pin(byte_stream), LineBuffer::new(), false),
        |(mut stream, mut buffer, done)| async move {
            if done {
                return None;
            }

            loop {
                while let Some(record) = buffer.next_record() {
                    if let Some(event) = parse_record(&record) {
                        return Some((Ok(event), (stream, buffer, false)));
                    }
                }

                match stream.next().await {
                    Some(Ok(chunk)) => buffer.push(&chunk),
                    Some(Err(e)) => {
                        let message = e.to_string();
                        warn!("Reply stream read error: {}", message);
                        return Some((
                            Err(GatewayError::StreamInterrupted(message)),
                            (stream, buffer, true),
                        ));
                    }
                    None => {
                        if !buffer.is_empty() {
                            debug!(
                                "Discarding {} bytes of incomplete record at end of stream",
                                buffer.len()
                            );
                        }
                        return None;
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use threadline_domain::ThreadId;

    const BODY: &str = concat!(
        r#"{"type":"threadId","threadId":"t1"}"#,
        "\n",
        r#"{"type":"delta","content":"Hi"}"#,
        "\n",
        r#"{"type":"delta","content":" thére ✓"}"#,
        "\r\n",
        r#"{"type":"error","message":"boom"}"#,
        "\n",
    );

    fn expected() -> Vec<StreamEvent> {
        vec![
            StreamEvent::thread_assigned(ThreadId::new("t1").unwrap()),
            StreamEvent::delta("Hi"),
            StreamEvent::delta(" thére ✓"),
            StreamEvent::failed("boom"),
        ]
    }

    async fn decode_chunks(chunks: Vec<Vec<u8>>) -> Vec<Result<StreamEvent, GatewayError>> {
        let source = futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, io::Error>(Bytes::from(c))),
        );
        decode_event_stream(source).collect().await
    }

    async fn decode_ok(chunks: Vec<Vec<u8>>) -> Vec<StreamEvent> {
        decode_chunks(chunks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn line_buffer_holds_partial_record() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"{\"a\":1}\n{\"b\"");
        assert_eq!(buffer.next_record().as_deref(), Some("{\"a\":1}"));
        assert_eq!(buffer.next_record(), None);
        assert_eq!(buffer.len(), 4);

        buffer.push(b":2}\r\n");
        assert_eq!(buffer.next_record().as_deref(), Some("{\"b\":2}"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn line_buffer_scans_only_new_bytes() {
        let mut buffer = LineBuffer::new();
        for byte in br#"{"type":"delta","content":"long"}"# {
            buffer.push(&[*byte]);
            assert_eq!(buffer.next_record(), None);
            assert_eq!(buffer.scanned, buffer.len());
        }

        buffer.push(b"\n{\"c\"");
        assert_eq!(
            buffer.next_record().as_deref(),
            Some(r#"{"type":"delta","content":"long"}"#)
        );
        assert_eq!(buffer.scanned, 0);
        assert_eq!(buffer.next_record(), None);
        assert_eq!(buffer.scanned, 4);

        buffer.push(b":3}\n");
        assert_eq!(buffer.next_record().as_deref(), Some("{\"c\":3}"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn parse_record_skips_blank_and_malformed_lines() {
        assert_eq!(parse_record(""), None);
        assert_eq!(parse_record("   "), None);
        assert_eq!(parse_record("not json"), None);
        assert_eq!(parse_record(r#"{"type":"unknown"}"#), None);
        assert_eq!(parse_record(r#"{"type":"delta"}"#), None);
        assert_eq!(
            parse_record(r#"{"type":"delta","content":"x"}"#),
            Some(StreamEvent::delta("x"))
        );
    }

    #[tokio::test]
    async fn single_chunk_decodes_all_records() {
        assert_eq!(decode_ok(vec![BODY.as_bytes().to_vec()]).await, expected());
    }

    #[tokio::test]
    async fn every_split_point_yields_same_events() {
        let bytes = BODY.as_bytes();
        for split in 0..=bytes.len() {
            let chunks = vec![bytes[..split].to_vec(), bytes[split..].to_vec()];
            assert_eq!(decode_ok(chunks).await, expected(), "split at byte {split}");
        }
    }

    #[tokio::test]
    async fn byte_at_a_time_yields_same_events() {
        let chunks = BODY.as_bytes().iter().map(|b| vec![*b]).collect();
        assert_eq!(decode_ok(chunks).await, expected());
    }

    #[tokio::test]
    async fn malformed_line_between_deltas_is_skipped() {
        let body = concat!(
            r#"{"type":"delta","content":"a"}"#,
            "\n",
            "<<garbage>>\n",
            r#"{"type":"delta","content":"b"}"#,
            "\n",
        );
        let text: String = decode_ok(vec![body.as_bytes().to_vec()])
            .await
            .iter()
            .filter_map(|e| e.text().map(str::to_string))
            .collect();
        assert_eq!(text, "ab");
    }

    #[tokio::test]
    async fn trailing_partial_record_is_discarded() {
        let body = concat!(r#"{"type":"delta","content":"a"}"#, "\n", r#"{"type":"delta","con"#);
        assert_eq!(
            decode_ok(vec![body.as_bytes().to_vec()]).await,
            vec![StreamEvent::delta("a")]
        );
    }

    #[tokio::test]
    async fn transport_error_ends_sequence() {
        let source = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"{\"type\":\"delta\",\"content\":\"a\"}\n")),
            Err(io::Error::other("connection reset")),
            Ok(Bytes::from_static(b"{\"type\":\"delta\",\"content\":\"b\"}\n")),
        ]);

        let items: Vec<_> = decode_event_stream(source).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok(StreamEvent::delta("a")));
        assert!(matches!(
            &items[1],
            Err(GatewayError::StreamInterrupted(msg)) if msg.contains("connection reset")
        ));
    }

    #[tokio::test]
    async fn empty_body_yields_nothing() {
        assert!(decode_chunks(vec![]).await.is_empty());
    }
}
