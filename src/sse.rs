//! Server-sent event framing over an incrementally delivered byte stream.
//!
//! Both wire protocols stream over SSE. The decoder consumes raw byte chunks
//! line by line, so frames (and multi-byte characters) split across chunk
//! boundaries reassemble correctly, and CR-LF line endings need no special
//! casing.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_util::{Stream, StreamExt};

use crate::Error;

/// One decoded SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event` field, when the frame carried one.
    pub event: Option<String>,
    /// Joined `data` lines.
    pub data: String,
}

impl SseFrame {
    /// The `[DONE]` sentinel some chat endpoints close the stream with.
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

// Caps memory held for a single unterminated frame.
const MAX_PENDING_BYTES: usize = 1 << 20;

/// Decodes SSE frames from a byte stream, holding partial lines across chunk
/// boundaries.
pub struct SseDecoder<S> {
    source: S,
    source_done: bool,
    /// Raw bytes of the (possibly incomplete) current line.
    pending: Vec<u8>,
    /// Fields of the frame currently being assembled.
    event: Option<String>,
    data_lines: Vec<String>,
    /// Frames ready to be yielded.
    decoded: VecDeque<SseFrame>,
}

impl<S> SseDecoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            source_done: false,
            pending: Vec::new(),
            event: None,
            data_lines: Vec::new(),
            decoded: VecDeque::new(),
        }
    }

    /// Split complete lines off the front of the pending buffer and feed them
    /// to the frame assembler.
    fn drain_lines(&mut self) -> Result<(), Error> {
        while let Some(pos) = memchr::memchr(b'\n', &self.pending) {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let mut line = &line[..line.len() - 1];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            let line = std::str::from_utf8(line)
                .map_err(|e| Error::streaming(format!("invalid UTF-8 in SSE line: {e}")))?
                .to_string();
            self.feed_line(&line);
        }
        Ok(())
    }

    fn feed_line(&mut self, line: &str) {
        // Blank line terminates the current frame.
        if line.is_empty() {
            if !self.data_lines.is_empty() {
                self.decoded.push_back(SseFrame {
                    event: self.event.take(),
                    data: self.data_lines.join("\n"),
                });
                self.data_lines.clear();
            } else {
                self.event = None;
            }
            return;
        }
        // Comment line.
        if line.starts_with(':') {
            return;
        }

        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            _ => {}
        }
    }

    /// Flush state when the source ends, covering streams that close without
    /// a final newline or frame terminator.
    fn finish(&mut self) -> Result<(), Error> {
        if !self.pending.is_empty() {
            let trailing = std::mem::take(&mut self.pending);
            let line = std::str::from_utf8(&trailing)
                .map_err(|e| Error::streaming(format!("invalid UTF-8 in SSE line: {e}")))?
                .trim_end_matches('\r')
                .to_string();
            self.feed_line(&line);
        }
        if !self.data_lines.is_empty() {
            self.decoded.push_back(SseFrame {
                event: self.event.take(),
                data: self.data_lines.join("\n"),
            });
            self.data_lines.clear();
        }
        Ok(())
    }
}

impl<S, E> Stream for SseDecoder<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<SseFrame, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(frame) = self.decoded.pop_front() {
                return Poll::Ready(Some(Ok(frame)));
            }
            if self.source_done {
                return Poll::Ready(None);
            }

            let chunk = match ready!(self.source.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::streaming(format!(
                        "stream error: {}",
                        e.into()
                    )))));
                }
                None => {
                    self.source_done = true;
                    if let Err(e) = self.finish() {
                        return Poll::Ready(Some(Err(e)));
                    }
                    continue;
                }
            };

            self.pending.extend_from_slice(&chunk);
            if self.pending.len() > MAX_PENDING_BYTES {
                self.pending.clear();
                return Poll::Ready(Some(Err(Error::streaming(
                    "SSE line exceeded maximum buffered size",
                ))));
            }
            if let Err(e) = self.drain_lines() {
                return Poll::Ready(Some(Err(e)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: &[&[u8]]) -> Vec<Result<bytes::Bytes, std::io::Error>> {
        parts
            .iter()
            .map(|p| Ok(bytes::Bytes::copy_from_slice(p)))
            .collect()
    }

    #[tokio::test]
    async fn test_complete_frames() {
        let byte_stream = stream::iter(chunks(&[b"data: Hello\n\ndata: World\n\n"]));
        let mut decoder = SseDecoder::new(byte_stream);

        assert_eq!(decoder.next().await.unwrap().unwrap().data, "Hello");
        assert_eq!(decoder.next().await.unwrap().unwrap().data, "World");
        assert!(decoder.next().await.is_none());
    }

    #[tokio::test]
    async fn test_frame_split_across_chunks() {
        let byte_stream = stream::iter(chunks(&[
            b"data: Hel",
            b"lo World\n\ndata: ",
            b"Second\n\n",
        ]));
        let mut decoder = SseDecoder::new(byte_stream);

        assert_eq!(decoder.next().await.unwrap().unwrap().data, "Hello World");
        assert_eq!(decoder.next().await.unwrap().unwrap().data, "Second");
        assert!(decoder.next().await.is_none());
    }

    #[tokio::test]
    async fn test_multiline_data_joined() {
        let byte_stream = stream::iter(chunks(&[b"data: Line 1\ndata: Line 2\n\n"]));
        let mut decoder = SseDecoder::new(byte_stream);

        assert_eq!(decoder.next().await.unwrap().unwrap().data, "Line 1\nLine 2");
    }

    #[tokio::test]
    async fn test_event_field_and_comments() {
        let byte_stream = stream::iter(chunks(&[b": keep-alive\nevent: delta\ndata: x\n\n"]));
        let mut decoder = SseDecoder::new(byte_stream);

        let frame = decoder.next().await.unwrap().unwrap();
        assert_eq!(frame.event.as_deref(), Some("delta"));
        assert_eq!(frame.data, "x");
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let byte_stream = stream::iter(chunks(&[b"data: first\r\n\r\ndata: second\r\n\r\n"]));
        let mut decoder = SseDecoder::new(byte_stream);

        assert_eq!(decoder.next().await.unwrap().unwrap().data, "first");
        assert_eq!(decoder.next().await.unwrap().unwrap().data, "second");
        assert!(decoder.next().await.is_none());
    }

    #[tokio::test]
    async fn test_utf8_split_across_chunks() {
        // Euro sign is three bytes; split it mid-character.
        let euro = "€".as_bytes();
        let first = [b"data: Price: ".as_slice(), &euro[..2]].concat();
        let second = [&euro[2..], b"100\n\n"].concat();
        let byte_stream = stream::iter(vec![
            Ok::<_, std::io::Error>(bytes::Bytes::from(first)),
            Ok(bytes::Bytes::from(second)),
        ]);
        let mut decoder = SseDecoder::new(byte_stream);

        assert_eq!(decoder.next().await.unwrap().unwrap().data, "Price: €100");
    }

    #[tokio::test]
    async fn test_stream_ends_without_terminator() {
        let byte_stream = stream::iter(chunks(&[b"data: first\n\n", b"data: [DONE]"]));
        let mut decoder = SseDecoder::new(byte_stream);

        assert_eq!(decoder.next().await.unwrap().unwrap().data, "first");
        let last = decoder.next().await.unwrap().unwrap();
        assert!(last.is_done());
        assert!(decoder.next().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_an_error() {
        let byte_stream = stream::iter(chunks(&[b"data: ok \xFF\xFE bad\n\n"]));
        let mut decoder = SseDecoder::new(byte_stream);

        assert!(decoder.next().await.unwrap().is_err());
    }
}
