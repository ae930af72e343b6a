//! Line-oriented decoder for the hub's server-sent progress streams.
//!
//! The hub writes one `data: {json}` line per event, separated by blank
//! lines. Anything that is not a `data:` line is ignored. The stream ends
//! when the hub closes the connection, which says nothing about whether the
//! operation succeeded.

use std::marker::PhantomData;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::io::StreamReader;

use crate::error::{HubError, HubErrorKind, HubResult};
use crate::session::Session;

const DATA_PREFIX: &str = "data:";

/// Streaming HTTP body adapted to `AsyncBufRead`.
pub type HttpBody = StreamReader<BoxStream<'static, std::io::Result<Bytes>>, Bytes>;

/// Lazy, finite sequence of decoded events read from `R`.
///
/// Consumers may stop early; [`EventStream::close`] (or dropping the value)
/// releases the transport without draining it.
pub struct EventStream<R, T> {
    reader: R,
    line: Vec<u8>,
    done: bool,
    _event: PhantomData<fn() -> T>,
}

impl<R, T> EventStream<R, T>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            done: false,
            _event: PhantomData,
        }
    }

    /// Returns the next decoded event, or `None` once the transport ends.
    ///
    /// A read failure is yielded once and ends the sequence.
    pub async fn next(&mut self) -> Option<HubResult<T>> {
        while !self.done {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line).await {
                Ok(0) => self.done = true,
                Ok(_) => {
                    if let Some(event) = parse_data_line(&self.line) {
                        return Some(event);
                    }
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(HubError::new(
                        HubErrorKind::Transport,
                        format!("event stream read failed: {err}"),
                    )));
                }
            }
        }
        None
    }

    /// Releases the underlying transport.
    pub fn close(self) {
        drop(self.reader);
    }
}

/// Opens the event stream at `url`.
///
/// # Errors
/// Returns an HTTP error if the response status is not a success.
pub async fn open_event_stream<T>(session: &Session, url: &str) -> HubResult<EventStream<HttpBody, T>>
where
    T: DeserializeOwned,
{
    let response = session.send_checked(session.get(url)).await?;
    let body = response
        .bytes_stream()
        .map_err(std::io::Error::other)
        .boxed();
    Ok(EventStream::new(StreamReader::new(body)))
}

/// Decodes one raw line.
///
/// Returns `None` for blank lines and lines without the `data:` prefix.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn parse_data_line<T: DeserializeOwned>(raw: &[u8]) -> Option<HubResult<T>> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() || !line.starts_with(DATA_PREFIX) {
        return None;
    }
    let (_, payload) = line.split_once(':')?;
    Some(
        serde_json::from_str(payload)
            .map_err(|e| HubError::parse(format!("invalid event data {payload:?}: {e}"))),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::models::ProgressEvent;

    async fn collect<T: DeserializeOwned>(input: &'static [u8]) -> Vec<HubResult<T>> {
        let mut stream: EventStream<&[u8], T> = EventStream::new(input);
        let mut out = Vec::new();
        while let Some(event) = stream.next().await {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_yields_only_data_lines_in_order() {
        let input = b"data: {\"progress\": 0}\n\ndata: {\"progress\": 100, \"ready\": true, \"url\": \"/x\"}\njunk\n";
        let events = collect::<Value>(input).await;
        let events: Vec<Value> = events.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            events,
            vec![
                json!({"progress": 0}),
                json!({"progress": 100, "ready": true, "url": "/x"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_decoded() {
        let events = collect::<ProgressEvent>(b"data: {\"progress\": 50, \"message\": \"half\"}").await;
        assert_eq!(events.len(), 1);
        let event = events.into_iter().next().unwrap().unwrap();
        assert_eq!(event.progress_label(), "50");
        assert_eq!(event.message_text(), "half");
        assert!(!event.ready);
    }

    #[tokio::test]
    async fn test_crlf_and_comment_lines() {
        let input = b": keepalive\r\nevent: progress\r\ndata:{\"progress\": 10}\r\n\r\n";
        let events = collect::<ProgressEvent>(input).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().progress_label(), "10");
    }

    #[tokio::test]
    async fn test_empty_stream_ends_immediately() {
        assert!(collect::<Value>(b"").await.is_empty());
        assert!(collect::<Value>(b"\n\n\n").await.is_empty());
    }

    #[tokio::test]
    async fn test_early_stop_leaves_rest_unread() {
        let input: &[u8] = b"data: {\"progress\": 1}\ndata: {\"progress\": 2}\n";
        let mut stream: EventStream<&[u8], ProgressEvent> = EventStream::new(input);
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.progress_label(), "1");
        stream.close();
    }

    #[test]
    fn test_parse_data_line_rules() {
        assert!(parse_data_line::<Value>(b"").is_none());
        assert!(parse_data_line::<Value>(b"   \n").is_none());
        assert!(parse_data_line::<Value>(b"junk").is_none());
        assert!(parse_data_line::<Value>(b"id: data: {}").is_none());

        let value = parse_data_line::<Value>(b"data: {\"a\": \"b:c\"}\n").unwrap().unwrap();
        assert_eq!(value, json!({"a": "b:c"}));
    }

    #[test]
    fn test_parse_data_line_bad_json_is_parse_error() {
        let err = parse_data_line::<Value>(b"data: {not json").unwrap().unwrap_err();
        assert_eq!(err.kind, HubErrorKind::Parse);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let value = parse_data_line::<Value>(b"data: {\"message\": \"caf\xff\"}")
            .unwrap()
            .unwrap();
        assert_eq!(value["message"], "caf\u{fffd}");
    }
}
