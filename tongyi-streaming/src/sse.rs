//! Server-Sent Events (SSE) parsing.
//!
//! The parser is line oriented and buffers raw bytes until a full line is
//! available, so multi-byte UTF-8 sequences split across network chunks are
//! decoded correctly.

use crate::error::{StreamError, StreamResult};
use futures::{ready, Stream};
use pin_project_lite::pin_project;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

const MAX_LINE_SIZE: usize = 10 * 1024 * 1024;

/// A parsed SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type (if specified).
    pub event: Option<String>,
    /// Event data, multiple `data:` lines joined by `\n`.
    pub data: String,
    /// Event ID (if specified).
    pub id: Option<String>,
    /// Retry timeout (if specified).
    pub retry: Option<u64>,
}

impl SseEvent {
    /// Create a new SSE event with just data.
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
            id: None,
            retry: None,
        }
    }

    /// Set the event type.
    #[must_use]
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Check if this is the `[DONE]` terminator.
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }

    /// Parse the data as JSON.
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}

/// Incremental parser for Server-Sent Events.
#[derive(Debug, Default)]
pub struct SseParser {
    pending: Vec<u8>,
    data: Vec<String>,
    event: Option<String>,
    id: Option<String>,
    retry: Option<u64>,
    events: VecDeque<SseEvent>,
    last_event_id: Option<String>,
}

impl SseParser {
    /// Create a new SSE parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes into the parser. Completed events become available
    /// through [`next_event`](Self::next_event).
    pub fn feed(&mut self, bytes: &[u8]) -> StreamResult<()> {
        self.pending.extend_from_slice(bytes);

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8(line)
                .map_err(|e| StreamError::ParseSse(format!("invalid UTF-8: {e}")))?;
            self.process_line(&line);
        }

        if self.pending.len() > MAX_LINE_SIZE {
            return Err(StreamError::BufferOverflow);
        }
        Ok(())
    }

    /// Feed a string into the parser.
    pub fn feed_str(&mut self, s: &str) -> StreamResult<()> {
        self.feed(s.as_bytes())
    }

    /// Call when the byte stream ends to flush a trailing unterminated event.
    pub fn finish(&mut self) -> StreamResult<()> {
        if !self.pending.is_empty() {
            let line = String::from_utf8(std::mem::take(&mut self.pending))
                .map_err(|e| StreamError::ParseSse(format!("invalid UTF-8: {e}")))?;
            self.process_line(line.trim_end_matches('\r'));
        }
        self.dispatch();
        Ok(())
    }

    /// Get the next parsed event.
    pub fn next_event(&mut self) -> Option<SseEvent> {
        self.events.pop_front()
    }

    /// Check if there are pending events.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get the last event ID.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    fn process_line(&mut self, line: &str) {
        if line.is_empty() {
            self.dispatch();
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            "retry" => self.retry = value.trim().parse().ok(),
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        let event = self.event.take();
        let retry = self.retry.take();
        let id = self.id.take();
        if self.data.is_empty() {
            return;
        }

        if id.is_some() {
            self.last_event_id.clone_from(&id);
        }
        self.events.push_back(SseEvent {
            event,
            data: std::mem::take(&mut self.data).join("\n"),
            id,
            retry,
        });
    }
}

pin_project! {
    /// Stream adapter that parses SSE from a byte stream.
    pub struct SseStream<S> {
        #[pin]
        inner: S,
        parser: SseParser,
        finished: bool,
    }
}

impl<S> SseStream<S> {
    /// Create a new SSE stream from a byte stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            parser: SseParser::new(),
            finished: false,
        }
    }
}

impl<S, B, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    type Item = StreamResult<SseEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(event) = this.parser.next_event() {
                return Poll::Ready(Some(Ok(event)));
            }
            if *this.finished {
                return Poll::Ready(None);
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(bytes)) => {
                    if let Err(e) = this.parser.feed(bytes.as_ref()) {
                        *this.finished = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                }
                Some(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(StreamError::transport(e))));
                }
                None => {
                    *this.finished = true;
                    if let Err(e) = this.parser.finish() {
                        return Poll::Ready(Some(Err(e)));
                    }
                }
            }
        }
    }
}
