//! Incremental decoder for the provider's server-sent-event stream.
//!
//! Bytes arrive in arbitrary slices: a UTF-8 sequence or an event line may be
//! split across reads. [`StreamDecoder`] buffers both and only interprets
//! complete lines. [`V0Client::stream_generate`] wraps it in a pull-based
//! stream over the response body.

use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use super::http::V0Client;
use super::{GenerationRequest, StreamingResponse};
use crate::error::{RequestMode, TransportFailure, V0Error};

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamingResponse, V0Error>> + Send>>;

/// Progress added per decoded chunk.
pub const PROGRESS_STEP: u8 = 5;
/// Progress never exceeds this until the terminal marker.
pub const PROGRESS_CAP: u8 = 95;

const DATA_PREFIX: &str = "data:";
const DONE_MARKER: &str = "[DONE]";

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence.
    carry: Vec<u8>,
    /// Decoded text not yet terminated by a newline.
    buffer: String,
    progress: u8,
    done: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the terminal marker has been decoded. Later input is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feeds one network read and returns the events completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamingResponse> {
        if self.done {
            return Vec::new();
        }

        self.carry.extend_from_slice(bytes);
        self.decode_carry();

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            if let Some(event) = self.line(&line) {
                events.push(event);
            }
            if self.done {
                self.buffer.clear();
                break;
            }
        }
        events
    }

    /// Flushes a final unterminated line at end of input.
    pub fn finish(&mut self) -> Vec<StreamingResponse> {
        if self.done {
            return Vec::new();
        }
        if !self.carry.is_empty() {
            let rest = String::from_utf8_lossy(&self.carry).into_owned();
            self.carry.clear();
            self.buffer.push_str(&rest);
        }
        let line = std::mem::take(&mut self.buffer);
        self.line(&line).into_iter().collect()
    }

    /// Moves every complete UTF-8 sequence from `carry` into `buffer`.
    fn decode_carry(&mut self) {
        let valid = match std::str::from_utf8(&self.carry) {
            Ok(s) => s.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => {
                // Invalid bytes mid-stream: replace rather than stall forever.
                let text = String::from_utf8_lossy(&self.carry).into_owned();
                self.buffer.push_str(&text);
                self.carry.clear();
                return;
            }
        };

        let tail = self.carry.split_off(valid);
        let head = std::mem::replace(&mut self.carry, tail);
        // valid_up_to guarantees the prefix is UTF-8
        if let Ok(text) = String::from_utf8(head) {
            self.buffer.push_str(&text);
        }
    }

    fn line(&mut self, line: &str) -> Option<StreamingResponse> {
        let line = line.trim_end_matches(['\n', '\r']);
        let payload = line.strip_prefix(DATA_PREFIX)?.trim();

        if payload == DONE_MARKER {
            self.done = true;
            return Some(StreamingResponse::terminal());
        }

        let event: StreamEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("skipping undecodable stream line: {e}");
                return None;
            }
        };

        let chunk = event
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta)
            .and_then(|d| d.content)
            .unwrap_or_default();

        self.progress = self.progress.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);

        Some(StreamingResponse {
            chunk,
            progress: self.progress,
            complete: false,
            usage_metadata: event.usage,
        })
    }
}

/// Wraps an open streaming response in a pull-based event stream.
///
/// Nothing is read until the consumer polls. Dropping the stream drops the
/// response body and with it the connection. A body that ends without the
/// terminal marker yields its remaining events and then an error.
pub fn decode_response(response: reqwest::Response) -> ChunkStream {
    struct State<S> {
        body: S,
        decoder: StreamDecoder,
        pending: std::collections::VecDeque<Result<StreamingResponse, V0Error>>,
        finished: bool,
    }

    let state = State {
        body: Box::pin(response.bytes_stream()),
        decoder: StreamDecoder::new(),
        pending: Default::default(),
        finished: false,
    };

    let events = stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.finished {
                return None;
            }

            match st.body.next().await {
                Some(Ok(bytes)) => {
                    st.pending.extend(st.decoder.feed(&bytes).into_iter().map(Ok));
                    if st.decoder.is_done() {
                        st.finished = true;
                    }
                }
                Some(Err(e)) => {
                    st.finished = true;
                    st.pending
                        .push_back(Err(TransportFailure::Io(e).classify(RequestMode::Text)));
                }
                None => {
                    st.finished = true;
                    st.pending.extend(st.decoder.finish().into_iter().map(Ok));
                    if !st.decoder.is_done() {
                        st.pending.push_back(Err(V0Error::MalformedResponse(
                            "v0 API stream ended before completion. The connection may have been interrupted; please retry the request."
                                .to_string(),
                        )));
                    }
                }
            }
        }
    });

    Box::pin(events)
}

impl V0Client {
    /// Opens a streaming generation. Fails immediately when the request is
    /// invalid, the status is not a success, or the response has no body.
    pub async fn stream_generate(&self, req: &GenerationRequest) -> Result<ChunkStream, V0Error> {
        let response = self.open_stream(req).await?;
        Ok(decode_response(response))
    }

    /// Consumes a streaming generation and returns the concatenated text.
    pub async fn collect_stream(&self, req: &GenerationRequest) -> Result<String, V0Error> {
        let mut events = self.stream_generate(req).await?;
        let mut text = String::new();
        while let Some(event) = events.next().await {
            let event = event?;
            if event.complete {
                break;
            }
            text.push_str(&event.chunk);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_line(content: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{content}\"}}}}]}}\n\n")
    }

    #[test]
    fn one_chunk_then_done_yields_two_events() {
        let mut d = StreamDecoder::new();
        let body = format!("{}data: [DONE]\n\n", chunk_line("Hi"));
        let events = d.feed(body.as_bytes());

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].chunk, "Hi");
        assert_eq!(events[0].progress, 5);
        assert!(!events[0].complete);
        assert_eq!(events[1], StreamingResponse::terminal());
        assert!(d.is_done());
    }

    #[test]
    fn undecodable_line_is_skipped() {
        let mut d = StreamDecoder::new();
        let body = format!("data: not-json\n{}", chunk_line("ok"));
        let events = d.feed(body.as_bytes());

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].chunk, "ok");
        assert_eq!(events[0].progress, 5);
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let mut d = StreamDecoder::new();
        let body = format!(": keep-alive\nevent: message\n{}", chunk_line("x"));
        assert_eq!(d.feed(body.as_bytes()).len(), 1);
    }

    #[test]
    fn line_split_across_reads_is_held_back() {
        let mut d = StreamDecoder::new();
        let line = chunk_line("split");
        let (a, b) = line.split_at(17);

        assert!(d.feed(a.as_bytes()).is_empty());
        let events = d.feed(b.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].chunk, "split");
    }

    #[test]
    fn multibyte_character_split_across_reads() {
        let mut d = StreamDecoder::new();
        let line = chunk_line("héllo ✓");
        let bytes = line.as_bytes();
        // Cut inside the three-byte check mark
        let cut = line.find('✓').unwrap() + 1;

        assert!(d.feed(&bytes[..cut]).is_empty());
        let events = d.feed(&bytes[cut..]);
        assert_eq!(events[0].chunk, "héllo ✓");
    }

    #[test]
    fn progress_caps_at_95_before_done() {
        let mut d = StreamDecoder::new();
        let body: String = (0..30).map(|_| chunk_line("a")).collect();
        let events = d.feed(body.as_bytes());

        assert_eq!(events.len(), 30);
        assert!(events.windows(2).all(|w| w[0].progress <= w[1].progress));
        assert_eq!(events.last().unwrap().progress, 95);
        assert!(events.iter().all(|e| !e.complete));
    }

    #[test]
    fn missing_delta_yields_empty_chunk() {
        let mut d = StreamDecoder::new();
        let events = d.feed(b"data: {\"choices\":[{\"finish_reason\":\"stop\"}]}\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].chunk, "");
        assert_eq!(events[0].progress, 5);
    }

    #[test]
    fn input_after_done_is_ignored() {
        let mut d = StreamDecoder::new();
        d.feed(b"data: [DONE]\n");
        assert!(d.feed(chunk_line("late").as_bytes()).is_empty());
        assert!(d.finish().is_empty());
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut d = StreamDecoder::new();
        assert!(d.feed(b"data: [DONE]").is_empty());
        let events = d.finish();
        assert_eq!(events, vec![StreamingResponse::terminal()]);
    }

    #[test]
    fn data_prefix_without_space_and_crlf() {
        let mut d = StreamDecoder::new();
        let events = d.feed(b"data:{\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\r\n");
        assert_eq!(events[0].chunk, "x");
    }
}
