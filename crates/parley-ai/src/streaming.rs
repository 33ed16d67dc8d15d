//! Server-Sent Events (SSE) streaming parser.
//!
//! Streaming completions arrive as SSE frames. This module turns any
//! buffered byte source (a reqwest body, or an in-memory reader in tests)
//! into a lazy, one-pass stream of events.

use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio_util::io::StreamReader;

use crate::AiError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The event type, when the server names one.
    pub event: Option<String>,
    /// The event data; multi-line data is joined with `\n`.
    pub data: String,
}

/// Parse the body of a streaming reqwest response into SSE events.
pub fn response_events(
    response: reqwest::Response,
) -> impl Stream<Item = Result<SseEvent, AiError>> + Send + 'static {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    sse_events(tokio::io::BufReader::new(StreamReader::new(byte_stream)))
}

/// Parse SSE events from a buffered reader.
///
/// Events are separated by blank lines. `id:`, `retry:` and comment lines
/// are ignored. A trailing event without a terminating blank line is
/// still emitted.
pub fn sse_events<R>(reader: R) -> impl Stream<Item = Result<SseEvent, AiError>> + Send
where
    R: AsyncBufRead + Unpin + Send,
{
    futures_util::stream::try_unfold(reader.lines(), next_event::<R>)
}

async fn next_event<R>(mut lines: Lines<R>) -> Result<Option<(SseEvent, Lines<R>)>, AiError>
where
    R: AsyncBufRead + Unpin,
{
    let mut current_event: Option<String> = None;
    let mut current_data = String::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| AiError::upstream(format!("stream read failed: {e}")))?
    {
        if line.is_empty() {
            // Blank line = end of event
            if !current_data.is_empty() {
                let event = SseEvent {
                    event: current_event,
                    data: current_data,
                };
                return Ok(Some((event, lines)));
            }
            current_event = None;
            continue;
        }

        if let Some(event_type) = line.strip_prefix("event:") {
            current_event = Some(event_type.trim_start().to_string());
        } else if let Some(data) = line.strip_prefix("data:") {
            let data = data.strip_prefix(' ').unwrap_or(data);
            if !current_data.is_empty() {
                current_data.push('\n');
            }
            current_data.push_str(data);
        }
    }

    if current_data.is_empty() {
        return Ok(None);
    }
    Ok(Some((
        SseEvent {
            event: current_event,
            data: current_data,
        },
        lines,
    )))
}
