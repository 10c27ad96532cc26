/**
 * Fallback Responder
 *
 * Used when the AI service cannot be reached or answers with an error
 * status. The streaming variant emits the simulated reply one character per
 * server-sent-event frame:
 *
 * ```text
 * data: {"content":"I"}
 *
 * data: {"content":" "}
 *
 * ...
 * data: [DONE]
 * ```
 *
 * With natural pacing each frame is delayed like typing: spaces are quick,
 * sentence punctuation pauses, commas pause briefly.
 */
use std::convert::Infallible;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{self, Stream};
use rand::Rng;

use crate::shared::FallbackPacing;

/// Frame terminating a simulated stream
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Reply streamed by `POST /api/ai/stream` when the service is down
pub fn simulated_stream_text(message: &str) -> String {
    format!(
        "I received your message: \"{}\". This is a simulated streaming response from the server. \
         FastAPI is currently unavailable, so I'm using the fallback response system.",
        message
    )
}

/// Reply returned by `POST /api/ai/chat` when the service is down
pub fn simulated_reply_text(message: &str) -> String {
    format!(
        "I received your message: \"{}\". This is a simulated response. \
         FastAPI is currently unavailable, so I'm using the fallback response system.",
        message
    )
}

/// Delay before emitting `c`, or `None` for instant pacing
pub fn char_delay(c: char, pacing: FallbackPacing) -> Option<Duration> {
    let millis = match pacing {
        FallbackPacing::Instant => return None,
        FallbackPacing::Natural => match c {
            ' ' => 2,
            '.' | '!' | '?' => 15,
            ',' => 8,
            _ => rand::thread_rng().gen_range(3..7),
        },
    };
    Some(Duration::from_millis(millis))
}

/// SSE frame carrying one character
pub fn content_frame(c: char) -> String {
    let payload = serde_json::json!({ "content": c.to_string() });
    format!("data: {}\n\n", payload)
}

/// Stream `text` as character frames followed by `DONE_FRAME`
pub fn simulated_stream(
    text: String,
    pacing: FallbackPacing,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let chars: Vec<char> = text.chars().collect();

    stream::unfold(Some(chars.into_iter()), move |state| async move {
        let mut chars = state?;
        match chars.next() {
            Some(c) => {
                if let Some(delay) = char_delay(c, pacing) {
                    tokio::time::sleep(delay).await;
                }
                Some((Ok(Bytes::from(content_frame(c))), Some(chars)))
            }
            None => Some((Ok(Bytes::from_static(DONE_FRAME.as_bytes())), None)),
        }
    })
}
