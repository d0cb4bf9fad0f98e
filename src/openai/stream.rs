use std::future;

use eventsource_stream::Eventsource;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::Response;

use super::types::ChatCompletionChunk;
use super::ApiFailure;

pub type FragmentStream = BoxStream<'static, Result<String, ApiFailure>>;

const DONE_MARKER: &str = "[DONE]";

#[derive(Debug)]
enum ChunkEvent {
    Delta(Option<String>),
    Done,
    Failed(ApiFailure),
}

fn parse_event(data: &str) -> ChunkEvent {
    if data.trim() == DONE_MARKER {
        return ChunkEvent::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => match chunk.error {
            Some(body) => ChunkEvent::Failed(ApiFailure::transport(body.describe())),
            None => ChunkEvent::Delta(chunk.into_delta()),
        },
        Err(err) => ChunkEvent::Failed(ApiFailure::transport(format!(
            "malformed stream chunk: {err}"
        ))),
    }
}

/// Turn a `text/event-stream` response into its text fragments.
///
/// The stream ends at the `[DONE]` marker or when the body is exhausted. A transport or
/// decoding failure is yielded as an `Err` item; consumers stop at the first one.
pub fn fragments(resp: Response) -> FragmentStream {
    resp.bytes_stream()
        .eventsource()
        .map(|event| match event {
            Ok(event) => parse_event(&event.data),
            Err(err) => ChunkEvent::Failed(ApiFailure::transport(format!(
                "stream transport error: {err}"
            ))),
        })
        .take_while(|event| future::ready(!matches!(event, ChunkEvent::Done)))
        .filter_map(|event| {
            future::ready(match event {
                ChunkEvent::Delta(Some(text)) => Some(Ok(text)),
                ChunkEvent::Failed(failure) => Some(Err(failure)),
                ChunkEvent::Delta(None) | ChunkEvent::Done => None,
            })
        })
        .boxed()
}
