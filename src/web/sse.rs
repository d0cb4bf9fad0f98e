use std::convert::Infallible;

use axum::response::sse::Event;
use futures_util::stream::{self, Stream};
use serde_json::json;
use tokio::sync::mpsc;

use super::error::error_payload;
use crate::error::AppError;
use crate::pipeline::RenderSink;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Render(String),
    Final(String),
    Error(serde_json::Value),
}

impl StreamUpdate {
    pub fn into_event(self) -> Event {
        match self {
            StreamUpdate::Render(text) => Event::default()
                .event("render")
                .data(json!({ "text": text }).to_string()),
            StreamUpdate::Final(text) => Event::default()
                .event("final")
                .data(json!({ "text": text }).to_string()),
            StreamUpdate::Error(payload) => Event::default().event("error").data(payload.to_string()),
        }
    }
}

/// Forwards renderings to the SSE response. The channel is unbounded so no frame is dropped.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamUpdate>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<StreamUpdate>) -> Self {
        Self { tx }
    }

    pub fn fail(&mut self, err: &AppError) {
        // A closed receiver means the client went away; nothing left to tell it.
        let _ = self.tx.send(StreamUpdate::Error(error_payload(err)));
    }
}

impl RenderSink for ChannelSink {
    fn interim(&mut self, rendered: &str) {
        let _ = self.tx.send(StreamUpdate::Render(rendered.to_string()));
    }

    fn finalize(&mut self, text: &str) {
        let _ = self.tx.send(StreamUpdate::Final(text.to_string()));
    }
}

/// Drain the channel as SSE events until every sender is dropped.
pub fn event_stream(
    rx: mpsc::UnboundedReceiver<StreamUpdate>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|update| (Ok::<_, Infallible>(update.into_event()), rx))
    })
}
