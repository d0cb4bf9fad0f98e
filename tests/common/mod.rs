#![allow(dead_code)]

use std::time::Duration;

use serde_json::json;
use vision_describe::openai::OpenAiClient;
use vision_describe::pipeline::{AnalysisPipeline, PipelineSettings, RenderSink};

pub const KEY: &str = "sk-proj-ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn client(base_url: &str) -> OpenAiClient {
    OpenAiClient::new(base_url, Duration::from_secs(5)).expect("client")
}

pub fn pipeline(base_url: &str) -> AnalysisPipeline {
    AnalysisPipeline::new(
        client(base_url),
        PipelineSettings {
            model: "gpt-4o".into(),
            max_tokens: 1200,
            language: "es".into(),
        },
    )
}

/// Server-sent events body as the completion endpoint emits it.
pub fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "data: {}\n\n",
        json!({ "choices": [{ "index": 0, "delta": { "role": "assistant" } }] })
    ));
    for fragment in fragments {
        body.push_str(&format!(
            "data: {}\n\n",
            json!({ "choices": [{ "index": 0, "delta": { "content": fragment } }] })
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub interim: Vec<String>,
    pub finals: Vec<String>,
}

impl RenderSink for RecordingSink {
    fn interim(&mut self, rendered: &str) {
        self.interim.push(rendered.to_string());
    }

    fn finalize(&mut self, text: &str) {
        self.finals.push(text.to_string());
    }
}
