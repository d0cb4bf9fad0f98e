use crate::openai::{ChatCompletionRequest, ChatMessage, ContentPart, ImageUrl};
use crate::prompts::PromptSet;

/// Base instruction, plus the user's context when the toggle is on and the context is non-blank.
pub fn compose_prompt(prompts: &PromptSet, ask_details: bool, details: &str) -> String {
    let mut prompt = prompts.describe.clone();
    let details = details.trim();

    if ask_details && !details.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(&prompts.context_header);
        prompt.push('\n');
        prompt.push_str(details);
    }

    prompt
}

/// Single-turn request: text part first, image second.
pub fn build_request(
    model: &str,
    max_tokens: u32,
    prompt: String,
    image_uri: String,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user(vec![
            ContentPart::Text { text: prompt },
            ContentPart::ImageUrl {
                image_url: ImageUrl { url: image_uri },
            },
        ])],
        max_tokens,
        stream: true,
    }
}
