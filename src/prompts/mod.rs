use once_cell::sync::Lazy;
use serde::Deserialize;

// NOTE:
// The base instruction names the response language explicitly;
// the model answers in whatever language the instruction asks for.

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Deserialize)]
pub struct PromptSet {
    /// Fixed instruction sent with every image.
    pub describe: String,
    /// Line introducing the user's optional context.
    pub context_header: String,
}

macro_rules! prompt_file {
    ($lang:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/lang/",
            $lang,
            "/prompts.json"
        ))
    };
}

static EN_PROMPTS: Lazy<PromptSet> = Lazy::new(|| load_prompt_set(prompt_file!("en")));
static ES_PROMPTS: Lazy<PromptSet> = Lazy::new(|| load_prompt_set(prompt_file!("es")));

fn load_prompt_set(raw: &str) -> PromptSet {
    serde_json::from_str(raw).expect("invalid prompt config")
}

/// Prompt set for a language tag such as `es`, `es-MX` or `en_US`; unknown tags get English.
pub fn prompts_for(language: Option<&str>) -> &'static PromptSet {
    let normalized = language
        .and_then(|lang| lang.split(|c| c == '-' || c == '_').next())
        .map(|lang| lang.trim().to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    match normalized.as_str() {
        "es" => &ES_PROMPTS,
        _ => &EN_PROMPTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_suffix_is_ignored() {
        assert_eq!(
            prompts_for(Some("es-MX")).describe,
            prompts_for(Some("es")).describe
        );
        assert!(prompts_for(Some("ES_es")).describe.contains("español"));
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(
            prompts_for(Some("klingon")).describe,
            prompts_for(None).describe
        );
        assert!(prompts_for(None).describe.contains("English"));
    }

    #[test]
    fn embedded_sets_are_complete() {
        for lang in ["en", "es"] {
            let set = prompts_for(Some(lang));
            assert!(!set.describe.trim().is_empty());
            assert!(!set.context_header.trim().is_empty());
        }
    }
}
