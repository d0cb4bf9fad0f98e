use axum::extract::Multipart;

use super::error::WebError;
use crate::credentials::ManualEntry;
use crate::pipeline::{AnalysisInput, UploadedImage};

#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub manual: ManualEntry,
    pub input: AnalysisInput,
}

impl AnalyzeForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, WebError> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| WebError::BadRequest(format!("Invalid multipart payload: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                if form.input.image.is_some() {
                    return Err(WebError::BadRequest(
                        "Only one image per request is supported".to_string(),
                    ));
                }

                let filename = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|m| m.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WebError::BadRequest(format!("Failed to read image: {e}")))?;

                if !bytes.is_empty() {
                    form.input.image =
                        Some(UploadedImage::new(bytes.to_vec(), filename, content_type));
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| WebError::BadRequest(format!("Failed to read field `{name}`: {e}")))?;

            match name.as_str() {
                "api_key" => form.manual.api_key = value,
                "organization" => form.manual.organization = non_blank(value),
                "project" => form.manual.project = non_blank(value),
                "ask_details" => form.input.ask_details = parse_toggle(&value),
                "details" => form.input.details = value,
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Checkbox and toggle values as browsers and scripts send them.
pub fn parse_toggle(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_values() {
        for on in ["true", "on", "1", " YES "] {
            assert!(parse_toggle(on), "{on}");
        }
        for off in ["", "false", "off", "0", "nope"] {
            assert!(!parse_toggle(off), "{off}");
        }
    }

    #[test]
    fn blank_identifiers_are_dropped() {
        assert_eq!(non_blank("  ".into()), None);
        assert_eq!(non_blank("org-1".into()).as_deref(), Some("org-1"));
    }
}
