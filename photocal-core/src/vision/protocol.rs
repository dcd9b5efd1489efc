//! Wire types for OpenAI-compatible chat completions with image input.

use serde::{Deserialize, Serialize};

/// Instruction sent alongside every photo.
pub const EXTRACTION_PROMPT: &str = r#"Analyze this image and extract event details. Look for any text, signs, screens, or visual clues that indicate:
1. Event title/name
2. Date (try to find actual dates, not just infer from the photo)
3. Time
4. Location/venue/context

Return the information as JSON in this exact format:
{
  "title": "Event name or descriptive title",
  "date": "YYYY-MM-DD format",
  "time": "HH:MM format (24-hour)",
  "context": "Location, venue, or brief description of what/where"
}

If you cannot find specific details, make reasonable inferences based on what you see in the image. For dates, if no specific date is visible, estimate based on context clues or use today's date. For times, estimate based on lighting/context."#;

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ChatRequest {
    /// One user message: the extraction prompt plus the photo at high detail.
    pub fn extraction(
        model: &str,
        image_data_url: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        ChatRequest {
            model: model.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_url,
                            detail: Some("high".to_string()),
                        },
                    },
                ],
            }],
            max_tokens,
            temperature,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Convenience for building a reply with a single text choice.
    pub fn with_content(content: impl Into<String>) -> Self {
        ChatResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some(content.into()),
                },
            }],
        }
    }

    /// Text of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|c| !c.trim().is_empty())
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: Option<String>,
}
