// src/services/gemini_service.rs
use crate::errors::PotretError;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// What the remote model handed back, decoded once at the boundary.
#[derive(Debug, Clone)]
pub enum ModelOutput {
    /// Image bytes plus their mime type.
    Image { mime_type: String, data: Vec<u8> },
    /// No image, but a non-empty textual explanation or refusal.
    Refusal(String),
    /// No image and no usable text.
    Empty,
}

/// The remote generative-image capability: one image plus one instruction in,
/// one image or refusal text out. Mocked in orchestrator tests.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(
        &self,
        image: &InlineImage,
        instruction: &str,
        aspect_ratio: Option<&str>,
    ) -> Result<ModelOutput, PotretError>;
}

pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiService {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiService {
    async fn generate(
        &self,
        image: &InlineImage,
        instruction: &str,
        aspect_ratio: Option<&str>,
    ) -> Result<ModelOutput, PotretError> {
        let payload = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: general_purpose::STANDARD.encode(&image.data),
                        },
                    },
                    RequestPart::Text {
                        text: instruction.to_string(),
                    },
                ],
            }],
            generation_config: GenerationSettings {
                response_modalities: vec!["IMAGE", "TEXT"],
                image_config: aspect_ratio.map(|tag| ImageConfig {
                    aspect_ratio: tag.to_string(),
                }),
            },
        };

        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        debug!("Calling Gemini model {} ({} byte image)", self.model, image.data.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PotretError::Model(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PotretError::Model(format!(
                "Gemini error ({}): {}",
                status, body
            )));
        }

        let decoded: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PotretError::Model(format!("Failed to parse Gemini response: {}", e)))?;

        interpret_response(decoded)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationSettings,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    response_modalities: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponsePart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: ResponseInlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    mime_type: String,
    data: String,
}

fn interpret_response(response: GenerateContentResponse) -> Result<ModelOutput, PotretError> {
    let mut texts = Vec::new();

    for candidate in response.candidates.unwrap_or_default() {
        let parts = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default();
        for part in parts {
            match part {
                ResponsePart::InlineData { inline_data } => {
                    if inline_data.mime_type.starts_with("image/") {
                        let data = general_purpose::STANDARD
                            .decode(inline_data.data)
                            .map_err(|e| {
                                PotretError::Model(format!("Invalid image payload: {}", e))
                            })?;
                        return Ok(ModelOutput::Image {
                            mime_type: inline_data.mime_type,
                            data,
                        });
                    }
                }
                ResponsePart::Text { text } => {
                    if !text.trim().is_empty() {
                        texts.push(text);
                    }
                }
            }
        }
    }

    let joined = texts.join("\n");
    if joined.trim().is_empty() {
        Ok(ModelOutput::Empty)
    } else {
        Ok(ModelOutput::Refusal(joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_from(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn image_part_wins_over_text() {
        let response = response_from(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your image" },
                        { "inlineData": { "mimeType": "image/png", "data": general_purpose::STANDARD.encode(b"pixels") } }
                    ]
                }
            }]
        }));
        match interpret_response(response).unwrap() {
            ModelOutput::Image { mime_type, data } => {
                assert_eq!(mime_type, "image/png");
                assert_eq!(data, b"pixels");
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn text_only_response_is_a_refusal() {
        let response = response_from(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I cannot process this request." }] }
            }]
        }));
        match interpret_response(response).unwrap() {
            ModelOutput::Refusal(text) => assert_eq!(text, "I cannot process this request."),
            other => panic!("expected refusal, got {:?}", other),
        }
    }

    #[test]
    fn missing_candidates_or_blank_text_is_empty() {
        let response = response_from(json!({}));
        assert!(matches!(interpret_response(response).unwrap(), ModelOutput::Empty));

        let response = response_from(json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        }));
        assert!(matches!(interpret_response(response).unwrap(), ModelOutput::Empty));
    }

    #[test]
    fn non_image_inline_data_is_ignored() {
        let response = response_from(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "inlineData": { "mimeType": "audio/wav", "data": "AAAA" } }
                    ]
                }
            }]
        }));
        assert!(matches!(interpret_response(response).unwrap(), ModelOutput::Empty));
    }

    #[test]
    fn request_payload_uses_camel_case_wire_names() {
        let payload = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart::Text { text: "hi".into() }],
            }],
            generation_config: GenerationSettings {
                response_modalities: vec!["IMAGE", "TEXT"],
                image_config: Some(ImageConfig {
                    aspect_ratio: "1:1".into(),
                }),
            },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["generationConfig"]["imageConfig"]["aspectRatio"], "1:1");
        assert_eq!(value["generationConfig"]["responseModalities"][0], "IMAGE");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
    }
}
