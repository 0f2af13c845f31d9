// src/models.rs
use crate::errors::PotretError;
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SLOT_COUNT: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub id: Uuid,
    pub session_id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub data: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoType {
    #[serde(rename = "keluarga")]
    Keluarga,
    #[serde(rename = "personal")]
    Personal,
    #[serde(rename = "profesional")]
    Profesional,
    #[serde(rename = "anak-anak")]
    AnakAnak,
}

impl PhotoType {
    pub fn id(&self) -> &'static str {
        match self {
            PhotoType::Keluarga => "keluarga",
            PhotoType::Personal => "personal",
            PhotoType::Profesional => "profesional",
            PhotoType::AnakAnak => "anak-anak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "perempuan")]
    Perempuan,
    #[serde(rename = "laki-laki")]
    LakiLaki,
    #[serde(rename = "campuran")]
    Campuran,
}

impl Gender {
    pub fn id(&self) -> &'static str {
        match self {
            Gender::Perempuan => "perempuan",
            Gender::LakiLaki => "laki-laki",
            Gender::Campuran => "campuran",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    Square,
    Portrait,
    Landscape,
    Story,
}

impl AspectRatio {
    /// Numeric width/height ratio the main image is cropped to.
    pub fn ratio(&self) -> f64 {
        match self {
            AspectRatio::Square => 1.0,
            AspectRatio::Portrait => 3.0 / 4.0,
            AspectRatio::Landscape => 16.0 / 9.0,
            AspectRatio::Story => 9.0 / 16.0,
        }
    }

    /// Aspect-ratio tag understood by the Gemini image config.
    pub fn api_tag(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Story => "9:16",
        }
    }

    /// Human-readable ratio-and-resolution phrase used in the prompt.
    pub fn description(&self) -> &'static str {
        match self {
            AspectRatio::Square => "persegi (1:1 - 1080x1080 piksel)",
            AspectRatio::Portrait => "potret (3:4 - 1080x1440 piksel)",
            AspectRatio::Landscape => "lanskap (16:9 - 1920x1080 piksel)",
            AspectRatio::Story => "vertikal/story (9:16 - 1080x1920 piksel)",
        }
    }
}

/// The styling configuration the user assembles in the browser. Field names
/// match the front end's JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub photo_type: PhotoType,
    pub pose_style: String,
    #[serde(default)]
    pub custom_pose_style: Option<String>,
    pub background_style: String,
    #[serde(default)]
    pub custom_background_style: Option<String>,
    #[serde(default)]
    pub extra_instructions: String,
    #[serde(default)]
    pub age_category: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub clothing_material: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Empty,
    Generating,
    Completed,
    Error,
    Upscaling,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub image_url: String,
    pub prompt: String,
}

/// One of the six parallel result positions in a generation round.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub id: usize,
    pub status: SlotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<GeneratedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upscaled_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ResultItem {
    pub fn empty(id: usize) -> Self {
        Self {
            id,
            status: SlotStatus::Empty,
            data: None,
            upscaled_image_url: None,
            error_message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: i64,
    pub config: GenerationConfig,
    pub prompt: String,
}

impl HistoryItem {
    pub fn new(config: GenerationConfig, prompt: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            config,
            prompt,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub main_image_id: Uuid,
    #[serde(default)]
    pub logo_image_id: Option<Uuid>,
    pub config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub results: Vec<ResultItem>,
    pub history: HistoryItem,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleRequest {
    pub results: Vec<ResultItem>,
    #[serde(default)]
    pub logo_image_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleResponse {
    pub results: Vec<ResultItem>,
    pub had_failure: bool,
}

/// Encodes image bytes as a `data:<mime>;base64,<payload>` URI, the uniform
/// format for recomposed inputs, generated outputs, and upscaled outputs.
pub fn to_data_uri(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(data))
}

pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>), PotretError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| PotretError::Validation("Not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PotretError::Validation("Malformed data URI".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| PotretError::Validation("Data URI is not base64-encoded".to_string()))?;
    let data = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| PotretError::Validation(format!("Invalid base64 payload: {}", e)))?;
    Ok((mime.to_string(), data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_round_trip() {
        let uri = to_data_uri("image/jpeg", b"hello");
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        let (mime, data) = parse_data_uri(&uri).unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(data, b"hello");
    }

    #[test]
    fn parse_data_uri_rejects_plain_text() {
        assert!(parse_data_uri("not a uri").is_err());
        assert!(parse_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn config_deserializes_front_end_shape() {
        let raw = serde_json::json!({
            "photoType": "anak-anak",
            "poseStyle": "random",
            "backgroundStyle": "studio-single-color",
            "extraInstructions": "",
            "ageCategory": "balita",
            "gender": "campuran",
            "ethnicity": "auto",
            "aspectRatio": "story"
        });
        let config: GenerationConfig = serde_json::from_value(raw).unwrap();
        assert_eq!(config.photo_type, PhotoType::AnakAnak);
        assert_eq!(config.aspect_ratio, AspectRatio::Story);
        assert_eq!(config.aspect_ratio.api_tag(), "9:16");
        assert!(config.custom_pose_style.is_none());
    }
}
