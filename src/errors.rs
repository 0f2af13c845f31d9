// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PotretError {
    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Model service error: {0}")]
    Model(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation already in progress: {0}")]
    Busy(String),
}

impl ResponseError for PotretError {
    fn error_response(&self) -> HttpResponse {
        match self {
            PotretError::Redis(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Storage error",
                "message": self.to_string()
            })),
            PotretError::Model(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": "AI service error",
                "message": self.to_string()
            })),
            PotretError::ImageProcessing(_) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Image processing error",
                    "message": self.to_string()
                }))
            }
            PotretError::Serialization(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Data processing error",
                    "message": self.to_string()
                }))
            }
            PotretError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Validation error",
                "message": self.to_string()
            })),
            PotretError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "Not found",
                "message": self.to_string()
            })),
            PotretError::Busy(_) => HttpResponse::Conflict().json(serde_json::json!({
                "error": "Busy",
                "message": self.to_string()
            })),
        }
    }
}
