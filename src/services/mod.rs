// src/services/mod.rs
pub mod gemini_service;
pub mod image_processor;
pub mod orchestrator;
pub mod prompt_builder;
pub mod redis_service;
pub mod watermark;

pub use gemini_service::GeminiService;
pub use image_processor::ImageProcessor;
pub use orchestrator::{GenerationOrchestrator, UpscaleOrchestrator};
pub use prompt_builder::PromptBuilder;
pub use redis_service::RedisService;
