// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use log::info;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

mod catalog;
mod errors;
mod handlers;
mod models;
mod services;

use crate::catalog::CatalogIndex;
use crate::handlers::{
    clear_history, delete_history_item, generate, list_history, upload_images, upscale,
};
use crate::services::gemini_service::{self, GenerativeModel};
use crate::services::redis_service::HistoryStore;
use crate::services::{
    GeminiService, GenerationOrchestrator, ImageProcessor, PromptBuilder, RedisService,
    UpscaleOrchestrator,
};

#[derive(Clone)]
pub struct AppState {
    redis_service: Arc<RedisService>,
    history: Arc<dyn HistoryStore>,
    image_processor: Arc<ImageProcessor>,
    generation: Arc<GenerationOrchestrator>,
    upscaler: Arc<UpscaleOrchestrator>,
    generating: Arc<AtomicBool>,
    upscaling: Arc<AtomicBool>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Potret service...");

    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");
    let model_name = std::env::var("GEMINI_MODEL")
        .unwrap_or_else(|_| gemini_service::DEFAULT_MODEL.to_string());

    let redis_service = Arc::new(RedisService::new(&redis_url).await.unwrap());
    let history: Arc<dyn HistoryStore> = redis_service.clone();
    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiService::new(api_key, model_name));
    let image_processor = Arc::new(ImageProcessor::new());
    let prompt_builder = Arc::new(PromptBuilder::new(CatalogIndex::new()));

    let generation = Arc::new(GenerationOrchestrator::new(
        model.clone(),
        history.clone(),
        image_processor.clone(),
        prompt_builder,
    ));
    let upscaler = Arc::new(UpscaleOrchestrator::new(model));

    let app_state = AppState {
        redis_service,
        history,
        image_processor,
        generation,
        upscaler,
        generating: Arc::new(AtomicBool::new(false)),
        upscaling: Arc::new(AtomicBool::new(false)),
    };

    info!("Starting HTTP server on 0.0.0.0:8080");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api/v1")
                    .route("/upload", web::post().to(upload_images))
                    .route("/generate", web::post().to(generate))
                    .route("/upscale", web::post().to(upscale))
                    .route("/history", web::get().to(list_history))
                    .route("/history/{id}", web::delete().to(delete_history_item))
                    .route("/history", web::delete().to(clear_history)),
            )
            .route("/health", web::get().to(health_check))
            .service(actix_files::Files::new("/", "./static").index_file("index.html"))
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "potret",
        "version": "0.1.0"
    }))
}
