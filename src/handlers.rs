// src/handlers.rs
use crate::{AppState, errors::PotretError, models::*};
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Releases the round's in-flight flag when the handler returns, on success
/// and error paths alike.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>, operation: &str) -> Result<Self, PotretError> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Ok(Self { flag: flag.clone() })
        } else {
            Err(PotretError::Busy(operation.to_string()))
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub async fn upload_images(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, PotretError> {
    let session_id = Uuid::new_v4();
    let mut uploaded_images = Vec::new();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| PotretError::Validation(format!("Invalid multipart payload: {}", e)))?
    {
        let content_disposition = field.content_disposition();
        let filename = content_disposition
            .get_filename()
            .ok_or_else(|| PotretError::Validation("No filename provided".to_string()))?
            .to_string();

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut image_data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| PotretError::Validation(format!("Upload read failed: {}", e)))?
        {
            image_data.extend_from_slice(&chunk);
        }

        data.image_processor.validate_image(&image_data)?;

        let image_upload = ImageUpload {
            id: Uuid::new_v4(),
            session_id,
            filename,
            content_type,
            size: image_data.len(),
            data: image_data,
            uploaded_at: chrono::Utc::now(),
        };

        data.redis_service.store_image(&image_upload).await?;

        uploaded_images.push(image_upload.id);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "sessionId": session_id,
        "uploadedImages": uploaded_images,
        "count": uploaded_images.len()
    })))
}

pub async fn generate(
    body: web::Json<GenerateRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, PotretError> {
    let _guard = InFlightGuard::acquire(&data.generating, "A generation round is in progress")?;
    let request = body.into_inner();

    let main_image = data.redis_service.get_image(&request.main_image_id).await?;

    let logo = match &request.logo_image_id {
        Some(id) => Some(data.redis_service.get_image(id).await?),
        None => None,
    };

    let outcome = data
        .generation
        .generate_round(
            &main_image.data,
            logo.as_ref().map(|l| l.data.as_slice()),
            &request.config,
        )
        .await?;

    Ok(HttpResponse::Ok().json(GenerateResponse {
        results: outcome.results,
        history: outcome.history,
    }))
}

pub async fn upscale(
    body: web::Json<UpscaleRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, PotretError> {
    let _guard = InFlightGuard::acquire(&data.upscaling, "An upscale batch is in progress")?;
    let request = body.into_inner();

    let logo = match &request.logo_image_id {
        Some(id) => Some(data.redis_service.get_image(id).await?),
        None => None,
    };

    let (results, had_failure) = data
        .upscaler
        .upscale_all(request.results, logo.as_ref().map(|l| l.data.as_slice()))
        .await;

    Ok(HttpResponse::Ok().json(UpscaleResponse {
        results,
        had_failure,
    }))
}

pub async fn list_history(data: web::Data<AppState>) -> Result<HttpResponse, PotretError> {
    let items = data.history.list().await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn delete_history_item(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, PotretError> {
    data.history.delete(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn clear_history(data: web::Data<AppState>) -> Result<HttpResponse, PotretError> {
    data.history.clear().await?;
    Ok(HttpResponse::NoContent().finish())
}
