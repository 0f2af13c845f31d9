// src/services/orchestrator.rs
use crate::errors::PotretError;
use crate::models::{
    GeneratedImage, GenerationConfig, HistoryItem, ResultItem, SLOT_COUNT, SlotStatus, to_data_uri,
};
use crate::services::gemini_service::{GenerativeModel, InlineImage, ModelOutput};
use crate::services::image_processor::{ImageProcessor, RECOMPOSED_MIME};
use crate::services::prompt_builder::PromptBuilder;
use crate::services::redis_service::HistoryStore;
use crate::services::watermark::apply_watermark;
use futures_util::future::join_all;
use log::{error, warn};
use std::sync::Arc;

/// Shown on a slot when the transport itself failed; detail goes to the log.
pub const SLOT_FAILURE_MESSAGE: &str = "Gagal membuat gambar.";
/// Shown when the model returned no image and no substantive explanation.
pub const GENERIC_REFUSAL_MESSAGE: &str = "Gagal menghasilkan gambar. Model AI tidak dapat memproses permintaan ini. Coba sesuaikan konfigurasi gaya, kurangi instruksi tambahan, atau gunakan foto utama yang berbeda.";

const UPSCALE_INSTRUCTION: &str = "Tingkatkan resolusi gambar ini menjadi 2K. Pertajam detail, tingkatkan kualitas dan pencahayaan secara keseluruhan, namun JANGAN mengubah subjek, komposisi, atau elemen asli apa pun di dalam gambar. Hasil harus terlihat seperti versi resolusi tinggi dari gambar asli.";

#[derive(Debug)]
pub struct RoundOutcome {
    pub results: Vec<ResultItem>,
    pub history: HistoryItem,
}

pub struct GenerationOrchestrator {
    model: Arc<dyn GenerativeModel>,
    history: Arc<dyn HistoryStore>,
    image_processor: Arc<ImageProcessor>,
    prompt_builder: Arc<PromptBuilder>,
}

impl GenerationOrchestrator {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        history: Arc<dyn HistoryStore>,
        image_processor: Arc<ImageProcessor>,
        prompt_builder: Arc<PromptBuilder>,
    ) -> Self {
        Self {
            model,
            history,
            image_processor,
            prompt_builder,
        }
    }

    /// Runs one generation round: recompose the main image, build the
    /// instruction, record history, then six concurrent model calls with
    /// per-slot failure isolation. Slot i always receives response i.
    pub async fn generate_round(
        &self,
        main_image: &[u8],
        logo: Option<&[u8]>,
        config: &GenerationConfig,
    ) -> Result<RoundOutcome, PotretError> {
        let prompt = self.prompt_builder.build(config);

        // Recorded before the fan-out so a failed round still shows up.
        let history = HistoryItem::new(config.clone(), prompt.clone());
        self.history.record(history.clone()).await?;

        let recomposed = self.image_processor.recompose(main_image, config.aspect_ratio)?;
        let inline = InlineImage {
            mime_type: RECOMPOSED_MIME.to_string(),
            data: recomposed,
        };
        let aspect_tag = config.aspect_ratio.api_tag();

        let calls = (0..SLOT_COUNT).map(|_| self.model.generate(&inline, &prompt, Some(aspect_tag)));
        let settled = join_all(calls).await;

        let results = settled
            .into_iter()
            .enumerate()
            .map(|(id, outcome)| self.settle_slot(id, outcome, &prompt, logo))
            .collect();

        Ok(RoundOutcome { results, history })
    }

    fn settle_slot(
        &self,
        id: usize,
        outcome: Result<ModelOutput, PotretError>,
        prompt: &str,
        logo: Option<&[u8]>,
    ) -> ResultItem {
        let mut slot = ResultItem::empty(id);
        match outcome {
            Ok(ModelOutput::Image { mime_type, data }) => {
                let (mime_type, data) = composite_logo(id, mime_type, data, logo);
                slot.status = SlotStatus::Completed;
                slot.data = Some(GeneratedImage {
                    image_url: to_data_uri(&mime_type, &data),
                    prompt: prompt.to_string(),
                });
            }
            Ok(ModelOutput::Refusal(text)) => {
                slot.status = SlotStatus::Error;
                slot.error_message = Some(classify_refusal(&text));
            }
            Ok(ModelOutput::Empty) => {
                slot.status = SlotStatus::Error;
                slot.error_message = Some(GENERIC_REFUSAL_MESSAGE.to_string());
            }
            Err(e) => {
                error!("Slot {} transport failure: {}", id, e);
                slot.status = SlotStatus::Error;
                slot.error_message = Some(SLOT_FAILURE_MESSAGE.to_string());
            }
        }
        slot
    }
}

pub struct UpscaleOrchestrator {
    model: Arc<dyn GenerativeModel>,
}

impl UpscaleOrchestrator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Upscales every completed slot that has not been upscaled yet.
    /// Idempotent: already-upscaled and incomplete slots are skipped, so a
    /// second invocation issues no remote calls. Returns the updated slots
    /// and whether at least one eligible slot failed.
    pub async fn upscale_all(
        &self,
        results: Vec<ResultItem>,
        logo: Option<&[u8]>,
    ) -> (Vec<ResultItem>, bool) {
        let tasks: Vec<_> = results
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                slot.status == SlotStatus::Completed
                    && slot.upscaled_image_url.is_none()
                    && slot.data.is_some()
            })
            .map(|(index, slot)| {
                let image_url = slot.data.as_ref().map(|d| d.image_url.clone()).unwrap_or_default();
                let id = slot.id;
                async move { (index, self.upscale_one(id, &image_url, logo).await) }
            })
            .collect();

        let settled = join_all(tasks).await;

        let mut results = results;
        let mut had_failure = false;
        for (index, outcome) in settled {
            match outcome {
                Ok(upscaled_url) => {
                    results[index].upscaled_image_url = Some(upscaled_url);
                }
                Err(e) => {
                    warn!("Upscale failed for slot {}: {}", results[index].id, e);
                    had_failure = true;
                }
            }
            results[index].status = SlotStatus::Completed;
        }

        (results, had_failure)
    }

    async fn upscale_one(
        &self,
        id: usize,
        image_url: &str,
        logo: Option<&[u8]>,
    ) -> Result<String, PotretError> {
        let (mime_type, data) = crate::models::parse_data_uri(image_url)?;
        let inline = InlineImage { mime_type, data };

        match self.model.generate(&inline, UPSCALE_INSTRUCTION, None).await? {
            ModelOutput::Image { mime_type, data } => {
                let (mime_type, data) = composite_logo(id, mime_type, data, logo);
                Ok(to_data_uri(&mime_type, &data))
            }
            ModelOutput::Refusal(text) => Err(PotretError::Model(format!(
                "Gagal melakukan upscale: {}",
                text
            ))),
            ModelOutput::Empty => Err(PotretError::Model(
                "Gagal melakukan upscale: model tidak mengembalikan gambar".to_string(),
            )),
        }
    }
}

/// Watermarks one generated image if a logo is configured. Compositing
/// failure is isolated to the slot: the unwatermarked image is kept.
fn composite_logo(
    id: usize,
    mime_type: String,
    data: Vec<u8>,
    logo: Option<&[u8]>,
) -> (String, Vec<u8>) {
    let Some(logo) = logo else {
        return (mime_type, data);
    };
    match apply_watermark(&data, logo) {
        Ok(watermarked) => ("image/png".to_string(), watermarked),
        Err(e) => {
            warn!("Watermark failed for slot {}: {}, keeping plain image", id, e);
            (mime_type, data)
        }
    }
}

/// Substance-free refusals (empty once stray backticks/whitespace are
/// stripped) become a generic guidance message; real explanations are
/// surfaced verbatim.
fn classify_refusal(text: &str) -> String {
    let cleaned = text.replace('`', "");
    if cleaned.trim().is_empty() {
        GENERIC_REFUSAL_MESSAGE.to_string()
    } else {
        format!("Gagal menghasilkan gambar. Pesan dari AI: \"{}\"", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogIndex;
    use crate::models::{AspectRatio, PhotoType};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockModel {
        outputs: Mutex<VecDeque<Result<ModelOutput, PotretError>>>,
        calls: AtomicUsize,
    }

    impl MockModel {
        fn new(outputs: Vec<Result<ModelOutput, PotretError>>) -> Arc<Self> {
            Arc::new(Self {
                outputs: Mutex::new(outputs.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeModel for MockModel {
        async fn generate(
            &self,
            _image: &InlineImage,
            _instruction: &str,
            _aspect_ratio: Option<&str>,
        ) -> Result<ModelOutput, PotretError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(ModelOutput::Empty))
        }
    }

    #[derive(Default)]
    struct MemoryHistory {
        items: Mutex<Vec<HistoryItem>>,
    }

    #[async_trait]
    impl HistoryStore for MemoryHistory {
        async fn record(&self, item: HistoryItem) -> Result<(), PotretError> {
            self.items.lock().unwrap().push(item);
            Ok(())
        }

        async fn list(&self) -> Result<Vec<HistoryItem>, PotretError> {
            Ok(self.items.lock().unwrap().clone())
        }

        async fn delete(&self, _id: &str) -> Result<(), PotretError> {
            Ok(())
        }

        async fn clear(&self) -> Result<(), PotretError> {
            Ok(())
        }
    }

    fn config() -> GenerationConfig {
        GenerationConfig {
            photo_type: PhotoType::Keluarga,
            pose_style: "random".to_string(),
            custom_pose_style: None,
            background_style: "sunny-park".to_string(),
            custom_background_style: None,
            extra_instructions: String::new(),
            age_category: None,
            gender: None,
            clothing_material: None,
            ethnicity: None,
            aspect_ratio: AspectRatio::Square,
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn image_output() -> Result<ModelOutput, PotretError> {
        Ok(ModelOutput::Image {
            mime_type: "image/png".to_string(),
            data: png_bytes(32, 32),
        })
    }

    fn orchestrator(
        model: Arc<MockModel>,
        history: Arc<MemoryHistory>,
    ) -> GenerationOrchestrator {
        GenerationOrchestrator::new(
            model,
            history,
            Arc::new(ImageProcessor::new()),
            Arc::new(PromptBuilder::new(CatalogIndex::new())),
        )
    }

    #[tokio::test]
    async fn six_successes_fill_six_slots_in_order() {
        let model = MockModel::new((0..6).map(|_| image_output()).collect());
        let history = Arc::new(MemoryHistory::default());
        let outcome = orchestrator(model.clone(), history.clone())
            .generate_round(&png_bytes(64, 64), None, &config())
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 6);
        for (i, slot) in outcome.results.iter().enumerate() {
            assert_eq!(slot.id, i);
            assert_eq!(slot.status, SlotStatus::Completed);
            let data = slot.data.as_ref().unwrap();
            assert!(data.image_url.starts_with("data:image/png;base64,"));
            assert_eq!(data.prompt, outcome.history.prompt);
        }
        assert_eq!(model.call_count(), 6);
        assert_eq!(history.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mixed_settlement_keeps_slot_indices_stable() {
        let model = MockModel::new(vec![
            image_output(),
            Err(PotretError::Model("connection reset".to_string())),
            image_output(),
            Err(PotretError::Model("timeout".to_string())),
            image_output(),
            Err(PotretError::Model("dns".to_string())),
        ]);
        let outcome = orchestrator(model, Arc::new(MemoryHistory::default()))
            .generate_round(&png_bytes(64, 64), None, &config())
            .await
            .unwrap();

        for i in [0, 2, 4] {
            assert_eq!(outcome.results[i].status, SlotStatus::Completed);
        }
        for i in [1, 3, 5] {
            assert_eq!(outcome.results[i].status, SlotStatus::Error);
            assert_eq!(
                outcome.results[i].error_message.as_deref(),
                Some(SLOT_FAILURE_MESSAGE)
            );
        }
    }

    #[tokio::test]
    async fn refusals_are_classified_by_substance() {
        let model = MockModel::new(vec![
            Ok(ModelOutput::Refusal("```  ```".to_string())),
            Ok(ModelOutput::Refusal("Konten tidak diizinkan.".to_string())),
            Ok(ModelOutput::Empty),
        ]);
        let outcome = orchestrator(model, Arc::new(MemoryHistory::default()))
            .generate_round(&png_bytes(64, 64), None, &config())
            .await
            .unwrap();

        assert_eq!(
            outcome.results[0].error_message.as_deref(),
            Some(GENERIC_REFUSAL_MESSAGE)
        );
        let surfaced = outcome.results[1].error_message.as_deref().unwrap();
        assert!(surfaced.contains("Konten tidak diizinkan."));
        assert_eq!(
            outcome.results[2].error_message.as_deref(),
            Some(GENERIC_REFUSAL_MESSAGE)
        );
    }

    #[tokio::test]
    async fn undecodable_main_image_aborts_round_after_history() {
        let model = MockModel::new(vec![]);
        let history = Arc::new(MemoryHistory::default());
        let err = orchestrator(model.clone(), history.clone())
            .generate_round(b"not an image", None, &config())
            .await
            .unwrap_err();

        assert!(matches!(err, PotretError::ImageProcessing(_)));
        assert_eq!(model.call_count(), 0);
        // The round is still recorded.
        assert_eq!(history.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn logo_is_composited_onto_successful_slots() {
        let model = MockModel::new((0..6).map(|_| image_output()).collect());
        let logo = png_bytes(8, 8);
        let outcome = orchestrator(model, Arc::new(MemoryHistory::default()))
            .generate_round(&png_bytes(64, 64), Some(&logo), &config())
            .await
            .unwrap();

        for slot in &outcome.results {
            let url = &slot.data.as_ref().unwrap().image_url;
            assert!(url.starts_with("data:image/png;base64,"));
        }
    }

    #[tokio::test]
    async fn watermark_failure_keeps_unwatermarked_image() {
        let model = MockModel::new((0..6).map(|_| image_output()).collect());
        let outcome = orchestrator(model, Arc::new(MemoryHistory::default()))
            .generate_round(&png_bytes(64, 64), Some(b"broken logo"), &config())
            .await
            .unwrap();

        for slot in &outcome.results {
            assert_eq!(slot.status, SlotStatus::Completed);
            assert!(slot.data.is_some());
        }
    }

    fn completed_slot(id: usize) -> ResultItem {
        ResultItem {
            id,
            status: SlotStatus::Completed,
            data: Some(GeneratedImage {
                image_url: to_data_uri("image/png", &png_bytes(16, 16)),
                prompt: "p".to_string(),
            }),
            upscaled_image_url: None,
            error_message: None,
        }
    }

    #[tokio::test]
    async fn upscale_skips_ineligible_and_is_idempotent() {
        let mut already = completed_slot(1);
        already.upscaled_image_url = Some("data:image/png;base64,AAAA".to_string());
        let mut failed = ResultItem::empty(2);
        failed.status = SlotStatus::Error;

        let input = vec![completed_slot(0), already, failed, completed_slot(3)];

        let model = MockModel::new(vec![image_output(), image_output()]);
        let upscaler = UpscaleOrchestrator::new(model.clone());

        let (results, had_failure) = upscaler.upscale_all(input, None).await;
        assert!(!had_failure);
        assert_eq!(model.call_count(), 2);
        assert!(results[0].upscaled_image_url.is_some());
        assert!(results[3].upscaled_image_url.is_some());
        assert!(results[2].upscaled_image_url.is_none());

        // Second pass: every completed slot is already upscaled, no calls.
        let (results, had_failure) = upscaler.upscale_all(results, None).await;
        assert!(!had_failure);
        assert_eq!(model.call_count(), 2);
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn one_upscale_failure_does_not_block_others() {
        let model = MockModel::new(vec![
            image_output(),
            Err(PotretError::Model("boom".to_string())),
        ]);
        let upscaler = UpscaleOrchestrator::new(model);

        let (results, had_failure) = upscaler
            .upscale_all(vec![completed_slot(0), completed_slot(1)], None)
            .await;

        assert!(had_failure);
        assert!(results[0].upscaled_image_url.is_some());
        assert!(results[1].upscaled_image_url.is_none());
        assert_eq!(results[1].status, SlotStatus::Completed);
    }

    #[tokio::test]
    async fn refusal_during_upscale_counts_as_failure() {
        let model = MockModel::new(vec![Ok(ModelOutput::Refusal("tidak bisa".to_string()))]);
        let upscaler = UpscaleOrchestrator::new(model);

        let (results, had_failure) = upscaler.upscale_all(vec![completed_slot(0)], None).await;
        assert!(had_failure);
        assert!(results[0].upscaled_image_url.is_none());
    }
}
