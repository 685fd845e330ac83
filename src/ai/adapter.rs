use super::completion::{CompletionBackend, CompletionMessage, CompletionRequest, TEMPERATURE};
use super::json_repair::{Coercion, coerce_array, normalize};
use super::prompts;
use super::provider::{TextProvider, VisionProvider};
use super::types::*;
use crate::{Error, Result, config::ConfidenceDefaults};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Implements both capability traits on top of a remote completion backend.
pub struct ModelAdapter {
    name: String,
    backend: Arc<dyn CompletionBackend>,
    text_model: String,
    vision_model: String,
    timeout: Duration,
    confidence: ConfidenceDefaults,
}

impl ModelAdapter {
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn CompletionBackend>,
        text_model: impl Into<String>,
        vision_model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            text_model: text_model.into(),
            vision_model: vision_model.into(),
            timeout: Duration::from_secs(60),
            confidence: ConfidenceDefaults::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceDefaults) -> Self {
        self.confidence = confidence;
        self
    }

    async fn call(
        &self,
        model: &str,
        max_tokens: u32,
        message: CompletionMessage,
    ) -> Result<String> {
        let request = CompletionRequest {
            model: model.to_string(),
            max_tokens,
            temperature: TEMPERATURE,
            messages: vec![message],
        };

        tokio::time::timeout(self.timeout, self.backend.complete(request))
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }

    async fn run_text(
        &self,
        task: TextTask,
        request: &TextProcessingRequest,
    ) -> TextProcessingResponse {
        let started = Instant::now();
        let prompt = match task {
            TextTask::Classify => prompts::classify(&request.text),
            TextTask::Extract => prompts::extract(&request.text),
            TextTask::Rewrite => prompts::rewrite(&request.text),
            TextTask::Review => prompts::review(&request.text),
        };

        let outcome = self
            .call(&self.text_model, task.max_tokens(), CompletionMessage::user_text(prompt))
            .await
            .map(|completion| normalize(&completion));

        let (result, confidence) = match outcome {
            Ok(result) => {
                let confidence = self.text_confidence(task, &result);
                (result, confidence)
            }
            Err(e) => {
                warn!("{} {} task failed: {}", self.name, task, e);
                (json!({ "error": e.to_string() }), 0.0)
            }
        };

        debug!("{} {} task finished with confidence {}", self.name, task, confidence);

        TextProcessingResponse {
            result,
            confidence,
            processing_time: started.elapsed().as_secs_f64(),
            provider: self.name.clone(),
            model_used: self.text_model.clone(),
        }
    }

    fn text_confidence(&self, task: TextTask, result: &Value) -> f64 {
        let score = match task {
            TextTask::Classify => result.get("confidence").and_then(Value::as_f64),
            TextTask::Rewrite => result.get("ste_score").and_then(Value::as_f64),
            TextTask::Extract => Some(self.confidence.extract),
            TextTask::Review => Some(self.confidence.review),
        };
        score.unwrap_or(0.0).clamp(0.0, 1.0)
    }

    async fn run_vision(
        &self,
        task: VisionTask,
        request: &VisionProcessingRequest,
    ) -> VisionProcessingResponse {
        let started = Instant::now();
        let instruction = match task {
            VisionTask::Caption => prompts::CAPTION,
            VisionTask::Objects => prompts::OBJECTS,
            VisionTask::Hotspots => prompts::HOTSPOTS,
        };
        let message = CompletionMessage::user_image(
            instruction,
            request.media_type.as_str(),
            request.image_data.as_str(),
        );

        let mut response = VisionProcessingResponse {
            provider: self.name.clone(),
            model_used: self.vision_model.clone(),
            ..Default::default()
        };

        match self.call(&self.vision_model, task.max_tokens(), message).await {
            Ok(completion) => match task {
                VisionTask::Caption => {
                    response.caption = Some(completion);
                    response.confidence = self.confidence.caption;
                }
                VisionTask::Objects => {
                    response.objects = Some(coerce_array(&completion, Coercion::WrapRaw));
                    response.confidence = self.confidence.objects;
                }
                VisionTask::Hotspots => {
                    let hotspots = coerce_array(&completion, Coercion::Empty);
                    debug!(
                        "{} of {} hotspots have usable geometry",
                        Hotspot::from_values(&hotspots).len(),
                        hotspots.len()
                    );
                    response.hotspots = Some(hotspots);
                    response.confidence = self.confidence.hotspots;
                }
            },
            Err(e) => {
                warn!("{} {} task failed: {}", self.name, task, e);
                match task {
                    VisionTask::Caption => {
                        response.caption = Some(format!("Error generating caption: {e}"))
                    }
                    VisionTask::Objects => response.objects = Some(Vec::new()),
                    VisionTask::Hotspots => response.hotspots = Some(Vec::new()),
                }
                response.error = Some(e.to_string());
            }
        }

        response.confidence = response.confidence.clamp(0.0, 1.0);
        response.processing_time = started.elapsed().as_secs_f64();
        response
    }
}

#[async_trait]
impl TextProvider for ModelAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify_document(&self, request: TextProcessingRequest) -> TextProcessingResponse {
        self.run_text(TextTask::Classify, &request).await
    }

    async fn extract_structured_data(
        &self,
        request: TextProcessingRequest,
    ) -> TextProcessingResponse {
        self.run_text(TextTask::Extract, &request).await
    }

    async fn rewrite_to_ste(&self, request: TextProcessingRequest) -> TextProcessingResponse {
        self.run_text(TextTask::Rewrite, &request).await
    }

    async fn review_module(&self, request: TextProcessingRequest) -> TextProcessingResponse {
        self.run_text(TextTask::Review, &request).await
    }
}

#[async_trait]
impl VisionProvider for ModelAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_caption(&self, request: VisionProcessingRequest) -> VisionProcessingResponse {
        self.run_vision(VisionTask::Caption, &request).await
    }

    async fn detect_objects(&self, request: VisionProcessingRequest) -> VisionProcessingResponse {
        self.run_vision(VisionTask::Objects, &request).await
    }

    async fn generate_hotspots(
        &self,
        request: VisionProcessingRequest,
    ) -> VisionProcessingResponse {
        self.run_vision(VisionTask::Hotspots, &request).await
    }
}
