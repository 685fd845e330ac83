use super::types::*;
use async_trait::async_trait;

/// Text intelligence capabilities.
///
/// Implementations never fail: vendor and parsing errors come back as a
/// response with `confidence == 0.0` and an `error` entry in `result`.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Identifier reported in every response's `provider` field.
    fn name(&self) -> &str;

    /// Classifies the text as an S1000D data module type with basic metadata.
    async fn classify_document(&self, request: TextProcessingRequest) -> TextProcessingResponse;

    /// Extracts sections, references and safety notices.
    async fn extract_structured_data(
        &self,
        request: TextProcessingRequest,
    ) -> TextProcessingResponse;

    /// Rewrites the text towards ASD-STE100 compliance.
    async fn rewrite_to_ste(&self, request: TextProcessingRequest) -> TextProcessingResponse;

    /// Reviews module content for grammar, clarity and STE compliance.
    async fn review_module(&self, request: TextProcessingRequest) -> TextProcessingResponse;

    async fn process(&self, request: TextProcessingRequest) -> TextProcessingResponse {
        match request.task {
            TextTask::Classify => self.classify_document(request).await,
            TextTask::Extract => self.extract_structured_data(request).await,
            TextTask::Rewrite => self.rewrite_to_ste(request).await,
            TextTask::Review => self.review_module(request).await,
        }
    }
}

/// Image intelligence capabilities. Same no-failure contract as [`TextProvider`].
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate_caption(&self, request: VisionProcessingRequest) -> VisionProcessingResponse;

    async fn detect_objects(&self, request: VisionProcessingRequest) -> VisionProcessingResponse;

    async fn generate_hotspots(
        &self,
        request: VisionProcessingRequest,
    ) -> VisionProcessingResponse;

    async fn process(&self, request: VisionProcessingRequest) -> VisionProcessingResponse {
        match request.task {
            VisionTask::Caption => self.generate_caption(request).await,
            VisionTask::Objects => self.detect_objects(request).await,
            VisionTask::Hotspots => self.generate_hotspots(request).await,
        }
    }
}
