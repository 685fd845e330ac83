//! Offline provider that answers every capability with simple heuristics.
//!
//! Useful for development and for deployments without vendor credentials.

use super::prompts::truncate_chars;
use super::provider::{TextProvider, VisionProvider};
use super::types::*;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Instant;

pub const NAME: &str = "local";

const STE_REPLACEMENTS: &[(&str, &str)] = &[
    ("utilize", "use"),
    ("approximately", "about"),
    ("prior to", "before"),
    ("in order to", "to"),
    ("subsequent to", "after"),
];

/// STE limits sentences to this many words.
const MAX_SENTENCE_WORDS: usize = 20;
/// Long sentences are re-chunked at this size.
const CHUNK_WORDS: usize = 15;

const DM_TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("PROC", &["procedure", "step", "instruction"]),
    ("DESC", &["description", "overview", "general"]),
    ("IPD", &["part", "component", "assembly"]),
    ("CIR", &["circuit", "electrical", "wiring"]),
    ("SNS", &["notice", "service", "bulletin"]),
    ("WIR", &["wire", "cable", "harness"]),
];

pub struct LocalProvider {
    text_model: String,
    vision_model: String,
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self {
            text_model: "local-qwen3-30b".to_string(),
            vision_model: "local-idefics2-8b".to_string(),
        }
    }
}

impl LocalProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn text_response(
        &self,
        started: Instant,
        result: Value,
        confidence: f64,
    ) -> TextProcessingResponse {
        TextProcessingResponse {
            result,
            confidence,
            processing_time: started.elapsed().as_secs_f64(),
            provider: NAME.to_string(),
            model_used: self.text_model.clone(),
        }
    }

    fn vision_response(&self, started: Instant, confidence: f64) -> VisionProcessingResponse {
        VisionProcessingResponse {
            confidence,
            processing_time: started.elapsed().as_secs_f64(),
            provider: NAME.to_string(),
            model_used: self.vision_model.clone(),
            ..Default::default()
        }
    }
}

fn classify_dm_type(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    DM_TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(dm_type, _)| *dm_type)
        .unwrap_or("GEN")
}

fn title_of(text: &str) -> String {
    let first = text.split('.').next().unwrap_or_default();
    truncate_chars(first.trim(), 50).to_string()
}

fn simplify(text: &str) -> String {
    let mut simplified = text.to_string();
    for (from, to) in STE_REPLACEMENTS {
        simplified = simplified.replace(from, to);
    }

    simplified
        .split('.')
        .flat_map(|sentence| {
            let words: Vec<&str> = sentence.split_whitespace().collect();
            if words.len() > MAX_SENTENCE_WORDS {
                words.chunks(CHUNK_WORDS).map(|chunk| chunk.join(" ")).collect()
            } else {
                vec![sentence.trim().to_string()]
            }
        })
        .filter(|sentence| !sentence.is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

fn long_sentences(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|sentence| sentence.split_whitespace().count() > MAX_SENTENCE_WORDS)
        .map(|sentence| {
            format!(
                "Sentence exceeds {} words: \"{}\"",
                MAX_SENTENCE_WORDS,
                truncate_chars(sentence, 60)
            )
        })
        .collect()
}

#[async_trait]
impl TextProvider for LocalProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn classify_document(&self, request: TextProcessingRequest) -> TextProcessingResponse {
        let started = Instant::now();
        let result = json!({
            "dm_type": classify_dm_type(&request.text),
            "title": title_of(&request.text),
            "confidence": 0.8,
            "metadata": {
                "language": "en-US",
                "technical_domain": "general",
                "complexity": "intermediate"
            }
        });
        self.text_response(started, result, 0.8)
    }

    async fn extract_structured_data(
        &self,
        request: TextProcessingRequest,
    ) -> TextProcessingResponse {
        let started = Instant::now();
        let sections: Vec<Value> = request
            .text
            .split("\n\n")
            .take(5)
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .enumerate()
            .map(|(i, paragraph)| {
                json!({
                    "type": "paragraph",
                    "title": format!("Section {}", i + 1),
                    "content": truncate_chars(paragraph, 200),
                    "level": 1
                })
            })
            .collect();

        let result = json!({
            "sections": sections,
            "references": [],
            "warnings": [],
            "cautions": [],
            "notes": []
        });
        self.text_response(started, result, 0.75)
    }

    async fn rewrite_to_ste(&self, request: TextProcessingRequest) -> TextProcessingResponse {
        let started = Instant::now();
        let result = json!({
            "rewritten_text": simplify(&request.text),
            "ste_score": 0.85,
            "improvements": ["Simplified vocabulary", "Shortened sentences"],
            "warnings": []
        });
        self.text_response(started, result, 0.85)
    }

    async fn review_module(&self, request: TextProcessingRequest) -> TextProcessingResponse {
        let started = Instant::now();
        let result = json!({
            "issues": long_sentences(&request.text),
            "suggested_text": simplify(&request.text)
        });
        self.text_response(started, result, 0.7)
    }
}

#[async_trait]
impl VisionProvider for LocalProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate_caption(
        &self,
        _request: VisionProcessingRequest,
    ) -> VisionProcessingResponse {
        let started = Instant::now();
        let mut response = self.vision_response(started, 0.70);
        response.caption = Some(
            "Technical diagram showing mechanical components and assembly details".to_string(),
        );
        response
    }

    async fn detect_objects(&self, _request: VisionProcessingRequest) -> VisionProcessingResponse {
        let started = Instant::now();
        let mut response = self.vision_response(started, 0.65);
        response.objects = Some(vec![
            json!("mechanical component"),
            json!("assembly part"),
            json!("technical drawing"),
            json!("measurement annotation"),
        ]);
        response
    }

    async fn generate_hotspots(
        &self,
        _request: VisionProcessingRequest,
    ) -> VisionProcessingResponse {
        let started = Instant::now();
        let mut response = self.vision_response(started, 0.60);
        response.hotspots = Some(vec![
            json!({"x": 100, "y": 150, "width": 50, "height": 30, "description": "Main component"}),
            json!({"x": 200, "y": 250, "width": 40, "height": 25, "description": "Secondary part"}),
            json!({"x": 300, "y": 100, "width": 60, "height": 35, "description": "Assembly point"}),
        ]);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_classify_by_keywords() {
        let provider = LocalProvider::new();

        let response = provider
            .classify_document(TextProcessingRequest::new(
                TextTask::Classify,
                "Removal procedure. Step 1: open the panel.",
            ))
            .await;

        assert_eq!(response.result["dm_type"], "PROC");
        assert_eq!(response.result["title"], "Removal procedure");
        assert_eq!(response.confidence, 0.8);
        assert_eq!(response.provider, "local");
    }

    #[test]
    fn test_classify_falls_back_to_general() {
        assert_eq!(classify_dm_type("Hydraulic fluid reservoir"), "GEN");
        assert_eq!(classify_dm_type("WIRING diagram"), "CIR");
    }

    #[tokio::test]
    async fn test_extract_limits_sections() {
        let text = (1..=8).map(|i| format!("Paragraph {i}")).collect::<Vec<_>>().join("\n\n");

        let response = LocalProvider::new()
            .extract_structured_data(TextProcessingRequest::new(TextTask::Extract, text))
            .await;

        let sections = response.result["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 5);
        assert_eq!(sections[0]["title"], "Section 1");
        assert_eq!(sections[4]["content"], "Paragraph 5");
    }

    #[test]
    fn test_simplify_replaces_vocabulary_and_splits_long_sentences() {
        assert_eq!(
            simplify("Utilize caution. You must utilize the tool prior to assembly."),
            "Utilize caution. You must use the tool before assembly"
        );

        let long = (1..=30).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let simplified = simplify(&long);
        assert_eq!(simplified.matches(". ").count(), 1);
    }

    #[tokio::test]
    async fn test_review_flags_long_sentences() {
        let long = (1..=25).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let text = format!("Short sentence. {long}.");

        let response = LocalProvider::new()
            .review_module(TextProcessingRequest::new(TextTask::Review, text))
            .await;

        assert_eq!(response.result["issues"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_vision_capabilities_fill_their_own_field() {
        let provider = LocalProvider::new();
        let request = VisionProcessingRequest::new(VisionTask::Hotspots, "AAAA");

        let hotspots = provider.generate_hotspots(request.clone()).await;
        assert_eq!(Hotspot::from_values(hotspots.hotspots.as_deref().unwrap()).len(), 3);
        assert!(hotspots.caption.is_none());

        let objects = provider.detect_objects(request.clone()).await;
        assert_eq!(objects.objects.unwrap().len(), 4);

        let caption = provider.generate_caption(request).await;
        assert!(caption.caption.unwrap().starts_with("Technical diagram"));
        assert_eq!(caption.confidence, 0.70);
    }
}
