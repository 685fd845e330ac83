//! Instructions sent to remote models, one per capability.
//!
//! Each prompt embeds a literal example of the JSON shape the response is
//! expected to follow; nothing downstream enforces that shape.

/// Classification only echoes this many characters of the input text.
pub const CLASSIFY_ECHO_CHARS: usize = 2000;

pub fn classify(text: &str) -> String {
    format!(
        r#"Analyze this text and classify it according to S1000D data module types.

Text: {}...

Respond in JSON format:
{{
    "dm_type": "PROC|DESC|IPD|CIR|SNS|WIR|GEN",
    "title": "extracted title",
    "confidence": 0.95,
    "metadata": {{
        "language": "en-US",
        "technical_domain": "aviation|electronics|mechanical|general",
        "complexity": "basic|intermediate|advanced"
    }}
}}"#,
        truncate_chars(text, CLASSIFY_ECHO_CHARS)
    )
}

pub fn extract(text: &str) -> String {
    format!(
        r#"Extract structured data from this technical text for S1000D data module creation.

Text: {text}

Respond in JSON format:
{{
    "sections": [
        {{
            "type": "paragraph|list|table|figure",
            "title": "section title",
            "content": "extracted content",
            "level": 1
        }}
    ],
    "references": [
        {{
            "type": "figure|table|dm",
            "reference": "Figure 1|Table 1|DMC-XXX",
            "title": "reference title"
        }}
    ],
    "warnings": ["safety warning 1", "safety warning 2"],
    "cautions": ["caution 1", "caution 2"],
    "notes": ["note 1", "note 2"]
}}"#
    )
}

pub fn rewrite(text: &str) -> String {
    format!(
        r#"Rewrite this technical text to comply with ASD-STE100 (Simplified Technical English) standards.

Original text: {text}

STE Requirements:
- Use only approved words from the STE dictionary
- Maximum sentence length: 20 words
- Use active voice
- Use simple present tense
- Avoid complex grammatical structures
- Use clear, unambiguous language

Respond in JSON format:
{{
    "rewritten_text": "STE compliant text",
    "ste_score": 0.92,
    "improvements": ["improvement 1", "improvement 2"],
    "warnings": ["warning if any"]
}}"#
    )
}

pub fn review(text: &str) -> String {
    format!(
        r#"Review the following S1000D data module content for grammar, clarity and STE compliance.
Provide JSON as {{"issues": ["issue1", "issue2"], "suggested_text": "corrected text"}}.

Content:
{text}"#
    )
}

pub const CAPTION: &str = "Generate a technical caption for this image suitable for S1000D documentation. Focus on technical accuracy and clarity.";

pub const OBJECTS: &str = "Identify and list all technical objects, components, and parts visible in this image. Return as a JSON array of object names.";

pub const HOTSPOTS: &str = r#"Identify key areas in this technical image that should have interactive hotspots. Return coordinates and descriptions in JSON format: [{"x": 100, "y": 150, "width": 50, "height": 30, "description": "component name"}]"#;

/// Prefix of at most `max` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 5), "");
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }

    #[test]
    fn test_classify_caps_echoed_text() {
        let text = format!("{}{}", "a".repeat(CLASSIFY_ECHO_CHARS), "ж".repeat(1000));
        let prompt = classify(&text);

        assert!(prompt.contains(&"a".repeat(CLASSIFY_ECHO_CHARS)));
        assert!(!prompt.contains('ж'));
    }

    #[test]
    fn test_prompts_embed_full_text_for_other_tasks() {
        let text = "x".repeat(5000);
        assert!(extract(&text).contains(&text));
        assert!(rewrite(&text).contains(&text));
        assert!(review(&text).contains(&text));
    }

    #[test]
    fn test_prompts_carry_output_shape() {
        assert!(classify("t").contains("\"dm_type\""));
        assert!(extract("t").contains("\"sections\""));
        assert!(rewrite("t").contains("\"ste_score\""));
        assert!(review("t").contains("\"suggested_text\""));
        assert!(HOTSPOTS.contains("\"description\""));
    }
}
