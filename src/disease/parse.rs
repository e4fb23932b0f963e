//! Parsing of free-text diagnoses from language-model providers

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Confidence assumed when the text does not state one
pub const DEFAULT_CONFIDENCE: u8 = 85;

const MAX_RECOMMENDATIONS: usize = 5;
const MIN_RECOMMENDATION_LEN: usize = 10;

static CONFIDENCE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)confidence[:\s]*(\d+)%").expect("valid regex"),
        Regex::new(r"(?i)accuracy[:\s]*(\d+)%").expect("valid regex"),
        Regex::new(r"(?i)(\d+)%\s*confident").expect("valid regex"),
    ]
});

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+\.|[-*•])\s").expect("valid regex"));

static TREATMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)treatment[:\-\s]+").expect("valid regex"));
static PREVENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)prevention[:\-\s]+").expect("valid regex"));
static CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)control[:\-\s]+").expect("valid regex"));

static STOP_AT_PREVENTION_OR_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)prevention|control").expect("valid regex"));
static STOP_AT_TREATMENT_OR_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)treatment|control").expect("valid regex"));

/// A provider answer reduced to text, confidence, and advice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiagnosis {
    pub text: String,
    pub confidence: u8,
    pub recommendations: Vec<String>,
}

/// Parse a provider body that may be JSON or plain text
///
/// JSON objects carrying `diagnosis`, `disease`, or `result` use those
/// fields; anything else is treated as prose.
#[must_use]
pub fn parse_provider_response(raw: &str) -> TextDiagnosis {
    let raw = raw.trim();

    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(raw) {
        let text = ["diagnosis", "disease", "result"]
            .iter()
            .find_map(|key| obj.get(*key).filter(|v| is_truthy(v)));

        if let Some(text) = text {
            let text = text
                .as_str()
                .map_or_else(|| text.to_string(), str::to_string);
            let confidence = obj
                .get("confidence")
                .and_then(Value::as_f64)
                .filter(|c| *c > 0.0)
                .map_or_else(|| extract_confidence(raw), clamp_percent);
            let recommendations = ["recommendations", "treatment"]
                .iter()
                .find_map(|key| obj.get(*key).and_then(string_list))
                .unwrap_or_else(|| extract_recommendations(raw));

            return TextDiagnosis {
                text,
                confidence,
                recommendations,
            };
        }
    }

    TextDiagnosis {
        text: raw.to_string(),
        confidence: extract_confidence(raw),
        recommendations: extract_recommendations(raw),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Stated confidence percentage, or [`DEFAULT_CONFIDENCE`]
#[must_use]
pub fn extract_confidence(text: &str) -> u8 {
    CONFIDENCE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .map_or(DEFAULT_CONFIDENCE, |n| u8::try_from(n.min(100)).unwrap_or(100))
}

/// Up to five actionable lines from a diagnosis
///
/// List items and lines that mention treatment verbs are taken first. When
/// there are none, `Treatment:`, `Prevention:` and `Control:` sections are
/// used instead.
#[must_use]
pub fn extract_recommendations(text: &str) -> Vec<String> {
    let mut recs: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            LIST_MARKER.is_match(line)
                || ["recommend", "treatment", "spray", "apply"]
                    .iter()
                    .any(|kw| lower.contains(kw))
        })
        .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
        .filter(|clean| clean.chars().count() > MIN_RECOMMENDATION_LEN)
        .collect();

    if recs.is_empty() {
        let sections = [
            ("Treatment", &*TREATMENT, Some(&*STOP_AT_PREVENTION_OR_CONTROL)),
            ("Prevention", &*PREVENTION, Some(&*STOP_AT_TREATMENT_OR_CONTROL)),
            ("Control", &*CONTROL, None),
        ];
        for (label, heading, stop) in sections {
            if let Some(body) = section(text, heading, stop) {
                recs.push(format!("{label}: {}", body.trim()));
            }
        }
    }

    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

/// Text following the first `heading` whose body runs, on a single line, to
/// the next stop word or to the end of the input
fn section<'a>(text: &'a str, heading: &Regex, stop: Option<&Regex>) -> Option<&'a str> {
    heading.find_iter(text).find_map(|m| {
        let rest = &text[m.end()..];
        let end = stop
            .and_then(|re| re.find(rest))
            .map_or(rest.len(), |s| s.start());
        let body = &rest[..end];
        (!body.contains('\n')).then_some(body)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_patterns() {
        assert_eq!(extract_confidence("Confidence: 72%"), 72);
        assert_eq!(extract_confidence("model accuracy 64%"), 64);
        assert_eq!(extract_confidence("I am 90% confident"), 90);
        assert_eq!(extract_confidence("no number here"), DEFAULT_CONFIDENCE);
        assert_eq!(extract_confidence("confidence: 250%"), 100);
    }

    #[test]
    fn test_list_recommendations() {
        let text = "Early blight detected.\n\
                    1. Remove the lower infected leaves\n\
                    - Spray copper fungicide weekly\n\
                    * ok\n\
                    Apply mulch around the base of plants\n\
                    Nothing else.";
        assert_eq!(
            extract_recommendations(text),
            [
                "Remove the lower infected leaves",
                "Spray copper fungicide weekly",
                "Apply mulch around the base of plants",
            ]
        );
    }

    #[test]
    fn test_recommendations_capped_at_five() {
        let text = (1..=8)
            .map(|i| format!("{i}. Recommendation number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_recommendations(&text).len(), 5);
    }

    #[test]
    fn test_section_fallback() {
        let text = "Leaf rust. Cure: copper. Prevention: rotate crops yearly";
        assert_eq!(
            extract_recommendations(text),
            ["Prevention: rotate crops yearly"]
        );

        let text = "Control - neem oil every week";
        assert_eq!(extract_recommendations(text), ["Control: neem oil every week"]);
    }

    #[test]
    fn test_json_response() {
        let raw = r#"{"disease": "Leaf Curl", "confidence": 77, "treatment": ["Use resistant seed"]}"#;
        let parsed = parse_provider_response(raw);
        assert_eq!(parsed.text, "Leaf Curl");
        assert_eq!(parsed.confidence, 77);
        assert_eq!(parsed.recommendations, ["Use resistant seed"]);
    }

    #[test]
    fn test_json_without_known_fields_is_prose() {
        let raw = r#"{"status": "ok"}"#;
        let parsed = parse_provider_response(raw);
        assert_eq!(parsed.text, raw);
        assert_eq!(parsed.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_plain_text_response() {
        let parsed = parse_provider_response("  Powdery mildew, 80% confident.\n- Apply sulfur dust at dawn \n");
        assert_eq!(parsed.confidence, 80);
        assert_eq!(parsed.recommendations, ["Apply sulfur dust at dawn"]);
        assert!(parsed.text.starts_with("Powdery"));
    }
}
