//! Keyword intent classifier
//!
//! Intents are an ordered rule table. Each rule carries keyword sets per
//! [`Language`]; every language is checked regardless of the session
//! language, and the first rule with a substring hit wins.

use serde::{Deserialize, Serialize};

use super::entities::{
    extract_crop_type, extract_destination, extract_location, extract_task_category,
    redirect_path,
};
use super::{Language, UserContext};

/// Intent tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    General,
    Weather,
    Crops,
    Tasks,
    Market,
    Disease,
    Navigation,
    FarmInfo,
}

impl Intent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Weather => "weather",
            Self::Crops => "crops",
            Self::Tasks => "tasks",
            Self::Market => "market",
            Self::Disease => "disease",
            Self::Navigation => "navigation",
            Self::FarmInfo => "farm_info",
        }
    }
}

/// Entities pulled from an utterance; which fields are set depends on the intent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_camera: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// Classification of a single utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub intent: Intent,
    pub entities: Entities,
    pub confidence: f32,
    pub requires_redirect: bool,
    pub redirect_to: Option<String>,
    pub follow_up_required: bool,
}

/// Keyword sets for one intent, keyed by language
struct Keywords {
    en: &'static [&'static str],
    hi: &'static [&'static str],
    es: &'static [&'static str],
}

impl Keywords {
    const fn for_language(&self, language: Language) -> &'static [&'static str] {
        match language {
            Language::En => self.en,
            Language::Hi => self.hi,
            Language::Es => self.es,
        }
    }

    fn matches(&self, text: &str) -> bool {
        Language::ALL
            .iter()
            .flat_map(|lang| self.for_language(*lang))
            .any(|k| text.contains(k))
    }
}

struct IntentRule {
    intent: Intent,
    confidence: f32,
    keywords: Keywords,
}

const RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Weather,
        confidence: 0.9,
        keywords: Keywords {
            en: &["weather", "rain", "temperature", "forecast"],
            hi: &["मौसम", "बारिश"],
            es: &["clima", "lluvia"],
        },
    },
    IntentRule {
        intent: Intent::Tasks,
        confidence: 0.85,
        keywords: Keywords {
            en: &["task", "todo", "work", "schedule"],
            hi: &["कार्य", "काम"],
            es: &["tarea", "trabajo"],
        },
    },
    IntentRule {
        intent: Intent::Crops,
        confidence: 0.8,
        keywords: Keywords {
            en: &["crop", "plant", "grow", "harvest"],
            hi: &["फसल", "उगाना"],
            es: &["cultivo", "plantar"],
        },
    },
    IntentRule {
        intent: Intent::Market,
        confidence: 0.8,
        keywords: Keywords {
            en: &["price", "market", "sell", "buy"],
            hi: &["भाव", "बाज़ार"],
            es: &["precio", "mercado"],
        },
    },
    IntentRule {
        intent: Intent::Disease,
        confidence: 0.85,
        keywords: Keywords {
            en: &[
                "disease",
                "problem",
                "pest",
                "yellow",
                "spots",
                "dying",
                "detect",
                "camera",
                "scan",
                "plant health",
                "leaf problem",
                "crop issue",
            ],
            hi: &["बीमारी", "समस्या", "कीट", "जांच", "कैमरा", "स्कैन"],
            es: &["enfermedad", "problema", "plaga"],
        },
    },
    IntentRule {
        intent: Intent::FarmInfo,
        confidence: 0.9,
        keywords: Keywords {
            en: &[
                "my farm",
                "farm info",
                "farm details",
                "land details",
                "field info",
                "coordinates",
                "latitude",
                "longitude",
                "soil data",
            ],
            hi: &["मेरी खेती", "खेत की जानकारी", "ज़मीन की जानकारी"],
            es: &["mi granja", "información de granja", "detalles del campo"],
        },
    },
    IntentRule {
        intent: Intent::Navigation,
        confidence: 0.9,
        keywords: Keywords {
            en: &["go to", "show me", "navigate", "open"],
            hi: &["जाना", "दिखाओ"],
            es: &["ir a", "mostrar"],
        },
    },
];

/// Words that route a disease query to camera detection
const CAMERA_WORDS: &[&str] = &["detect", "camera", "scan", "जांच", "कैमरा", "स्कैन"];

/// Confidence reported for unmatched input
pub const GENERAL_CONFIDENCE: f32 = 0.5;

/// Classify an utterance against the rule table
#[must_use]
pub fn classify_intent(text: &str, user: &UserContext) -> ConversationContext {
    let input = text.to_lowercase();

    let Some(rule) = RULES.iter().find(|rule| rule.keywords.matches(&input)) else {
        return ConversationContext {
            intent: Intent::General,
            entities: Entities::default(),
            confidence: GENERAL_CONFIDENCE,
            requires_redirect: false,
            redirect_to: None,
            follow_up_required: false,
        };
    };

    let mut context = ConversationContext {
        intent: rule.intent,
        entities: Entities::default(),
        confidence: rule.confidence,
        requires_redirect: false,
        redirect_to: None,
        follow_up_required: false,
    };

    match rule.intent {
        Intent::Weather => {
            context.entities.location =
                Some(extract_location(&input, &user.preferences.location));
        }
        Intent::Tasks => {
            context.entities.category = Some(extract_task_category(&input));
            context.requires_redirect = true;
            context.redirect_to = Some("/tasks".to_string());
            context.follow_up_required = true;
        }
        Intent::Crops => {
            context.entities.crop_type = Some(extract_crop_type(&input));
            context.follow_up_required = user.farm_fields.is_empty();
        }
        Intent::Market => {
            context.entities.crop = Some(extract_crop_type(&input));
            context.requires_redirect = true;
            context.redirect_to = Some("/market-prices".to_string());
        }
        Intent::Disease => {
            let needs_camera = CAMERA_WORDS.iter().any(|w| input.contains(w));
            context.entities.crop = Some(extract_crop_type(&input));
            context.entities.needs_camera = Some(needs_camera);
            context.requires_redirect = needs_camera;
            context.redirect_to = needs_camera.then(|| "/disease-detection".to_string());
            context.entities.symptoms = Some(input);
        }
        Intent::Navigation => {
            let destination = extract_destination(&input);
            context.requires_redirect = true;
            context.redirect_to = Some(redirect_path(&destination).to_string());
            context.entities.destination = Some(destination);
        }
        Intent::FarmInfo | Intent::General => {}
    }

    context
}

#[cfg(test)]
mod tests {
    use super::super::FarmField;
    use super::*;

    fn classify(text: &str) -> ConversationContext {
        classify_intent(text, &UserContext::default())
    }

    #[test]
    fn test_weather_with_location() {
        let ctx = classify("What's the weather in Delhi");
        assert_eq!(ctx.intent, Intent::Weather);
        assert_eq!(ctx.entities.location.as_deref(), Some("delhi"));
        assert!((ctx.confidence - 0.9).abs() < f32::EPSILON);
        assert!(!ctx.requires_redirect);
    }

    #[test]
    fn test_unmatched_is_general() {
        let ctx = classify("hello there");
        assert_eq!(ctx.intent, Intent::General);
        assert!((ctx.confidence - GENERAL_CONFIDENCE).abs() < f32::EPSILON);
        assert_eq!(ctx.entities, Entities::default());
    }

    #[test]
    fn test_rule_order_weather_beats_tasks() {
        // "rain" and "schedule" both match; weather is earlier in the table
        assert_eq!(classify("rain schedule").intent, Intent::Weather);
    }

    #[test]
    fn test_tasks_redirect() {
        let ctx = classify("what work should I do for irrigation");
        assert_eq!(ctx.intent, Intent::Tasks);
        assert_eq!(ctx.entities.category.as_deref(), Some("irrigation"));
        assert_eq!(ctx.redirect_to.as_deref(), Some("/tasks"));
        assert!(ctx.follow_up_required);
    }

    #[test]
    fn test_crops_follow_up_depends_on_fields() {
        assert!(classify("which crop for me").follow_up_required);

        let user = UserContext {
            farm_fields: vec![FarmField {
                id: "f1".to_string(),
                name: "North".to_string(),
                size: 3.0,
                soil_type: "loamy".to_string(),
                current_crop: "wheat".to_string(),
                location: "delhi".to_string(),
            }],
            ..UserContext::default()
        };
        let ctx = classify_intent("which crop for me", &user);
        assert_eq!(ctx.intent, Intent::Crops);
        assert!(!ctx.follow_up_required);
        assert_eq!(ctx.entities.crop_type.as_deref(), Some("general"));
    }

    #[test]
    fn test_market_in_spanish() {
        let ctx = classify("precio del tomate");
        assert_eq!(ctx.intent, Intent::Market);
        assert_eq!(ctx.entities.crop.as_deref(), Some("tomate"));
        assert_eq!(ctx.redirect_to.as_deref(), Some("/market-prices"));
    }

    #[test]
    fn test_disease_with_and_without_camera() {
        let ctx = classify("Yellow spots on potato leaves");
        assert_eq!(ctx.intent, Intent::Disease);
        assert_eq!(ctx.entities.needs_camera, Some(false));
        assert_eq!(
            ctx.entities.symptoms.as_deref(),
            Some("yellow spots on potato leaves")
        );
        assert_eq!(ctx.entities.crop.as_deref(), Some("potato"));
        assert!(ctx.redirect_to.is_none());

        let ctx = classify("कैमरा से बीमारी जांच");
        assert_eq!(ctx.intent, Intent::Disease);
        assert_eq!(ctx.entities.needs_camera, Some(true));
        assert_eq!(ctx.redirect_to.as_deref(), Some("/disease-detection"));
    }

    #[test]
    fn test_farm_info_in_hindi() {
        let ctx = classify("खेत की जानकारी बताओ");
        assert_eq!(ctx.intent, Intent::FarmInfo);
        assert!(!ctx.requires_redirect);
    }

    #[test]
    fn test_navigation_destination() {
        let ctx = classify("navigate to community");
        assert_eq!(ctx.intent, Intent::Navigation);
        assert_eq!(ctx.entities.destination.as_deref(), Some("community"));
        assert_eq!(ctx.redirect_to.as_deref(), Some("/community"));
    }

    #[test]
    fn test_every_keyword_classifies_to_its_rule_or_earlier() {
        for (index, rule) in RULES.iter().enumerate() {
            for language in Language::ALL {
                for keyword in rule.keywords.for_language(language) {
                    let intent = classify(keyword).intent;
                    let position = RULES.iter().position(|r| r.intent == intent);
                    assert!(
                        position.is_some_and(|p| p <= index),
                        "{keyword:?} classified as {intent:?}"
                    );
                }
            }
        }
    }
}
