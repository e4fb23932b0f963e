//! Farming voice/text assistant
//!
//! An utterance flows one way through the assistant:
//!
//! ```text
//! text ─▶ classify_intent ─▶ entities ─▶ FarmingBackend ─▶ responses ─▶ AgentReply
//! ```
//!
//! Backend failures never surface to the caller. Each call logs the error and
//! substitutes a default (empty lists, a placeholder weather report, an empty
//! diagnosis or farm summary) so a reply is always produced.

pub mod backend;
pub mod entities;
pub mod i18n;
pub mod intent;
pub mod responses;

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

pub use backend::{FarmingBackend, HttpBackend, LocalBackend};
pub use i18n::{Language, translate};
pub use intent::{ConversationContext, Entities, Intent, classify_intent};

use crate::config::DEFAULT_USER_ID;
use crate::db::farm::{Farm, FarmInfo};
use crate::farming::{
    CropRecommendation, CropRecommendationRequest, Diagnosis, MarketPrice, Season,
    TaskRecommendation, WeatherReport,
};
use entities::GENERAL_CROP;

/// Coordinates used for crop recommendations when the user has no location
pub const DEFAULT_COORDINATES: (f64, f64) = (28.6139, 77.2090);

/// Number of recent utterances remembered in the user context
const RECENT_QUERY_LIMIT: usize = 10;

/// Knowledge hits used to answer general questions
const GENERAL_KNOWLEDGE_LIMIT: usize = 3;

/// A field the user farms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmField {
    pub id: String,
    pub name: String,
    /// Size in acres
    pub size: f64,
    pub soil_type: String,
    pub current_crop: String,
    pub location: String,
}

impl From<&Farm> for FarmField {
    fn from(farm: &Farm) -> Self {
        Self {
            id: farm.id.clone(),
            name: farm.name.clone(),
            size: farm.total_area,
            soil_type: farm.soil_type.clone(),
            current_crop: farm.crop_type.clone(),
            location: format!("{:.6}, {:.6}", farm.center.lat, farm.center.lng),
        }
    }
}

/// Assistant preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub language: Language,
    pub location: String,
    pub farming_type: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::En,
            location: "delhi".to_string(),
            farming_type: "traditional".to_string(),
        }
    }
}

/// What the assistant knows about the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub farm_fields: Vec<FarmField>,
    pub preferences: Preferences,
    pub recent_queries: Vec<String>,
}

/// Partial update of a [`UserContext`]; unset parts are kept
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserContextPatch {
    pub farm_fields: Option<Vec<FarmField>>,
    pub preferences: Option<Preferences>,
    pub recent_queries: Option<Vec<String>>,
}

/// Who spoke a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A conversation history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Structured data attached to a reply for the client UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AgentAction {
    Weather(WeatherReport),
    Crops(Vec<CropRecommendation>),
    Tasks(Vec<TaskRecommendation>),
    Market(Vec<MarketPrice>),
    CameraDetection { redirect: String },
    Disease(Diagnosis),
    FarmInfo(FarmInfo),
}

/// The assistant's answer to one utterance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReply {
    pub response: String,
    pub actions: Vec<AgentAction>,
    pub should_redirect: bool,
    pub redirect_to: Option<String>,
}

impl AgentReply {
    fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            actions: Vec::new(),
            should_redirect: false,
            redirect_to: None,
        }
    }

    fn redirect(mut self, path: &str) -> Self {
        self.should_redirect = true;
        self.redirect_to = Some(path.to_string());
        self
    }

    fn with_action(mut self, action: AgentAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// How a handled intent interacts with conversation history
enum Handled {
    /// Reply is recorded as an assistant turn and takes the classifier's redirect
    Recorded(AgentReply),
    /// Reply is returned as-is without an assistant turn
    Direct(AgentReply),
}

/// Season for the current local month
#[must_use]
pub fn current_season() -> Season {
    Season::for_month(chrono::Local::now().month())
}

/// Log a backend failure and substitute a default
fn or_default<T>(result: crate::Result<T>, what: &str, default: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, call = what, "farming backend call failed");
        default()
    })
}

/// Keyword-driven farming assistant for one conversation
pub struct VoiceAgent {
    user_context: UserContext,
    backend: Arc<dyn FarmingBackend>,
    language: Language,
    user_id: String,
    history: Vec<ConversationTurn>,
}

impl std::fmt::Debug for VoiceAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceAgent")
            .field("language", &self.language)
            .field("user_id", &self.user_id)
            .field("turns", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl VoiceAgent {
    /// Create an assistant; the language comes from the context's preferences
    pub fn new(user_context: UserContext, backend: Arc<dyn FarmingBackend>) -> Self {
        Self {
            language: user_context.preferences.language,
            user_context,
            backend,
            user_id: DEFAULT_USER_ID.to_string(),
            history: Vec::new(),
        }
    }

    /// Set the user whose farms are reported
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub const fn user_context(&self) -> &UserContext {
        &self.user_context
    }

    /// Conversation so far, oldest first
    #[must_use]
    pub fn conversation_history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn clear_conversation_history(&mut self) {
        self.history.clear();
    }

    /// Merge a partial context; only provided parts are replaced
    pub fn update_user_context(&mut self, patch: UserContextPatch) {
        if let Some(fields) = patch.farm_fields {
            self.user_context.farm_fields = fields;
        }
        if let Some(preferences) = patch.preferences {
            self.language = preferences.language;
            self.user_context.preferences = preferences;
        }
        if let Some(queries) = patch.recent_queries {
            self.user_context.recent_queries = queries;
        }
    }

    /// Answer one utterance
    pub async fn process_user_input(&mut self, text: &str) -> AgentReply {
        if text.trim().is_empty() {
            return AgentReply::text(translate(self.language, "voiceAgent.processingError"));
        }

        self.push_turn(Role::User, text);
        self.remember_query(text);

        let context = classify_intent(text, &self.user_context);
        tracing::debug!(
            intent = context.intent.as_str(),
            confidence = context.confidence,
            "classified utterance"
        );

        match self.handle(text, &context).await {
            Handled::Recorded(mut reply) => {
                self.push_turn(Role::Assistant, &reply.response);
                reply.should_redirect = context.requires_redirect;
                reply.redirect_to = context.redirect_to;
                reply
            }
            Handled::Direct(reply) => reply,
        }
    }

    async fn handle(&self, text: &str, context: &ConversationContext) -> Handled {
        let lang = self.language;
        let entities = &context.entities;

        match context.intent {
            Intent::Weather => {
                let city = entities
                    .location
                    .clone()
                    .unwrap_or_else(|| self.user_context.preferences.location.clone());
                let report = or_default(self.backend.weather(&city).await, "weather", || {
                    WeatherReport::unavailable(&city)
                });
                let reply = AgentReply::text(responses::weather(lang, &report));
                Handled::Recorded(reply.with_action(AgentAction::Weather(report)))
            }
            Intent::Crops => {
                if self.user_context.farm_fields.is_empty() {
                    let reply = AgentReply::text(translate(lang, "voiceAgent.needLandInfo"));
                    return Handled::Direct(reply.redirect("/my-farm"));
                }

                let request = self.crop_request();
                let crops = or_default(
                    self.backend.crop_recommendations(&request).await,
                    "crop_recommendations",
                    Vec::new,
                );
                let reply = AgentReply::text(responses::crop_recommendations(lang, &crops));
                Handled::Recorded(reply.with_action(AgentAction::Crops(crops)))
            }
            Intent::Tasks => {
                let crop = self
                    .user_context
                    .farm_fields
                    .first()
                    .map(|f| f.current_crop.as_str());
                let tasks = or_default(
                    self.backend.tasks(current_season(), crop).await,
                    "tasks",
                    Vec::new,
                );
                let text = format!(
                    "{}\n\n{}",
                    translate(lang, "voiceAgent.taskNavigation"),
                    responses::tasks(lang, &tasks)
                );
                let reply = AgentReply::text(text).with_action(AgentAction::Tasks(tasks));
                Handled::Direct(reply.redirect("/tasks"))
            }
            Intent::Market => {
                let crop = entities.crop.as_deref().filter(|c| *c != GENERAL_CROP);
                let prices = or_default(
                    self.backend.market_prices(crop).await,
                    "market_prices",
                    Vec::new,
                );
                let text = format!(
                    "{}\n\n{}",
                    translate(lang, "voiceAgent.marketNavigation"),
                    responses::market(lang, &prices)
                );
                let reply = AgentReply::text(text).with_action(AgentAction::Market(prices));
                Handled::Direct(reply.redirect("/market-prices"))
            }
            Intent::Disease => {
                if entities.needs_camera == Some(true) {
                    let reply = AgentReply::text(translate(lang, "voiceAgent.cameraDetection"))
                        .with_action(AgentAction::CameraDetection {
                            redirect: "/disease-detection".to_string(),
                        });
                    return Handled::Direct(reply.redirect("/disease-detection"));
                }

                let symptoms = entities.symptoms.as_deref().unwrap_or(text);
                let crop = entities.crop.as_deref().filter(|c| *c != GENERAL_CROP);
                let diagnosis = or_default(
                    self.backend.diagnose(symptoms, crop).await,
                    "diagnose",
                    Diagnosis::default,
                );
                let reply = AgentReply::text(responses::disease(lang, &diagnosis));
                Handled::Recorded(reply.with_action(AgentAction::Disease(diagnosis)))
            }
            Intent::FarmInfo => {
                let info = or_default(
                    self.backend.farm_info(&self.user_id).await,
                    "farm_info",
                    FarmInfo::default,
                );
                let reply = AgentReply::text(responses::farm_info(&info));
                Handled::Recorded(reply.with_action(AgentAction::FarmInfo(info)))
            }
            Intent::Navigation => {
                let destination = entities.destination.as_deref().unwrap_or("home");
                let path = context.redirect_to.as_deref().unwrap_or("/");
                let reply = AgentReply::text(responses::navigation(lang, destination));
                Handled::Direct(reply.redirect(path))
            }
            Intent::General => {
                let response = match self
                    .backend
                    .search_knowledge(text, GENERAL_KNOWLEDGE_LIMIT)
                    .await
                {
                    Ok(hits) => responses::knowledge(&hits),
                    Err(e) => {
                        tracing::warn!(error = %e, "knowledge search failed");
                        responses::KNOWLEDGE_UNAVAILABLE.to_string()
                    }
                };
                Handled::Recorded(AgentReply::text(response))
            }
        }
    }

    fn crop_request(&self) -> CropRecommendationRequest {
        let fields = &self.user_context.farm_fields;
        let soil_type = fields
            .first()
            .map(|f| f.soil_type.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "loamy".to_string());

        CropRecommendationRequest {
            latitude: Some(DEFAULT_COORDINATES.0),
            longitude: Some(DEFAULT_COORDINATES.1),
            soil_type: Some(soil_type),
            land_size: Some(fields.iter().map(|f| f.size).sum()),
        }
    }

    fn push_turn(&mut self, role: Role, content: &str) {
        self.history.push(ConversationTurn {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn remember_query(&mut self, text: &str) {
        let queries = &mut self.user_context.recent_queries;
        queries.push(text.to_string());
        if queries.len() > RECENT_QUERY_LIMIT {
            let excess = queries.len() - RECENT_QUERY_LIMIT;
            queries.drain(..excess);
        }
    }
}
