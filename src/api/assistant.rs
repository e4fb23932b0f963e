//! Voice assistant sessions over HTTP
//!
//! Each session is a [`VoiceAgent`] kept in memory and answered through the
//! server's own farming services. A session is created on first use and
//! seeded with the user's active farms. Idle sessions expire after
//! [`SESSION_IDLE_TIMEOUT`].

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use mini_moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ApiError, ApiResult, ApiState, bad_request, error_response};
use crate::agent::{
    AgentReply, ConversationTurn, FarmField, Language, Preferences, UserContext,
    UserContextPatch, VoiceAgent,
};

/// How long an untouched assistant session is kept
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const MAX_SESSIONS: u64 = 10_000;

/// Live assistant sessions keyed by session id
pub type Sessions = Cache<String, Arc<Mutex<VoiceAgent>>>;

/// Session store that drops sessions idle for longer than `idle`
#[must_use]
pub fn session_store(idle: Duration) -> Sessions {
    Cache::builder()
        .max_capacity(MAX_SESSIONS)
        .time_to_idle(idle)
        .build()
}

#[derive(Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub text: String,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    /// Language code such as `hi` or `es-MX`
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub reply: AgentReply,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<ConversationTurn>,
}

fn session_not_found() -> ApiError {
    error_response(StatusCode::NOT_FOUND, "Session not found")
}

/// Build a fresh agent for a user from configured defaults and stored farms
fn new_agent(state: &ApiState, user_id: &str, language: Option<Language>) -> VoiceAgent {
    let defaults = &state.agent_defaults;

    let farm_fields = state
        .farms
        .list_active(user_id)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, user_id, "could not load farms for session");
            Vec::new()
        })
        .iter()
        .map(FarmField::from)
        .collect();

    let context = UserContext {
        farm_fields,
        preferences: Preferences {
            language: language.unwrap_or(defaults.language),
            location: defaults.location.clone(),
            farming_type: defaults.farming_type.clone(),
        },
        recent_queries: Vec::new(),
    };

    VoiceAgent::new(context, Arc::new(state.local_backend())).with_user_id(user_id)
}

fn session(state: &ApiState, session_id: &str) -> Option<Arc<Mutex<VoiceAgent>>> {
    state.sessions.get(&session_id.to_string())
}

async fn query(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<QueryResponse> {
    if request.text.trim().is_empty() {
        return Err(bad_request("Text is required"));
    }

    let language = request.language.as_deref().and_then(Language::from_code);
    let user_id = request
        .user_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| state.agent_defaults.user_id.clone());
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let agent = match session(&state, &session_id) {
        Some(agent) => {
            if let Some(language) = language {
                let mut guard = agent.lock().await;
                if guard.language() != language {
                    let preferences = Preferences {
                        language,
                        ..guard.user_context().preferences.clone()
                    };
                    guard.update_user_context(UserContextPatch {
                        preferences: Some(preferences),
                        ..UserContextPatch::default()
                    });
                }
            }
            agent
        }
        None => {
            let agent = Arc::new(Mutex::new(new_agent(&state, &user_id, language)));
            state.sessions.insert(session_id.clone(), agent.clone());
            tracing::info!(session_id = %session_id, user_id = %user_id, "assistant session created");
            agent
        }
    };

    let reply = agent.lock().await.process_user_input(&request.text).await;

    Ok(Json(QueryResponse { session_id, reply }))
}

async fn history(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
) -> ApiResult<HistoryResponse> {
    let agent = session(&state, &session_id).ok_or_else(session_not_found)?;
    let history = agent.lock().await.conversation_history().to_vec();
    Ok(Json(HistoryResponse {
        session_id,
        history,
    }))
}

async fn clear(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let agent = session(&state, &session_id).ok_or_else(session_not_found)?;
    agent.lock().await.clear_conversation_history();
    Ok(StatusCode::NO_CONTENT)
}

/// Build the assistant router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/sessions/{session_id}/history", get(history))
        .route("/sessions/{session_id}", delete(clear))
        .with_state(state)
}
