use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use toolrelay::errors::AgentError;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChatResponse {
    Final {
        #[serde(rename = "final")]
        text: String,
    },
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl ChatResponse {
    fn error<S: Into<String>>(error: S) -> Self {
        ChatResponse::Error {
            error: error.into(),
            name: None,
        }
    }
}

fn backend_status(err: &AgentError) -> Option<u16> {
    match err {
        AgentError::Backend(source) => source.status(),
        _ => None,
    }
}

fn error_response(err: AgentError) -> (StatusCode, Json<ChatResponse>) {
    match err {
        AgentError::MissingInput => (
            StatusCode::BAD_REQUEST,
            Json(ChatResponse::error("no message")),
        ),
        AgentError::UnknownTool(name) => (
            StatusCode::OK,
            Json(ChatResponse::Error {
                error: "unknown_tool".to_string(),
                name: Some(name),
            }),
        ),
        other => {
            tracing::error!(
                error = %other,
                backend_status = ?backend_status(&other),
                "chat request failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse::error(other.to_string())),
            )
        }
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let message = match payload {
        Ok(Json(request)) => request.message.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable chat request");
            String::new()
        }
    };

    match state.agent.reply(&message).await {
        Ok(text) => (StatusCode::OK, Json(ChatResponse::Final { text })),
        Err(err) => error_response(err),
    }
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .with_state(state)
}
