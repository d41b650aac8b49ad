use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, Key, SignedCookieJar};
use colored::Colorize;
use uuid::Uuid;

use crate::chat::{ChatError, ChatRelay};
use crate::logging::safe_truncate;
use crate::web::protocol::{ChatReply, ChatRequest, StatusReply};

/// Name of the signed session cookie.
pub const SESSION_COOKIE: &str = "session_id";

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ChatRelay>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}

/// Create router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/chat", post(chat))
        .route("/clear_history", post(clear_history))
        .with_state(state)
}

/// GET / - Serve the chat page
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../../web/index.html"))
}

/// POST /chat - Relay one exchange to the model
async fn chat(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(payload): Json<ChatRequest>,
) -> Response {
    // First contact gets a fresh session. The cookie rides the response
    // whether the exchange succeeds or not, so the credential is
    // established even when validation rejects the input.
    let (jar, session_id) = resolve_session(jar);

    let result = state
        .relay
        .handle_turn(
            &session_id,
            payload.message.as_deref(),
            payload.image_data.as_deref(),
        )
        .await;

    match result {
        Ok(reply) => (jar, Json(ChatReply { reply })).into_response(),
        Err(err) => (jar, AppError::from(err)).into_response(),
    }
}

/// POST /clear_history - Erase the session's stored turns
async fn clear_history(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Json<StatusReply>, AppError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        // No credential means nothing to clear.
        return Err(AppError::NoSession);
    };

    state.relay.clear_history(cookie.value())?;
    Ok(Json(StatusReply::success()))
}

/// Reuse the session id from a valid signed cookie, or mint a new one.
fn resolve_session(jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let session_id = cookie.value().to_string();
        return (jar, session_id);
    }

    let session_id = Uuid::new_v4().simple().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, session_id.clone()))
        .path("/")
        .http_only(true)
        .build();
    (jar.add(cookie), session_id)
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    Chat(ChatError),
    NoSession,
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        AppError::Chat(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let chat_err = match self {
            AppError::NoSession => {
                return (StatusCode::BAD_REQUEST, Json(StatusReply::error())).into_response();
            }
            AppError::Chat(err) => err,
        };

        let (status, message) = match &chat_err {
            ChatError::EmptyInput | ChatError::MalformedImage => {
                (StatusCode::BAD_REQUEST, chat_err.to_string())
            }
            // Detail stays in the server log; the client gets a generic line.
            ChatError::Upstream(_) | ChatError::Storage(_) => {
                eprintln!(
                    "{} request failed: {}",
                    "❌".red(),
                    safe_truncate(&chat_err.to_string(), 500)
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while processing your request.".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}
