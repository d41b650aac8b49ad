//! One request cycle: validate input, decode the image, pull the history
//! window, call the model, persist the exchange.

pub mod image;

use std::sync::Arc;

use colored::Colorize;
use thiserror::Error;

use crate::api::GenerativeModel;
use crate::models::{Part, Role};
use crate::store::HistoryStore;

/// Stored in place of the message text for image-only turns. The image
/// bytes themselves are never persisted.
pub const IMAGE_PLACEHOLDER: &str = "[Image Uploaded]";

/// Default number of turns supplied to the model as prior context.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message or image cannot be empty.")]
    EmptyInput,
    #[error("Invalid image data URL format.")]
    MalformedImage,
    #[error("upstream model call failed: {0}")]
    Upstream(#[source] anyhow::Error),
    #[error("history storage failed: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Relays one conversation turn between a web client and the model.
///
/// Holds the two injected dependencies, the history store and the model
/// client, and the history window size.
pub struct ChatRelay {
    store: HistoryStore,
    model: Arc<dyn GenerativeModel>,
    history_limit: usize,
}

impl ChatRelay {
    pub fn new(store: HistoryStore, model: Arc<dyn GenerativeModel>, history_limit: usize) -> Self {
        Self {
            store,
            model,
            history_limit,
        }
    }

    /// Handle one `/chat` exchange for a session and return the reply text.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        message: Option<&str>,
        image_data: Option<&str>,
    ) -> Result<String, ChatError> {
        let message = message.unwrap_or("");
        let image_data = image_data.filter(|url| !url.is_empty());

        if message.is_empty() && image_data.is_none() {
            return Err(ChatError::EmptyInput);
        }

        // Image first, text second.
        let mut parts = Vec::new();
        if let Some(url) = image_data {
            let (mime_type, data) =
                image::decode_data_url(url).ok_or(ChatError::MalformedImage)?;
            parts.push(Part::InlineImage { mime_type, data });
        }
        if !message.is_empty() {
            parts.push(Part::Text(message.to_string()));
        }

        let history = self.store.load_recent(session_id, self.history_limit)?;

        let reply = self
            .model
            .generate(&history, &parts)
            .await
            .map_err(ChatError::Upstream)?;

        let user_content = if message.is_empty() {
            IMAGE_PLACEHOLDER
        } else {
            message
        };

        // The reply is already in hand; a failed write must not take it away.
        let stored = self
            .store
            .append(session_id, Role::User, user_content)
            .and_then(|()| self.store.append(session_id, Role::Model, &reply));
        if let Err(err) = stored {
            eprintln!(
                "{} failed to persist turns for session {}: {}",
                "⚠️".yellow(),
                session_id,
                err
            );
        }

        Ok(reply)
    }

    /// Erase a session's stored history.
    pub fn clear_history(&self, session_id: &str) -> Result<(), ChatError> {
        self.store.clear(session_id)?;
        Ok(())
    }
}
