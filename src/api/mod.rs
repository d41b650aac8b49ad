mod gemini;

pub use gemini::{GeminiClient, DEFAULT_API_URL};

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Part, Turn};

/// The external generative chat capability.
///
/// Prior turns plus the new input parts go in, reply text comes out. The
/// relay only ever talks to this trait, so tests swap in a canned double
/// and no vendor request shape leaks into the orchestration logic.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, history: &[Turn], parts: &[Part]) -> Result<String>;
}
