// Logging helpers - console lines plus opt-in upstream request dumps
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

/// Safely truncate a string to a maximum number of characters
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        // Reserve space for "..." suffix
        let trunc_chars = if max_chars >= 3 { max_chars - 3 } else { 0 };
        format!("{}...", s.chars().take(trunc_chars).collect::<String>())
    }
}

/// Request dumps are opt-in; prompts and image payloads only hit disk when
/// `NERDCHAT_LOG_REQUESTS=1`.
pub fn request_dumps_enabled() -> bool {
    env::var("NERDCHAT_LOG_REQUESTS").map(|v| v == "1").unwrap_or(false)
}

/// Write the outbound model request to a timestamped file under logs/.
/// No-op unless `NERDCHAT_LOG_REQUESTS=1`.
pub fn log_request_to_file(url: &str, request: &serde_json::Value) -> Result<()> {
    if !request_dumps_enabled() {
        return Ok(());
    }

    fs::create_dir_all("logs")?;

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let filename = format!("logs/req-{}.txt", timestamp);

    let mut log_content = String::new();
    log_content.push_str("HTTP REQUEST LOG (GEMINI)\n");
    log_content.push_str("=========================\n\n");
    log_content.push_str(&format!("Timestamp: {}\n", timestamp));
    log_content.push_str(&format!("URL: {}\n\n", url));

    log_content.push_str("Request Body:\n");
    match serde_json::to_string_pretty(request) {
        Ok(json) => {
            log_content.push_str(&json);
            log_content.push('\n');
        }
        Err(e) => {
            log_content.push_str(&format!("Error serializing request: {}\n", e));
        }
    }

    fs::write(&filename, log_content)
        .with_context(|| format!("Failed to write request log to {}", filename))?;

    Ok(())
}
