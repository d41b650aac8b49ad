use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;

static DATA_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:(image/[^;]+);base64,(.+)$").expect("valid regex"));

/// Split a `data:image/...;base64,...` URL into its MIME type and decoded
/// bytes. Returns `None` for anything that doesn't match that exact shape,
/// including payloads that aren't valid base64.
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let captures = DATA_URL_RE.captures(url)?;
    let mime_type = captures[1].to_string();
    let data = STANDARD.decode(&captures[2]).ok()?;
    Some((mime_type, data))
}
