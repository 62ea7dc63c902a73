//! Screenshot payload decoding

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// MIME type assumed for raw base64 input
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// A base64 image ready to inline into a model request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    /// Base64 data without any data-URL header
    pub data: String,
}

impl ImagePayload {
    /// Accept either a `data:<mime>;base64,<data>` URL or raw base64
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("image data must not be empty".to_string());
        }

        let (mime_type, data) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| "data URL is missing its ',' separator".to_string())?;
                let params = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| "data URL must be base64-encoded".to_string())?;
                // Parameters such as charset follow the type
                let mime = params.split(';').next().unwrap_or(params);
                if !mime.starts_with("image/") {
                    return Err(format!("unsupported media type '{}'", mime));
                }
                (mime.to_string(), data)
            }
            None => (DEFAULT_IMAGE_MIME.to_string(), input),
        };

        if data.is_empty() {
            return Err("image data must not be empty".to_string());
        }
        STANDARD
            .decode(data)
            .map_err(|e| format!("invalid base64: {}", e))?;

        Ok(Self {
            mime_type,
            data: data.to_string(),
        })
    }
}
