//! Binary Encoder — turns a locally held image into its transmissible form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use crate::gemini_client::InlinePayload;

/// A user-selected image: raw bytes plus the upload's declared content type.
/// Owned exclusively by the orchestrator; dropped when replaced or on reset.
/// Clones are cheap — `Bytes` is reference-counted.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl ImageAsset {
    pub fn new(bytes: Bytes, mime_type: String) -> Self {
        Self { bytes, mime_type }
    }

    /// Encodes the full byte body as standard base64 for transmission.
    pub fn to_inline(&self) -> InlinePayload {
        InlinePayload {
            mime_type: self.mime_type.clone(),
            data: STANDARD.encode(&self.bytes),
        }
    }
}

/// Builds the self-contained `data:` URI handed to the presentation layer,
/// suitable for direct display or download.
pub fn data_uri(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{mime_type};base64,{base64_payload}")
}
