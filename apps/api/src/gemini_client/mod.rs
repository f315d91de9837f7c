/// Gemini Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All generation calls MUST go through this module, behind the
/// `GenerativeModel` trait so the pipeline can be tested against fakes.
///
/// Models are hardcoded — do not make configurable to prevent drift.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Text model used for scene description.
pub const DESCRIBE_MODEL: &str = "gemini-2.5-flash";
/// Multimodal model used for person-into-scene composition.
pub const COMPOSE_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no usable payload")]
    EmptyResponse,
}

/// A base64-encoded image body plus its content type, as sent on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinePayload {
    pub mime_type: String,
    pub data: String,
}

/// One unit of a multimodal response. Carries text, inline binary data, or
/// (for unrecognized part kinds) neither.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineResponseData>,
}

/// Inline binary data on a response part. The API may omit the mime type;
/// callers decide the default.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineResponseData {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

/// The remote generation capability: one call to describe an image as text,
/// one call to compose a new image from an image plus instruction text.
/// Single-shot — retry policy belongs to the caller (`pipeline::retry`).
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn describe(
        &self,
        image: &InlinePayload,
        instruction: &str,
    ) -> Result<String, ModelError>;

    async fn compose(
        &self,
        image: &InlinePayload,
        instruction: &str,
    ) -> Result<Vec<ResponsePart>, ModelError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (generateContent REST shapes, camelCase)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

/// Externally tagged: serializes as `{"inlineData": {...}}` or `{"text": "..."}`.
#[derive(Debug, Serialize)]
enum RequestPart<'a> {
    #[serde(rename = "inlineData")]
    InlineData(&'a InlinePayload),
    #[serde(rename = "text")]
    Text(&'a str),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single Gemini client used by the pipeline.
/// Wraps the generateContent REST endpoint; one request per call, no retries
/// here — the retry scheduler owns the attempt loop.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest<'_>,
    ) -> Result<Vec<ResponsePart>, ModelError> {
        let url = format!("{}/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the structured error message
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;

        let parts = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        debug!("Gemini call succeeded: model={model}, parts={}", parts.len());

        Ok(parts)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn describe(
        &self,
        image: &InlinePayload,
        instruction: &str,
    ) -> Result<String, ModelError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart::InlineData(image), RequestPart::Text(instruction)],
            }],
            generation_config: None,
        };

        let parts = self.generate_content(DESCRIBE_MODEL, &request).await?;

        parts
            .into_iter()
            .find_map(|p| p.text)
            .ok_or(ModelError::EmptyResponse)
    }

    async fn compose(
        &self,
        image: &InlinePayload,
        instruction: &str,
    ) -> Result<Vec<ResponsePart>, ModelError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart::InlineData(image), RequestPart::Text(instruction)],
            }],
            // The image-preview model rejects image-only requests; both
            // modalities must be declared.
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE", "TEXT"],
            }),
        };

        self.generate_content(COMPOSE_MODEL, &request).await
    }
}
