//! Compositor — places the person into the described scene via the multimodal
//! compose call and extracts the image from the response parts.

use crate::errors::AppError;
use crate::gemini_client::{GenerativeModel, ModelError, ResponsePart};
use crate::pipeline::encoder::{data_uri, ImageAsset};
use crate::pipeline::prompts::compose_instruction;
use crate::pipeline::retry::run_with_retry;

/// Content type assumed when the model returns image data without one.
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// The final composite: base64 payload plus content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeImage {
    pub mime_type: String,
    pub data: String,
}

impl CompositeImage {
    pub fn to_data_uri(&self) -> String {
        data_uri(&self.mime_type, &self.data)
    }
}

/// Composes the person image into the scene described by `scene_prompt`.
///
/// A transport-successful response with no inline image part counts as a
/// failed attempt and feeds the same retry loop as transport errors.
pub async fn compose_person(
    model: &dyn GenerativeModel,
    scene_prompt: &str,
    person: &ImageAsset,
) -> Result<CompositeImage, AppError> {
    let payload = person.to_inline();
    let instruction = compose_instruction(scene_prompt);

    run_with_retry("compose", || async {
        let parts = model.compose(&payload, &instruction).await?;
        first_inline_image(parts).ok_or(ModelError::EmptyResponse)
    })
    .await
    .map_err(|e| AppError::Composition(e.to_string()))
}

/// First part carrying inline image data, in response order.
fn first_inline_image(parts: Vec<ResponsePart>) -> Option<CompositeImage> {
    parts.into_iter().find_map(|part| {
        part.inline_data.map(|inline| CompositeImage {
            mime_type: inline
                .mime_type
                .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
            data: inline.data,
        })
    })
}
