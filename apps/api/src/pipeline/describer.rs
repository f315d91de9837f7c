//! Scene Describer — asks the model for a generation-ready description of the
//! scene image.

use crate::errors::AppError;
use crate::gemini_client::GenerativeModel;
use crate::pipeline::encoder::ImageAsset;
use crate::pipeline::prompts::SCENE_DESCRIBE_INSTRUCTION;
use crate::pipeline::retry::run_with_retry;

/// Describes the scene image as a ready-to-use generation prompt.
/// The model's text comes back verbatim — no post-processing; the compositor
/// treats it as opaque prompt text.
pub async fn describe_scene(
    model: &dyn GenerativeModel,
    scene: &ImageAsset,
) -> Result<String, AppError> {
    let payload = scene.to_inline();

    run_with_retry("describe-scene", || {
        model.describe(&payload, SCENE_DESCRIBE_INSTRUCTION)
    })
    .await
    .map_err(|e| AppError::SceneAnalysis(e.to_string()))
}
