// Fixed instruction text for the generation pipeline.
// Both calls use exact, stable wording — the scene instruction asks for a
// ready-to-use generation prompt, the compose instruction embeds it verbatim.

/// Instruction for the scene-description call. Asks for a short, technically
/// detailed prompt covering environment, lighting, atmosphere, and camera
/// characteristics, explicitly excluding any people in the image.
pub const SCENE_DESCRIBE_INSTRUCTION: &str = "give a short description of the background \
    and scene in the image. focus on environment, lighting conditions, atmosphere, and \
    technical details such as camera and lens. avoid describing people or humans in the \
    image. create a detailed prompt for AI image generation that I can use. start directly \
    with the prompt without explanation. keep the prompt short but technically detailed.";

/// Builds the composition instruction with the scene prompt embedded verbatim.
pub fn compose_instruction(scene_prompt: &str) -> String {
    format!(
        "Take the person from the provided image and place them seamlessly into the scene \
        described in the following prompt. The final image should be photorealistic, with \
        lighting, shadows, and style that perfectly match the scene.\n\nScene Prompt: {scene_prompt}"
    )
}
