// Generation pipeline: encoding, retry scheduling, scene description,
// composition, and the run state machine.
// All model calls go through gemini_client — no direct HTTP here.

pub mod compositor;
pub mod describer;
pub mod encoder;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod retry;
