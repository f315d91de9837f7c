//! Orchestrator — owns the uploaded image assets and drives one generation
//! run at a time: describe the scene, then compose the person into it.
//!
//! State machine: Idle → Analyzing → Composing → Succeeded | Failed, with an
//! explicit reset back to Idle. At most one run is in flight; there is no
//! cancellation — a started run proceeds to success or full retry exhaustion.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::gemini_client::GenerativeModel;
use crate::pipeline::compositor::compose_person;
use crate::pipeline::describer::describe_scene;
use crate::pipeline::encoder::ImageAsset;

/// Where the current run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Analyzing,
    Composing,
    Succeeded,
    Failed,
}

impl RunPhase {
    fn is_running(self) -> bool {
        matches!(self, RunPhase::Analyzing | RunPhase::Composing)
    }
}

/// Terminal output of one run. At most one exists at a time; starting a new
/// run clears the previous one.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineResult {
    Composite { data_uri: String },
    Failure { message: String },
}

#[derive(Debug, Default)]
struct RunState {
    phase: RunPhase,
    scene: Option<ImageAsset>,
    person: Option<ImageAsset>,
    result: Option<PipelineResult>,
}

/// Snapshot handed to the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub phase: RunPhase,
    pub has_scene: bool,
    pub has_person: bool,
    pub result: Option<PipelineResult>,
}

pub struct Orchestrator {
    model: Arc<dyn GenerativeModel>,
    // Never held across an await — locked briefly for each transition.
    state: Mutex<RunState>,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            state: Mutex::new(RunState::default()),
        }
    }

    /// Stores a newly selected scene image, dropping any previous one and
    /// clearing a stale result. Rejected while a run is in flight.
    pub fn set_scene(&self, asset: ImageAsset) -> Result<(), AppError> {
        self.set_asset(asset, true)
    }

    /// Same as [`Self::set_scene`], for the person image.
    pub fn set_person(&self, asset: ImageAsset) -> Result<(), AppError> {
        self.set_asset(asset, false)
    }

    fn set_asset(&self, asset: ImageAsset, is_scene: bool) -> Result<(), AppError> {
        let mut state = self.lock();
        if state.phase.is_running() {
            return Err(run_in_flight());
        }
        if is_scene {
            state.scene = Some(asset);
        } else {
            state.person = Some(asset);
        }
        state.result = None;
        state.phase = RunPhase::Idle;
        Ok(())
    }

    /// Drives one full run and returns the composite data URI.
    ///
    /// Requires both images (validation failure otherwise, no transition) and
    /// rejects a trigger while another run is in flight. Terminal failures
    /// land the machine in `Failed`; the user may reset and try again.
    pub async fn run(&self) -> Result<String, AppError> {
        let (scene, person) = self.begin()?;
        info!("Run started: analyzing scene ({} bytes)", scene.bytes.len());

        let scene_prompt = match describe_scene(self.model.as_ref(), &scene).await {
            Ok(prompt) => prompt,
            Err(e) => return Err(self.fail(e)),
        };

        info!(
            "Scene analysis complete ({} chars), composing person into scene",
            scene_prompt.len()
        );
        self.lock().phase = RunPhase::Composing;

        let composite = match compose_person(self.model.as_ref(), &scene_prompt, &person).await {
            Ok(image) => image,
            Err(e) => return Err(self.fail(e)),
        };

        let data_uri = composite.to_data_uri();
        let mut state = self.lock();
        state.phase = RunPhase::Succeeded;
        state.result = Some(PipelineResult::Composite {
            data_uri: data_uri.clone(),
        });
        info!("Run succeeded: composite is {}", composite.mime_type);

        Ok(data_uri)
    }

    /// Explicit reset: drop both assets and the result, back to `Idle`.
    /// Rejected while a run is in flight (no cancellation primitive).
    pub fn reset(&self) -> Result<(), AppError> {
        let mut state = self.lock();
        if state.phase.is_running() {
            return Err(run_in_flight());
        }
        *state = RunState::default();
        Ok(())
    }

    pub fn snapshot(&self) -> RunSnapshot {
        let state = self.lock();
        RunSnapshot {
            phase: state.phase,
            has_scene: state.scene.is_some(),
            has_person: state.person.is_some(),
            result: state.result.clone(),
        }
    }

    /// Validates inputs and claims the single run slot atomically.
    fn begin(&self) -> Result<(ImageAsset, ImageAsset), AppError> {
        let mut state = self.lock();
        if state.phase.is_running() {
            return Err(run_in_flight());
        }
        let scene = state.scene.clone().ok_or_else(|| {
            AppError::Validation("scene image is missing; upload it before generating".to_string())
        })?;
        let person = state.person.clone().ok_or_else(|| {
            AppError::Validation("person image is missing; upload it before generating".to_string())
        })?;
        state.result = None;
        state.phase = RunPhase::Analyzing;
        Ok((scene, person))
    }

    fn fail(&self, error: AppError) -> AppError {
        let mut state = self.lock();
        state.phase = RunPhase::Failed;
        state.result = Some(PipelineResult::Failure {
            message: error.to_string(),
        });
        error
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().expect("orchestrator state lock poisoned")
    }
}

fn run_in_flight() -> AppError {
    AppError::Conflict("a generation run is already in flight".to_string())
}
