//! Inference engine boundary.
//!
//! The scanner never executes a network itself. It hands a `[1, 3, H, W]`
//! tensor to an [`InferenceEngine`] and reads back named outputs.

use crate::encoding::Tensor;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors reported by an inference engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("failed to load model {model}: {reason}")]
    LoadFailed { model: String, reason: String },
    #[error("inference run failed: {0}")]
    RunFailed(String),
}

/// How the engine should load the model artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// URL or filesystem path of the model artifact.
    pub model_url: String,
    /// Execution provider name (engine specific).
    pub execution_provider: String,
    /// Graph optimization level (engine specific).
    pub optimization_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_url: "/models/yolo-elements.onnx".to_string(),
            execution_provider: "wasm".to_string(),
            optimization_level: "all".to_string(),
        }
    }
}

/// Named output tensors in the order the engine produced them.
#[derive(Debug, Clone, Default)]
pub struct SessionOutputs {
    outputs: Vec<(String, Tensor)>,
}

impl SessionOutputs {
    /// An empty output set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named output.
    pub fn insert(&mut self, name: impl Into<String>, tensor: Tensor) {
        self.outputs.push((name.into(), tensor));
    }

    /// Looks up an output by name.
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// The detection head: `output0`, else `output`, else the first output.
    pub fn primary(&self) -> Option<&Tensor> {
        self.get("output0")
            .or_else(|| self.get("output"))
            .or_else(|| self.outputs.first().map(|(_, t)| t))
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// An engine able to load a model and run it on one input tensor.
///
/// `Session` is the engine's opaque loaded-model handle.
pub trait InferenceEngine {
    type Session: Send + Sync;

    /// Loads the model described by `config`.
    fn load(
        &self,
        config: &EngineConfig,
    ) -> impl Future<Output = Result<Self::Session, EngineError>> + Send;

    /// Runs the session with a single named input.
    fn run(
        &self,
        session: &Self::Session,
        input_name: &str,
        input: Tensor,
    ) -> impl Future<Output = Result<SessionOutputs, EngineError>> + Send;

    /// Frees the session's resources.
    fn release(&self, session: Self::Session) -> impl Future<Output = ()> + Send;
}

/// Engine returning a fixed output, for demos and tests.
///
/// Every run yields the configured tensor under the name `output0`.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    output: Option<Tensor>,
    fail_load: bool,
    fail_run: bool,
    load_delay: Duration,
    run_delay: Duration,
    loads: AtomicUsize,
    runs: AtomicUsize,
    releases: AtomicUsize,
}

/// Handle produced by [`ScriptedEngine::load`].
#[derive(Debug)]
pub struct ScriptedSession {
    pub model_url: String,
}

impl ScriptedEngine {
    /// An engine whose runs return `output`.
    pub fn with_output(output: Tensor) -> Self {
        Self {
            output: Some(output),
            ..Self::default()
        }
    }

    /// An engine whose runs return no outputs at all.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Makes every load fail.
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Makes every run fail.
    pub fn failing_run(mut self) -> Self {
        self.fail_run = true;
        self
    }

    /// Delays loads, to exercise concurrent load requests.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Delays runs, to exercise a release racing an in-flight run.
    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = delay;
        self
    }

    /// Number of load attempts so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of runs so far, including failed ones.
    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Number of sessions released.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl InferenceEngine for ScriptedEngine {
    type Session = ScriptedSession;

    async fn load(&self, config: &EngineConfig) -> Result<ScriptedSession, EngineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        if self.fail_load {
            return Err(EngineError::LoadFailed {
                model: config.model_url.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(ScriptedSession {
            model_url: config.model_url.clone(),
        })
    }

    async fn run(
        &self,
        _session: &ScriptedSession,
        input_name: &str,
        input: Tensor,
    ) -> Result<SessionOutputs, EngineError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if !self.run_delay.is_zero() {
            tokio::time::sleep(self.run_delay).await;
        }
        if self.fail_run {
            return Err(EngineError::RunFailed("scripted failure".to_string()));
        }
        tracing::trace!(input_name, dims = ?input.dims(), "Scripted inference run");

        let mut outputs = SessionOutputs::new();
        if let Some(output) = &self.output {
            outputs.insert("output0", output.clone());
        }
        Ok(outputs)
    }

    async fn release(&self, _session: ScriptedSession) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
