//! Owned inference-session handle with an explicit lifecycle.
//!
//! `Uninitialized → Loading → Ready → Released`. Loads are serialized by a
//! guard so concurrent callers await the single in-flight load instead of
//! issuing their own. A failed load returns to `Uninitialized`; a released
//! session reloads on the next request.

use super::engine::{EngineConfig, EngineError, InferenceEngine, SessionOutputs};
use crate::encoding::Tensor;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
    Released,
}

enum Slot<S> {
    Uninitialized,
    Loading,
    Ready(Arc<S>),
    Released,
}

impl<S> Slot<S> {
    fn state(&self) -> SessionState {
        match self {
            Slot::Uninitialized => SessionState::Uninitialized,
            Slot::Loading => SessionState::Loading,
            Slot::Ready(_) => SessionState::Ready,
            Slot::Released => SessionState::Released,
        }
    }
}

/// A lazily loaded model session bound to one engine.
pub struct InferenceSession<E: InferenceEngine> {
    engine: E,
    config: EngineConfig,
    slot: Mutex<Slot<E::Session>>,
    /// Held for the duration of a load or release.
    load_guard: Mutex<()>,
    /// Shared by runs, exclusive for release. Always taken before `load_guard`.
    in_flight: RwLock<()>,
}

impl<E: InferenceEngine> InferenceSession<E> {
    /// An unloaded session; the model loads on first use.
    pub fn new(engine: E, config: EngineConfig) -> Self {
        Self {
            engine,
            config,
            slot: Mutex::new(Slot::Uninitialized),
            load_guard: Mutex::new(()),
            in_flight: RwLock::new(()),
        }
    }

    /// The engine this session loads with.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Model location and engine options.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        self.slot.lock().await.state()
    }

    async fn ready_handle(&self) -> Option<Arc<E::Session>> {
        match &*self.slot.lock().await {
            Slot::Ready(session) => Some(Arc::clone(session)),
            _ => None,
        }
    }

    /// Returns the loaded session, loading it first if needed.
    pub async fn ensure_ready(&self) -> Result<Arc<E::Session>, EngineError> {
        if let Some(session) = self.ready_handle().await {
            return Ok(session);
        }

        let _guard = self.load_guard.lock().await;
        // Another caller may have finished loading while we waited.
        if let Some(session) = self.ready_handle().await {
            return Ok(session);
        }

        *self.slot.lock().await = Slot::Loading;
        tracing::info!(
            model = %self.config.model_url,
            provider = %self.config.execution_provider,
            "Loading inference model"
        );

        match self.engine.load(&self.config).await {
            Ok(session) => {
                let session = Arc::new(session);
                *self.slot.lock().await = Slot::Ready(Arc::clone(&session));
                tracing::info!(model = %self.config.model_url, "Inference model loaded");
                Ok(session)
            }
            Err(e) => {
                *self.slot.lock().await = Slot::Uninitialized;
                tracing::warn!(error = %e, "Failed to load inference model");
                Err(e)
            }
        }
    }

    /// Runs the model on `input`, loading the session on first use.
    pub async fn run(&self, input_name: &str, input: Tensor) -> Result<SessionOutputs, EngineError> {
        let _running = self.in_flight.read().await;
        let session = self.ensure_ready().await?;
        self.engine.run(&session, input_name, input).await
    }

    /// Releases the loaded session once in-flight runs have finished.
    ///
    /// A handle still held by an [`ensure_ready`](Self::ensure_ready) caller
    /// is dropped without the engine's release hook.
    pub async fn release(&self) {
        let _idle = self.in_flight.write().await;
        let _guard = self.load_guard.lock().await;
        let previous = std::mem::replace(&mut *self.slot.lock().await, Slot::Released);

        match previous {
            Slot::Ready(session) => match Arc::try_unwrap(session) {
                Ok(session) => {
                    self.engine.release(session).await;
                    tracing::info!("Inference session released");
                }
                Err(_) => {
                    tracing::warn!("Inference session still in use; released without engine hook");
                }
            },
            other => {
                tracing::debug!(state = ?other.state(), "Release requested without a loaded session");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::engine::ScriptedEngine;
    use std::time::Duration;

    fn session(engine: ScriptedEngine) -> InferenceSession<ScriptedEngine> {
        InferenceSession::new(engine, EngineConfig::default())
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let session = session(ScriptedEngine::silent());
        assert_eq!(session.state().await, SessionState::Uninitialized);

        session.ensure_ready().await.unwrap();
        assert_eq!(session.state().await, SessionState::Ready);

        session.release().await;
        assert_eq!(session.state().await, SessionState::Released);
        assert_eq!(session.engine().release_count(), 1);
    }

    #[tokio::test]
    async fn test_loads_once() {
        let session = session(ScriptedEngine::silent());

        session.ensure_ready().await.unwrap();
        session.ensure_ready().await.unwrap();
        assert_eq!(session.engine().load_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_load() {
        let session =
            session(ScriptedEngine::silent().with_load_delay(Duration::from_millis(20)));

        let (a, b, c) = tokio::join!(
            session.ensure_ready(),
            session.ensure_ready(),
            session.ensure_ready()
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(session.engine().load_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_resets() {
        let session = session(ScriptedEngine::silent().failing_load());

        assert!(session.ensure_ready().await.is_err());
        assert_eq!(session.state().await, SessionState::Uninitialized);

        // A later request retries
        assert!(session.ensure_ready().await.is_err());
        assert_eq!(session.engine().load_count(), 2);
    }

    #[tokio::test]
    async fn test_reload_after_release() {
        let session = session(ScriptedEngine::silent());

        session.ensure_ready().await.unwrap();
        session.release().await;
        session.run("images", Tensor::new(vec![0.0], vec![1]).unwrap()).await.unwrap();

        assert_eq!(session.state().await, SessionState::Ready);
        assert_eq!(session.engine().load_count(), 2);
    }

    #[tokio::test]
    async fn test_release_waits_for_running_inference() {
        let session =
            session(ScriptedEngine::silent().with_run_delay(Duration::from_millis(30)));
        session.ensure_ready().await.unwrap();

        let (run, ()) = tokio::join!(
            session.run("images", Tensor::new(vec![0.0], vec![1]).unwrap()),
            async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                session.release().await;
            }
        );

        assert!(run.is_ok());
        assert_eq!(session.state().await, SessionState::Released);
        assert_eq!(session.engine().release_count(), 1);
    }

    #[tokio::test]
    async fn test_release_without_load() {
        let session = session(ScriptedEngine::silent());
        session.release().await;

        assert_eq!(session.state().await, SessionState::Released);
        assert_eq!(session.engine().release_count(), 0);
    }
}
