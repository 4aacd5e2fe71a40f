//! Registry of concurrent, independent sessions.

use crate::engine::Session;
use sentia_core::{EmotionClassifier, EngineError, Result, SessionConfig, TextGenerator, TurnRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Opaque handle returned by [`SessionManager::start_session`].
pub type SessionHandle = Uuid;

/// Sessions keyed by handle. Each session sits behind its own mutex, so turns
/// in different sessions run concurrently while turns within one session are
/// serialized. The registry lock is only held to look a session up.
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionHandle, Arc<Mutex<Session>>>>,
    classifier: Arc<dyn EmotionClassifier>,
    generator: Arc<dyn TextGenerator>,
}

impl SessionManager {
    pub fn new(classifier: Arc<dyn EmotionClassifier>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            classifier,
            generator,
        }
    }

    pub async fn start_session(&self, config: SessionConfig) -> Result<SessionHandle> {
        let session = Session::start(config, self.classifier.clone(), self.generator.clone())?;
        let handle = session.id();
        self.sessions
            .write()
            .await
            .insert(handle, Arc::new(Mutex::new(session)));
        Ok(handle)
    }

    async fn get(&self, handle: SessionHandle) -> Result<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .await
            .get(&handle)
            .cloned()
            .ok_or(EngineError::SessionNotFound(handle))
    }

    pub async fn submit_turn(&self, handle: SessionHandle, input: &str) -> Result<TurnRecord> {
        let session = self.get(handle).await?;
        let mut session = session.lock().await;
        session.submit_turn(input).await
    }

    pub async fn get_history(&self, handle: SessionHandle) -> Result<Vec<TurnRecord>> {
        let session = self.get(handle).await?;
        let session = session.lock().await;
        Ok(session.history().to_vec())
    }

    pub async fn reset_session(&self, handle: SessionHandle) -> Result<()> {
        let session = self.get(handle).await?;
        session.lock().await.reset();
        Ok(())
    }

    /// Remove a session. Its history is returned to the caller.
    pub async fn end_session(&self, handle: SessionHandle) -> Result<Vec<TurnRecord>> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&handle)
            .ok_or(EngineError::SessionNotFound(handle))?;
        let session = session.lock().await;
        tracing::info!(session = %handle, turns = session.history().len(), "Session ended");
        Ok(session.history().to_vec())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
