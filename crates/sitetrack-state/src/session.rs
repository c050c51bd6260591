use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use sitetrack_store::{get_json, put_json, SnapshotStore, SESSION_STORAGE};
use tracing::warn;

use crate::lock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionSnapshot {
    token: Option<String>,
}

/// Process-wide auth state: `{Anonymous} --login--> {Authenticated}
/// --logout--> {Anonymous}`. Gates every other context.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SnapshotStore>,
    inner: Arc<Mutex<SessionSnapshot>>,
}

impl SessionContext {
    /// Rehydrate from the session snapshot. Any rehydration failure
    /// (missing key, unreadable bytes, undecodable JSON) yields the
    /// anonymous default.
    pub async fn load(store: Arc<dyn SnapshotStore>) -> Self {
        let snap = match get_json::<SessionSnapshot>(store.as_ref(), SESSION_STORAGE).await {
            Ok(Some(snap)) => snap,
            Ok(None) => SessionSnapshot::default(),
            Err(e) => {
                warn!("session rehydration failed, starting anonymous: {e}");
                SessionSnapshot::default()
            }
        };
        Self {
            store,
            inner: Arc::new(Mutex::new(snap)),
        }
    }

    pub fn token(&self) -> Option<String> {
        lock(&self.inner).token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.inner).token.is_some()
    }

    /// Set the token unconditionally and persist.
    pub async fn login(&self, token: String) {
        lock(&self.inner).token = Some(token);
        self.persist().await;
    }

    /// Clear the token and persist.
    ///
    /// Does NOT touch the project, step, location or design-form
    /// contexts. Callers that want a full reset cascade explicitly (see
    /// `ClientContexts::logout` in sitetrack-client); keeping the
    /// primitive non-cascading lets a session-expired banner appear
    /// without losing navigation state.
    pub async fn logout(&self) {
        lock(&self.inner).token = None;
        self.persist().await;
    }

    async fn persist(&self) {
        let snap = lock(&self.inner).clone();
        if let Err(e) = put_json(self.store.as_ref(), SESSION_STORAGE, &snap).await {
            warn!("persist session: {e}");
        }
    }
}
