use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use sitetrack_core::step::StepDescriptor;
use sitetrack_store::{get_json, put_json, SnapshotStore, PROJECT_STORAGE};
use tracing::{debug, warn};

use crate::lock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProjectSnapshot {
    project_id: Option<String>,
    project_data: Option<serde_json::Value>,
    #[serde(default)]
    step_types: Vec<StepDescriptor>,
    step_type: Option<String>,
    step_id: Option<String>,
    design_id: Option<String>,
}

struct Inner {
    snap: ProjectSnapshot,
    /// Latest issued step-fetch generation. Only a commit carrying this
    /// value may replace `step_types`; late responses from superseded
    /// fetches are discarded.
    fetch_gen: u64,
}

/// Currently chosen project plus the subordinate step (phase) selection.
///
/// `step_types` is only meaningful while `project_id` points at the
/// project it was fetched for; nothing here invalidates it when the
/// project changes — callers clear explicitly, as the flows in
/// sitetrack-client do.
#[derive(Clone)]
pub struct ProjectContext {
    store: Arc<dyn SnapshotStore>,
    inner: Arc<Mutex<Inner>>,
}

impl ProjectContext {
    pub async fn load(store: Arc<dyn SnapshotStore>) -> Self {
        let snap = match get_json::<ProjectSnapshot>(store.as_ref(), PROJECT_STORAGE).await {
            Ok(Some(snap)) => snap,
            Ok(None) => ProjectSnapshot::default(),
            Err(e) => {
                warn!("project rehydration failed, starting empty: {e}");
                ProjectSnapshot::default()
            }
        };
        Self {
            store,
            inner: Arc::new(Mutex::new(Inner { snap, fetch_gen: 0 })),
        }
    }

    // -- Project selection --

    pub fn selected_project_id(&self) -> Option<String> {
        lock(&self.inner).snap.project_id.clone()
    }

    pub fn project_data(&self) -> Option<serde_json::Value> {
        lock(&self.inner).snap.project_data.clone()
    }

    /// Pure state set; no validation that `id` names a known project.
    pub async fn set_selected_project_id(&self, id: Option<String>) {
        lock(&self.inner).snap.project_id = id;
        self.persist().await;
    }

    pub async fn set_project_data(&self, data: Option<serde_json::Value>) {
        lock(&self.inner).snap.project_data = data;
        self.persist().await;
    }

    // -- Step types --

    pub fn step_types(&self) -> Vec<StepDescriptor> {
        lock(&self.inner).snap.step_types.clone()
    }

    /// Replace the step-type list wholesale, bypassing the generation
    /// guard. Prefer `begin_step_fetch` + `commit_step_types` for
    /// anything fed by a network response.
    pub async fn set_project_step_types(&self, list: Vec<StepDescriptor>) {
        {
            let mut inner = lock(&self.inner);
            inner.snap.step_types = list;
        }
        self.persist().await;
    }

    /// Issue a new fetch generation. The returned token must accompany
    /// the eventual `commit_step_types` for that fetch.
    pub fn begin_step_fetch(&self) -> u64 {
        let mut inner = lock(&self.inner);
        inner.fetch_gen += 1;
        inner.fetch_gen
    }

    /// Apply a fetched step-type list if `gen` is still the latest
    /// issued generation. Returns whether the commit was applied; a
    /// stale response is discarded so a slower, older fetch can never
    /// overwrite the list a newer fetch installed.
    pub async fn commit_step_types(&self, gen: u64, list: Vec<StepDescriptor>) -> bool {
        let applied = {
            let mut inner = lock(&self.inner);
            if gen == inner.fetch_gen {
                inner.snap.step_types = list;
                true
            } else {
                debug!(
                    "discarding stale step-types commit (gen {gen}, current {})",
                    inner.fetch_gen
                );
                false
            }
        };
        if applied {
            self.persist().await;
        }
        applied
    }

    // -- Step selection (subordinate, colocated) --

    pub fn selected_step_type(&self) -> Option<String> {
        lock(&self.inner).snap.step_type.clone()
    }

    pub fn selected_step_id(&self) -> Option<String> {
        lock(&self.inner).snap.step_id.clone()
    }

    pub async fn set_selected_step_type(&self, step_type: Option<String>) {
        lock(&self.inner).snap.step_type = step_type;
        self.persist().await;
    }

    pub async fn set_selected_step_id(&self, step_id: Option<String>) {
        lock(&self.inner).snap.step_id = step_id;
        self.persist().await;
    }

    pub fn design_id(&self) -> Option<String> {
        lock(&self.inner).snap.design_id.clone()
    }

    pub async fn set_design_id(&self, id: Option<String>) {
        lock(&self.inner).snap.design_id = id;
        self.persist().await;
    }

    /// Promote the head of the step-type list into the active step
    /// selection. This is the default-selection policy applied after a
    /// fetch, before any user interaction; a tap on a different card
    /// overrides it. No-op on an empty list.
    pub async fn promote_first_step_as_default(&self) {
        let changed = {
            let mut inner = lock(&self.inner);
            match inner.snap.step_types.first().cloned() {
                Some(first) => {
                    inner.snap.step_type = Some(first.step_type);
                    inner.snap.step_id = Some(first.step_id);
                    true
                }
                None => false,
            }
        };
        if changed {
            self.persist().await;
        }
    }

    // -- Total lookups --

    /// Find a step descriptor whose `step_id` OR `record_id` matches.
    /// First match wins; a miss is `None`, never an error.
    pub fn step_type_by_id(&self, id: &str) -> Option<StepDescriptor> {
        lock(&self.inner)
            .snap
            .step_types
            .iter()
            .find(|s| s.step_id == id || s.record_id == id)
            .cloned()
    }

    /// Find a step descriptor by its `step_type` string. Total.
    pub fn step_type_by_kind(&self, step_type: &str) -> Option<StepDescriptor> {
        lock(&self.inner)
            .snap
            .step_types
            .iter()
            .find(|s| s.step_type == step_type)
            .cloned()
    }

    // -- Clears --

    /// Clear only the step selection, keeping project-level data so a
    /// project can be re-entered without refetching.
    pub async fn clear_step_selection(&self) {
        {
            let mut inner = lock(&self.inner);
            inner.snap.step_type = None;
            inner.snap.step_id = None;
        }
        self.persist().await;
    }

    /// Reset every project-scoped field. The full cross-context reset
    /// (including location state) lives on `ClientContexts`, which also
    /// clears the location context; this handles everything persisted
    /// under the project snapshot.
    pub async fn clear_project_data(&self) {
        {
            let mut inner = lock(&self.inner);
            inner.snap = ProjectSnapshot::default();
        }
        self.persist().await;
    }

    async fn persist(&self) {
        let snap = lock(&self.inner).snap.clone();
        if let Err(e) = put_json(self.store.as_ref(), PROJECT_STORAGE, &snap).await {
            warn!("persist project: {e}");
        }
    }
}
