use std::sync::{Arc, Mutex};

use sitetrack_core::design_form::{CreateDesignForm, DesignForm, UpdateDesignForm};
use sitetrack_store::{get_json, put_json, SnapshotStore, DESIGN_STORAGE};
use tracing::warn;

use crate::lock;

/// Design-form submissions, one record per generated id.
///
/// The task relationship is a lookup, not an ownership key: `add_form`
/// never dedupes on task id, and `form_by_task_id` scans for the first
/// match, which is treated as canonical if duplicates exist.
#[derive(Clone)]
pub struct DesignFormStore {
    store: Arc<dyn SnapshotStore>,
    inner: Arc<Mutex<Vec<DesignForm>>>,
}

impl DesignFormStore {
    pub async fn load(store: Arc<dyn SnapshotStore>) -> Self {
        let forms = match get_json::<Vec<DesignForm>>(store.as_ref(), DESIGN_STORAGE).await {
            Ok(Some(forms)) => forms,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("design-form rehydration failed, starting empty: {e}");
                Vec::new()
            }
        };
        Self {
            store,
            inner: Arc::new(Mutex::new(forms)),
        }
    }

    /// Append a new record with a fresh id and creation timestamp.
    /// Returns the stored record.
    pub async fn add_form(&self, input: CreateDesignForm) -> DesignForm {
        let form = DesignForm::from_input(input);
        lock(&self.inner).push(form.clone());
        self.persist().await;
        form
    }

    /// Merge a patch into the record matching `id` (not task id).
    /// Returns the updated record, or `None` when no record has that id.
    pub async fn update_form(&self, id: &str, patch: UpdateDesignForm) -> Option<DesignForm> {
        let updated = {
            let mut forms = lock(&self.inner);
            forms.iter_mut().find(|f| f.id == id).map(|form| {
                form.apply(patch);
                form.clone()
            })
        };
        if updated.is_some() {
            self.persist().await;
        }
        updated
    }

    /// First record whose task id matches, or `None`. Total.
    pub fn form_by_task_id(&self, task_id: &str) -> Option<DesignForm> {
        lock(&self.inner)
            .iter()
            .find(|f| f.task_id == task_id)
            .cloned()
    }

    pub async fn delete_form(&self, id: &str) {
        lock(&self.inner).retain(|f| f.id != id);
        self.persist().await;
    }

    pub async fn clear_all(&self) {
        lock(&self.inner).clear();
        self.persist().await;
    }

    pub fn forms(&self) -> Vec<DesignForm> {
        lock(&self.inner).clone()
    }

    async fn persist(&self) {
        let forms = lock(&self.inner).clone();
        if let Err(e) = put_json(self.store.as_ref(), DESIGN_STORAGE, &forms).await {
            warn!("persist design forms: {e}");
        }
    }
}
