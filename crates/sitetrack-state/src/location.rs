use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sitetrack_core::location::LocationSnapshot;
use sitetrack_store::{
    get_json, put_json, SnapshotStore, FINISHES_IDS_STORAGE, STEP_DATA_STORAGE,
    TASK_CATEGORY_STORAGE,
};
use tracing::warn;

use crate::lock;

#[derive(Default)]
struct Inner {
    fields: LocationSnapshot,
    progress_ids: HashMap<String, String>,
    task_ids: HashMap<String, String>,
}

/// Drill-down path within a phase: building → level → unit, plus the
/// derived progress-id and task-id lookup maps.
///
/// The cascade invariant is enforced here, not left to callers:
/// selecting a building resets level and unit, selecting a level resets
/// unit. A stale unit can therefore never survive against a new level.
#[derive(Clone)]
pub struct LocationContext {
    store: Arc<dyn SnapshotStore>,
    inner: Arc<Mutex<Inner>>,
}

impl LocationContext {
    pub async fn load(store: Arc<dyn SnapshotStore>) -> Self {
        let fields = match get_json::<LocationSnapshot>(store.as_ref(), STEP_DATA_STORAGE).await
        {
            Ok(Some(fields)) => fields,
            Ok(None) => LocationSnapshot::default(),
            Err(e) => {
                warn!("location rehydration failed, starting empty: {e}");
                LocationSnapshot::default()
            }
        };
        let progress_ids = load_map(store.as_ref(), FINISHES_IDS_STORAGE).await;
        let task_ids = load_map(store.as_ref(), TASK_CATEGORY_STORAGE).await;
        Self {
            store,
            inner: Arc::new(Mutex::new(Inner {
                fields,
                progress_ids,
                task_ids,
            })),
        }
    }

    // -- Cascade setters --

    /// Select a building. Resets the level and unit below it.
    pub async fn set_selected_building(&self, id: Option<String>, name: Option<String>) {
        {
            let mut inner = lock(&self.inner);
            inner.fields.building_id = id;
            inner.fields.building_name = name;
            inner.fields.level_id = None;
            inner.fields.level_name = None;
            inner.fields.unit_name = None;
        }
        self.persist_fields().await;
    }

    /// Select a level. Resets the unit below it.
    pub async fn set_selected_level(&self, id: Option<String>, name: Option<String>) {
        {
            let mut inner = lock(&self.inner);
            inner.fields.level_id = id;
            inner.fields.level_name = name;
            inner.fields.unit_name = None;
        }
        self.persist_fields().await;
    }

    pub async fn set_selected_unit_name(&self, name: Option<String>) {
        lock(&self.inner).fields.unit_name = name;
        self.persist_fields().await;
    }

    /// Snapshot of all five drill-down fields.
    pub fn current_location(&self) -> LocationSnapshot {
        lock(&self.inner).fields.clone()
    }

    // -- Derived lookup maps --

    pub async fn set_progress_id(&self, key: String, id: String) {
        lock(&self.inner).progress_ids.insert(key, id);
        self.persist_progress_ids().await;
    }

    pub fn progress_id(&self, key: &str) -> Option<String> {
        lock(&self.inner).progress_ids.get(key).cloned()
    }

    pub async fn set_task_id(&self, key: String, id: String) {
        lock(&self.inner).task_ids.insert(key, id);
        self.persist_task_ids().await;
    }

    pub fn task_id(&self, key: &str) -> Option<String> {
        lock(&self.inner).task_ids.get(key).cloned()
    }

    // -- Scoped clears --

    /// Clear the whole drill-down path and both lookup maps.
    pub async fn clear_location_data(&self) {
        {
            let mut inner = lock(&self.inner);
            inner.fields = LocationSnapshot::default();
            inner.progress_ids.clear();
            inner.task_ids.clear();
        }
        self.persist_fields().await;
        self.persist_progress_ids().await;
        self.persist_task_ids().await;
    }

    /// Clear the building tier; level and unit go with it.
    pub async fn clear_building_selection(&self) {
        {
            let mut inner = lock(&self.inner);
            inner.fields = LocationSnapshot::default();
        }
        self.persist_fields().await;
    }

    /// Clear the level tier; the unit goes with it.
    pub async fn clear_level_selection(&self) {
        {
            let mut inner = lock(&self.inner);
            inner.fields.level_id = None;
            inner.fields.level_name = None;
            inner.fields.unit_name = None;
        }
        self.persist_fields().await;
    }

    pub async fn clear_unit_selection(&self) {
        lock(&self.inner).fields.unit_name = None;
        self.persist_fields().await;
    }

    async fn persist_fields(&self) {
        let fields = lock(&self.inner).fields.clone();
        if let Err(e) = put_json(self.store.as_ref(), STEP_DATA_STORAGE, &fields).await {
            warn!("persist location fields: {e}");
        }
    }

    async fn persist_progress_ids(&self) {
        let map = lock(&self.inner).progress_ids.clone();
        if let Err(e) = put_json(self.store.as_ref(), FINISHES_IDS_STORAGE, &map).await {
            warn!("persist progress ids: {e}");
        }
    }

    async fn persist_task_ids(&self) {
        let map = lock(&self.inner).task_ids.clone();
        if let Err(e) = put_json(self.store.as_ref(), TASK_CATEGORY_STORAGE, &map).await {
            warn!("persist task ids: {e}");
        }
    }
}

async fn load_map(store: &dyn SnapshotStore, key: &str) -> HashMap<String, String> {
    match get_json::<HashMap<String, String>>(store, key).await {
        Ok(Some(map)) => map,
        Ok(None) => HashMap::new(),
        Err(e) => {
            warn!("{key} rehydration failed, starting empty: {e}");
            HashMap::new()
        }
    }
}
