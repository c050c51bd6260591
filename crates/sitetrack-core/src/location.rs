use serde::{Deserialize, Serialize};

/// Snapshot of the building → level → unit drill-down path.
/// Fields below a selected tier are always `None` for fresh selections;
/// see the cascade rules on `LocationContext`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub building_id: Option<String>,
    pub building_name: Option<String>,
    pub level_id: Option<String>,
    pub level_name: Option<String>,
    pub unit_name: Option<String>,
}

impl LocationSnapshot {
    pub fn is_empty(&self) -> bool {
        self.building_id.is_none()
            && self.building_name.is_none()
            && self.level_id.is_none()
            && self.level_name.is_none()
            && self.unit_name.is_none()
    }
}
