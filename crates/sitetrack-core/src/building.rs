use serde::{Deserialize, Serialize};

/// One building of a project, as returned by the buildings endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub units: Vec<String>,
}
