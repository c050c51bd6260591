use serde::{Deserialize, Serialize};

/// Response body of the session-validation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionValidity {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
}
