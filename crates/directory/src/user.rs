use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenderflow_core::Username;

/// A user known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: Username,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    pub fn new(username: impl Into<Username>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            first_name: None,
            last_name: None,
        }
    }
}
