use serde::{Deserialize, Serialize};

use super::Keyed;

/// A past condition in the patient's medical history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl Keyed for HistoryItem {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewHistoryItem {
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}
