use serde::{Deserialize, Serialize};

use super::enums::AllergySeverity;
use super::Keyed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergy {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub severity: AllergySeverity,
}

impl Keyed for Allergy {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewAllergy {
    pub name: String,
    pub severity: AllergySeverity,
}
