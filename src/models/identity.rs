use serde::{Deserialize, Serialize};

use super::enums::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub experience: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub primary_contact: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_timestamp: Option<String>,
}

/// The signed-in user. The `role` field of the login payload selects
/// the variant, and is written back when the identity is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum SessionIdentity {
    Doctor(Doctor),
    Patient(Patient),
}

impl SessionIdentity {
    pub fn role(&self) -> Role {
        match self {
            SessionIdentity::Doctor(_) => Role::Doctor,
            SessionIdentity::Patient(_) => Role::Patient,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SessionIdentity::Doctor(d) => &d.id,
            SessionIdentity::Patient(p) => &p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SessionIdentity::Doctor(d) => &d.name,
            SessionIdentity::Patient(p) => &p.name,
        }
    }

    pub fn as_doctor(&self) -> Option<&Doctor> {
        match self {
            SessionIdentity::Doctor(d) => Some(d),
            SessionIdentity::Patient(_) => None,
        }
    }

    pub fn as_patient(&self) -> Option<&Patient> {
        match self {
            SessionIdentity::Patient(p) => Some(p),
            SessionIdentity::Doctor(_) => None,
        }
    }
}
