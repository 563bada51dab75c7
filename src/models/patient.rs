use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Keyed;

/// Placeholder shown for demographic fields the record does not carry.
pub const NO_DATA: &str = "No data";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentInfo {
    #[serde(default)]
    pub current_diagnosis: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Full patient record as returned by `GET /api/patients/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub primary_contact: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub treatment_info: Option<TreatmentInfo>,
}

impl PatientRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn treatment(&self) -> TreatmentInfo {
        self.treatment_info.clone().unwrap_or_default()
    }

    /// Display rows for the personal-information tab.
    pub fn demographic_rows(&self) -> Vec<(&'static str, String)> {
        fn or_no_data(value: &Option<String>) -> String {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(NO_DATA)
                .to_string()
        }

        vec![
            ("Name", self.full_name()),
            (
                "Age",
                self.age.map(|a| a.to_string()).unwrap_or_else(|| NO_DATA.to_string()),
            ),
            ("Gender", or_no_data(&self.gender)),
            ("Blood Group", or_no_data(&self.blood_group)),
            ("Contact Number", or_no_data(&self.primary_contact)),
            ("Emergency Contact", or_no_data(&self.emergency_contact)),
        ]
    }
}

/// Row of the doctor's patient search table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub last_visit: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PatientSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Most recent activity: the record update wins over the visit date.
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_updated.or(self.last_visit)
    }

    pub fn last_seen_label(&self) -> String {
        self.last_seen()
            .map(|ts| ts.format("%B %-d, %Y at %I:%M %p").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("N/A")
    }
}

impl Keyed for PatientSummary {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Body of `PUT /api/patients/:id` for demographics. Unset fields are
/// left out of the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
}

impl PatientUpdate {
    pub fn is_empty(&self) -> bool {
        self == &PatientUpdate::default()
    }
}

/// Editable text fields of the personal-information tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemographicsForm {
    pub age: String,
    pub gender: String,
    pub blood_group: String,
    pub primary_contact: String,
    pub emergency_contact: String,
}

impl DemographicsForm {
    /// Pre-fill the form from the record being edited.
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            age: record.age.map(|a| a.to_string()).unwrap_or_default(),
            gender: record.gender.clone().unwrap_or_default(),
            blood_group: record.blood_group.clone().unwrap_or_default(),
            primary_contact: record.primary_contact.clone().unwrap_or_default(),
            emergency_contact: record.emergency_contact.clone().unwrap_or_default(),
        }
    }
}

/// Body of `PUT /api/patients/:id` for the treatment tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentUpdate {
    pub current_diagnosis: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_tolerates_missing_optional_fields() {
        let json = serde_json::json!({ "_id": "p1", "firstName": "Jane", "lastName": "Doe" });
        let record: PatientRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.full_name(), "Jane Doe");
        assert_eq!(record.treatment(), TreatmentInfo::default());
        let rows = record.demographic_rows();
        assert_eq!(rows[1], ("Age", "No data".to_string()));
        assert_eq!(rows[3], ("Blood Group", "No data".to_string()));
    }

    #[test]
    fn treatment_info_parses_iso_timestamp() {
        let json = serde_json::json!({
            "_id": "p1",
            "treatmentInfo": {
                "currentDiagnosis": "Hypertension",
                "lastUpdated": "2024-12-06T10:30:00.000Z"
            }
        });
        let record: PatientRecord = serde_json::from_value(json).unwrap();
        let info = record.treatment();
        assert_eq!(info.current_diagnosis, "Hypertension");
        assert_eq!(info.last_updated.unwrap().to_rfc3339(), "2024-12-06T10:30:00+00:00");
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = PatientUpdate {
            age: Some(40),
            blood_group: Some("A-".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({ "age": 40, "bloodGroup": "A-" }));
        assert!(PatientUpdate::default().is_empty());
    }

    #[test]
    fn summary_prefers_last_updated_over_last_visit() {
        let json = serde_json::json!({
            "_id": "p1",
            "firstName": "John",
            "lastName": "Smith",
            "lastVisit": "2024-01-02T09:00:00Z",
            "lastUpdated": "2024-03-04T15:45:00Z"
        });
        let summary: PatientSummary = serde_json::from_value(json).unwrap();
        assert_eq!(summary.last_seen_label(), "March 4, 2024 at 03:45 PM");
        assert_eq!(summary.status_label(), "N/A");
    }

    #[test]
    fn summary_without_dates_reads_na() {
        let json = serde_json::json!({ "_id": "p2", "firstName": "Ann", "lastName": "Lee" });
        let summary: PatientSummary = serde_json::from_value(json).unwrap();
        assert_eq!(summary.last_seen_label(), "N/A");
    }
}
