//! "Current diagnosis" card on the patient dashboard.

use chrono::{DateTime, Duration, Utc};

use crate::models::PatientRecord;

/// Follow-up interval after the last treatment update.
pub const FOLLOW_UP_DAYS: i64 = 14;

pub const INCOMPLETE: &str = "Treatment information is incomplete.";

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosisCard {
    Complete {
        diagnosis: String,
        last_updated: DateTime<Utc>,
        next_appointment: DateTime<Utc>,
    },
    Incomplete,
}

impl DiagnosisCard {
    pub fn from_record(record: &PatientRecord) -> Self {
        let treatment = record.treatment();
        match treatment.last_updated {
            Some(last_updated) if !treatment.current_diagnosis.trim().is_empty() => {
                DiagnosisCard::Complete {
                    diagnosis: treatment.current_diagnosis,
                    last_updated,
                    next_appointment: last_updated + Duration::days(FOLLOW_UP_DAYS),
                }
            }
            _ => DiagnosisCard::Incomplete,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            DiagnosisCard::Complete { diagnosis, last_updated, next_appointment } => vec![
                format!("Diagnosis: {diagnosis}"),
                format!("Last updated: {}", last_updated.format("%B %-d, %Y")),
                format!("Next appointment: {}", next_appointment.format("%B %-d, %Y")),
            ],
            DiagnosisCard::Incomplete => vec![INCOMPLETE.to_string()],
        }
    }
}
