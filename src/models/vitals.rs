use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One blood-pressure + blood-sugar reading.
///
/// Readings carry no server id; the backend orders them oldest first.
/// Missing numeric fields read as 0, matching how the dashboards chart them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsSample {
    #[serde(default, alias = "timestamp")]
    pub date: String,
    #[serde(default)]
    pub systolic: f64,
    #[serde(default)]
    pub diastolic: f64,
    #[serde(default)]
    pub sugar: f64,
}

impl VitalsSample {
    /// Parse `date` as RFC 3339, falling back to a bare `YYYY-MM-DD`.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.date) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn blood_pressure_label(&self) -> String {
        format!("{}/{} mmHg", self.systolic, self.diastolic)
    }
}

/// Body of `POST /api/patients/:id/vitals`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NewVitals {
    pub systolic: f64,
    pub diastolic: f64,
    pub sugar: f64,
}

/// Raw text from the health-metrics form, before parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VitalsForm {
    pub systolic: String,
    pub diastolic: String,
    pub sugar: String,
}

/// Summary row for the patient's "recent metrics" panel.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthMetric {
    pub systolic: f64,
    pub diastolic: f64,
    pub sugar: f64,
    pub recorded_at: Option<DateTime<Utc>>,
    pub blood_pressure: String,
}

/// Number of readings shown in the recent-metrics panel.
pub const RECENT_METRICS: usize = 4;

/// The most recent readings, newest first.
pub fn recent_metrics(samples: &[VitalsSample]) -> Vec<HealthMetric> {
    let start = samples.len().saturating_sub(RECENT_METRICS);
    samples[start..]
        .iter()
        .rev()
        .map(|s| HealthMetric {
            systolic: s.systolic,
            diastolic: s.diastolic,
            sugar: s.sugar,
            recorded_at: s.recorded_at(),
            blood_pressure: s.blood_pressure_label(),
        })
        .collect()
}

/// "Last updated" caption for the recent-metrics panel.
pub fn last_updated_label(metrics: &[HealthMetric]) -> String {
    metrics
        .first()
        .and_then(|m| m.recorded_at)
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "No data available".to_string())
}
