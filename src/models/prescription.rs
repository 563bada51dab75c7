use serde::{Deserialize, Serialize};

use super::enums::MealTiming;
use super::Keyed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(rename = "_id")]
    pub id: String,
    pub medicine: String,
    pub dosage: String,
    pub timing: MealTiming,
    pub frequency: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Administration times, `HH:MM`, in the order the doctor entered them.
    #[serde(default)]
    pub times: Vec<String>,
}

impl Prescription {
    /// Schedule line shown on the patient's medication card.
    pub fn schedule_label(&self) -> String {
        format!("{}, {}x per day", self.timing, self.frequency)
    }
}

impl Keyed for Prescription {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Form state for a new prescription.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub medicine: String,
    pub dosage: String,
    pub timing: MealTiming,
    pub frequency: u32,
    pub instructions: String,
    pub times: Vec<String>,
}

impl Default for NewPrescription {
    /// Blank form: after meals, once a day, one empty time slot.
    fn default() -> Self {
        Self {
            medicine: String::new(),
            dosage: String::new(),
            timing: MealTiming::default(),
            frequency: 1,
            instructions: String::new(),
            times: vec![String::new()],
        }
    }
}

impl NewPrescription {
    pub fn add_time(&mut self) {
        self.times.push(String::new());
    }

    pub fn set_time(&mut self, index: usize, value: &str) {
        if let Some(slot) = self.times.get_mut(index) {
            *slot = value.to_string();
        }
    }

    /// Remove a time slot; the last remaining slot cannot be removed.
    pub fn remove_time(&mut self, index: usize) -> bool {
        if self.times.len() <= 1 || index >= self.times.len() {
            return false;
        }
        self.times.remove(index);
        true
    }
}
