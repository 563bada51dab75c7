//! Client-side checks run before any mutation reaches the network.
//!
//! A failed check yields `PortalError::Validation` carrying the text the
//! user sees in the blocking alert.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::PortalError;
use crate::models::{
    DemographicsForm, NewAllergy, NewHistoryItem, NewPrescription, NewVitals, PatientUpdate,
    TreatmentUpdate, VitalsForm,
};

pub const SYSTOLIC_RANGE: RangeInclusive<f64> = 0.0..=300.0;
pub const DIASTOLIC_RANGE: RangeInclusive<f64> = 0.0..=200.0;
pub const SUGAR_RANGE: RangeInclusive<f64> = 0.0..=600.0;

static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d$").unwrap());

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

/// A draft that can be checked before submission.
pub trait Validate {
    fn validate(&self) -> Result<(), PortalError>;
}

fn invalid(message: &str) -> PortalError {
    PortalError::Validation(message.to_string())
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `HH:MM`, 24-hour clock.
pub fn is_time_of_day(value: &str) -> bool {
    TIME_OF_DAY.is_match(value)
}

impl Validate for NewPrescription {
    fn validate(&self) -> Result<(), PortalError> {
        if blank(&self.medicine) || blank(&self.dosage) || self.frequency < 1 {
            return Err(invalid("Please fill in all required fields."));
        }
        if self.times.is_empty() || self.times.iter().any(|t| !is_time_of_day(t)) {
            return Err(invalid("Please enter every administration time as HH:MM."));
        }
        Ok(())
    }
}

impl Validate for NewHistoryItem {
    fn validate(&self) -> Result<(), PortalError> {
        if blank(&self.condition) {
            return Err(invalid("Please enter the condition."));
        }
        if let Some(year) = &self.year {
            if !YEAR.is_match(year.trim()) {
                return Err(invalid("Please enter the year as four digits."));
            }
        }
        Ok(())
    }
}

impl Validate for NewAllergy {
    fn validate(&self) -> Result<(), PortalError> {
        if blank(&self.name) {
            return Err(invalid("Please enter the allergy name and severity."));
        }
        Ok(())
    }
}

impl Validate for NewVitals {
    fn validate(&self) -> Result<(), PortalError> {
        let in_range = SYSTOLIC_RANGE.contains(&self.systolic)
            && DIASTOLIC_RANGE.contains(&self.diastolic)
            && SUGAR_RANGE.contains(&self.sugar);
        if !in_range {
            return Err(invalid("Please enter valid health metrics."));
        }
        Ok(())
    }
}

impl Validate for TreatmentUpdate {
    fn validate(&self) -> Result<(), PortalError> {
        if blank(&self.current_diagnosis) {
            return Err(invalid("Please enter the current diagnosis."));
        }
        Ok(())
    }
}

/// Parse and range-check the health-metrics form.
pub fn parse_vitals(form: &VitalsForm) -> Result<NewVitals, PortalError> {
    fn number(raw: &str) -> Result<f64, PortalError> {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid("Please enter valid health metrics."))
    }

    let vitals = NewVitals {
        systolic: number(&form.systolic)?,
        diastolic: number(&form.diastolic)?,
        sugar: number(&form.sugar)?,
    };
    vitals.validate()?;
    Ok(vitals)
}

/// Build the demographics update: empty fields are omitted, `age` must
/// parse as a whole number.
pub fn demographics_update(form: &DemographicsForm) -> Result<PatientUpdate, PortalError> {
    fn text(value: &str) -> Option<String> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    let age = match text(&form.age) {
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| invalid("Please enter a valid age."))?,
        ),
        None => None,
    };

    Ok(PatientUpdate {
        age,
        gender: text(&form.gender),
        blood_group: text(&form.blood_group),
        primary_contact: text(&form.primary_contact),
        emergency_contact: text(&form.emergency_contact),
    })
}
