pub mod allergy;
pub mod enums;
pub mod history;
pub mod identity;
pub mod patient;
pub mod prescription;
pub mod vitals;

pub use allergy::{Allergy, NewAllergy};
pub use enums::{AllergySeverity, InvalidEnum, MealTiming, Role};
pub use history::{HistoryItem, NewHistoryItem};
pub use identity::{Doctor, Patient, SessionIdentity};
pub use patient::{DemographicsForm, PatientRecord, PatientSummary, PatientUpdate, TreatmentInfo, TreatmentUpdate};
pub use prescription::{NewPrescription, Prescription};
pub use vitals::{HealthMetric, NewVitals, VitalsForm, VitalsSample};

/// An entity addressed by a server-issued id, unique within its patient.
pub trait Keyed {
    fn key(&self) -> &str;
}
