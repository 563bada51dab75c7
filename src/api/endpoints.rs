//! Typed wrappers over the portal's REST routes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::{take_field, ApiClient};
use crate::error::PortalError;
use crate::models::{
    Allergy, HistoryItem, Keyed, NewAllergy, NewHistoryItem, NewPrescription, NewVitals,
    PatientRecord, PatientSummary, Prescription, Role, SessionIdentity, VitalsSample,
};
use crate::validation::Validate;

// ═══════════════════════════════════════════════════════════
// Login
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

/// Body of a successful `POST /api/login`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub user: SessionIdentity,
    pub token: String,
}

// ═══════════════════════════════════════════════════════════
// Per-patient collections
// ═══════════════════════════════════════════════════════════

/// A list nested under `/api/patients/:id/<segment>`.
///
/// The segment doubles as the envelope key of the list response; a
/// single created item comes back under `ITEM_FIELD`.
pub trait PatientCollection {
    type Item: DeserializeOwned + Keyed + Clone + Send + Sync + 'static;
    type Draft: Serialize + Validate + Send + Sync;

    const SEGMENT: &'static str;
    const ITEM_FIELD: &'static str;
    /// Lower-case noun used in prompts ("prescription", "medical history").
    const NOUN: &'static str;
    /// Capitalised noun for success messages.
    const TITLE: &'static str;
    const FETCH_ERROR: &'static str;
}

pub struct Prescriptions;
pub struct Histories;
pub struct Allergies;

impl PatientCollection for Prescriptions {
    type Item = Prescription;
    type Draft = NewPrescription;
    const SEGMENT: &'static str = "prescriptions";
    const ITEM_FIELD: &'static str = "prescription";
    const NOUN: &'static str = "prescription";
    const TITLE: &'static str = "Prescription";
    const FETCH_ERROR: &'static str = "Failed to fetch prescriptions.";
}

impl PatientCollection for Histories {
    type Item = HistoryItem;
    type Draft = NewHistoryItem;
    const SEGMENT: &'static str = "histories";
    const ITEM_FIELD: &'static str = "history";
    const NOUN: &'static str = "medical history";
    const TITLE: &'static str = "Medical history";
    const FETCH_ERROR: &'static str = "Failed to fetch medical histories.";
}

impl PatientCollection for Allergies {
    type Item = Allergy;
    type Draft = NewAllergy;
    const SEGMENT: &'static str = "allergies";
    const ITEM_FIELD: &'static str = "allergy";
    const NOUN: &'static str = "allergy";
    const TITLE: &'static str = "Allergy";
    const FETCH_ERROR: &'static str = "Failed to fetch allergies.";
}

fn patient_path(patient_id: &str) -> String {
    format!("/api/patients/{patient_id}")
}

impl ApiClient {
    /// `POST /api/login`. Returns the exact status so the caller can
    /// insist on 200 rather than any 2xx.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(u16, Value), PortalError> {
        let body = LoginRequest { email, password, role };
        self.post_json_with_status("/api/login", &body).await
    }

    pub async fn patient(&self, patient_id: &str) -> Result<PatientRecord, PortalError> {
        let body = self.get_json(&patient_path(patient_id), &[]).await?;
        take_field(body, "patient")
    }

    /// `PUT /api/patients/:id` with any partial body; returns the
    /// server's updated record.
    pub async fn update_patient<B: Serialize + ?Sized>(
        &self,
        patient_id: &str,
        update: &B,
    ) -> Result<PatientRecord, PortalError> {
        let body = self.put_json(&patient_path(patient_id), update).await?;
        take_field(body, "patient")
    }

    pub async fn search_patients(&self, query: &str) -> Result<Vec<PatientSummary>, PortalError> {
        let body = self
            .get_json("/api/patients/search", &[("query", query)])
            .await?;
        take_field(body, "patients")
    }

    pub async fn list<C: PatientCollection>(
        &self,
        patient_id: &str,
    ) -> Result<Vec<C::Item>, PortalError> {
        let path = format!("{}/{}", patient_path(patient_id), C::SEGMENT);
        let body = self.get_json(&path, &[]).await?;
        take_field(body, C::SEGMENT)
    }

    pub async fn create<C: PatientCollection>(
        &self,
        patient_id: &str,
        draft: &C::Draft,
    ) -> Result<C::Item, PortalError> {
        let path = format!("{}/{}", patient_path(patient_id), C::SEGMENT);
        let body = self.post_json(&path, draft).await?;
        take_field(body, C::ITEM_FIELD)
    }

    pub async fn remove<C: PatientCollection>(
        &self,
        patient_id: &str,
        item_id: &str,
    ) -> Result<(), PortalError> {
        let path = format!("{}/{}/{}", patient_path(patient_id), C::SEGMENT, item_id);
        self.delete(&path).await.map(|_| ())
    }

    pub async fn vitals(&self, patient_id: &str) -> Result<Vec<VitalsSample>, PortalError> {
        let body = self
            .get_json(&format!("{}/vitals", patient_path(patient_id)), &[])
            .await?;
        take_field(body, "vitals")
    }

    /// Submit a reading. The backend may echo it back as `vital`;
    /// `None` means it did not and the caller should reload.
    pub async fn add_vitals(
        &self,
        patient_id: &str,
        vitals: &NewVitals,
    ) -> Result<Option<VitalsSample>, PortalError> {
        let body = self
            .post_json(&format!("{}/vitals", patient_path(patient_id)), vitals)
            .await?;
        let echoed = body.get("vital").is_some_and(|v| !v.is_null());
        if echoed {
            take_field(body, "vital").map(Some)
        } else {
            Ok(None)
        }
    }
}
