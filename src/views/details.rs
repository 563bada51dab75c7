//! Personal information and treatment tabs of one patient record.

use crate::models::{DemographicsForm, PatientRecord, TreatmentUpdate};
use crate::remote::Remote;
use crate::validation::{demographics_update, Validate};

use super::ViewContext;

pub const FETCH_ERROR: &str = "Failed to fetch patient data.";

pub struct PatientDetailsView {
    ctx: ViewContext,
    patient_id: String,
    record: Remote<Option<PatientRecord>>,
}

impl PatientDetailsView {
    pub fn new(ctx: ViewContext, patient_id: &str) -> Self {
        Self {
            ctx,
            patient_id: patient_id.to_string(),
            record: Remote::new(),
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn remote(&self) -> &Remote<Option<PatientRecord>> {
        &self.record
    }

    pub fn record(&self) -> Option<&PatientRecord> {
        self.record.data().and_then(Option::as_ref)
    }

    /// Edit form pre-filled from the loaded record.
    pub fn demographics_form(&self) -> DemographicsForm {
        self.record()
            .map(DemographicsForm::from_record)
            .unwrap_or_default()
    }

    pub async fn set_patient(&mut self, patient_id: &str) {
        if self.patient_id != patient_id {
            self.patient_id = patient_id.to_string();
            self.load().await;
        }
    }

    pub async fn load(&mut self) {
        let ticket = self.record.begin_reload(&self.patient_id);
        let result = self.ctx.client().patient(ticket.owner()).await;
        if let Err(e) = &result {
            self.ctx.notice(e);
        }
        self.record.complete_reload(ticket, result.map(Some), FETCH_ERROR);
    }

    /// Save the personal-information form. Blank fields are left out of
    /// the update; the record is replaced with the server's answer.
    pub async fn update_demographics(&mut self, form: &DemographicsForm) -> bool {
        let update = match demographics_update(form) {
            Ok(update) => update,
            Err(e) => {
                self.ctx.fail(&e, "");
                return false;
            }
        };

        match self.ctx.client().update_patient(&self.patient_id, &update).await {
            Ok(record) => {
                tracing::info!(patient_id = %self.patient_id, "Demographics updated");
                self.record.replace(Some(record));
                self.ctx.alert("Patient details updated successfully.");
                true
            }
            Err(e) => {
                self.ctx.fail(&e, "Failed to update patient details.");
                false
            }
        }
    }

    pub async fn update_treatment(&mut self, current_diagnosis: &str) -> bool {
        let update = TreatmentUpdate {
            current_diagnosis: current_diagnosis.trim().to_string(),
        };
        if let Err(e) = update.validate() {
            self.ctx.fail(&e, "");
            return false;
        }

        match self.ctx.client().update_patient(&self.patient_id, &update).await {
            Ok(record) => {
                tracing::info!(patient_id = %self.patient_id, "Treatment information updated");
                self.record.replace(Some(record));
                self.ctx.alert("Treatment information updated successfully.");
                true
            }
            Err(e) => {
                self.ctx.fail(&e, "Failed to update treatment information.");
                false
            }
        }
    }
}
