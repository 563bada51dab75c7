//! Health metrics: vitals history plus the submission form.

use crate::models::vitals::{last_updated_label, recent_metrics};
use crate::models::{HealthMetric, VitalsForm, VitalsSample};
use crate::remote::RemoteCollection;
use crate::validation::parse_vitals;

use super::ViewContext;

pub const FETCH_ERROR: &str = "Failed to fetch vitals data.";
const SUBMIT_ERROR: &str = "Failed to submit health metrics. Please try again.";

pub struct VitalsView {
    ctx: ViewContext,
    patient_id: String,
    samples: RemoteCollection<VitalsSample>,
}

impl VitalsView {
    pub fn new(ctx: ViewContext, patient_id: &str) -> Self {
        Self {
            ctx,
            patient_id: patient_id.to_string(),
            samples: RemoteCollection::new(),
        }
    }

    pub fn remote(&self) -> &RemoteCollection<VitalsSample> {
        &self.samples
    }

    /// All readings, oldest first.
    pub fn samples(&self) -> &[VitalsSample] {
        self.samples.items()
    }

    pub fn recent(&self) -> Vec<HealthMetric> {
        recent_metrics(self.samples())
    }

    pub fn last_updated(&self) -> String {
        last_updated_label(&self.recent())
    }

    pub async fn set_patient(&mut self, patient_id: &str) {
        if self.patient_id != patient_id {
            self.patient_id = patient_id.to_string();
            self.load().await;
        }
    }

    pub async fn load(&mut self) {
        let ticket = self.samples.begin_reload(&self.patient_id);
        let result = self.ctx.client().vitals(ticket.owner()).await;
        if let Err(e) = &result {
            self.ctx.notice(e);
        }
        self.samples.complete_reload(ticket, result, FETCH_ERROR);
    }

    /// Parse, range-check and submit one reading. An echoed reading is
    /// appended; otherwise the history is re-read.
    pub async fn submit(&mut self, form: &VitalsForm) -> bool {
        let vitals = match parse_vitals(form) {
            Ok(v) => v,
            Err(e) => {
                self.ctx.fail(&e, "");
                return false;
            }
        };

        match self.ctx.client().add_vitals(&self.patient_id, &vitals).await {
            Ok(echoed) => {
                tracing::info!(patient_id = %self.patient_id, echoed = echoed.is_some(), "Vitals submitted");
                match echoed {
                    Some(sample) => self.samples.push(sample),
                    None => self.load().await,
                }
                self.ctx.alert("Health metrics submitted successfully.");
                true
            }
            Err(e) => {
                self.ctx.fail(&e, SUBMIT_ERROR);
                false
            }
        }
    }
}
